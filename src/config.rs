use std::path::PathBuf;

use clap::Args;

use crate::forecast::ForecastConfig;

/// Where the ledger and each derived artifact live.
#[derive(Debug, Clone, Args)]
pub struct OutputPaths {
    /// Append-only news ledger (CSV)
    #[arg(long, global = true, default_value = "news_history.csv")]
    pub history: PathBuf,
    #[arg(long, global = true, default_value = "sentiment_forecast.csv")]
    pub forecast_out: PathBuf,
    #[arg(long, global = true, default_value = "leaderboard.txt")]
    pub leaderboard_out: PathBuf,
    #[arg(long, global = true, default_value = "news_summary.txt")]
    pub summary_out: PathBuf,
    #[arg(long, global = true, default_value = "word_cloud.svg")]
    pub word_cloud_out: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct ForecastArgs {
    /// Nominal coverage of the forecast interval, strictly between 0 and 1
    #[arg(long, default_value_t = 0.8, value_parser = parse_interval_width)]
    pub interval_width: f64,
    /// Never fit a day-of-week component
    #[arg(long)]
    pub no_weekly: bool,
}

fn parse_interval_width(raw: &str) -> Result<f64, String> {
    let width: f64 = raw.parse().map_err(|_| format!("`{raw}` is not a number"))?;
    if width > 0.0 && width < 1.0 {
        Ok(width)
    } else {
        Err(format!("{width} is outside (0, 1)"))
    }
}

impl ForecastArgs {
    pub fn to_config(&self) -> ForecastConfig {
        ForecastConfig {
            interval_width: self.interval_width,
            weekly_seasonality: !self.no_weekly,
            ..ForecastConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        forecast: ForecastArgs,
    }

    #[test]
    fn interval_width_must_be_a_fraction() {
        assert_eq!(parse_interval_width("0.95"), Ok(0.95));
        assert!(parse_interval_width("0").is_err());
        assert!(parse_interval_width("1").is_err());
        assert!(parse_interval_width("-0.2").is_err());
        assert!(parse_interval_width("NaN").is_err());
        assert!(parse_interval_width("wide").is_err());
    }

    #[test]
    fn cli_rejects_out_of_range_width() {
        assert!(Harness::try_parse_from(["digest", "--interval-width", "1.5"]).is_err());

        let parsed = Harness::try_parse_from(["digest", "--interval-width", "0.9"]).unwrap();
        let config = parsed.forecast.to_config();
        assert_eq!(config.interval_width, 0.9);
        assert!(config.weekly_seasonality);
    }
}
