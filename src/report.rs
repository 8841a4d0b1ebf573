use std::fmt::Write;

use chrono::NaiveDateTime;

use crate::models::{Article, ForecastPoint, LeaderboardEntry};

pub fn build_leaderboard_report(entries: &[LeaderboardEntry]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Top {} Words in News Titles:", entries.len());
    for entry in entries {
        let _ = writeln!(output, "{}: {} mentions", entry.word, entry.count);
    }

    output
}

pub fn build_daily_summary(generated_at: NaiveDateTime, articles: &[Article]) -> String {
    let mut output = String::new();

    let _ = writeln!(
        output,
        "Daily News Summary - {}",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(output, "{}", "=".repeat(50));
    let _ = writeln!(output);

    if articles.is_empty() {
        let _ = writeln!(output, "No articles fetched in this run.");
    }

    for (i, article) in articles.iter().enumerate() {
        let _ = writeln!(output, "{}. {}", i + 1, article.title);
        if let Some(summary) = article.summary.as_deref().filter(|s| *s != article.title) {
            let _ = writeln!(output, "Summary: {summary}");
        }
        let _ = writeln!(output, "Link: {}", article.link);
        let _ = writeln!(output);
    }

    output
}

pub fn build_forecast_csv(points: &[ForecastPoint]) -> anyhow::Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["date", "point_estimate", "lower_bound", "upper_bound"])?;
    for point in points {
        writer.write_record([
            point.date.to_string(),
            format!("{:.4}", point.point_estimate),
            format!("{:.4}", point.lower_bound),
            format!("{:.4}", point.upper_bound),
        ])?;
    }
    Ok(writer.into_inner().map_err(|err| err.into_error())?)
}
