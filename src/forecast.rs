//! Short-horizon extrapolation of a daily count series.
//!
//! The model is a least-squares linear trend over day offsets from the first
//! observation, plus an additive day-of-week component once the history is
//! long enough to estimate one. Intervals come from the residual standard
//! error scaled by the usual regression prediction-error factor, so they widen
//! as the horizon moves away from the bulk of the data.

use chrono::{Datelike, Duration, NaiveDate};
use thiserror::Error;
use tracing::debug;

use crate::models::ForecastPoint;

pub const HORIZON_DAYS: u32 = 7;

const DAYS_PER_WEEK: usize = 7;
/// Minimum observations per weekday before a weekly component is fitted.
const MIN_WEEKLY_CYCLES: usize = 2;

#[derive(Debug, Error, PartialEq)]
pub enum ForecastError {
    #[error("need at least 2 distinct dates to forecast, found {observed}")]
    InsufficientData { observed: usize },
    #[error("series dates must be strictly increasing, got {previous} then {next}")]
    UnorderedSeries { previous: NaiveDate, next: NaiveDate },
    #[error("interval width must lie strictly between 0 and 1, got {width}")]
    InvalidIntervalWidth { width: f64 },
}

#[derive(Debug, Clone)]
pub struct ForecastConfig {
    pub horizon_days: u32,
    /// Nominal coverage of the interval, e.g. 0.8 for an 80% band.
    pub interval_width: f64,
    pub weekly_seasonality: bool,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon_days: HORIZON_DAYS,
            interval_width: 0.8,
            weekly_seasonality: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrendFit {
    pub origin: NaiveDate,
    pub last_date: NaiveDate,
    pub intercept: f64,
    pub slope: f64,
    /// Additive offset per weekday, Monday first.
    pub weekly: Option<[f64; DAYS_PER_WEEK]>,
    pub sigma: f64,
    observations: usize,
    mean_offset: f64,
    offset_spread: f64,
}

impl TrendFit {
    fn offset(&self, date: NaiveDate) -> f64 {
        (date - self.origin).num_days() as f64
    }

    fn expected(&self, date: NaiveDate) -> f64 {
        let trend = self.intercept + self.slope * self.offset(date);
        let seasonal = self
            .weekly
            .map(|weekly| weekly[weekday_index(date)])
            .unwrap_or(0.0);
        trend + seasonal
    }

    /// Point forecasts and bounds for the `horizon_days` days after the last
    /// observation. Counts cannot be negative, so all three values are floored
    /// at zero (which keeps them ordered).
    fn project(&self, horizon_days: u32, interval_width: f64) -> Vec<ForecastPoint> {
        let z = z_score(interval_width);
        let n = self.observations as f64;

        (1..=i64::from(horizon_days))
            .map(|step| {
                let date = self.last_date + Duration::days(step);
                let distance = self.offset(date) - self.mean_offset;
                let spread = (1.0 + 1.0 / n + distance * distance / self.offset_spread).sqrt();
                let half_width = z * self.sigma * spread;
                let point = self.expected(date);

                ForecastPoint {
                    date,
                    point_estimate: point.max(0.0),
                    lower_bound: (point - half_width).max(0.0),
                    upper_bound: (point + half_width).max(0.0),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TrendForecaster {
    config: ForecastConfig,
}

impl TrendForecaster {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    pub fn forecast(
        &self,
        series: &[(NaiveDate, f64)],
    ) -> Result<Vec<ForecastPoint>, ForecastError> {
        let width = self.config.interval_width;
        if !(width > 0.0 && width < 1.0) {
            return Err(ForecastError::InvalidIntervalWidth { width });
        }

        let fit = self.fit(series)?;
        Ok(fit.project(self.config.horizon_days, self.config.interval_width))
    }

    pub fn fit(&self, series: &[(NaiveDate, f64)]) -> Result<TrendFit, ForecastError> {
        if series.len() < 2 {
            return Err(ForecastError::InsufficientData {
                observed: series.len(),
            });
        }
        for pair in series.windows(2) {
            if pair[1].0 <= pair[0].0 {
                return Err(ForecastError::UnorderedSeries {
                    previous: pair[0].0,
                    next: pair[1].0,
                });
            }
        }

        let origin = series[0].0;
        let last_date = series[series.len() - 1].0;
        let offsets: Vec<f64> = series
            .iter()
            .map(|(date, _)| (*date - origin).num_days() as f64)
            .collect();
        let values: Vec<f64> = series.iter().map(|(_, value)| *value).collect();

        let n = series.len() as f64;
        let mean_offset = offsets.iter().sum::<f64>() / n;
        let mean_value = values.iter().sum::<f64>() / n;
        let offset_spread: f64 = offsets.iter().map(|t| (t - mean_offset).powi(2)).sum();
        let covariance: f64 = offsets
            .iter()
            .zip(&values)
            .map(|(t, y)| (t - mean_offset) * (y - mean_value))
            .sum();
        let slope = covariance / offset_spread;
        let intercept = mean_value - slope * mean_offset;

        let weekly = if self.config.weekly_seasonality && weekly_pattern_detectable(series) {
            Some(weekday_effects(series, &offsets, intercept, slope))
        } else {
            None
        };

        let mut fit = TrendFit {
            origin,
            last_date,
            intercept,
            slope,
            weekly,
            sigma: 0.0,
            observations: series.len(),
            mean_offset,
            offset_spread,
        };

        let squared_error: f64 = series
            .iter()
            .map(|(date, value)| (value - fit.expected(*date)).powi(2))
            .sum();
        let parameters = if weekly.is_some() { 2 + DAYS_PER_WEEK - 1 } else { 2 };
        fit.sigma = if series.len() > parameters {
            (squared_error / (series.len() - parameters) as f64).sqrt()
        } else {
            mean_absolute_change(&values)
        };

        debug!(
            slope = fit.slope,
            intercept = fit.intercept,
            sigma = fit.sigma,
            weekly = fit.weekly.is_some(),
            observations = fit.observations,
            "fitted trend model"
        );
        Ok(fit)
    }
}

fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_monday() as usize
}

/// True when the series spans two full weeks and every weekday has been
/// observed at least `MIN_WEEKLY_CYCLES` times.
fn weekly_pattern_detectable(series: &[(NaiveDate, f64)]) -> bool {
    let (first, last) = (series[0].0, series[series.len() - 1].0);
    if (last - first).num_days() + 1 < (MIN_WEEKLY_CYCLES * DAYS_PER_WEEK) as i64 {
        return false;
    }

    let mut seen = [0usize; DAYS_PER_WEEK];
    for (date, _) in series {
        seen[weekday_index(*date)] += 1;
    }
    seen.iter().all(|count| *count >= MIN_WEEKLY_CYCLES)
}

/// Mean detrended value per weekday, centred so the effects sum to zero.
fn weekday_effects(
    series: &[(NaiveDate, f64)],
    offsets: &[f64],
    intercept: f64,
    slope: f64,
) -> [f64; DAYS_PER_WEEK] {
    let mut sums = [0.0; DAYS_PER_WEEK];
    let mut counts = [0usize; DAYS_PER_WEEK];

    for ((date, value), offset) in series.iter().zip(offsets) {
        let idx = weekday_index(*date);
        sums[idx] += value - (intercept + slope * offset);
        counts[idx] += 1;
    }

    let mut effects = [0.0; DAYS_PER_WEEK];
    for idx in 0..DAYS_PER_WEEK {
        if counts[idx] > 0 {
            effects[idx] = sums[idx] / counts[idx] as f64;
        }
    }

    let centre = effects.iter().sum::<f64>() / DAYS_PER_WEEK as f64;
    for effect in &mut effects {
        *effect -= centre;
    }
    effects
}

/// Scale fallback for fits with no residual degrees of freedom.
fn mean_absolute_change(values: &[f64]) -> f64 {
    let changes: Vec<f64> = values.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
    if changes.is_empty() {
        0.0
    } else {
        changes.iter().sum::<f64>() / changes.len() as f64
    }
}

/// Two-sided standard normal quantile for a central interval of the given
/// width (Abramowitz and Stegun 26.2.23, absolute error below 4.5e-4).
fn z_score(interval_width: f64) -> f64 {
    let tail = (1.0 - interval_width) / 2.0;
    let t = (-2.0 * tail.ln()).sqrt();
    let numerator = 2.515517 + 0.802853 * t + 0.010328 * t * t;
    let denominator = 1.0 + 1.432788 * t + 0.189269 * t * t + 0.001308 * t * t * t;
    t - numerator / denominator
}
