use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{DailySentimentCounts, HistoryRecord, Sentiment};

/// One row per distinct ledger date, ascending, with every sentiment class
/// present (zero when no record on that date carries it).
pub fn daily_sentiment_counts(ledger: &[HistoryRecord]) -> Vec<DailySentimentCounts> {
    let mut by_date: BTreeMap<NaiveDate, DailySentimentCounts> = BTreeMap::new();

    for record in ledger {
        by_date
            .entry(record.date)
            .or_insert_with(|| DailySentimentCounts::empty(record.date))
            .increment(record.sentiment);
    }

    by_date.into_values().collect()
}

/// Projects the aggregated table onto the series the forecaster consumes.
pub fn sentiment_series(
    counts: &[DailySentimentCounts],
    sentiment: Sentiment,
) -> Vec<(NaiveDate, f64)> {
    counts
        .iter()
        .map(|day| (day.date, f64::from(day.count(sentiment))))
        .collect()
}
