use std::collections::HashMap;

use thiserror::Error;

use crate::models::{HistoryRecord, LeaderboardEntry};

pub const DEFAULT_TOP_WORDS: usize = 5;

#[derive(Debug, Error, PartialEq)]
pub enum LeaderboardError {
    #[error("news history is empty")]
    EmptyLedger,
}

/// Counts exact whitespace-delimited tokens, returning them by descending
/// count. Ties keep the order in which each token first appeared.
pub fn word_frequencies<'a, I>(titles: I) -> Vec<LeaderboardEntry>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut entries: Vec<LeaderboardEntry> = Vec::new();

    for token in titles.into_iter().flat_map(str::split_whitespace) {
        match index.get(token) {
            Some(&slot) => entries[slot].count += 1,
            None => {
                index.insert(token, entries.len());
                entries.push(LeaderboardEntry {
                    word: token.to_string(),
                    count: 1,
                });
            }
        }
    }

    // stable sort keeps first-seen order among equal counts
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}

pub fn build_leaderboard(
    ledger: &[HistoryRecord],
    top: usize,
) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
    if ledger.is_empty() {
        return Err(LeaderboardError::EmptyLedger);
    }

    let mut ranked = word_frequencies(ledger.iter().map(|record| record.title.as_str()));
    ranked.truncate(top);
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sentiment;
    use chrono::NaiveDate;

    fn ledger(titles: &[&str]) -> Vec<HistoryRecord> {
        titles
            .iter()
            .enumerate()
            .map(|(i, title)| HistoryRecord {
                date: NaiveDate::from_ymd_opt(2024, 1, 1 + i as u32).unwrap(),
                title: title.to_string(),
                sentiment: Sentiment::Neutral,
                link: format!("https://news.test/{i}"),
            })
            .collect()
    }

    #[test]
    fn most_common_word_ranks_first() {
        let ranked = build_leaderboard(&ledger(&["a b", "a c", "a d"]), DEFAULT_TOP_WORDS).unwrap();
        assert_eq!(
            ranked[0],
            LeaderboardEntry {
                word: "a".to_string(),
                count: 3
            }
        );
        assert_eq!(ranked.len(), 4);
    }

    #[test]
    fn ties_keep_first_encountered_order() {
        let ranked = build_leaderboard(&ledger(&["zeta alpha", "mid zeta alpha"]), 3).unwrap();
        let words: Vec<_> = ranked.iter().map(|e| e.word.as_str()).collect();
        assert_eq!(words, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn tokens_are_case_and_punctuation_sensitive() {
        let ranked = word_frequencies(["AI ai AI, ai"]);
        let words: Vec<_> = ranked.iter().map(|e| (e.word.as_str(), e.count)).collect();
        assert_eq!(words, vec![("ai", 2), ("AI", 1), ("AI,", 1)]);
    }

    #[test]
    fn keeps_only_top_entries() {
        let titles = ["one two three four five six seven", "seven six"];
        let ranked = build_leaderboard(&ledger(&titles), DEFAULT_TOP_WORDS).unwrap();
        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked[0].word, "six");
        assert_eq!(ranked[1].word, "seven");
    }

    #[test]
    fn empty_ledger_is_reported_not_ranked() {
        assert_eq!(
            build_leaderboard(&[], DEFAULT_TOP_WORDS),
            Err(LeaderboardError::EmptyLedger)
        );
    }
}
