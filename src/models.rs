use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

#[derive(Debug, Error, PartialEq)]
pub enum ArticleError {
    #[error("article is missing its {0}")]
    MissingField(&'static str),
}

/// A fetched news item. `sentiment` stays `None` until a classifier runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub sentiment: Option<Sentiment>,
    pub summary: Option<String>,
}

impl Article {
    /// Builds an article from possibly-missing fields, rejecting blank titles or links.
    pub fn from_parts(title: Option<&str>, link: Option<&str>) -> Result<Self, ArticleError> {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ArticleError::MissingField("title"))?;
        let link = link
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .ok_or(ArticleError::MissingField("link"))?;

        Ok(Self {
            title: title.to_string(),
            link: link.to_string(),
            sentiment: None,
            summary: None,
        })
    }

    pub fn sentiment_or_default(&self) -> Sentiment {
        self.sentiment.unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub date: NaiveDate,
    pub title: String,
    pub sentiment: Sentiment,
    pub link: String,
}

impl HistoryRecord {
    pub fn from_article(article: &Article, date: NaiveDate) -> Self {
        Self {
            date,
            title: article.title.clone(),
            sentiment: article.sentiment_or_default(),
            link: article.link.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySentimentCounts {
    pub date: NaiveDate,
    pub positive: u32,
    pub negative: u32,
    pub neutral: u32,
}

impl DailySentimentCounts {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            positive: 0,
            negative: 0,
            neutral: 0,
        }
    }

    pub fn count(&self, sentiment: Sentiment) -> u32 {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
        }
    }

    pub fn increment(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => self.neutral += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub point_estimate: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub word: String,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_requires_title_and_link() {
        assert_eq!(
            Article::from_parts(None, Some("https://example.com")),
            Err(ArticleError::MissingField("title"))
        );
        assert_eq!(
            Article::from_parts(Some("Headline"), Some("   ")),
            Err(ArticleError::MissingField("link"))
        );

        let article = Article::from_parts(Some(" Headline "), Some("https://example.com")).unwrap();
        assert_eq!(article.title, "Headline");
        assert_eq!(article.sentiment_or_default(), Sentiment::Neutral);
    }

    #[test]
    fn record_defaults_missing_sentiment_to_neutral() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut article =
            Article::from_parts(Some("Chips rally"), Some("https://x.test/a")).unwrap();
        assert_eq!(HistoryRecord::from_article(&article, date).sentiment, Sentiment::Neutral);

        article.sentiment = Some(Sentiment::Positive);
        let record = HistoryRecord::from_article(&article, date);
        assert_eq!(record.sentiment, Sentiment::Positive);
        assert_eq!(record.date, date);
        assert_eq!(record.link, "https://x.test/a");
    }

    #[test]
    fn daily_counts_track_each_class() {
        let mut counts = DailySentimentCounts::empty(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        counts.increment(Sentiment::Negative);
        counts.increment(Sentiment::Negative);
        counts.increment(Sentiment::Neutral);
        assert_eq!(counts.count(Sentiment::Positive), 0);
        assert_eq!(counts.count(Sentiment::Negative), 2);
        assert_eq!(counts.count(Sentiment::Neutral), 1);
    }
}
