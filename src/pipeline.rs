use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use tracing::{info, warn};

use crate::aggregate::{daily_sentiment_counts, sentiment_series};
use crate::config::OutputPaths;
use crate::forecast::{ForecastError, TrendForecaster};
use crate::history::{persist_atomically, HistoryStore};
use crate::leaderboard::{build_leaderboard, LeaderboardError};
use crate::models::{Article, ForecastPoint, HistoryRecord, LeaderboardEntry, Sentiment};
use crate::report;
use crate::sentiment::{label_articles, SentimentClassifier};
use crate::sources::{collect_articles, ArticleSource};
use crate::summarize::{summarize_articles, Summarizer};
use crate::wordcloud::WordCloudRenderer;

/// The collaborators a run needs, constructed once by the caller.
pub struct Pipeline {
    pub store: HistoryStore,
    pub outputs: OutputPaths,
    pub classifier: Box<dyn SentimentClassifier>,
    pub summarizer: Box<dyn Summarizer>,
    pub word_cloud: Box<dyn WordCloudRenderer>,
    pub forecaster: TrendForecaster,
    pub top_words: usize,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub fetched: usize,
    pub ledger_len: usize,
    pub forecast_days: Option<usize>,
    pub leaderboard_words: Option<usize>,
}

impl Pipeline {
    /// One full batch pass: fetch, label, record, then rebuild every artifact
    /// from the ledger.
    pub async fn run(
        &self,
        sources: &[Box<dyn ArticleSource>],
        now: NaiveDateTime,
    ) -> anyhow::Result<RunSummary> {
        let mut articles = collect_articles(sources).await;
        info!(count = articles.len(), "collected articles");

        summarize_articles(self.summarizer.as_ref(), &mut articles);
        self.write_word_cloud(&articles)?;

        let ledger_len = self.ingest(&mut articles, now.date())?;
        let forecast_days = self.forecast()?.map(|points| points.len());
        let leaderboard_words = self.leaderboard()?.map(|entries| entries.len());
        self.write_summary(now, &articles)?;

        Ok(RunSummary {
            fetched: articles.len(),
            ledger_len,
            forecast_days,
            leaderboard_words,
        })
    }

    /// Labels unlabelled articles and appends them to the ledger dated `today`.
    pub fn ingest(&self, articles: &mut [Article], today: NaiveDate) -> anyhow::Result<usize> {
        label_articles(self.classifier.as_ref(), articles);
        let records: Vec<HistoryRecord> = articles
            .iter()
            .map(|article| HistoryRecord::from_article(article, today))
            .collect();

        self.store.initialize()?;
        let total = self.store.append(&records)?;
        Ok(total)
    }

    /// Forecasts daily positive volume and writes the artifact. `None` when
    /// the ledger covers fewer than two dates.
    pub fn forecast(&self) -> anyhow::Result<Option<Vec<ForecastPoint>>> {
        let ledger = self.store.load()?;
        let counts = daily_sentiment_counts(&ledger);
        let series = sentiment_series(&counts, Sentiment::Positive);

        let points = match self.forecaster.forecast(&series) {
            Ok(points) => points,
            Err(err @ ForecastError::InsufficientData { .. }) => {
                warn!(error = %err, "skipping sentiment forecast");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let contents = report::build_forecast_csv(&points)?;
        persist_atomically(&self.outputs.forecast_out, &contents).with_context(|| {
            format!("failed to write {}", self.outputs.forecast_out.display())
        })?;
        info!(
            path = %self.outputs.forecast_out.display(),
            days = points.len(),
            "sentiment forecast saved"
        );

        Ok(Some(points))
    }

    /// Ranks title words across the whole ledger and writes the report.
    /// `None` when the ledger is empty.
    pub fn leaderboard(&self) -> anyhow::Result<Option<Vec<LeaderboardEntry>>> {
        let ledger = self.store.load()?;

        let entries = match build_leaderboard(&ledger, self.top_words) {
            Ok(entries) => entries,
            Err(LeaderboardError::EmptyLedger) => {
                warn!(
                    path = %self.store.path().display(),
                    "news history is empty, skipping leaderboard"
                );
                return Ok(None);
            }
        };

        let contents = report::build_leaderboard_report(&entries);
        persist_atomically(&self.outputs.leaderboard_out, contents.as_bytes()).with_context(|| {
            format!("failed to write {}", self.outputs.leaderboard_out.display())
        })?;
        info!(path = %self.outputs.leaderboard_out.display(), "leaderboard generated");

        Ok(Some(entries))
    }

    fn write_word_cloud(&self, articles: &[Article]) -> anyhow::Result<()> {
        let titles: Vec<&str> = articles.iter().map(|a| a.title.as_str()).collect();
        let Some(image) = self.word_cloud.render(&titles) else {
            warn!("no titles this run, skipping word cloud");
            return Ok(());
        };

        persist_atomically(&self.outputs.word_cloud_out, image.as_bytes()).with_context(|| {
            format!("failed to write {}", self.outputs.word_cloud_out.display())
        })?;
        info!(path = %self.outputs.word_cloud_out.display(), "word cloud generated");
        Ok(())
    }

    fn write_summary(&self, now: NaiveDateTime, articles: &[Article]) -> anyhow::Result<()> {
        let contents = report::build_daily_summary(now, articles);
        persist_atomically(&self.outputs.summary_out, contents.as_bytes()).with_context(|| {
            format!("failed to write {}", self.outputs.summary_out.display())
        })?;
        info!(path = %self.outputs.summary_out.display(), "news summary written");
        Ok(())
    }
}
