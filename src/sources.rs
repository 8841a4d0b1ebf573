use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{Article, Sentiment};

pub const NEWSAPI_ENDPOINT: &str = "https://newsapi.org/v2/top-headlines";
pub const DEFAULT_FEED_URL: &str = "https://venturebeat.com/feed/";
const ARTICLES_PER_SOURCE: usize = 5;
const USER_AGENT: &str = "Mozilla/5.0 (compatible; news-trend-digest/0.1)";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{source_name} responded with HTTP {status}")]
    Unavailable { source_name: String, status: u16 },
    #[error("{source_name} returned a malformed payload: {message}")]
    MalformedPayload { source_name: String, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to read {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

#[async_trait]
pub trait ArticleSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<Vec<Article>, SourceError>;
}

pub fn http_client() -> anyhow::Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(15))
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build HTTP client")
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Top headlines from NewsAPI for a fixed set of publishers.
pub struct NewsApiSource {
    client: Client,
    api_key: String,
    sources: String,
    endpoint: String,
}

impl NewsApiSource {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            sources: "techcrunch,reuters".to_string(),
            endpoint: NEWSAPI_ENDPOINT.to_string(),
        }
    }
}

#[async_trait]
impl ArticleSource for NewsApiSource {
    fn name(&self) -> &str {
        "NewsAPI"
    }

    async fn fetch(&self) -> Result<Vec<Article>, SourceError> {
        let page_size = ARTICLES_PER_SOURCE.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("sources", self.sources.as_str()),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Unavailable {
                source_name: self.name().to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        let payload: NewsApiResponse =
            serde_json::from_str(&body).map_err(|err| SourceError::MalformedPayload {
                source_name: self.name().to_string(),
                message: err.to_string(),
            })?;

        Ok(keep_well_formed(
            self.name(),
            payload
                .articles
                .iter()
                .map(|item| (item.title.as_deref(), item.url.as_deref())),
        ))
    }
}

/// First items of an RSS feed.
pub struct FeedSource {
    client: Client,
    name: String,
    url: String,
}

impl FeedSource {
    pub fn new(client: Client, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl ArticleSource for FeedSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Vec<Article>, SourceError> {
        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(SourceError::Unavailable {
                source_name: self.name.clone(),
                status: response.status().as_u16(),
            });
        }

        let content = response.bytes().await?;
        parse_feed(&self.name, &content[..])
    }
}

pub fn parse_feed(source_name: &str, content: &[u8]) -> Result<Vec<Article>, SourceError> {
    let channel = rss::Channel::read_from(content).map_err(|err| SourceError::MalformedPayload {
        source_name: source_name.to_string(),
        message: err.to_string(),
    })?;

    Ok(keep_well_formed(
        source_name,
        channel.items().iter().map(|item| (item.title(), item.link())),
    ))
}

/// Articles from a local CSV with `title`, `link` and optional `sentiment`
/// and `summary` columns. Every row is read; rows that fail to parse or lack
/// a title or link are skipped.
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> Result<Vec<Article>, SourceError> {
        #[derive(Deserialize)]
        struct CsvRow {
            title: Option<String>,
            link: Option<String>,
            #[serde(default)]
            sentiment: Option<Sentiment>,
            #[serde(default)]
            summary: Option<String>,
        }

        let file_error = |source: csv::Error| SourceError::File {
            path: self.path.clone(),
            source,
        };

        let mut reader = csv::Reader::from_path(&self.path).map_err(file_error)?;
        let mut articles = Vec::new();

        for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
            let row = match result {
                Ok(row) => row,
                Err(err) if err.is_io_error() => return Err(file_error(err)),
                Err(err) => {
                    warn!(
                        path = %self.path.display(),
                        row = line + 1,
                        error = %err,
                        "skipping unreadable article row"
                    );
                    continue;
                }
            };

            match Article::from_parts(row.title.as_deref(), row.link.as_deref()) {
                Ok(mut article) => {
                    article.sentiment = row.sentiment;
                    article.summary = row.summary.filter(|s| !s.trim().is_empty());
                    articles.push(article);
                }
                Err(err) => {
                    warn!(
                        path = %self.path.display(),
                        row = line + 1,
                        error = %err,
                        "skipping malformed article"
                    );
                }
            }
        }

        Ok(articles)
    }
}

#[async_trait]
impl ArticleSource for CsvSource {
    fn name(&self) -> &str {
        "csv import"
    }

    async fn fetch(&self) -> Result<Vec<Article>, SourceError> {
        self.read()
    }
}

/// Takes the first items, skipping any without a title or link.
fn keep_well_formed<'a>(
    source_name: &str,
    items: impl Iterator<Item = (Option<&'a str>, Option<&'a str>)>,
) -> Vec<Article> {
    items
        .take(ARTICLES_PER_SOURCE)
        .filter_map(|(title, link)| match Article::from_parts(title, link) {
            Ok(article) => Some(article),
            Err(err) => {
                warn!(source = source_name, error = %err, "skipping malformed article");
                None
            }
        })
        .collect()
}

/// Tries each source once, in order. A failing source contributes nothing.
pub async fn collect_articles(sources: &[Box<dyn ArticleSource>]) -> Vec<Article> {
    let mut articles = Vec::new();

    for source in sources {
        match source.fetch().await {
            Ok(fetched) => {
                info!(source = source.name(), count = fetched.len(), "fetched articles");
                articles.extend(fetched);
            }
            Err(err) => {
                warn!(
                    source = source.name(),
                    error = %err,
                    "source unavailable, continuing without it"
                );
            }
        }
    }

    articles
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) struct StubSource {
        pub name: &'static str,
        pub result: fn() -> Result<Vec<Article>, SourceError>,
    }

    #[async_trait]
    impl ArticleSource for StubSource {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(&self) -> Result<Vec<Article>, SourceError> {
            (self.result)()
        }
    }

    const FEED: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
<title>Tech</title><link>https://tech.test</link><description>d</description>
<item><title>Model launches</title><link>https://tech.test/1</link></item>
<item><link>https://tech.test/untitled</link></item>
<item><title>Chip demand grows</title><link>https://tech.test/2</link></item>
</channel></rss>"#;

    #[test]
    fn feed_items_without_title_are_skipped() {
        let articles = parse_feed("Tech", FEED.as_bytes()).unwrap();
        let titles: Vec<_> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Model launches", "Chip demand grows"]);
        assert!(articles.iter().all(|a| a.sentiment.is_none()));
    }

    #[test]
    fn garbage_feed_is_malformed() {
        assert!(matches!(
            parse_feed("Tech", b"<html>not a feed"),
            Err(SourceError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn only_first_items_are_taken() {
        let items: Vec<(Option<&str>, Option<&str>)> =
            (0..8).map(|_| (Some("t"), Some("https://x.test"))).collect();
        assert_eq!(keep_well_formed("x", items.into_iter()).len(), ARTICLES_PER_SOURCE);
    }

    #[tokio::test]
    async fn csv_rows_keep_their_sentiment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.csv");
        std::fs::write(
            &path,
            "title,link,sentiment,summary\n\
             Funding round closes,https://x.test/1,Positive,\n\
             ,https://x.test/missing,,\n\
             Outage hits cloud,https://x.test/2,,Short take\n",
        )
        .unwrap();

        let articles = CsvSource::new(&path).fetch().await.unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].sentiment, Some(Sentiment::Positive));
        assert_eq!(articles[0].summary, None);
        assert_eq!(articles[1].sentiment, None);
        assert_eq!(articles[1].summary.as_deref(), Some("Short take"));
    }

    #[tokio::test]
    async fn unparsable_rows_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.csv");
        std::fs::write(
            &path,
            "title,link,sentiment,summary\n\
             Funding round closes,https://x.test/1,Positive,\n\
             Lowercase label,https://x.test/2,positive,\n\
             Short row\n\
             Outage hits cloud,https://x.test/3,Negative,\n",
        )
        .unwrap();

        let articles = CsvSource::new(&path).fetch().await.unwrap();
        let links: Vec<_> = articles.iter().map(|a| a.link.as_str()).collect();
        assert_eq!(links, vec!["https://x.test/1", "https://x.test/3"]);
        assert_eq!(articles[1].sentiment, Some(Sentiment::Negative));
    }

    #[tokio::test]
    async fn missing_csv_is_a_source_error() {
        let result = CsvSource::new("/nonexistent/articles.csv").fetch().await;
        assert!(matches!(result, Err(SourceError::File { .. })));
    }

    #[tokio::test]
    async fn failing_source_does_not_stop_collection() {
        let sources: Vec<Box<dyn ArticleSource>> = vec![
            Box::new(StubSource {
                name: "down",
                result: || {
                    Err(SourceError::Unavailable {
                        source_name: "down".to_string(),
                        status: 503,
                    })
                },
            }),
            Box::new(StubSource {
                name: "up",
                result: || {
                    let article = Article::from_parts(Some("Up story"), Some("https://up.test"));
                    Ok(vec![article.unwrap()])
                },
            }),
        ];

        let articles = collect_articles(&sources).await;
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Up story");
    }
}
