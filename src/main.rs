use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod aggregate;
mod config;
mod forecast;
mod history;
mod leaderboard;
mod models;
mod pipeline;
mod report;
mod sentiment;
mod sources;
mod summarize;
mod wordcloud;

use config::{ForecastArgs, OutputPaths};
use forecast::TrendForecaster;
use history::HistoryStore;
use leaderboard::DEFAULT_TOP_WORDS;
use pipeline::Pipeline;
use sentiment::ClassifierKind;
use sources::{ArticleSource, CsvSource, FeedSource, NewsApiSource};
use summarize::LeadSummarizer;
use wordcloud::SvgWordCloud;

#[derive(Parser)]
#[command(name = "news-trend-digest")]
#[command(about = "Daily news history, word leaderboard and sentiment forecast", long_about = None)]
struct Cli {
    #[command(flatten)]
    paths: OutputPaths,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the news history ledger if it does not exist
    Init,
    /// Fetch today's news and rebuild every artifact
    Run {
        #[arg(long, env = "NEWSAPI_KEY", hide_env_values = true)]
        newsapi_key: Option<String>,
        #[arg(long, default_value = sources::DEFAULT_FEED_URL)]
        feed_url: String,
        #[arg(long, value_enum, default_value_t = ClassifierKind::Neutral)]
        classifier: ClassifierKind,
        #[command(flatten)]
        forecast: ForecastArgs,
    },
    /// Append articles from a CSV file to the ledger, dated today
    Import {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, value_enum, default_value_t = ClassifierKind::Neutral)]
        classifier: ClassifierKind,
    },
    /// Forecast daily positive-sentiment volume for the next week
    Forecast {
        #[command(flatten)]
        forecast: ForecastArgs,
    },
    /// Rank the most frequent words across all recorded titles
    Leaderboard {
        #[arg(long, default_value_t = DEFAULT_TOP_WORDS)]
        top: usize,
    },
}

fn build_pipeline(
    paths: &OutputPaths,
    classifier: ClassifierKind,
    forecast: Option<&ForecastArgs>,
    top_words: usize,
) -> Pipeline {
    Pipeline {
        store: HistoryStore::new(&paths.history),
        outputs: paths.clone(),
        classifier: classifier.build(),
        summarizer: Box::new(LeadSummarizer::default()),
        word_cloud: Box::new(SvgWordCloud::default()),
        forecaster: forecast
            .map(|args| TrendForecaster::new(args.to_config()))
            .unwrap_or_default(),
        top_words,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            let store = HistoryStore::new(&cli.paths.history);
            if store.initialize()? {
                println!("Created {}.", store.path().display());
            } else {
                println!("{} already exists.", store.path().display());
            }
        }
        Commands::Run {
            newsapi_key,
            feed_url,
            classifier,
            forecast,
        } => {
            let client = sources::http_client()?;
            let mut article_sources: Vec<Box<dyn ArticleSource>> = Vec::new();
            article_sources.push(Box::new(FeedSource::new(
                client.clone(),
                "VentureBeat",
                feed_url,
            )));
            match newsapi_key.filter(|key| !key.trim().is_empty()) {
                Some(key) => article_sources.push(Box::new(NewsApiSource::new(client, key))),
                None => warn!("NEWSAPI_KEY not set, skipping NewsAPI source"),
            }

            let pipeline =
                build_pipeline(&cli.paths, classifier, Some(&forecast), DEFAULT_TOP_WORDS);
            let summary = pipeline.run(&article_sources, Local::now().naive_local()).await?;

            println!(
                "Recorded {} articles ({} in history).",
                summary.fetched, summary.ledger_len
            );
            match summary.forecast_days {
                Some(days) => println!(
                    "Forecast {days} days to {}.",
                    cli.paths.forecast_out.display()
                ),
                None => println!("Not enough history to forecast yet."),
            }
            if summary.leaderboard_words.is_some() {
                println!("Leaderboard written to {}.", cli.paths.leaderboard_out.display());
            }
            info!("run completed");
        }
        Commands::Import { csv, classifier } => {
            let source = CsvSource::new(&csv);
            let mut articles = source
                .fetch()
                .await
                .with_context(|| format!("failed to import {}", csv.display()))?;

            let pipeline = build_pipeline(&cli.paths, classifier, None, DEFAULT_TOP_WORDS);
            let total = pipeline.ingest(&mut articles, Local::now().date_naive())?;
            println!(
                "Imported {} articles from {} ({total} in history).",
                articles.len(),
                csv.display()
            );
        }
        Commands::Forecast { forecast } => {
            let pipeline = build_pipeline(
                &cli.paths,
                ClassifierKind::Neutral,
                Some(&forecast),
                DEFAULT_TOP_WORDS,
            );
            let Some(points) = pipeline.forecast()? else {
                println!("Not enough history to forecast yet (need at least 2 dates).");
                return Ok(());
            };

            println!("Positive-sentiment forecast:");
            for point in &points {
                println!(
                    "- {} {:.2} [{:.2}, {:.2}]",
                    point.date, point.point_estimate, point.lower_bound, point.upper_bound
                );
            }
        }
        Commands::Leaderboard { top } => {
            let pipeline = build_pipeline(&cli.paths, ClassifierKind::Neutral, None, top);
            match pipeline.leaderboard()? {
                Some(entries) => print!("{}", report::build_leaderboard_report(&entries)),
                None => println!("News history is empty."),
            }
        }
    }

    Ok(())
}
