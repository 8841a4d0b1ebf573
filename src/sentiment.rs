use clap::ValueEnum;

use crate::models::{Article, Sentiment};

pub trait SentimentClassifier {
    fn classify(&self, text: &str) -> Sentiment;
}

/// Labels everything `Neutral`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeutralClassifier;

impl SentimentClassifier for NeutralClassifier {
    fn classify(&self, _text: &str) -> Sentiment {
        Sentiment::Neutral
    }
}

const POSITIVE_WORDS: &[&str] = &[
    "win", "wins", "success", "gain", "gains", "rise", "rises", "surge", "surges", "boost",
    "boosts", "breakthrough", "launch", "launches", "record", "growth", "grows", "improve",
    "improves", "strong", "beat", "beats", "raise", "raises", "partnership", "approve",
    "approves", "expands", "soars", "upgrade",
];

const NEGATIVE_WORDS: &[&str] = &[
    "lose", "loses", "loss", "fail", "fails", "failure", "drop", "drops", "fall", "falls",
    "crash", "crashes", "decline", "declines", "cut", "cuts", "layoffs", "lawsuit", "sues",
    "breach", "hack", "ban", "bans", "warn", "warns", "risk", "threat", "probe", "fine",
    "fined", "slump", "delay", "delays",
];

/// Keyword-count classifier: more positive than negative hits is `Positive`,
/// the reverse is `Negative`, a tie is `Neutral`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconClassifier;

impl SentimentClassifier for LexiconClassifier {
    fn classify(&self, text: &str) -> Sentiment {
        let mut score = 0i32;
        for word in text.split_whitespace() {
            let word = word
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            if POSITIVE_WORDS.contains(&word.as_str()) {
                score += 1;
            } else if NEGATIVE_WORDS.contains(&word.as_str()) {
                score -= 1;
            }
        }

        match score {
            s if s > 0 => Sentiment::Positive,
            s if s < 0 => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ClassifierKind {
    #[default]
    Neutral,
    Lexicon,
}

impl ClassifierKind {
    pub fn build(self) -> Box<dyn SentimentClassifier> {
        match self {
            ClassifierKind::Neutral => Box::new(NeutralClassifier),
            ClassifierKind::Lexicon => Box::new(LexiconClassifier),
        }
    }
}

/// Fills in sentiment for articles that arrived without one.
pub fn label_articles(classifier: &dyn SentimentClassifier, articles: &mut [Article]) {
    for article in articles.iter_mut().filter(|a| a.sentiment.is_none()) {
        article.sentiment = Some(classifier.classify(&article.title));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexicon_scores_by_keyword_balance() {
        let classifier = LexiconClassifier;
        assert_eq!(classifier.classify("Startup SURGES after record quarter"), Sentiment::Positive);
        assert_eq!(classifier.classify("Chipmaker warns of layoffs"), Sentiment::Negative);
        assert_eq!(classifier.classify("Stocks rise, then fall"), Sentiment::Neutral);
        assert_eq!(classifier.classify("Company publishes report"), Sentiment::Neutral);
    }

    #[test]
    fn labelling_keeps_existing_sentiment() {
        let mut articles = vec![
            Article::from_parts(Some("Record growth"), Some("https://x.test/1")).unwrap(),
            Article::from_parts(Some("Record growth"), Some("https://x.test/2")).unwrap(),
        ];
        articles[1].sentiment = Some(Sentiment::Negative);

        label_articles(&LexiconClassifier, &mut articles);
        assert_eq!(articles[0].sentiment, Some(Sentiment::Positive));
        assert_eq!(articles[1].sentiment, Some(Sentiment::Negative));

        let mut fresh =
            vec![Article::from_parts(Some("Record growth"), Some("https://x.test/3")).unwrap()];
        label_articles(ClassifierKind::default().build().as_ref(), &mut fresh);
        assert_eq!(fresh[0].sentiment, Some(Sentiment::Neutral));
    }
}
