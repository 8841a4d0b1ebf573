use crate::models::Article;

pub trait Summarizer {
    fn summarize(&self, text: &str) -> String;
}

/// Extractive summarizer: short text passes through, longer text is cut to its
/// first sentence and capped in length.
#[derive(Debug, Clone)]
pub struct LeadSummarizer {
    pub min_words: usize,
    pub max_words: usize,
}

impl Default for LeadSummarizer {
    fn default() -> Self {
        Self {
            min_words: 8,
            max_words: 100,
        }
    }
}

impl Summarizer for LeadSummarizer {
    fn summarize(&self, text: &str) -> String {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.len() < self.min_words {
            return text.to_string();
        }

        let limit = self.max_words.min(words.len() + 5);
        let mut summary = Vec::new();
        for word in words.into_iter().take(limit) {
            summary.push(word);
            if word.ends_with(['.', '!', '?']) {
                break;
            }
        }
        summary.join(" ")
    }
}

pub fn summarize_articles(summarizer: &dyn Summarizer, articles: &mut [Article]) {
    for article in articles.iter_mut() {
        article.summary = Some(summarizer.summarize(&article.title));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_titles_pass_through() {
        let summarizer = LeadSummarizer::default();
        let text = "Six words  are   not enough here";
        assert_eq!(summarizer.summarize(text), text);
    }

    #[test]
    fn long_text_keeps_first_sentence() {
        let summarizer = LeadSummarizer::default();
        let text = "Open model tops benchmark again. Rivals respond with new releases this week";
        assert_eq!(summarizer.summarize(text), "Open model tops benchmark again.");
    }

    #[test]
    fn long_text_is_capped() {
        let summarizer = LeadSummarizer {
            min_words: 2,
            max_words: 3,
        };
        assert_eq!(summarizer.summarize("one two three four five"), "one two three");
    }

    #[test]
    fn summaries_are_attached_to_every_article() {
        let mut articles =
            vec![Article::from_parts(Some("Tiny title"), Some("https://x.test")).unwrap()];
        summarize_articles(&LeadSummarizer::default(), &mut articles);
        assert_eq!(articles[0].summary.as_deref(), Some("Tiny title"));
    }
}
