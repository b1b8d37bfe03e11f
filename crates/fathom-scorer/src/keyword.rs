use crate::UrlScorer;
use url::Url;

/// Scores a URL by the fraction of configured keywords that appear,
/// case-insensitively, in its path and query.
pub struct KeywordRelevanceScorer {
    keywords: Vec<String>,
}

impl KeywordRelevanceScorer {
    pub fn new(keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        KeywordRelevanceScorer {
            keywords: keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
        }
    }
}

impl UrlScorer for KeywordRelevanceScorer {
    fn name(&self) -> &str {
        "keyword_relevance"
    }

    fn score(&self, url: &Url) -> f64 {
        if self.keywords.is_empty() {
            return 0.0;
        }
        let haystack = format!("{} {}", url.path(), url.query().unwrap_or("")).to_lowercase();
        let matched = self
            .keywords
            .iter()
            .filter(|kw| haystack.contains(kw.as_str()))
            .count();
        matched as f64 / self.keywords.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_proportional_to_keyword_matches() {
        let scorer = KeywordRelevanceScorer::new(["browser", "crawler", "web", "automation"]);
        let url = Url::parse("https://docs.example.com/browser-crawler-guide").unwrap();
        assert_eq!(scorer.score(&url), 0.5);
    }

    #[test]
    fn no_keywords_scores_zero() {
        let scorer = KeywordRelevanceScorer::new(Vec::<String>::new());
        let url = Url::parse("https://example.com/anything").unwrap();
        assert_eq!(scorer.score(&url), 0.0);
    }
}
