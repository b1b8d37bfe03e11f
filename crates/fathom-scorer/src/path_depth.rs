use crate::UrlScorer;
use url::Url;

/// Prefers shallower paths; score decays geometrically per path
/// segment so a scorer favoring "closer to the site root" URLs can be
/// composed alongside content-relevance scorers.
pub struct PathDepthScorer {
    decay: f64,
}

impl PathDepthScorer {
    pub fn new(decay: f64) -> Self {
        PathDepthScorer { decay }
    }
}

impl UrlScorer for PathDepthScorer {
    fn name(&self) -> &str {
        "path_depth"
    }

    fn score(&self, url: &Url) -> f64 {
        let segments = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).count())
            .unwrap_or(0);
        self.decay.powi(segments as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_scores_one() {
        let scorer = PathDepthScorer::new(0.5);
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(scorer.score(&url), 1.0);
    }

    #[test]
    fn deeper_paths_score_lower() {
        let scorer = PathDepthScorer::new(0.5);
        let shallow = Url::parse("https://example.com/a").unwrap();
        let deep = Url::parse("https://example.com/a/b/c").unwrap();
        assert!(scorer.score(&deep) < scorer.score(&shallow));
    }
}
