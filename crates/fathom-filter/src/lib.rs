//! Ordered predicate pipeline over URLs, used by link discovery in
//! the deep-crawl strategies.
//!
//! A [`FilterChain`] short-circuits on the first rejecting filter and
//! tracks per-filter `{total, passed, rejected}` counters so callers
//! can inspect which stage is doing the rejecting.

mod domain;
mod pattern;

pub use domain::DomainFilter;
pub use pattern::{ContentTypeFilter, UrlPatternFilter};

use std::sync::atomic::{AtomicU64, Ordering};
use url::Url;

/// A single named predicate over a candidate URL.
pub trait UrlFilter: Send + Sync {
    fn name(&self) -> &str;
    fn apply(&self, url: &Url) -> bool;
}

/// Running pass/reject counters for one filter in the chain.
#[derive(Debug, Default)]
pub struct FilterStats {
    total: AtomicU64,
    passed: AtomicU64,
    rejected: AtomicU64,
}

impl FilterStats {
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    pub fn passed(&self) -> u64 {
        self.passed.load(Ordering::Relaxed)
    }

    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    fn record(&self, passed: bool) {
        self.total.fetch_add(1, Ordering::Relaxed);
        if passed {
            self.passed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.rejected.fetch_add(1, Ordering::Relaxed);
        }
    }
}

struct Stage {
    filter: Box<dyn UrlFilter>,
    stats: FilterStats,
}

/// Ordered sequence of [`UrlFilter`]s. An empty chain accepts every URL.
#[derive(Default)]
pub struct FilterChain {
    stages: Vec<Stage>,
}

impl FilterChain {
    pub fn new() -> Self {
        FilterChain { stages: Vec::new() }
    }

    pub fn with_filter(mut self, filter: impl UrlFilter + 'static) -> Self {
        self.stages.push(Stage {
            filter: Box::new(filter),
            stats: FilterStats::default(),
        });
        self
    }

    /// Run every stage in order against `url`, stopping at the first
    /// rejection.
    pub fn apply(&self, url: &Url) -> bool {
        for stage in &self.stages {
            let passed = stage.filter.apply(url);
            stage.stats.record(passed);
            if !passed {
                return false;
            }
        }
        true
    }

    /// Per-stage `(name, stats)` pairs, in chain order.
    pub fn stats(&self) -> Vec<(&str, &FilterStats)> {
        self.stages
            .iter()
            .map(|s| (s.filter.name(), &s.stats))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysReject;
    impl UrlFilter for AlwaysReject {
        fn name(&self) -> &str {
            "always_reject"
        }
        fn apply(&self, _url: &Url) -> bool {
            false
        }
    }

    struct AlwaysPass;
    impl UrlFilter for AlwaysPass {
        fn name(&self) -> &str {
            "always_pass"
        }
        fn apply(&self, _url: &Url) -> bool {
            true
        }
    }

    #[test]
    fn empty_chain_accepts_everything() {
        let chain = FilterChain::new();
        let url = Url::parse("https://example.com").unwrap();
        assert!(chain.apply(&url));
    }

    #[test]
    fn short_circuits_on_first_rejection() {
        let chain = FilterChain::new()
            .with_filter(AlwaysReject)
            .with_filter(AlwaysPass);
        let url = Url::parse("https://example.com").unwrap();
        assert!(!chain.apply(&url));
        let stats = chain.stats();
        assert_eq!(stats[0].1.rejected(), 1);
        // second stage never runs because the first short-circuited
        assert_eq!(stats[1].1.total(), 0);
    }

    #[test]
    fn counters_accumulate_across_calls() {
        let chain = FilterChain::new().with_filter(AlwaysPass);
        let url = Url::parse("https://example.com").unwrap();
        for _ in 0..5 {
            chain.apply(&url);
        }
        let stats = chain.stats();
        assert_eq!(stats[0].1.total(), 5);
        assert_eq!(stats[0].1.passed(), 5);
    }
}
