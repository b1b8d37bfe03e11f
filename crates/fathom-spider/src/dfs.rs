//! Depth-first deep crawl: a LIFO stack popped one URL at a time
//! (newly discovered children pushed on top so the next pop descends
//! rather than broadening), with the same budgets as BFS.
//!
//! Each pop is still submitted through the Dispatcher as a
//! single-element batch, so both strategies share one execution path
//! even though DFS's traversal order is inherently sequential.

use crate::discovery::discover;
use crate::{annotate, DeepCrawlConfig, DeepCrawlStrategy};
use async_trait::async_trait;
use fathom_dispatch::{Crawler, Dispatcher};
use fathom_types::config::RunConfig;
use fathom_types::result::CrawlResult;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::instrument;

#[derive(Default)]
pub struct DfsStrategy;

#[async_trait]
impl DeepCrawlStrategy for DfsStrategy {
    #[instrument(skip(self, crawler, dispatcher, run_config, deep_config))]
    async fn run(
        &self,
        start_url: &str,
        crawler: Arc<dyn Crawler>,
        dispatcher: Arc<dyn Dispatcher>,
        run_config: RunConfig,
        deep_config: DeepCrawlConfig,
    ) -> Vec<CrawlResult> {
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(start_url.to_string());

        let mut stack: Vec<(String, u32, Option<String>)> = vec![(start_url.to_string(), 0, None)];
        let mut emitted: Vec<CrawlResult> = Vec::new();
        let guarded_config = run_config.with_deep_crawl_guard();

        while let Some((url, depth, parent)) = stack.pop() {
            if emitted.len() >= deep_config.max_pages {
                break;
            }

            let task_results = dispatcher
                .run(vec![url], guarded_config.clone(), crawler.clone())
                .await;
            let Some(task_result) = task_results.into_iter().next() else {
                continue;
            };
            let Some(mut result) = task_result.result else {
                continue;
            };
            result = annotate(result, depth, parent, None);
            let succeeded = result.success;
            emitted.push(result.clone());

            if !succeeded || emitted.len() >= deep_config.max_pages || depth >= deep_config.max_depth {
                continue;
            }

            let remaining_capacity = deep_config.max_pages.saturating_sub(emitted.len());
            let discovered = discover(
                &result,
                depth,
                deep_config.include_external,
                &mut visited,
                &deep_config.filter_chain,
                deep_config.scorer.as_deref(),
                deep_config.score_threshold,
                remaining_capacity,
            );
            for candidate in discovered {
                stack.push((candidate.url, candidate.depth, Some(candidate.parent_url)));
            }
        }

        emitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fathom_dispatch::{MemoryAdaptiveConfig, MemoryAdaptiveDispatcher};
    use fathom_types::error::CrawlError;

    struct StubCrawler;

    #[async_trait]
    impl Crawler for StubCrawler {
        async fn crawl(&self, url: &str, _run_config: &RunConfig) -> CrawlResult {
            CrawlResult::failed(url, &CrawlError::Navigation("stub, no network in tests".into()))
        }
    }

    #[tokio::test]
    async fn visits_start_url_first() {
        let strategy = DfsStrategy;
        let dispatcher = Arc::new(MemoryAdaptiveDispatcher::new(MemoryAdaptiveConfig::default()));
        let results = strategy
            .run(
                "https://example.com",
                Arc::new(StubCrawler),
                dispatcher,
                RunConfig::default(),
                DeepCrawlConfig::default(),
            )
            .await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://example.com");
    }
}
