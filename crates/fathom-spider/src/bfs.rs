//! Breadth-first deep crawl: a FIFO frontier processed one depth level
//! at a time through the Dispatcher, emitting each level's results in
//! batch once that level completes.

use crate::discovery::discover;
use crate::{annotate, DeepCrawlConfig, DeepCrawlStrategy};
use async_trait::async_trait;
use fathom_dispatch::{Crawler, Dispatcher};
use fathom_types::config::RunConfig;
use fathom_types::result::CrawlResult;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::instrument;

#[derive(Default)]
pub struct BfsStrategy;

#[async_trait]
impl DeepCrawlStrategy for BfsStrategy {
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

        let mut frontier: VecDeque<(String, u32, Option<String>)> = VecDeque::new();
        frontier.push_back((start_url.to_string(), 0, None));

        let mut emitted: Vec<CrawlResult> = Vec::new();
        let guarded_config = run_config.with_deep_crawl_guard();

        while !frontier.is_empty() && emitted.len() < deep_config.max_pages {
            let level: Vec<(String, u32, Option<String>)> = frontier.drain(..).collect();
            let urls: Vec<String> = level.iter().map(|(url, _, _)| url.clone()).collect();

            let results = dispatcher
                .run(urls, guarded_config.clone(), crawler.clone())
                .await;

            for (task_result, (_, depth, parent)) in results.into_iter().zip(level.into_iter()) {
                let Some(mut result) = task_result.result else {
                    continue;
                };
                result = annotate(result, depth, parent, None);
                let succeeded = result.success;
                emitted.push(result.clone());

                if !succeeded || emitted.len() >= deep_config.max_pages {
                    continue;
                }
                if depth >= deep_config.max_depth {
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
                    frontier.push_back((candidate.url, candidate.depth, Some(candidate.parent_url)));
                }
            }

            if emitted.len() >= deep_config.max_pages {
                break;
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
    async fn stops_after_max_pages_even_with_no_successes() {
        let strategy = BfsStrategy;
        let dispatcher = Arc::new(MemoryAdaptiveDispatcher::new(MemoryAdaptiveConfig::default()));
        let deep_config = DeepCrawlConfig {
            max_pages: 1,
            ..DeepCrawlConfig::default()
        };
        let results = strategy
            .run(
                "https://example.com",
                Arc::new(StubCrawler),
                dispatcher,
                RunConfig::default(),
                deep_config,
            )
            .await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].depth, Some(0));
    }
}
