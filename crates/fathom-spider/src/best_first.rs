//! Best-first deep crawl: a min-priority queue keyed by negated score
//! (so the highest score dequeues first), ties broken by shallower
//! depth then earliest discovery. Dequeues up to `batch_size`
//! candidates per Dispatcher submission.
//!
//! The max-heap-via-custom-`Ord` trick mirrors
//! `riptide-core/src/spider/frontier.rs::PriorityRequest`.

use crate::discovery::discover;
use crate::{annotate, DeepCrawlConfig, DeepCrawlStrategy};
use async_trait::async_trait;
use fathom_dispatch::{Crawler, Dispatcher};
use fathom_types::config::RunConfig;
use fathom_types::result::CrawlResult;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::sync::Arc;
use tracing::instrument;

#[derive(Debug, Clone)]
struct Entry {
    url: String,
    depth: u32,
    parent: Option<String>,
    score: f64,
    seq: u64,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score && self.depth == other.depth && self.seq == other.seq
    }
}
impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .partial_cmp(&other.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.depth.cmp(&self.depth))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Default)]
pub struct BestFirstStrategy;

#[async_trait]
impl DeepCrawlStrategy for BestFirstStrategy {
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

        let mut seq_counter: u64 = 0;
        let mut heap: BinaryHeap<Entry> = BinaryHeap::new();
        heap.push(Entry {
            url: start_url.to_string(),
            depth: 0,
            parent: None,
            score: f64::INFINITY,
            seq: seq_counter,
        });
        seq_counter += 1;

        let mut emitted: Vec<CrawlResult> = Vec::new();
        let guarded_config = run_config.with_deep_crawl_guard();

        while !heap.is_empty() && emitted.len() < deep_config.max_pages {
            let mut batch: Vec<Entry> = Vec::new();
            while batch.len() < deep_config.batch_size {
                match heap.pop() {
                    Some(entry) => batch.push(entry),
                    None => break,
                }
            }
            if batch.is_empty() {
                break;
            }

            let urls: Vec<String> = batch.iter().map(|e| e.url.clone()).collect();
            let results = dispatcher
                .run(urls, guarded_config.clone(), crawler.clone())
                .await;

            for (task_result, entry) in results.into_iter().zip(batch.into_iter()) {
                let Some(mut result) = task_result.result else {
                    continue;
                };
                let score = if entry.score.is_finite() { Some(entry.score) } else { None };
                result = annotate(result, entry.depth, entry.parent, score);
                let succeeded = result.success;
                emitted.push(result.clone());

                if !succeeded || emitted.len() >= deep_config.max_pages || entry.depth >= deep_config.max_depth {
                    continue;
                }

                let remaining_capacity = deep_config.max_pages.saturating_sub(emitted.len());
                let discovered = discover(
                    &result,
                    entry.depth,
                    deep_config.include_external,
                    &mut visited,
                    &deep_config.filter_chain,
                    deep_config.scorer.as_deref(),
                    deep_config.score_threshold,
                    remaining_capacity,
                );
                for candidate in discovered {
                    heap.push(Entry {
                        url: candidate.url,
                        depth: candidate.depth,
                        parent: Some(candidate.parent_url),
                        score: candidate.score.unwrap_or(0.0),
                        seq: seq_counter,
                    });
                    seq_counter += 1;
                }
            }
        }

        emitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_score_pops_first() {
        let mut heap = BinaryHeap::new();
        heap.push(Entry { url: "a".into(), depth: 0, parent: None, score: 1.0, seq: 0 });
        heap.push(Entry { url: "b".into(), depth: 0, parent: None, score: 5.0, seq: 1 });
        assert_eq!(heap.pop().unwrap().url, "b");
    }

    #[test]
    fn ties_break_by_shallower_depth_then_fifo() {
        let mut heap = BinaryHeap::new();
        heap.push(Entry { url: "deep".into(), depth: 2, parent: None, score: 3.0, seq: 0 });
        heap.push(Entry { url: "shallow".into(), depth: 1, parent: None, score: 3.0, seq: 1 });
        assert_eq!(heap.pop().unwrap().url, "shallow");

        let mut heap2 = BinaryHeap::new();
        heap2.push(Entry { url: "later".into(), depth: 1, parent: None, score: 3.0, seq: 2 });
        heap2.push(Entry { url: "earlier".into(), depth: 1, parent: None, score: 3.0, seq: 1 });
        assert_eq!(heap2.pop().unwrap().url, "earlier");
    }
}
