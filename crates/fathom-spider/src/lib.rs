//! Deep-crawl strategies: BFS, DFS, and Best-First traversal over a
//! link graph discovered as pages are fetched, sharing one link
//! discovery algorithm and one budget model.
//!
//! Frontier shapes (FIFO/LIFO/min-priority-queue) and per-host/depth
//! bookkeeping are grounded on `riptide-core/src/spider/frontier.rs`
//! (`FrontierManager`, `PriorityRequest`'s max-heap-via-reversed-`Ord`
//! trick) and `riptide-core/src/spider/types.rs` (`CrawlRequest`'s
//! depth/parent/score fields).

mod best_first;
mod bfs;
mod dfs;
pub mod discovery;

pub use best_first::BestFirstStrategy;
pub use bfs::BfsStrategy;
pub use dfs::DfsStrategy;

use async_trait::async_trait;
use fathom_dispatch::{Crawler, Dispatcher};
use fathom_filter::FilterChain;
use fathom_scorer::UrlScorer;
use fathom_types::config::RunConfig;
use fathom_types::result::CrawlResult;
use std::sync::Arc;

/// Budgets and collaborators shared by every deep-crawl strategy.
pub struct DeepCrawlConfig {
    pub max_depth: u32,
    pub max_pages: usize,
    pub score_threshold: Option<f64>,
    pub include_external: bool,
    pub filter_chain: FilterChain,
    pub scorer: Option<Arc<dyn UrlScorer>>,
    /// Best-First only: candidates dequeued per Dispatcher submission.
    pub batch_size: usize,
}

impl Default for DeepCrawlConfig {
    fn default() -> Self {
        DeepCrawlConfig {
            max_depth: 3,
            max_pages: 100,
            score_threshold: None,
            include_external: false,
            filter_chain: FilterChain::new(),
            scorer: None,
            batch_size: 10,
        }
    }
}

/// Shared contract for BFS, DFS, and Best-First.
#[async_trait]
pub trait DeepCrawlStrategy: Send + Sync {
    async fn run(
        &self,
        start_url: &str,
        crawler: Arc<dyn Crawler>,
        dispatcher: Arc<dyn Dispatcher>,
        run_config: RunConfig,
        deep_config: DeepCrawlConfig,
    ) -> Vec<CrawlResult>;
}

/// Stamp a dispatcher-returned result with the depth/parent/score that
/// link discovery attached to the URL that produced it.
pub(crate) fn annotate(
    mut result: CrawlResult,
    depth: u32,
    parent_url: Option<String>,
    score: Option<f64>,
) -> CrawlResult {
    result.depth = Some(depth);
    result.parent_url = parent_url;
    result.score = score;
    result
}
