//! Crawl Orchestrator: the composition root tying every other
//! `fathom-*` crate into the single-URL and many-URL contracts.
//!
//! Dependency-injection shape (an `Arc<dyn Trait>` per collaborator,
//! assembled by a builder) is grounded on
//! `riptide-facade/src/facades/crawl_facade.rs::CrawlFacade` — a thin
//! wrapper holding trait-object executors rather than concrete types,
//! so swapping an implementation (cache backend, extraction strategy)
//! never touches this crate.

mod pipeline;
mod proxy;

pub use proxy::ProxyRotationStrategy;

use fathom_config::RobotsPolicy;
use fathom_dispatch::{Crawler, Dispatcher, MemoryAdaptiveConfig, MemoryAdaptiveDispatcher, TaskResult};
use fathom_extraction::ExtractionStrategy;
use fathom_markdown::RelevantContentFilter;
use fathom_pool::Pool;
use fathom_scraper::ScrapeOptions;
use fathom_spider::{DeepCrawlConfig, DeepCrawlStrategy};
use fathom_types::config::{BrowserConfig, RunConfig};
use fathom_types::ports::CacheStorage;
use fathom_types::result::{CrawlResult, DispatchMetrics};
use futures::stream::BoxStream;
use std::sync::Arc;
use tracing::instrument;

/// Ties the Browser Pool, Cache Context, robots policy, proxy
/// rotation, Content Scraper, Markdown Generator, and Extraction
/// Strategy into the single-URL pipeline defined in `pipeline.rs`.
pub struct Orchestrator {
    pool: Arc<Pool>,
    default_browser_config: BrowserConfig,
    cache: Option<Arc<dyn CacheStorage>>,
    robots: Option<Arc<RobotsPolicy>>,
    proxy_rotation: Option<Arc<dyn ProxyRotationStrategy>>,
    extraction: Option<Arc<dyn ExtractionStrategy>>,
    content_filter: Option<Arc<dyn RelevantContentFilter>>,
    scrape_options: ScrapeOptions,
}

impl Orchestrator {
    /// The many-URL contract: `run_many(urls, run_config, dispatcher?)`.
    /// Instantiates a default Memory-Adaptive Dispatcher when none is
    /// supplied, and stamps each returned [`CrawlResult`] with the
    /// dispatcher's timing/memory metrics.
    #[instrument(skip(self, run_config, dispatcher))]
    pub async fn run_many(
        &self,
        urls: Vec<String>,
        run_config: RunConfig,
        dispatcher: Option<Arc<dyn Dispatcher>>,
    ) -> Vec<CrawlResult> {
        let dispatcher = dispatcher.unwrap_or_else(default_dispatcher);
        let crawler: Arc<dyn Crawler> = self.as_crawler();
        let task_results = dispatcher.run(urls, run_config, crawler).await;
        task_results.into_iter().map(attach_dispatch_metrics).collect()
    }

    /// Streaming variant of [`Self::run_many`]; completion order
    /// surfaces as results arrive rather than submission order.
    pub fn run_many_stream(
        &self,
        urls: Vec<String>,
        run_config: RunConfig,
        dispatcher: Option<Arc<dyn Dispatcher>>,
    ) -> BoxStream<'static, CrawlResult> {
        let dispatcher = dispatcher.unwrap_or_else(default_dispatcher);
        let crawler: Arc<dyn Crawler> = self.as_crawler();
        let stream = dispatcher.run_stream(urls, run_config, crawler);
        Box::pin(futures::StreamExt::map(stream, attach_dispatch_metrics))
    }

    /// Deep-crawl entry point. Arms the recursion guard before
    /// delegating to `strategy`, so the per-page fetches the strategy
    /// drives through `dispatcher` never themselves try to re-enter a
    /// deep crawl (there is no implicit deep-crawl trigger inside
    /// [`Self::run`]/[`Self::crawl`] to guard against today, but the
    /// guard is still threaded through every per-page call for any
    /// future instrumentation that needs to distinguish them).
    #[instrument(skip(self, strategy, dispatcher, run_config, deep_config))]
    pub async fn run_deep(
        &self,
        start_url: &str,
        strategy: Arc<dyn DeepCrawlStrategy>,
        dispatcher: Arc<dyn Dispatcher>,
        run_config: RunConfig,
        deep_config: DeepCrawlConfig,
    ) -> Vec<CrawlResult> {
        let crawler: Arc<dyn Crawler> = self.as_crawler();
        strategy
            .run(start_url, crawler, dispatcher, run_config, deep_config)
            .await
    }

    fn as_crawler(&self) -> Arc<dyn Crawler> {
        Arc::new(OrchestratorCrawler {
            pool: self.pool.clone(),
            default_browser_config: self.default_browser_config.clone(),
            cache: self.cache.clone(),
            robots: self.robots.clone(),
            proxy_rotation: self.proxy_rotation.clone(),
            extraction: self.extraction.clone(),
            content_filter: self.content_filter.clone(),
            scrape_options: self.scrape_options.clone(),
        })
    }
}

/// Thin clone of [`Orchestrator`]'s fields behind an `Arc`, so a
/// dispatcher can hold a `Crawler` handle without owning the
/// orchestrator outright. Every field is itself already `Arc`/`Clone`,
/// so this is a shallow, cheap clone.
struct OrchestratorCrawler {
    pool: Arc<Pool>,
    default_browser_config: BrowserConfig,
    cache: Option<Arc<dyn CacheStorage>>,
    robots: Option<Arc<RobotsPolicy>>,
    proxy_rotation: Option<Arc<dyn ProxyRotationStrategy>>,
    extraction: Option<Arc<dyn ExtractionStrategy>>,
    content_filter: Option<Arc<dyn RelevantContentFilter>>,
    scrape_options: ScrapeOptions,
}

#[async_trait::async_trait]
impl Crawler for OrchestratorCrawler {
    async fn crawl(&self, url: &str, run_config: &RunConfig) -> CrawlResult {
        let orchestrator = Orchestrator {
            pool: self.pool.clone(),
            default_browser_config: self.default_browser_config.clone(),
            cache: self.cache.clone(),
            robots: self.robots.clone(),
            proxy_rotation: self.proxy_rotation.clone(),
            extraction: self.extraction.clone(),
            content_filter: self.content_filter.clone(),
            scrape_options: self.scrape_options.clone(),
        };
        orchestrator.run(url, run_config).await
    }
}

fn default_dispatcher() -> Arc<dyn Dispatcher> {
    Arc::new(MemoryAdaptiveDispatcher::new(MemoryAdaptiveConfig::default()))
}

fn attach_dispatch_metrics(task_result: TaskResult) -> CrawlResult {
    let wall_time = task_result
        .end_time
        .saturating_duration_since(task_result.start_time);
    match task_result.result {
        Some(mut result) => {
            result.dispatch_metrics = Some(DispatchMetrics {
                memory_start_mb: task_result.memory_start_mb,
                memory_end_mb: task_result.peak_memory_mb,
                memory_peak_mb: task_result.peak_memory_mb,
                wall_time,
                retry_count: task_result.retry_count,
            });
            result
        }
        None => {
            let err = fathom_types::error::CrawlError::Cancelled;
            let mut result = CrawlResult::failed(&task_result.url, &err);
            result.error_message = task_result.error_message;
            result
        }
    }
}

/// Assembles an [`Orchestrator`] by injecting each optional
/// collaborator, mirroring `CrawlFacade::new`'s trait-object
/// injection pattern.
pub struct OrchestratorBuilder {
    pool: Arc<Pool>,
    default_browser_config: BrowserConfig,
    cache: Option<Arc<dyn CacheStorage>>,
    robots: Option<Arc<RobotsPolicy>>,
    proxy_rotation: Option<Arc<dyn ProxyRotationStrategy>>,
    extraction: Option<Arc<dyn ExtractionStrategy>>,
    content_filter: Option<Arc<dyn RelevantContentFilter>>,
    scrape_options: ScrapeOptions,
}

impl OrchestratorBuilder {
    pub fn new(pool: Arc<Pool>) -> Self {
        OrchestratorBuilder {
            pool,
            default_browser_config: BrowserConfig::default(),
            cache: None,
            robots: None,
            proxy_rotation: None,
            extraction: None,
            content_filter: None,
            scrape_options: ScrapeOptions::default(),
        }
    }

    pub fn with_default_browser_config(mut self, config: BrowserConfig) -> Self {
        self.default_browser_config = config;
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheStorage>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_robots(mut self, robots: Arc<RobotsPolicy>) -> Self {
        self.robots = Some(robots);
        self
    }

    pub fn with_proxy_rotation(mut self, strategy: Arc<dyn ProxyRotationStrategy>) -> Self {
        self.proxy_rotation = Some(strategy);
        self
    }

    pub fn with_extraction(mut self, extraction: Arc<dyn ExtractionStrategy>) -> Self {
        self.extraction = Some(extraction);
        self
    }

    pub fn with_content_filter(mut self, filter: Arc<dyn RelevantContentFilter>) -> Self {
        self.content_filter = Some(filter);
        self
    }

    pub fn with_scrape_options(mut self, options: ScrapeOptions) -> Self {
        self.scrape_options = options;
        self
    }

    pub fn build(self) -> Orchestrator {
        Orchestrator {
            pool: self.pool,
            default_browser_config: self.default_browser_config,
            cache: self.cache,
            robots: self.robots,
            proxy_rotation: self.proxy_rotation,
            extraction: self.extraction,
            content_filter: self.content_filter,
            scrape_options: self.scrape_options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fathom_browser::hooks::HookRegistry;

    fn test_pool() -> Arc<Pool> {
        Arc::new(Pool::new(None, HookRegistry::new()))
    }

    #[test]
    fn builder_defaults_to_no_optional_collaborators() {
        let orchestrator = OrchestratorBuilder::new(test_pool()).build();
        assert!(orchestrator.cache.is_none());
        assert!(orchestrator.robots.is_none());
        assert!(orchestrator.extraction.is_none());
    }

    #[tokio::test]
    async fn run_rejects_invalid_url_without_touching_the_pool() {
        let orchestrator = OrchestratorBuilder::new(test_pool()).build();
        let result = orchestrator.run("not a url", &RunConfig::default()).await;
        assert!(!result.success);
    }
}
