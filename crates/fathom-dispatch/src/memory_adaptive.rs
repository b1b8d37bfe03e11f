//! Memory-Adaptive dispatcher: admits queued URLs only while container
//! memory stays under a threshold, up to a hard concurrency cap.

use crate::{run_one_task, CancelHandle, Crawler, DispatchMonitor, Dispatcher, TaskResult};
use async_trait::async_trait;
use fathom_types::config::RunConfig;
use fathom_types::ports::RateLimiterPort;
use futures::stream::BoxStream;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, instrument};

#[derive(Debug, Clone)]
pub struct MemoryAdaptiveConfig {
    pub memory_threshold_percent: f64,
    pub check_interval: Duration,
    pub max_session_permit: usize,
}

impl Default for MemoryAdaptiveConfig {
    fn default() -> Self {
        MemoryAdaptiveConfig {
            memory_threshold_percent: 90.0,
            check_interval: Duration::from_secs(1),
            max_session_permit: 10,
        }
    }
}

pub struct MemoryAdaptiveDispatcher {
    config: MemoryAdaptiveConfig,
    rate_limiter: Option<Arc<dyn RateLimiterPort>>,
    monitor: Option<Arc<dyn DispatchMonitor>>,
    cancel: Option<CancelHandle>,
}

impl MemoryAdaptiveDispatcher {
    pub fn new(config: MemoryAdaptiveConfig) -> Self {
        MemoryAdaptiveDispatcher {
            config,
            rate_limiter: None,
            monitor: None,
            cancel: None,
        }
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<dyn RateLimiterPort>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    pub fn with_monitor(mut self, monitor: Arc<dyn DispatchMonitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn with_cancel_handle(mut self, cancel: CancelHandle) -> Self {
        self.cancel = Some(cancel);
        self
    }

    #[instrument(skip(self, urls, run_config, crawler, emit))]
    async fn drive(
        &self,
        urls: Vec<String>,
        run_config: RunConfig,
        crawler: Arc<dyn Crawler>,
        emit: tokio::sync::mpsc::UnboundedSender<TaskResult>,
    ) {
        let queue = Arc::new(Mutex::new(VecDeque::from(urls)));
        let mut join_set = JoinSet::new();
        let cancel = self.cancel.clone();

        loop {
            if cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
                join_set.abort_all();
                break;
            }

            let queue_is_empty = queue.lock().await.is_empty();
            if queue_is_empty && join_set.is_empty() {
                break;
            }

            if join_set.len() < self.config.max_session_permit && !queue_is_empty {
                let pct = crate::memory::memory_percent();
                if pct < self.config.memory_threshold_percent {
                    let url = queue.lock().await.pop_front();
                    if let Some(url) = url {
                        let run_config = run_config.clone();
                        let crawler = crawler.clone();
                        let rate_limiter = self.rate_limiter.clone();
                        let monitor = self.monitor.clone();
                        let emit = emit.clone();
                        join_set.spawn(async move {
                            let result = run_one_task(url, run_config, crawler, rate_limiter, monitor).await;
                            let _ = emit.send(result);
                        });
                    }
                    continue;
                } else {
                    debug!(memory_percent = pct, "memory gate closed, waiting");
                    tokio::time::sleep(self.config.check_interval).await;
                    continue;
                }
            }

            if let Some(joined) = join_set.join_next().await {
                if let Err(e) = joined {
                    if !e.is_cancelled() {
                        debug!(error = %e, "dispatched task panicked");
                    }
                }
            } else {
                tokio::time::sleep(self.config.check_interval).await;
            }
        }
    }
}

#[async_trait]
impl Dispatcher for MemoryAdaptiveDispatcher {
    async fn run(
        &self,
        urls: Vec<String>,
        run_config: RunConfig,
        crawler: Arc<dyn Crawler>,
    ) -> Vec<TaskResult> {
        let order: Vec<String> = urls.clone();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        self.drive(urls, run_config, crawler, tx).await;
        let mut by_url: std::collections::HashMap<String, TaskResult> = std::collections::HashMap::new();
        while let Ok(result) = rx.try_recv() {
            by_url.insert(result.url.clone(), result);
        }
        // Batch mode preserves submission order even though completions interleave.
        order.into_iter().filter_map(|url| by_url.remove(&url)).collect()
    }

    fn run_stream(
        &self,
        urls: Vec<String>,
        run_config: RunConfig,
        crawler: Arc<dyn Crawler>,
    ) -> BoxStream<'static, TaskResult> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let config = self.config.clone();
        let rate_limiter = self.rate_limiter.clone();
        let monitor = self.monitor.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            let dispatcher = MemoryAdaptiveDispatcher {
                config,
                rate_limiter,
                monitor,
                cancel,
            };
            dispatcher.drive(urls, run_config, crawler, tx).await;
        });
        Box::pin(tokio_stream::wrappers::UnboundedReceiverStream::new(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fathom_types::result::CrawlResult;

    struct EchoCrawler;

    #[async_trait]
    impl Crawler for EchoCrawler {
        async fn crawl(&self, url: &str, _run_config: &RunConfig) -> CrawlResult {
            CrawlResult {
                url: url.to_string(),
                redirected_url: None,
                status_code: Some(200),
                response_headers: Default::default(),
                success: true,
                raw_html: None,
                cleaned_html: None,
                media: Vec::new(),
                links: Vec::new(),
                markdown: None,
                extracted_content: None,
                screenshot: None,
                pdf: None,
                ssl_certificate: None,
                console_log: Vec::new(),
                network_log: Vec::new(),
                dispatch_metrics: None,
                depth: None,
                parent_url: None,
                score: None,
                error_kind: None,
                error_message: None,
            }
        }
    }

    #[tokio::test]
    async fn batch_run_preserves_submission_order() {
        let dispatcher = MemoryAdaptiveDispatcher::new(MemoryAdaptiveConfig {
            max_session_permit: 4,
            ..MemoryAdaptiveConfig::default()
        });
        let urls = vec![
            "https://a.example".to_string(),
            "https://b.example".to_string(),
            "https://c.example".to_string(),
        ];
        let results = dispatcher
            .run(urls.clone(), RunConfig::default(), Arc::new(EchoCrawler))
            .await;
        let returned_urls: Vec<String> = results.iter().map(|r| r.url.clone()).collect();
        assert_eq!(returned_urls, urls);
    }

    #[tokio::test]
    async fn cancellation_stops_admitting_new_tasks() {
        let cancel = CancelHandle::new();
        cancel.cancel();
        let dispatcher = MemoryAdaptiveDispatcher::new(MemoryAdaptiveConfig::default())
            .with_cancel_handle(cancel);
        let results = dispatcher
            .run(
                vec!["https://a.example".to_string()],
                RunConfig::default(),
                Arc::new(EchoCrawler),
            )
            .await;
        assert!(results.is_empty());
    }
}
