//! Semaphore dispatcher: fixed-concurrency alternative to the
//! Memory-Adaptive variant, with no memory gating.

use crate::{run_one_task, CancelHandle, Crawler, DispatchMonitor, Dispatcher, TaskResult};
use async_trait::async_trait;
use fathom_types::config::RunConfig;
use fathom_types::ports::RateLimiterPort;
use futures::stream::BoxStream;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::instrument;

pub struct SemaphoreDispatcher {
    semaphore_count: usize,
    rate_limiter: Option<Arc<dyn RateLimiterPort>>,
    monitor: Option<Arc<dyn DispatchMonitor>>,
    cancel: Option<CancelHandle>,
}

impl SemaphoreDispatcher {
    pub fn new(semaphore_count: usize) -> Self {
        SemaphoreDispatcher {
            semaphore_count,
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
        let semaphore = Arc::new(Semaphore::new(self.semaphore_count));
        let mut join_set = JoinSet::new();

        for url in urls {
            if self.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
                break;
            }
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let run_config = run_config.clone();
            let crawler = crawler.clone();
            let rate_limiter = self.rate_limiter.clone();
            let monitor = self.monitor.clone();
            let emit = emit.clone();
            join_set.spawn(async move {
                let _permit = permit;
                let result = run_one_task(url, run_config, crawler, rate_limiter, monitor).await;
                let _ = emit.send(result);
            });
        }

        if self.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
            join_set.abort_all();
            return;
        }

        while join_set.join_next().await.is_some() {}
    }
}

#[async_trait]
impl Dispatcher for SemaphoreDispatcher {
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
        order.into_iter().filter_map(|url| by_url.remove(&url)).collect()
    }

    fn run_stream(
        &self,
        urls: Vec<String>,
        run_config: RunConfig,
        crawler: Arc<dyn Crawler>,
    ) -> BoxStream<'static, TaskResult> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let semaphore_count = self.semaphore_count;
        let rate_limiter = self.rate_limiter.clone();
        let monitor = self.monitor.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            let dispatcher = SemaphoreDispatcher {
                semaphore_count,
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
    async fn runs_all_urls_with_fixed_concurrency() {
        let dispatcher = SemaphoreDispatcher::new(2);
        let urls = vec!["https://a.example".to_string(), "https://b.example".to_string()];
        let results = dispatcher
            .run(urls.clone(), RunConfig::default(), Arc::new(EchoCrawler))
            .await;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.status == crate::TaskStatus::Completed));
    }
}
