//! Dispatcher: schedules per-URL Orchestrator calls under memory,
//! concurrency, and rate-limit gates.
//!
//! Worker-pool shape (shared task queue, `Semaphore` permits,
//! `JoinSet`, progress tracking) grounded on
//! `riptide-extraction/src/parallel.rs::ParallelExtractor`.

mod cancel;
mod memory;
mod memory_adaptive;
mod semaphore;

pub use cancel::CancelHandle;
pub use memory::memory_percent;
pub use memory_adaptive::{MemoryAdaptiveConfig, MemoryAdaptiveDispatcher};
pub use semaphore::SemaphoreDispatcher;

use async_trait::async_trait;
use fathom_types::config::RunConfig;
use fathom_types::result::CrawlResult;
use futures::stream::BoxStream;
use std::time::Instant;

/// The Orchestrator's single-URL entry point, as seen by a dispatcher.
/// Implemented by `fathom-orchestrator`; kept as a trait here so
/// `fathom-dispatch` never depends on the orchestrator crate.
#[async_trait]
pub trait Crawler: Send + Sync {
    async fn crawl(&self, url: &str, run_config: &RunConfig) -> CrawlResult;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
}

/// One dispatched task's full lifecycle record.
#[derive(Debug, Clone)]
pub struct TaskResult {
    pub task_id: uuid::Uuid,
    pub url: String,
    pub status: TaskStatus,
    pub result: Option<CrawlResult>,
    pub memory_start_mb: f64,
    pub peak_memory_mb: f64,
    pub start_time: Instant,
    pub end_time: Instant,
    pub retry_count: u32,
    pub error_message: Option<String>,
}

/// Optional collaborator notified as a task's status changes.
#[async_trait]
pub trait DispatchMonitor: Send + Sync {
    async fn on_status_change(&self, task_id: uuid::Uuid, status: TaskStatus);
}

/// Shared contract for both dispatcher variants.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Run every url to completion, returning once all are done.
    async fn run(&self, urls: Vec<String>, run_config: RunConfig, crawler: std::sync::Arc<dyn Crawler>)
        -> Vec<TaskResult>;

    /// Run every url, yielding each `TaskResult` as it completes.
    fn run_stream(
        &self,
        urls: Vec<String>,
        run_config: RunConfig,
        crawler: std::sync::Arc<dyn Crawler>,
    ) -> BoxStream<'static, TaskResult>;
}

pub(crate) fn extract_host(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .unwrap_or_else(|| url.to_string())
}

/// Run one URL to completion: optional rate-limiter admission, the
/// crawler call itself, and a status report back to the optional
/// monitor. Shared by both dispatcher variants.
pub(crate) async fn run_one_task(
    url: String,
    run_config: RunConfig,
    crawler: std::sync::Arc<dyn Crawler>,
    rate_limiter: Option<std::sync::Arc<dyn fathom_types::ports::RateLimiterPort>>,
    monitor: Option<std::sync::Arc<dyn DispatchMonitor>>,
) -> TaskResult {
    let task_id = uuid::Uuid::new_v4();
    let memory_start_mb = memory::memory_percent();
    let start_time = Instant::now();

    if let Some(monitor) = &monitor {
        monitor.on_status_change(task_id, TaskStatus::InProgress).await;
    }

    let host = extract_host(&url);
    if let Some(limiter) = &rate_limiter {
        let _ = limiter.acquire(&host).await;
    }

    let result = crawler.crawl(&url, &run_config).await;

    if let Some(limiter) = &rate_limiter {
        let outcome = fathom_types::ports::FetchOutcome {
            status_code: result.status_code,
            succeeded: result.success,
        };
        limiter.report(&host, outcome).await;
    }

    let status = if result.success {
        TaskStatus::Completed
    } else {
        TaskStatus::Failed
    };
    if let Some(monitor) = &monitor {
        monitor.on_status_change(task_id, status).await;
    }

    let peak_memory_mb = memory::memory_percent().max(memory_start_mb);
    let error_message = result.error_message.clone();

    TaskResult {
        task_id,
        url,
        status,
        result: Some(result),
        memory_start_mb,
        peak_memory_mb,
        start_time,
        end_time: Instant::now(),
        retry_count: 0,
        error_message,
    }
}
