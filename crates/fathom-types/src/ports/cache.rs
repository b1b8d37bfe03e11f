//! Backend-agnostic cache storage interface.
//!
//! The crawl execution plane consumes a cache only through this trait;
//! persistence mechanics (a local database, blob storage, Redis) are
//! out of scope here and live entirely behind an implementation of
//! this port.

use crate::error::Result;
use crate::result::CrawlResult;
use async_trait::async_trait;

/// Read/write policy for persisted crawl results.
///
/// Implementations must be `Send + Sync`; the orchestrator calls
/// `get`/`put` from concurrently-scheduled per-URL tasks.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Look up a previously cached result for `url`.
    async fn get(&self, url: &str) -> Result<Option<CrawlResult>>;

    /// Persist a result, keyed by its own `url` field.
    async fn put(&self, result: CrawlResult) -> Result<()>;
}
