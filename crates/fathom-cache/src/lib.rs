//! In-memory [`CacheStorage`] implementation.
//!
//! Persistence mechanics (a real database, blob storage, Redis) are
//! out of scope here; the teacher's own `riptide-cache` is Redis-heavy
//! and not reused beyond its port-level contract
//! (`riptide-types::ports::cache` equivalent). This crate supplies
//! only the in-process implementation the orchestrator falls back to
//! when no external cache is configured.

use async_trait::async_trait;
use dashmap::DashMap;
use fathom_types::error::Result;
use fathom_types::ports::CacheStorage;
use fathom_types::result::CrawlResult;
use tracing::debug;

/// Keyed by [`CrawlResult::url`]. No eviction policy; entries live for
/// the process lifetime, matching the "no other assumptions" contract
/// the core places on a `CacheStorage` implementation.
#[derive(Default)]
pub struct InMemoryCache {
    entries: DashMap<String, CrawlResult>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        InMemoryCache {
            entries: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheStorage for InMemoryCache {
    async fn get(&self, url: &str) -> Result<Option<CrawlResult>> {
        Ok(self.entries.get(url).map(|entry| entry.value().clone()))
    }

    async fn put(&self, result: CrawlResult) -> Result<()> {
        debug!(url = %result.url, "caching crawl result");
        self.entries.insert(result.url.clone(), result);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fathom_types::error::CrawlError;

    fn sample(url: &str) -> CrawlResult {
        let mut result = CrawlResult::failed(url, &CrawlError::Navigation("placeholder".into()));
        result.success = true;
        result.error_kind = None;
        result.error_message = None;
        result
    }

    #[tokio::test]
    async fn miss_returns_none() {
        let cache = InMemoryCache::new();
        assert!(cache.get("https://example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let cache = InMemoryCache::new();
        cache.put(sample("https://example.com")).await.unwrap();
        let found = cache.get("https://example.com").await.unwrap();
        assert_eq!(found.unwrap().url, "https://example.com");
    }

    #[tokio::test]
    async fn put_overwrites_existing_entry_for_same_url() {
        let cache = InMemoryCache::new();
        cache.put(sample("https://example.com")).await.unwrap();
        let mut updated = sample("https://example.com");
        updated.status_code = Some(201);
        cache.put(updated).await.unwrap();
        assert_eq!(cache.len(), 1);
        let found = cache.get("https://example.com").await.unwrap().unwrap();
        assert_eq!(found.status_code, Some(201));
    }
}
