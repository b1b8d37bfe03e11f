//! Three-tier browser pool: permanent / hot / cold, keyed by config
//! signature, with a per-signature creation lock and an adaptive
//! janitor sweeping Cold then Hot on a memory-pressure-driven interval.
//!
//! Concurrency shape grounded on `riptide-pool/src/pool.rs` (per-key
//! locking, eviction sweep) and `riptide-core/src/memory_manager.rs`
//! (available/in-use split, atomic counters).

use crate::janitor::{thresholds_for, JanitorThresholds};
use crate::memory::memory_pressure_percent;
use dashmap::DashMap;
use fathom_browser::hooks::HookRegistry;
use fathom_browser::EngineAdapter;
use fathom_types::config::BrowserConfig;
use fathom_types::error::{CrawlError, Result};
use fathom_types::pool::PoolTier;
use fathom_types::signature::config_signature;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Use-count, while still in the Cold tier, at which an adapter is
/// promoted to Hot. Not specified numerically; chosen conservatively
/// so a handful of repeat requests under one variant config earns
/// promotion without letting single one-off configs bloat Hot.
const PROMOTION_THRESHOLD: u32 = 3;

struct PoolState {
    permanent_signature: Mutex<Option<String>>,
    permanent: Mutex<Option<Arc<EngineAdapter>>>,
    hot: DashMap<String, Arc<EngineAdapter>>,
    cold: DashMap<String, Arc<EngineAdapter>>,
    use_counts: DashMap<String, AtomicU32>,
    creation_locks: DashMap<String, Arc<Mutex<()>>>,
}

/// The browser pool. One instance per process; construct at startup,
/// call [`Pool::shutdown`] at process teardown.
pub struct Pool {
    state: Arc<PoolState>,
    hooks: HookRegistry,
    profile_base_dir: Option<PathBuf>,
}

impl Pool {
    pub fn new(profile_base_dir: Option<PathBuf>, hooks: HookRegistry) -> Self {
        Pool {
            state: Arc::new(PoolState {
                permanent_signature: Mutex::new(None),
                permanent: Mutex::new(None),
                hot: DashMap::new(),
                cold: DashMap::new(),
                use_counts: DashMap::new(),
                creation_locks: DashMap::new(),
            }),
            hooks,
            profile_base_dir,
        }
    }

    /// Acquire an engine adapter for `config`, per the permanent →
    /// hot → cold → create contract.
    #[instrument(skip(self, config))]
    pub async fn acquire(&self, config: &BrowserConfig) -> Result<Arc<EngineAdapter>> {
        let default = BrowserConfig::default();
        let signature = config_signature(config, &default);

        {
            let perm_sig = self.state.permanent_signature.lock().await;
            if perm_sig.as_deref() == Some(signature.as_str()) {
                if let Some(adapter) = self.state.permanent.lock().await.clone() {
                    adapter.record_acquisition();
                    return Ok(adapter);
                }
            }
        }

        if let Some(adapter) = self.state.hot.get(&signature) {
            let adapter = adapter.clone();
            adapter.record_acquisition();
            adapter.touch().await;
            return Ok(adapter);
        }

        if let Some(adapter) = self.state.cold.get(&signature) {
            let adapter = adapter.clone();
            let count = self.bump_use_count(&signature);
            adapter.record_acquisition();
            adapter.touch().await;
            if count >= PROMOTION_THRESHOLD {
                self.promote_to_hot(&signature, adapter.clone()).await;
            }
            return Ok(adapter);
        }

        self.create_and_insert(config, signature).await
    }

    /// Mark `config`'s signature as the process's permanent slot,
    /// creating its adapter immediately if one doesn't already exist.
    #[instrument(skip(self, config))]
    pub async fn install_permanent(&self, config: &BrowserConfig) -> Result<Arc<EngineAdapter>> {
        let default = BrowserConfig::default();
        let signature = config_signature(config, &default);
        *self.state.permanent_signature.lock().await = Some(signature.clone());

        let adapter = Arc::new(
            EngineAdapter::launch(
                config,
                signature.clone(),
                self.profile_base_dir.as_deref(),
                self.hooks.clone(),
            )
            .await?,
        );
        adapter.set_tier(PoolTier::Permanent).await;
        *self.state.permanent.lock().await = Some(adapter.clone());
        info!(%signature, "installed permanent browser adapter");
        Ok(adapter)
    }

    fn bump_use_count(&self, signature: &str) -> u32 {
        self.state
            .use_counts
            .entry(signature.to_string())
            .or_insert_with(|| AtomicU32::new(0))
            .fetch_add(1, Ordering::Relaxed)
            + 1
    }

    async fn promote_to_hot(&self, signature: &str, adapter: Arc<EngineAdapter>) {
        adapter.set_tier(PoolTier::Hot).await;
        self.state.cold.remove(signature);
        self.state.hot.insert(signature.to_string(), adapter);
        debug!(%signature, "promoted adapter from cold to hot");
    }

    async fn create_and_insert(
        &self,
        config: &BrowserConfig,
        signature: String,
    ) -> Result<Arc<EngineAdapter>> {
        let lock = self
            .state
            .creation_locks
            .entry(signature.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Another caller may have created it while we waited for the lock.
        if let Some(adapter) = self.state.cold.get(&signature) {
            let adapter = adapter.clone();
            adapter.record_acquisition();
            adapter.touch().await;
            return Ok(adapter);
        }
        if let Some(adapter) = self.state.hot.get(&signature) {
            let adapter = adapter.clone();
            adapter.record_acquisition();
            adapter.touch().await;
            return Ok(adapter);
        }

        if memory_pressure_percent() > 80.0 {
            self.sweep().await;
            if memory_pressure_percent() > 80.0 {
                return Err(CrawlError::PoolExhausted);
            }
        }

        let adapter = EngineAdapter::launch(
            config,
            signature.clone(),
            self.profile_base_dir.as_deref(),
            self.hooks.clone(),
        )
        .await?;
        adapter.set_tier(PoolTier::Cold).await;
        adapter.record_acquisition();
        let adapter = Arc::new(adapter);
        self.state.cold.insert(signature.clone(), adapter.clone());
        self.state
            .use_counts
            .insert(signature, AtomicU32::new(1));
        Ok(adapter)
    }

    /// Evict Cold, then Hot, adapters idle beyond the current
    /// pressure-driven TTL. Permanent is never touched.
    #[instrument(skip(self))]
    pub async fn sweep(&self) {
        let thresholds = self.current_thresholds();
        self.sweep_tier(&self.state.cold, thresholds.cold_ttl).await;
        self.sweep_tier(&self.state.hot, thresholds.hot_ttl).await;
    }

    async fn sweep_tier(&self, tier: &DashMap<String, Arc<EngineAdapter>>, ttl: std::time::Duration) {
        let candidates: Vec<String> = tier.iter().map(|e| e.key().clone()).collect();
        for signature in candidates {
            let Some(adapter) = tier.get(&signature).map(|e| e.clone()) else {
                continue;
            };
            if adapter.is_in_use() {
                continue;
            }
            if adapter.last_used().await.elapsed() > ttl {
                tier.remove(&signature);
                adapter.close().await;
                debug!(%signature, "janitor evicted idle adapter");
            }
        }
    }

    pub fn current_thresholds(&self) -> JanitorThresholds {
        thresholds_for(memory_pressure_percent())
    }

    /// Run the janitor loop until `shutdown` signals it to stop.
    pub async fn run_janitor(&self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        loop {
            let interval = self.current_thresholds().wake_interval;
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    self.sweep().await;
                }
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        return;
                    }
                }
            }
        }
    }

    /// Close every adapter: Cold, then Hot, then Permanent, in that order.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        for entry in self.state.cold.iter() {
            entry.value().close().await;
        }
        self.state.cold.clear();

        for entry in self.state.hot.iter() {
            entry.value().close().await;
        }
        self.state.hot.clear();

        if let Some(adapter) = self.state.permanent.lock().await.take() {
            adapter.close().await;
        }
        info!("browser pool shut down");
    }

    pub fn hot_count(&self) -> usize {
        self.state.hot.len()
    }

    pub fn cold_count(&self) -> usize {
        self.state.cold.len()
    }

    pub async fn has_permanent(&self) -> bool {
        self.state.permanent.lock().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promotion_threshold_is_reasonable() {
        assert!(PROMOTION_THRESHOLD >= 1);
    }
}
