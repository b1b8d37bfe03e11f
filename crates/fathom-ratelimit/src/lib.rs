//! Per-host rate limiter: jittered initial delay plus doubling backoff
//! on throttle responses, decaying back toward the initial draw on
//! success.
//!
//! Grounded on `riptide-fetch/src/fetch.rs`'s `RateLimiter` (per-host
//! token state shape, `Mutex<f64>`-style refill) and
//! `riptide-core/src/robots.rs`'s `TokenBucket` for the atomic
//! fail-count style; `riptide-utils/src/rate_limit.rs`'s `governor`
//! based limiter was considered and rejected since it has no notion of
//! per-host status-code-driven backoff escalation.

use async_trait::async_trait;
use dashmap::DashMap;
use fathom_types::error::Result;
use fathom_types::ports::{FetchOutcome, RateLimiterPort};
use rand::Rng;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

/// Tunables for the per-host backoff algorithm.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub base_delay_min: Duration,
    pub base_delay_max: Duration,
    pub max_delay: Duration,
    pub max_retries: u32,
    pub throttle_status_codes: HashSet<u16>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        RateLimitConfig {
            base_delay_min: Duration::from_millis(100),
            base_delay_max: Duration::from_millis(500),
            max_delay: Duration::from_secs(60),
            max_retries: 5,
            throttle_status_codes: [429, 503].into_iter().collect(),
        }
    }
}

struct HostState {
    last_request_time: Mutex<Option<Instant>>,
    current_delay: Mutex<Duration>,
    fail_count: AtomicU32,
}

impl HostState {
    fn new(initial_delay: Duration) -> Self {
        HostState {
            last_request_time: Mutex::new(None),
            current_delay: Mutex::new(initial_delay),
            fail_count: AtomicU32::new(0),
        }
    }
}

/// Error returned by [`RateLimiter::report`]'s caller once a host has
/// exhausted its retries; surfaced via [`fathom_types::error::CrawlError`]
/// at the call site that owns the fetch attempt loop.
pub struct RetriesExhausted;

/// Per-host rate limiter implementing [`RateLimiterPort`].
pub struct RateLimiter {
    config: RateLimitConfig,
    hosts: DashMap<String, std::sync::Arc<HostState>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        RateLimiter {
            config,
            hosts: DashMap::new(),
        }
    }

    fn initial_delay(&self) -> Duration {
        let mut rng = rand::thread_rng();
        let min = self.config.base_delay_min.as_millis() as u64;
        let max = self.config.base_delay_max.as_millis() as u64;
        let millis = if max > min { rng.gen_range(min..=max) } else { min };
        Duration::from_millis(millis)
    }

    fn host_state(&self, host: &str) -> std::sync::Arc<HostState> {
        self.hosts
            .entry(host.to_string())
            .or_insert_with(|| std::sync::Arc::new(HostState::new(self.initial_delay())))
            .clone()
    }

    pub fn fail_count(&self, host: &str) -> u32 {
        self.hosts
            .get(host)
            .map(|s| s.fail_count.load(Ordering::Relaxed))
            .unwrap_or(0)
    }
}

#[async_trait]
impl RateLimiterPort for RateLimiter {
    #[instrument(skip(self))]
    async fn acquire(&self, host: &str) -> Result<()> {
        let state = self.host_state(host);
        let delay = *state.current_delay.lock().await;

        let mut last = state.last_request_time.lock().await;
        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < delay {
                let remainder = delay - elapsed;
                let jitter = Duration::from_millis(rand::thread_rng().gen_range(0..=20));
                debug!(%host, wait_ms = (remainder + jitter).as_millis() as u64, "rate limit admission wait");
                tokio::time::sleep(remainder + jitter).await;
            }
        }
        *last = Some(Instant::now());
        Ok(())
    }

    #[instrument(skip(self, outcome))]
    async fn report(&self, host: &str, outcome: FetchOutcome) {
        let state = self.host_state(host);
        let throttled = outcome
            .status_code
            .map(|code| self.config.throttle_status_codes.contains(&code))
            .unwrap_or(false);

        if throttled || !outcome.succeeded {
            let fail_count = state.fail_count.fetch_add(1, Ordering::Relaxed) + 1;
            let mut delay = state.current_delay.lock().await;
            *delay = (*delay * 2).min(self.config.max_delay);
            debug!(%host, fail_count, new_delay_ms = delay.as_millis() as u64, "escalated host backoff");
            if fail_count > self.config.max_retries {
                debug!(%host, "host exceeded max retries");
            }
        } else {
            state.fail_count.store(0, Ordering::Relaxed);
            let mut delay = state.current_delay.lock().await;
            let initial = self.initial_delay();
            // Decay halfway back toward a fresh initial draw each success.
            *delay = Duration::from_secs_f64((delay.as_secs_f64() + initial.as_secs_f64()) / 2.0);
        }
    }
}

/// Whether `host` has exceeded its configured retry budget.
pub fn retries_exhausted(limiter: &RateLimiter, host: &str) -> bool {
    limiter.fail_count(host) > limiter.config.max_retries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_acquire_does_not_block() {
        let limiter = RateLimiter::new(RateLimitConfig::default());
        let start = Instant::now();
        limiter.acquire("example.com").await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn throttled_report_escalates_delay() {
        let limiter = RateLimiter::new(RateLimitConfig::default());
        limiter.acquire("example.com").await.unwrap();
        let before = *limiter.host_state("example.com").current_delay.lock().await;
        limiter
            .report(
                "example.com",
                FetchOutcome {
                    status_code: Some(429),
                    succeeded: false,
                },
            )
            .await;
        let after = *limiter.host_state("example.com").current_delay.lock().await;
        assert!(after >= before * 2 || after == limiter.config.max_delay);
    }

    #[tokio::test]
    async fn success_report_resets_fail_count() {
        let limiter = RateLimiter::new(RateLimitConfig::default());
        limiter
            .report(
                "example.com",
                FetchOutcome {
                    status_code: Some(429),
                    succeeded: false,
                },
            )
            .await;
        assert_eq!(limiter.fail_count("example.com"), 1);
        limiter
            .report(
                "example.com",
                FetchOutcome {
                    status_code: Some(200),
                    succeeded: true,
                },
            )
            .await;
        assert_eq!(limiter.fail_count("example.com"), 0);
    }

    #[tokio::test]
    async fn distinct_hosts_have_independent_state() {
        let limiter = RateLimiter::new(RateLimitConfig::default());
        limiter
            .report(
                "a.com",
                FetchOutcome {
                    status_code: Some(429),
                    succeeded: false,
                },
            )
            .await;
        assert_eq!(limiter.fail_count("a.com"), 1);
        assert_eq!(limiter.fail_count("b.com"), 0);
    }

    #[test]
    fn retries_exhausted_uses_configured_ceiling() {
        let limiter = RateLimiter::new(RateLimitConfig {
            max_retries: 0,
            ..RateLimitConfig::default()
        });
        limiter.hosts.insert(
            "x.com".to_string(),
            std::sync::Arc::new(HostState::new(Duration::from_millis(100))),
        );
        limiter
            .hosts
            .get("x.com")
            .unwrap()
            .fail_count
            .store(1, Ordering::Relaxed);
        assert!(retries_exhausted(&limiter, "x.com"));
    }
}
