//! Port for the per-host rate limiter the dispatcher consults before
//! admitting a task, decoupling `fathom-dispatch` from the concrete
//! limiter implementation in `fathom-ratelimit`.

use crate::error::Result;
use async_trait::async_trait;

/// Outcome a dispatcher reports back to the limiter after a fetch, so
/// the limiter can update its per-host backoff state.
#[derive(Debug, Clone, Copy)]
pub struct FetchOutcome {
    pub status_code: Option<u16>,
    pub succeeded: bool,
}

/// Per-host admission gate consulted before every fetch.
#[async_trait]
pub trait RateLimiterPort: Send + Sync {
    /// Block until `host` is clear to issue its next request.
    async fn acquire(&self, host: &str) -> Result<()>;

    /// Report the result of a request to `host` so the limiter can
    /// decay or escalate that host's delay.
    async fn report(&self, host: &str, outcome: FetchOutcome);
}
