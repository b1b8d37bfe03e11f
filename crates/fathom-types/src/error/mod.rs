//! Unified error enum for the crawl execution plane.

use thiserror::Error;

/// Result type alias using [`CrawlError`].
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Error kinds surfaced in [`crate::result::CrawlResult::error_kind`].
///
/// Mirrors the failure taxonomy a per-URL task can terminate with.
/// Every variant here is non-fatal at the run level: the orchestrator
/// always converts these into an unsuccessful `CrawlResult` rather than
/// propagating them across URL boundaries. `Cancelled` is the only
/// kind that also halts the run that produced it.
#[derive(Error, Debug, Clone)]
pub enum CrawlError {
    /// Malformed URL or run/browser configuration.
    #[error("validation failed: {0}")]
    ValidationError(String),

    /// robots.txt denies the effective user agent.
    #[error("access denied by robots.txt")]
    RobotsBlocked,

    /// DNS/TLS/refused/HTTP-level navigation failure.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// Page load, selector-wait, or task-level timeout exceeded.
    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// JS evaluation error or a `wait_for` selector never appeared.
    #[error("interaction failed: {0}")]
    Interaction(String),

    /// Screenshot/PDF capture failed; the result is still returned.
    #[error("capture failed: {0}")]
    Capture(String),

    /// Extraction strategy raised; the result still carries the rest
    /// of the pipeline's output.
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// The browser pool could not allocate an adapter after an
    /// eviction sweep.
    #[error("pool exhausted")]
    PoolExhausted,

    /// Task cancelled by shutdown or dispatcher cancellation.
    #[error("cancelled")]
    Cancelled,
}

impl CrawlError {
    /// HTTP-shaped status code a caller would naturally attach to this
    /// error kind when serializing an unsuccessful `CrawlResult`.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            CrawlError::RobotsBlocked => Some(403),
            CrawlError::ValidationError(_) => Some(400),
            _ => None,
        }
    }

    /// Whether the dispatcher should consider retrying this failure.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CrawlError::Navigation(_) | CrawlError::Timeout(_) | CrawlError::PoolExhausted
        )
    }

    /// Whether this failure is fatal to the whole run, not just the
    /// URL that produced it.
    pub fn is_run_fatal(&self) -> bool {
        matches!(self, CrawlError::Cancelled)
    }
}
