//! Backend-agnostic trait interfaces ("ports" in the hexagonal-
//! architecture sense) that let the orchestrator and dispatcher depend
//! on abstractions instead of concrete cache/rate-limit backends.

mod cache;
mod rate_limit;

pub use cache::CacheStorage;
pub use rate_limit::{FetchOutcome, RateLimiterPort};
