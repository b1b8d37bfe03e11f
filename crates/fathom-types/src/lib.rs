//! # fathom-types
//!
//! Shared types and traits for the fathom crawl execution plane.
//! Provides the data model shared by every other `fathom-*` crate, the
//! unified error enum, the config-signature function, and the
//! hexagonal "port" trait interfaces that let the orchestrator and
//! dispatcher depend on abstractions rather than concrete backends.
//!
//! ## Organization
//!
//! - `config`: `BrowserConfig`, `RunConfig`, and related option types.
//! - `result`: `CrawlResult`, `MarkdownBundle`, media/link inventories.
//! - `pool`: pool-tier types shared between `fathom-pool` and `fathom-browser`.
//! - `error`: `CrawlError` and the crate-wide `Result` alias.
//! - `ports`: backend-agnostic trait interfaces (`CacheStorage`, `RateLimiter`).
//! - `signature`: content-hash config-signature function.

pub mod config;
pub mod error;
pub mod ports;
pub mod pool;
pub mod result;
pub mod signature;

pub use config::{BrowserConfig, ChunkingMode, EngineKind, MarkdownSource, RunConfig};
pub use error::{CrawlError, Result};
pub use pool::{PoolTier, SessionHandle};
pub use result::{CrawlResult, LinkInfo, MarkdownBundle, MediaInfo};
pub use signature::config_signature;
