//! Ambient configuration: process-wide env-derived defaults, config
//! builders with construction-time validation, and robots.txt policy.
//!
//! Grounded on the teacher's `riptide-api/src/config.rs::ApiConfig`
//! (env-var overlay shape) and `riptide-core/src/robots.rs`
//! (`RobotsManager`'s per-host cache and `DefaultMatcher` usage).

mod builder;
mod env;
mod robots;

pub use builder::{BrowserConfigBuilder, ConfigError, RunConfigBuilder};
pub use env::ProcessDefaults;
pub use robots::{RobotsDecision, RobotsPolicy};
