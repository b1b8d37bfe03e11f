//! Config builders that validate at construction time.
//!
//! The original source guarded removed configuration fields with a
//! dynamic `__setattr__` hook that emitted a deprecation warning at
//! assignment time. That pattern has no static equivalent; here a
//! deprecated field name is rejected immediately by
//! [`BrowserConfigBuilder::set_raw`]/[`RunConfigBuilder::set_raw`]
//! with a structured [`ConfigError::DeprecatedField`], rather than
//! deferred to a runtime warning.

use fathom_types::config::{BrowserConfig, CacheMode, RunConfig, Viewport};
use std::time::Duration;
use thiserror::Error;

/// Error surfaced by a builder's `build()` or `set_raw()`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("field '{name}' was removed; use '{replacement}' instead")]
    DeprecatedField { name: String, replacement: String },

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Field names the original source used to accept, mapped to their
/// replacement on the current config types. Checked by `set_raw`
/// before any other validation runs.
const DEPRECATED_BROWSER_FIELDS: &[(&str, &str)] = &[
    ("verbose", "tracing log level (set via RUST_LOG)"),
    ("sleep_on_close", "extra_args"),
    ("browser_type", "engine"),
];

const DEPRECATED_RUN_FIELDS: &[(&str, &str)] = &[
    ("bypass_cache", "cache_mode = CacheMode::Bypass"),
    ("only_text", "js_only"),
    ("word_count_threshold", "chunking.word_token_rate"),
];

fn reject_deprecated(name: &str, table: &[(&str, &str)]) -> Result<(), ConfigError> {
    if let Some((_, replacement)) = table.iter().find(|(deprecated, _)| *deprecated == name) {
        return Err(ConfigError::DeprecatedField {
            name: name.to_string(),
            replacement: replacement.to_string(),
        });
    }
    Ok(())
}

/// Builds a validated [`BrowserConfig`].
#[derive(Default)]
pub struct BrowserConfigBuilder {
    config: BrowserConfig,
}

impl BrowserConfigBuilder {
    pub fn new() -> Self {
        BrowserConfigBuilder {
            config: BrowserConfig::default(),
        }
    }

    /// Reject a field name the original source accepted but this
    /// config no longer does, before any caller looks it up further.
    pub fn set_raw(&self, field: &str) -> Result<(), ConfigError> {
        reject_deprecated(field, DEPRECATED_BROWSER_FIELDS)
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.config.viewport = Viewport { width, height };
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    pub fn text_mode(mut self, text_mode: bool) -> Self {
        self.config.text_mode = text_mode;
        self
    }

    pub fn build(self) -> Result<BrowserConfig, ConfigError> {
        if self.config.viewport.width == 0 || self.config.viewport.height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "viewport".to_string(),
                reason: "width and height must be non-zero".to_string(),
            });
        }
        Ok(self.config)
    }
}

/// Builds a validated [`RunConfig`].
#[derive(Default)]
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    pub fn new() -> Self {
        RunConfigBuilder {
            config: RunConfig::default(),
        }
    }

    pub fn set_raw(&self, field: &str) -> Result<(), ConfigError> {
        reject_deprecated(field, DEPRECATED_RUN_FIELDS)
    }

    pub fn cache_mode(mut self, mode: CacheMode) -> Self {
        self.config.cache_mode = mode;
        self
    }

    pub fn page_timeout(mut self, timeout: Duration) -> Self {
        self.config.page_timeout = timeout;
        self
    }

    pub fn check_robots_txt(mut self, check: bool) -> Self {
        self.config.check_robots_txt = check;
        self
    }

    pub fn css_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.css_selector = Some(selector.into());
        self
    }

    pub fn build(self) -> Result<RunConfig, ConfigError> {
        if self.config.page_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "page_timeout".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browser_builder_rejects_deprecated_field() {
        let builder = BrowserConfigBuilder::new();
        let err = builder.set_raw("browser_type").unwrap_err();
        assert_eq!(
            err,
            ConfigError::DeprecatedField {
                name: "browser_type".to_string(),
                replacement: "engine".to_string(),
            }
        );
    }

    #[test]
    fn browser_builder_accepts_unknown_field_name() {
        let builder = BrowserConfigBuilder::new();
        assert!(builder.set_raw("engine").is_ok());
    }

    #[test]
    fn browser_builder_rejects_zero_viewport() {
        let result = BrowserConfigBuilder::new().viewport(0, 600).build();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn run_builder_rejects_deprecated_field() {
        let builder = RunConfigBuilder::new();
        assert!(builder.set_raw("bypass_cache").is_err());
    }

    #[test]
    fn run_builder_rejects_zero_timeout() {
        let result = RunConfigBuilder::new().page_timeout(Duration::ZERO).build();
        assert!(result.is_err());
    }

    #[test]
    fn run_builder_builds_with_defaults() {
        let config = RunConfigBuilder::new().build().unwrap();
        assert_eq!(config.page_timeout, Duration::from_secs(30));
    }
}
