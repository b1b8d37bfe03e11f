//! `BrowserConfig` and `RunConfig`: the two configuration values passed
//! into the crawl execution plane. Both are serializable to JSON so
//! they can be hashed into a pool signature or persisted to cache.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Which headless engine a [`BrowserConfig`] should launch or attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Chromium,
    Firefox,
    Webkit,
}

impl Default for EngineKind {
    fn default() -> Self {
        EngineKind::Chromium
    }
}

/// How a [`BrowserConfig`] connects to its browser process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ConnectMode {
    /// Launch and own a new browser process.
    Managed,
    /// Attach to an already-running browser via its CDP endpoint.
    Attach { endpoint: String },
}

impl Default for ConnectMode {
    fn default() -> Self {
        ConnectMode::Managed
    }
}

/// Viewport dimensions, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            width: 1920,
            height: 1080,
        }
    }
}

/// Immutable description of how to launch or attach a browser.
///
/// Two configs with an identical [`crate::signature::config_signature`]
/// are interchangeable for pool reuse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub engine: EngineKind,
    pub headless: bool,
    pub viewport: Viewport,
    pub user_agent: Option<String>,
    pub proxy: Option<String>,
    pub cookies: Vec<CookieParam>,
    pub default_headers: HashMap<String, String>,
    /// Disable images/fonts/JS for faster text-only fetches.
    pub text_mode: bool,
    pub extra_args: Vec<String>,
    pub connect_mode: ConnectMode,
    /// Directory backing a persistent profile; `None` uses a fresh
    /// temp profile per adapter.
    pub user_data_dir: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        BrowserConfig {
            engine: EngineKind::default(),
            headless: true,
            viewport: Viewport::default(),
            user_agent: None,
            proxy: None,
            cookies: Vec::new(),
            default_headers: HashMap::new(),
            text_mode: false,
            extra_args: Vec::new(),
            connect_mode: ConnectMode::default(),
            user_data_dir: None,
        }
    }
}

/// A single cookie to seed into a browser context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieParam {
    pub name: String,
    pub value: String,
    pub domain: Option<String>,
    pub path: Option<String>,
}

/// Read-only cache policy for a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    /// Read if present, write the fresh result back.
    Enabled,
    /// Never consult or write the cache.
    Bypass,
    /// Only read; never write (used for idempotence checks).
    ReadOnly,
    /// Only write; always fetch fresh.
    WriteOnly,
}

impl Default for CacheMode {
    fn default() -> Self {
        CacheMode::Enabled
    }
}

impl CacheMode {
    pub fn should_read(&self) -> bool {
        matches!(self, CacheMode::Enabled | CacheMode::ReadOnly)
    }

    pub fn should_write(&self) -> bool {
        matches!(self, CacheMode::Enabled | CacheMode::WriteOnly)
    }
}

/// Which HTML source feeds the Markdown Generator / Extraction Strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkdownSource {
    RawHtml,
    CleanedHtml,
    FitHtml,
}

impl Default for MarkdownSource {
    fn default() -> Self {
        MarkdownSource::CleanedHtml
    }
}

/// Approximate-token chunking policy applied before extraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChunkingMode {
    pub apply_chunking: bool,
    pub chunk_token_threshold: usize,
    pub overlap_rate: f64,
    /// Words-per-token approximation used to estimate a chunk's token count.
    pub word_token_rate: f64,
}

impl Default for ChunkingMode {
    fn default() -> Self {
        ChunkingMode {
            apply_chunking: true,
            chunk_token_threshold: 2048,
            overlap_rate: 0.1,
            word_token_rate: 0.75,
        }
    }
}

/// Per-request knobs controlling a single fetch/crawl invocation.
///
/// A value type: subsystems clone it whenever they need to disable
/// deep-crawl recursion or override streaming for a nested call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub cache_mode: CacheMode,
    pub session_id: Option<String>,
    pub wait_for_selector: Option<String>,
    pub page_timeout: Duration,
    pub js_snippets: Vec<String>,
    pub js_only: bool,
    pub scan_full_page: bool,
    pub remove_overlays: bool,
    pub screenshot: bool,
    pub pdf: bool,
    pub mhtml: bool,
    pub css_selector: Option<String>,
    pub markdown_source: MarkdownSource,
    pub chunking: ChunkingMode,
    pub check_robots_txt: bool,
    pub include_external: bool,
    pub stream: bool,
    /// Set by the orchestrator's recursion guard; `true` once a
    /// deep-crawl strategy has taken over a call so the top-level
    /// entry point does not re-delegate into itself.
    #[serde(skip)]
    pub deep_crawl_guard: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            cache_mode: CacheMode::default(),
            session_id: None,
            wait_for_selector: None,
            page_timeout: Duration::from_secs(30),
            js_snippets: Vec::new(),
            js_only: false,
            scan_full_page: false,
            remove_overlays: false,
            screenshot: false,
            pdf: false,
            mhtml: false,
            css_selector: None,
            markdown_source: MarkdownSource::default(),
            chunking: ChunkingMode::default(),
            check_robots_txt: false,
            include_external: false,
            stream: false,
            deep_crawl_guard: false,
        }
    }
}

impl RunConfig {
    /// Clone this config with the deep-crawl recursion guard armed, as
    /// the orchestrator does before delegating a single-URL call into
    /// a deep-crawl strategy's per-page fetches.
    pub fn with_deep_crawl_guard(&self) -> Self {
        let mut cfg = self.clone();
        cfg.deep_crawl_guard = true;
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_mode_read_write_policy() {
        assert!(CacheMode::Enabled.should_read());
        assert!(CacheMode::Enabled.should_write());
        assert!(CacheMode::ReadOnly.should_read());
        assert!(!CacheMode::ReadOnly.should_write());
        assert!(!CacheMode::Bypass.should_read());
        assert!(!CacheMode::Bypass.should_write());
    }

    #[test]
    fn deep_crawl_guard_is_cloned_armed() {
        let cfg = RunConfig::default();
        assert!(!cfg.deep_crawl_guard);
        let guarded = cfg.with_deep_crawl_guard();
        assert!(guarded.deep_crawl_guard);
        assert!(!cfg.deep_crawl_guard);
    }
}
