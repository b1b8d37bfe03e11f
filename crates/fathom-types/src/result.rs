//! `CrawlResult`, `MarkdownBundle`, and the media/link inventories that
//! a content scraper attaches to a rendered page.

use crate::error::CrawlError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// One discovered image/audio/video element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    pub src: String,
    pub alt: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Heuristic relevance score in `[0, 1]`.
    pub score: f64,
}

/// One discovered hyperlink, classified by base-domain comparison
/// against the page it was found on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkInfo {
    pub href: String,
    pub text: String,
    pub base_domain: String,
    pub is_external: bool,
}

/// One entry in a [`MarkdownBundle`]'s references list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    pub index: u32,
    pub url: String,
    pub description: Option<String>,
}

/// Raw, citation-substituted, references-only, and optionally
/// content-filtered variants of a page's markdown conversion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarkdownBundle {
    pub raw_markdown: String,
    pub markdown_with_citations: String,
    pub references_markdown: String,
    pub fit_markdown: Option<String>,
    pub fit_html: Option<String>,
}

/// SSL certificate summary captured during a fetch, when requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SslCertSummary {
    pub issuer: String,
    pub subject: String,
    pub valid_from: String,
    pub valid_to: String,
}

/// Dispatch-level timing and memory metrics attached by the dispatcher.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchMetrics {
    pub memory_start_mb: f64,
    pub memory_end_mb: f64,
    pub memory_peak_mb: f64,
    pub wall_time: Duration,
    pub retry_count: u32,
}

/// The union result type returned by every per-URL operation in the
/// crawl execution plane, successful or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    pub url: String,
    pub redirected_url: Option<String>,
    pub status_code: Option<u16>,
    pub response_headers: HashMap<String, String>,
    pub success: bool,

    pub raw_html: Option<String>,
    pub cleaned_html: Option<String>,
    pub media: Vec<MediaInfo>,
    pub links: Vec<LinkInfo>,
    pub markdown: Option<MarkdownBundle>,
    pub extracted_content: Option<serde_json::Value>,

    pub screenshot: Option<Vec<u8>>,
    pub pdf: Option<Vec<u8>>,
    pub ssl_certificate: Option<SslCertSummary>,
    pub console_log: Vec<String>,
    pub network_log: Vec<String>,

    pub dispatch_metrics: Option<DispatchMetrics>,
    /// Populated when this result was emitted by a deep-crawl strategy.
    pub depth: Option<u32>,
    pub parent_url: Option<String>,
    /// Populated alongside `depth` when a `URLScorer` gated discovery.
    pub score: Option<f64>,

    pub error_kind: Option<CrawlErrorKind>,
    pub error_message: Option<String>,
}

/// Serializable projection of [`CrawlError`] for result payloads —
/// carries the discriminant without the error's `Display` payload, so
/// equal failure kinds compare equal regardless of message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlErrorKind {
    ValidationError,
    RobotsBlocked,
    Navigation,
    Timeout,
    Interaction,
    Capture,
    Extraction,
    PoolExhausted,
    Cancelled,
}

impl From<&CrawlError> for CrawlErrorKind {
    fn from(err: &CrawlError) -> Self {
        match err {
            CrawlError::ValidationError(_) => CrawlErrorKind::ValidationError,
            CrawlError::RobotsBlocked => CrawlErrorKind::RobotsBlocked,
            CrawlError::Navigation(_) => CrawlErrorKind::Navigation,
            CrawlError::Timeout(_) => CrawlErrorKind::Timeout,
            CrawlError::Interaction(_) => CrawlErrorKind::Interaction,
            CrawlError::Capture(_) => CrawlErrorKind::Capture,
            CrawlError::Extraction(_) => CrawlErrorKind::Extraction,
            CrawlError::PoolExhausted => CrawlErrorKind::PoolExhausted,
            CrawlError::Cancelled => CrawlErrorKind::Cancelled,
        }
    }
}

impl CrawlResult {
    /// Build a minimal unsuccessful result for `url`, the shape every
    /// per-URL task falls back to when a [`CrawlError`] is caught.
    pub fn failed(url: impl Into<String>, err: &CrawlError) -> Self {
        CrawlResult {
            url: url.into(),
            redirected_url: None,
            status_code: err.status_code(),
            response_headers: HashMap::new(),
            success: false,
            raw_html: None,
            cleaned_html: None,
            media: Vec::new(),
            links: Vec::new(),
            markdown: None,
            extracted_content: None,
            screenshot: None,
            pdf: None,
            ssl_certificate: None,
            console_log: Vec::new(),
            network_log: Vec::new(),
            dispatch_metrics: None,
            depth: None,
            parent_url: None,
            score: None,
            error_kind: Some(CrawlErrorKind::from(err)),
            error_message: Some(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_result_carries_status_and_kind() {
        let result = CrawlResult::failed("https://example.com", &CrawlError::RobotsBlocked);
        assert!(!result.success);
        assert_eq!(result.status_code, Some(403));
        assert_eq!(result.error_kind, Some(CrawlErrorKind::RobotsBlocked));
    }
}
