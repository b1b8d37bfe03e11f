//! Single-URL pipeline: validate, cache-read, robots, proxy, acquire,
//! fetch, scrape/markdown/extract, cache-write. Every failure mode is
//! caught and converted into an unsuccessful [`CrawlResult`] rather
//! than propagated, per the orchestrator's never-throw contract.

use crate::Orchestrator;
use fathom_extraction::chunking;
use fathom_markdown::{ContentSource, GenerationOptions};
use fathom_scraper::{scrape, ScrapeOptions};
use fathom_types::config::{MarkdownSource, RunConfig};
use fathom_types::error::CrawlError;
use fathom_types::result::CrawlResult;
use tracing::{instrument, warn};
use url::Url;

impl Orchestrator {
    /// The single-URL contract: `run(url, run_config) -> CrawlResult`.
    #[instrument(skip(self, run_config), fields(url = %url))]
    pub async fn run(&self, url: &str, run_config: &RunConfig) -> CrawlResult {
        let parsed = match validate(url) {
            Ok(parsed) => parsed,
            Err(err) => return CrawlResult::failed(url, &err),
        };

        if run_config.cache_mode.should_read() {
            if let Some(cache) = &self.cache {
                match cache.get(url).await {
                    Ok(Some(cached)) if satisfies(&cached, run_config) => {
                        let mut cached = cached;
                        cached.url = url.to_string();
                        return cached;
                    }
                    Ok(_) => {}
                    Err(err) => warn!(url = %url, error = %err, "cache read failed, proceeding without it"),
                }
            }
        }

        if run_config.check_robots_txt {
            if let Some(robots) = &self.robots {
                if matches!(
                    robots.check(url).await,
                    fathom_config::RobotsDecision::Disallow
                ) {
                    return CrawlResult::failed(url, &CrawlError::RobotsBlocked);
                }
            }
        }

        let mut browser_config = self.default_browser_config.clone();
        if let Some(proxy_rotation) = &self.proxy_rotation {
            if let Some(proxy) = proxy_rotation.next_proxy() {
                browser_config.proxy = Some(proxy);
            }
        }

        let adapter = match self.pool.acquire(&browser_config).await {
            Ok(adapter) => adapter,
            Err(err) => return CrawlResult::failed(url, &err),
        };

        let response = match adapter.fetch(url, run_config).await {
            Ok(response) => response,
            Err(err) => return CrawlResult::failed(url, &err),
        };

        let mut result = CrawlResult {
            url: url.to_string(),
            redirected_url: response.redirected_url,
            status_code: response.status_code,
            response_headers: response.headers,
            success: true,
            raw_html: Some(response.html.clone()),
            cleaned_html: None,
            media: Vec::new(),
            links: Vec::new(),
            markdown: None,
            extracted_content: None,
            screenshot: response.screenshot,
            pdf: response.pdf,
            ssl_certificate: None,
            console_log: response.console_log,
            network_log: response.network_log,
            dispatch_metrics: None,
            depth: None,
            parent_url: None,
            score: None,
            error_kind: None,
            error_message: None,
        };

        let scrape_options = ScrapeOptions {
            css_selector: run_config.css_selector.clone(),
            ..self.scrape_options.clone()
        };
        let scraped = scrape(&response.html, &parsed, &scrape_options);
        result.cleaned_html = Some(scraped.cleaned_html.clone());
        result.media = scraped.media;
        result.links = scraped.links;

        let markdown_source_html = match run_config.markdown_source {
            MarkdownSource::RawHtml => response.html.as_str(),
            MarkdownSource::CleanedHtml | MarkdownSource::FitHtml => scraped.cleaned_html.as_str(),
        };
        let generation_options = GenerationOptions {
            content_source: match run_config.markdown_source {
                MarkdownSource::RawHtml => ContentSource::RawHtml,
                MarkdownSource::CleanedHtml => ContentSource::CleanedHtml,
                MarkdownSource::FitHtml => ContentSource::FitHtml,
            },
            citations: true,
            content_filter: self.content_filter.as_deref(),
        };
        let bundle = fathom_markdown::generate(markdown_source_html, &generation_options);

        if let Some(extraction) = &self.extraction {
            let extraction_input = match run_config.markdown_source {
                MarkdownSource::FitHtml if bundle.fit_markdown.is_none() => {
                    warn!(url = %url, "fit_markdown requested but unavailable, falling back to raw markdown");
                    bundle.raw_markdown.clone()
                }
                MarkdownSource::FitHtml => bundle.fit_markdown.clone().unwrap(),
                _ => bundle.raw_markdown.clone(),
            };
            let sections = chunking::chunk(&extraction_input, &run_config.chunking);
            match extraction.run(url, &sections).await {
                Ok(records) => {
                    result.extracted_content = Some(serde_json::Value::Array(records));
                }
                Err(err) => {
                    warn!(url = %url, error = %err, "extraction failed, returning result without extracted content");
                    result.error_kind = Some((&err).into());
                    result.error_message = Some(err.to_string());
                }
            }
        }

        result.markdown = Some(bundle);

        if run_config.cache_mode.should_write() {
            if let Some(cache) = &self.cache {
                if let Err(err) = cache.put(result.clone()).await {
                    warn!(url = %url, error = %err, "cache write failed");
                }
            }
        }

        result
    }
}

fn validate(url: &str) -> Result<Url, CrawlError> {
    if url.trim().is_empty() {
        return Err(CrawlError::ValidationError("url must not be empty".into()));
    }
    let parsed = Url::parse(url)
        .map_err(|e| CrawlError::ValidationError(format!("malformed url: {e}")))?;
    match parsed.scheme() {
        "http" | "https" | "file" | "raw" => Ok(parsed),
        other => Err(CrawlError::ValidationError(format!(
            "unsupported scheme: {other}"
        ))),
    }
}

/// Whether a cached result already carries the artifacts this call
/// asked for (screenshot/PDF availability).
fn satisfies(cached: &CrawlResult, run_config: &RunConfig) -> bool {
    if run_config.screenshot && cached.screenshot.is_none() {
        return false;
    }
    if run_config.pdf && cached.pdf.is_none() {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use fathom_types::result::CrawlErrorKind;

    #[test]
    fn validate_rejects_empty_url() {
        assert!(validate("").is_err());
    }

    #[test]
    fn validate_rejects_unsupported_scheme() {
        assert!(validate("ftp://example.com").is_err());
    }

    #[test]
    fn validate_accepts_http_and_https() {
        assert!(validate("http://example.com").is_ok());
        assert!(validate("https://example.com").is_ok());
    }

    #[test]
    fn satisfies_requires_screenshot_when_requested() {
        let mut cached = CrawlResult::failed("https://example.com", &CrawlError::Navigation("x".into()));
        cached.error_kind = Some(CrawlErrorKind::Navigation);
        let mut run_config = RunConfig::default();
        run_config.screenshot = true;
        assert!(!satisfies(&cached, &run_config));
        cached.screenshot = Some(vec![1, 2, 3]);
        assert!(satisfies(&cached, &run_config));
    }
}
