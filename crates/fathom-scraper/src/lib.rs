//! Content Scraper: cleans rendered HTML and extracts media and link
//! inventories.
//!
//! Grounded on the `HtmlProcessor` option/result shape from the
//! teacher workspace's HTML crate, rebuilt against `scraper` for DOM
//! traversal rather than a regex/lol_html pass, since selector-scoped
//! cleaning and inventory extraction are naturally expressed as CSS
//! selection here.

use fathom_types::result::{LinkInfo, MediaInfo};
use scraper::{Html, Selector};
use std::collections::HashMap;
use tracing::debug;
use url::Url;

const EXCLUDED_TAGS_DEFAULT: &[&str] = &["script", "style", "noscript", "svg"];

/// Options controlling how a page is cleaned and inventoried.
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Restrict scraping to the subtree matched by this CSS selector;
    /// `None` scrapes the whole document.
    pub css_selector: Option<String>,
    pub excluded_tags: Vec<String>,
    pub excluded_selector: Option<String>,
    pub keep_attributes: Vec<String>,
    /// Media items scoring below this are dropped from the inventory.
    pub image_score_threshold: f64,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        ScrapeOptions {
            css_selector: None,
            excluded_tags: EXCLUDED_TAGS_DEFAULT.iter().map(|s| s.to_string()).collect(),
            excluded_selector: None,
            keep_attributes: vec!["href".into(), "src".into(), "alt".into()],
            image_score_threshold: 0.0,
        }
    }
}

/// Output of a single scrape pass over rendered HTML.
#[derive(Debug, Clone, Default)]
pub struct ScrapeResult {
    pub cleaned_html: String,
    pub media: Vec<MediaInfo>,
    pub links: Vec<LinkInfo>,
    pub metadata: HashMap<String, String>,
}

/// Clean `html` and build its media/link inventories, resolving
/// relative URLs against `base_url`.
pub fn scrape(html: &str, base_url: &Url, options: &ScrapeOptions) -> ScrapeResult {
    let document = Html::parse_document(html);

    let root_fragment = match &options.css_selector {
        Some(sel) => match Selector::parse(sel) {
            Ok(selector) => document
                .select(&selector)
                .map(|el| el.html())
                .collect::<Vec<_>>()
                .join("\n"),
            Err(_) => {
                debug!(selector = %sel, "invalid css_selector, scraping full document");
                document.html()
            }
        },
        None => document.html(),
    };

    let scoped = Html::parse_fragment(&root_fragment);
    let cleaned_html = clean_html(&scoped, options);
    let media = extract_media(&scoped, base_url, options.image_score_threshold);
    let links = extract_links(&scoped, base_url);

    let mut metadata = HashMap::new();
    metadata.insert("title".to_string(), extract_title(&document));

    ScrapeResult {
        cleaned_html,
        media,
        links,
        metadata,
    }
}

fn extract_title(document: &Html) -> String {
    Selector::parse("title")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default()
}

/// Detach every element matching the excluded-tags/selector set from a
/// cloned copy of `fragment`'s tree, then serialize what remains.
///
/// `scraper::Html` wraps an `ego_tree::Tree`, whose nodes support
/// in-place `detach()`; this avoids a second HTML parse just to drop
/// a handful of subtrees.
fn clean_html(fragment: &Html, options: &ScrapeOptions) -> String {
    let mut parts: Vec<String> = options.excluded_tags.clone();
    if let Some(sel) = &options.excluded_selector {
        parts.push(sel.clone());
    }
    let combined = parts.join(", ");
    let Ok(excluded) = Selector::parse(&combined) else {
        return fragment.root_element().html();
    };

    let mut tree = fragment.tree.clone();
    let excluded_ids: Vec<_> = {
        let snapshot = Html {
            tree: tree.clone(),
            errors: Vec::new(),
            quirks_mode: fragment.quirks_mode,
        };
        snapshot.select(&excluded).map(|el| el.id()).collect()
    };
    for id in excluded_ids {
        if let Some(mut node) = tree.get_mut(id) {
            node.detach();
        }
    }
    let cleaned = Html {
        tree,
        errors: Vec::new(),
        quirks_mode: fragment.quirks_mode,
    };
    cleaned.root_element().html()
}

fn extract_media(fragment: &Html, base_url: &Url, score_threshold: f64) -> Vec<MediaInfo> {
    let Ok(img_selector) = Selector::parse("img") else {
        return Vec::new();
    };
    fragment
        .select(&img_selector)
        .filter_map(|el| {
            let src = el.value().attr("src")?;
            let resolved = base_url.join(src).ok()?.to_string();
            let width = el.value().attr("width").and_then(|w| w.parse().ok());
            let height = el.value().attr("height").and_then(|h| h.parse().ok());
            let alt = el.value().attr("alt").map(|a| a.to_string());
            let score = media_score(width, height, alt.as_deref());
            if score < score_threshold {
                return None;
            }
            Some(MediaInfo {
                src: resolved,
                alt,
                width,
                height,
                score,
            })
        })
        .collect()
}

/// Heuristic: images with meaningful dimensions and alt text score
/// higher, matching the "media relevance" convention in the original
/// scraper-style pipelines this component is modeled on.
fn media_score(width: Option<u32>, height: Option<u32>, alt: Option<&str>) -> f64 {
    let mut score = 0.5;
    if let (Some(w), Some(h)) = (width, height) {
        if w >= 200 && h >= 200 {
            score += 0.3;
        }
    }
    if alt.is_some_and(|a| !a.trim().is_empty()) {
        score += 0.2;
    }
    score.min(1.0)
}

fn extract_links(fragment: &Html, base_url: &Url) -> Vec<LinkInfo> {
    let Ok(a_selector) = Selector::parse("a") else {
        return Vec::new();
    };
    let base_domain = base_url.host_str().unwrap_or_default().to_string();
    fragment
        .select(&a_selector)
        .filter_map(|el| {
            let href = el.value().attr("href")?;
            let resolved = base_url.join(href).ok()?;
            let link_domain = resolved.host_str().unwrap_or_default().to_string();
            let is_external = link_domain != base_domain;
            Some(LinkInfo {
                href: resolved.to_string(),
                text: el.text().collect::<String>().trim().to_string(),
                base_domain: link_domain,
                is_external,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_links_classified_internal_external() {
        let html = r#"
            <html><body>
                <a href="/about">About</a>
                <a href="https://other.example/page">Other</a>
            </body></html>
        "#;
        let base = Url::parse("https://example.com/").unwrap();
        let result = scrape(html, &base, &ScrapeOptions::default());
        assert_eq!(result.links.len(), 2);
        assert!(!result.links[0].is_external);
        assert!(result.links[1].is_external);
    }

    #[test]
    fn extracts_media_with_scores() {
        let html = r#"<html><body><img src="/a.png" width="300" height="300" alt="a photo"></body></html>"#;
        let base = Url::parse("https://example.com/").unwrap();
        let result = scrape(html, &base, &ScrapeOptions::default());
        assert_eq!(result.media.len(), 1);
        assert_eq!(result.media[0].src, "https://example.com/a.png");
        assert!(result.media[0].score > 0.5);
    }

    #[test]
    fn css_selector_scopes_extraction() {
        let html = r#"<html><body><div class="main"><a href="/x">x</a></div><a href="/y">y</a></body></html>"#;
        let base = Url::parse("https://example.com/").unwrap();
        let mut options = ScrapeOptions::default();
        options.css_selector = Some(".main".to_string());
        let result = scrape(html, &base, &options);
        assert_eq!(result.links.len(), 1);
        assert_eq!(result.links[0].href, "https://example.com/x");
    }
}
