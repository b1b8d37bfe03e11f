//! Shared link-discovery step run by every deep-crawl strategy after
//! each fetched page: normalize candidates, dedup against the visited
//! set, run the filter chain and scorer, then keep at most the
//! remaining capacity.

use fathom_filter::FilterChain;
use fathom_scorer::UrlScorer;
use fathom_types::result::{CrawlResult, LinkInfo};
use std::collections::HashSet;
use url::Url;

/// A surviving candidate, ready to be enqueued at `depth` with `parent`.
#[derive(Debug, Clone)]
pub struct DiscoveredUrl {
    pub url: String,
    pub depth: u32,
    pub parent_url: String,
    pub score: Option<f64>,
}

/// Strip the fragment, lower-case the scheme and host, and drop a
/// default port, so equivalent URLs compare equal in the visited set.
pub fn normalize(url: &Url) -> Option<Url> {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    let scheme = normalized.scheme().to_ascii_lowercase();
    if normalized.set_scheme(&scheme).is_err() {
        return None;
    }
    if let Some(host) = normalized.host_str() {
        let lower = host.to_ascii_lowercase();
        let _ = normalized.set_host(Some(&lower));
    }
    let default_port = match normalized.scheme() {
        "http" => Some(80),
        "https" => Some(443),
        _ => None,
    };
    if normalized.port() == default_port {
        let _ = normalized.set_port(None);
    }
    Some(normalized)
}

/// Run link discovery over one fetched page's link inventory.
#[allow(clippy::too_many_arguments)]
pub fn discover(
    result: &CrawlResult,
    depth: u32,
    include_external: bool,
    visited: &mut HashSet<String>,
    filter_chain: &FilterChain,
    scorer: Option<&dyn UrlScorer>,
    score_threshold: Option<f64>,
    remaining_capacity: usize,
) -> Vec<DiscoveredUrl> {
    if remaining_capacity == 0 {
        return Vec::new();
    }

    let candidates: Vec<&LinkInfo> = result
        .links
        .iter()
        .filter(|link| include_external || !link.is_external)
        .collect();

    let mut surviving: Vec<DiscoveredUrl> = Vec::new();
    for link in candidates {
        let Ok(parsed) = Url::parse(&link.href) else {
            continue;
        };
        let Some(normalized) = normalize(&parsed) else {
            continue;
        };
        let key = normalized.to_string();
        if visited.contains(&key) {
            continue;
        }
        if !filter_chain.apply(&normalized) {
            continue;
        }
        let score = scorer.map(|s| s.score(&normalized));
        if let (Some(score), Some(threshold)) = (score, score_threshold) {
            if score < threshold {
                continue;
            }
        }
        visited.insert(key.clone());
        surviving.push(DiscoveredUrl {
            url: key,
            depth: depth + 1,
            parent_url: result.url.clone(),
            score,
        });
    }

    if surviving.len() > remaining_capacity {
        if scorer.is_some() {
            surviving.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        surviving.truncate(remaining_capacity);
    }

    surviving
}

#[cfg(test)]
mod tests {
    use super::*;
    use fathom_types::error::CrawlError;

    fn page(url: &str, links: Vec<(&str, bool)>) -> CrawlResult {
        let mut result = CrawlResult::failed(url, &CrawlError::Navigation("placeholder".into()));
        result.links = links
            .into_iter()
            .map(|(href, is_external)| LinkInfo {
                href: href.to_string(),
                text: String::new(),
                base_domain: "example.com".to_string(),
                is_external,
            })
            .collect();
        result
    }

    #[test]
    fn normalize_strips_fragment_and_default_port() {
        let url = Url::parse("HTTP://Example.com:80/path#frag").unwrap();
        let normalized = normalize(&url).unwrap();
        assert_eq!(normalized.as_str(), "http://example.com/path");
    }

    #[test]
    fn discovery_dedups_against_visited_set() {
        let result = page(
            "https://example.com",
            vec![("https://example.com/a", false), ("https://example.com/a", false)],
        );
        let mut visited = HashSet::new();
        let found = discover(&result, 0, false, &mut visited, &FilterChain::new(), None, None, 10);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn discovery_excludes_external_by_default() {
        let result = page(
            "https://example.com",
            vec![("https://example.com/a", false), ("https://other.com/b", true)],
        );
        let mut visited = HashSet::new();
        let found = discover(&result, 0, false, &mut visited, &FilterChain::new(), None, None, 10);
        assert_eq!(found.len(), 1);
        assert!(found[0].url.contains("example.com"));
    }

    #[test]
    fn discovery_caps_to_remaining_capacity_by_arrival_order() {
        let result = page(
            "https://example.com",
            vec![
                ("https://example.com/a", false),
                ("https://example.com/b", false),
                ("https://example.com/c", false),
            ],
        );
        let mut visited = HashSet::new();
        let found = discover(&result, 0, false, &mut visited, &FilterChain::new(), None, None, 2);
        assert_eq!(found.len(), 2);
    }
}
