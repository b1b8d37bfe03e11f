//! robots.txt policy: per-host cached fetch plus the
//! `DefaultMatcher`-based allow/disallow check.
//!
//! Grounded directly on `riptide-core/src/robots.rs::RobotsManager`
//! (per-host cache with TTL, `robotstxt::DefaultMatcher`). Unlike the
//! teacher, there is no bundled rate limiter here — that concern
//! belongs to `fathom-ratelimit`. An unreachable robots.txt is treated
//! as allow, the resolution recorded for this crate's open question.

use dashmap::DashMap;
use robotstxt::DefaultMatcher;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

/// Outcome of a robots.txt check for one URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotsDecision {
    Allow,
    Disallow,
}

struct CachedRobots {
    content: String,
    fetched_at: Instant,
}

impl CachedRobots {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() > ttl
    }
}

/// Per-host robots.txt cache and allow/disallow evaluator.
pub struct RobotsPolicy {
    user_agent: String,
    cache_ttl: Duration,
    client: reqwest::Client,
    cache: DashMap<String, CachedRobots>,
}

impl RobotsPolicy {
    pub fn new(user_agent: impl Into<String>) -> Self {
        RobotsPolicy {
            user_agent: user_agent.into(),
            cache_ttl: Duration::from_secs(3600),
            client: reqwest::Client::new(),
            cache: DashMap::new(),
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Evaluate `url` against its host's robots.txt, fetching and
    /// caching it on first use. A fetch failure degrades to
    /// [`RobotsDecision::Allow`] rather than blocking the caller.
    pub async fn check(&self, url: &str) -> RobotsDecision {
        let Ok(parsed) = Url::parse(url) else {
            return RobotsDecision::Allow;
        };
        let Some(host) = parsed.host_str() else {
            return RobotsDecision::Allow;
        };
        let host = host.to_string();

        let content = self.content_for_host(&parsed, &host).await;

        let mut matcher = DefaultMatcher::default();
        let allowed = matcher.one_agent_allowed_by_robots(&content, &self.user_agent, url);
        debug!(url = %url, allowed, "robots.txt decision");
        if allowed {
            RobotsDecision::Allow
        } else {
            RobotsDecision::Disallow
        }
    }

    async fn content_for_host(&self, parsed: &Url, host: &str) -> String {
        if let Some(cached) = self.cache.get(host) {
            if !cached.is_expired(self.cache_ttl) {
                return cached.content.clone();
            }
        }

        let robots_url = format!("{}://{}/robots.txt", parsed.scheme(), host);
        let content = match self.client.get(&robots_url).send().await {
            Ok(response) if response.status().is_success() => {
                response.text().await.unwrap_or_default()
            }
            Ok(response) => {
                debug!(host = %host, status = %response.status(), "robots.txt not found");
                String::new()
            }
            Err(err) => {
                warn!(host = %host, error = %err, "robots.txt unreachable, treating as allow");
                String::new()
            }
        };

        self.cache.insert(
            host.to_string(),
            CachedRobots {
                content: content.clone(),
                fetched_at: Instant::now(),
            },
        );
        content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn unreachable_host_is_allowed() {
        let policy = RobotsPolicy::new("fathom-test");
        let decision = policy.check("http://127.0.0.1:1/page").await;
        assert_eq!(decision, RobotsDecision::Allow);
    }

    #[tokio::test]
    async fn disallowed_path_is_blocked() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /admin\n"))
            .mount(&server)
            .await;

        let policy = RobotsPolicy::new("fathom-test");
        let url = format!("{}/admin/panel", server.uri());
        assert_eq!(policy.check(&url).await, RobotsDecision::Disallow);
    }

    #[tokio::test]
    async fn allowed_path_passes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /admin\n"))
            .mount(&server)
            .await;

        let policy = RobotsPolicy::new("fathom-test");
        let url = format!("{}/public/page", server.uri());
        assert_eq!(policy.check(&url).await, RobotsDecision::Allow);
    }
}
