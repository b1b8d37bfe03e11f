use crate::UrlFilter;
use url::Url;

/// Accepts a URL only if its host is, or is a subdomain of, one of
/// `allowed_domains`.
pub struct DomainFilter {
    allowed_domains: Vec<String>,
}

impl DomainFilter {
    pub fn new(allowed_domains: impl IntoIterator<Item = impl Into<String>>) -> Self {
        DomainFilter {
            allowed_domains: allowed_domains.into_iter().map(Into::into).collect(),
        }
    }
}

impl UrlFilter for DomainFilter {
    fn name(&self) -> &str {
        "domain_filter"
    }

    fn apply(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        self.allowed_domains
            .iter()
            .any(|domain| host == domain || host.ends_with(&format!(".{domain}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exact_and_subdomain_matches() {
        let filter = DomainFilter::new(["example.com"]);
        assert!(filter.apply(&Url::parse("https://example.com/page").unwrap()));
        assert!(filter.apply(&Url::parse("https://docs.example.com/page").unwrap()));
        assert!(!filter.apply(&Url::parse("https://example.org/page").unwrap()));
    }
}
