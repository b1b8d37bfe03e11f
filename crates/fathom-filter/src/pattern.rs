use crate::UrlFilter;
use url::Url;

/// Accepts a URL only if its path matches at least one of a set of
/// glob-like patterns (`*` matches any run of characters).
pub struct UrlPatternFilter {
    patterns: Vec<String>,
}

impl UrlPatternFilter {
    pub fn new(patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        UrlPatternFilter {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    fn matches(pattern: &str, path: &str) -> bool {
        let mut parts = pattern.split('*').peekable();
        let mut cursor = 0usize;
        let mut first = true;
        while let Some(part) = parts.next() {
            if part.is_empty() {
                first = false;
                continue;
            }
            if first {
                if !path[cursor..].starts_with(part) {
                    return false;
                }
                cursor += part.len();
            } else if let Some(idx) = path[cursor..].find(part) {
                cursor += idx + part.len();
            } else {
                return false;
            }
            first = false;
        }
        true
    }
}

impl UrlFilter for UrlPatternFilter {
    fn name(&self) -> &str {
        "url_pattern_filter"
    }

    fn apply(&self, url: &Url) -> bool {
        self.patterns
            .iter()
            .any(|pattern| Self::matches(pattern, url.path()))
    }
}

/// Accepts a URL only if its path's apparent extension is absent or
/// matches one of an allowed set of content-type-implying extensions.
pub struct ContentTypeFilter {
    allowed_extensions: Vec<String>,
}

impl ContentTypeFilter {
    pub fn new(allowed_extensions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        ContentTypeFilter {
            allowed_extensions: allowed_extensions.into_iter().map(Into::into).collect(),
        }
    }
}

impl UrlFilter for ContentTypeFilter {
    fn name(&self) -> &str {
        "content_type_filter"
    }

    fn apply(&self, url: &Url) -> bool {
        let path = url.path();
        match path.rsplit_once('.') {
            None => true,
            Some((_, ext)) => self.allowed_extensions.iter().any(|e| e == ext),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_filter_matches_glob() {
        let filter = UrlPatternFilter::new(["/blog/*"]);
        assert!(filter.apply(&Url::parse("https://example.com/blog/post-1").unwrap()));
        assert!(!filter.apply(&Url::parse("https://example.com/about").unwrap()));
    }

    #[test]
    fn content_type_filter_allows_missing_extension() {
        let filter = ContentTypeFilter::new(["html"]);
        assert!(filter.apply(&Url::parse("https://example.com/page").unwrap()));
        assert!(filter.apply(&Url::parse("https://example.com/page.html").unwrap()));
        assert!(!filter.apply(&Url::parse("https://example.com/image.png").unwrap()));
    }
}
