//! Single-pass citation substitution: every markdown link and image
//! is rewritten to carry a numeric citation marker, and a references
//! list is built alongside in the same scan.

use regex::Regex;
use std::sync::OnceLock;

/// Matches either `![alt](url "title")` or `[text](url "title")` in
/// one alternation so both forms are rewritten in a single left-to-
/// right scan over the source markdown.
fn link_or_image_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?P<bang>!)?\[(?P<text>[^\]]*)\]\((?P<url>[^)\s"]+)(?:\s+"(?P<title>[^"]*)")?\)"#)
            .expect("citation pattern is a valid regex")
    })
}

/// Rewrite `markdown`'s links/images into `text[n]` / `![text[n]]`
/// form and return `(markdown_with_citations, references_markdown)`.
///
/// References are numbered in order of first appearance; a URL that
/// appears more than once reuses its first citation index rather than
/// growing the references list.
pub fn substitute(markdown: &str) -> (String, String) {
    let pattern = link_or_image_pattern();
    let mut references: Vec<(String, Option<String>)> = Vec::new();
    let mut indices: std::collections::HashMap<String, u32> = std::collections::HashMap::new();

    let rewritten = pattern.replace_all(markdown, |caps: &regex::Captures| {
        let is_image = caps.name("bang").is_some();
        let text = caps.name("text").map(|m| m.as_str()).unwrap_or_default();
        let url = caps.name("url").map(|m| m.as_str()).unwrap_or_default();
        let title = caps.name("title").map(|m| m.as_str().to_string());

        let index = *indices.entry(url.to_string()).or_insert_with(|| {
            let next = references.len() as u32 + 1;
            references.push((url.to_string(), title.clone()));
            next
        });

        if is_image {
            format!("![{text}[{index}]]")
        } else {
            format!("{text}[{index}]")
        }
    });

    let references_markdown = references
        .iter()
        .enumerate()
        .map(|(i, (url, title))| {
            let n = i as u32 + 1;
            match title {
                Some(t) if !t.is_empty() => format!("{n}. {url} - {t}"),
                _ => format!("{n}. {url}"),
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    (rewritten.into_owned(), references_markdown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_a_single_link_with_citation() {
        let (markdown, refs) = substitute(r#"See [docs](https://example.com/docs "Docs")."#);
        assert_eq!(markdown, "See docs[1].");
        assert_eq!(refs, "1. https://example.com/docs - Docs");
    }

    #[test]
    fn rewrites_images_with_bracketed_index() {
        let (markdown, refs) = substitute("![a photo](https://example.com/a.png)");
        assert_eq!(markdown, "![a photo[1]]");
        assert_eq!(refs, "1. https://example.com/a.png");
    }

    #[test]
    fn references_length_matches_distinct_urls() {
        let markdown = "[a](https://x.test/a) and [b](https://x.test/a) and [c](https://x.test/b)";
        let (_, refs) = substitute(markdown);
        assert_eq!(refs.lines().count(), 2);
    }
}
