// src/utils/mod.rs

//! Utility functions and helpers.

pub mod csv;
pub mod flatten;
pub mod http;

use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// File-system safe stem derived from a display name.
///
/// Every non-alphanumeric character becomes `_` and the result is lowercased.
/// Records without a usable name fall back to the last segment of their link,
/// then to `record`. Distinct names can map to the same stem; the later write
/// wins.
pub fn sanitize_name(name: &str, link: Option<&str>) -> String {
    let stem = sanitize(name);
    if has_alphanumeric(&stem) {
        return stem;
    }

    let fallback = link
        .and_then(|l| l.trim_end_matches('/').rsplit('/').next())
        .map(sanitize)
        .filter(|s| has_alphanumeric(s));

    fallback.unwrap_or_else(|| "record".to_string())
}

fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

fn has_alphanumeric(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_alphanumeric())
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://example.com/path/").unwrap();
        assert_eq!(
            resolve_url(&base, "/public-register/firms/acme"),
            "https://example.com/public-register/firms/acme"
        );
        assert_eq!(
            resolve_url(&base, "https://other.com/x"),
            "https://other.com/x"
        );
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Acme Capital (DIFC) Ltd.", None), "acme_capital__difc__ltd_");
        assert_eq!(sanitize_name("ÄBC", None), "_bc");
    }

    #[test]
    fn test_sanitize_name_falls_back_to_link() {
        assert_eq!(
            sanitize_name("  ", Some("/public-register/firms/Acme-Capital/")),
            "acme_capital"
        );
        assert_eq!(sanitize_name("", None), "record");
        assert_eq!(sanitize_name("---", Some("")), "record");
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \n\t b  "), "a b");
    }
}
