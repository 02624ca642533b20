//! Link extraction
//!
//! A deliberately narrow resolver: anchor targets that already carry an HTTP
//! scheme are kept as-is, root-relative targets are glued onto the base
//! URL's scheme and authority, and everything else is dropped. No `<base>`
//! tag handling, no relative-path resolution, no normalization — two links
//! are distinct unless they match as exact strings. Known consequences:
//! relative links are under-counted and trivially different spellings of the
//! same page (trailing slash, case) are crawled separately.

use scraper::{Html, Selector};
use url::Url;

/// Extracts candidate absolute URLs from a page body, in document order
///
/// Matches `<a href="...">` targets only. `base` is the URL the page was
/// fetched from and supplies the scheme+authority for root-relative targets.
///
/// # Example
///
/// ```
/// use spindle::extract_links;
/// use url::Url;
///
/// let base = Url::parse("http://example.com").unwrap();
/// let html = r#"<a href="http://example.com/a">a</a><a href="/b">b</a>"#;
/// let links = extract_links(html, &base);
/// assert_eq!(links, vec!["http://example.com/a", "http://example.com/b"]);
/// ```
pub fn extract_links(html: &str, base: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let origin = base.origin().ascii_serialization();

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve(href, &origin))
        .collect()
}

/// Applies the resolution rule to a single anchor target
///
/// Returns `None` for every form the crawler does not follow: relative
/// paths, fragments, protocol-relative `//host` targets, and non-HTTP
/// schemes.
fn resolve(href: &str, origin: &str) -> Option<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }

    // A single leading slash is a root-relative path; two is protocol-relative
    // and falls outside the contract.
    if href.starts_with('/') && !href.starts_with("//") {
        return Some(format!("{}{}", origin, href));
    }

    None
}
