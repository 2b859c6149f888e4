//! HTML parser for extracting links
//!
//! Parsing is lenient: html5ever recovers from any malformed markup, so
//! extraction never fails. Anchors it cannot make sense of are skipped.

use scraper::{Html, Selector};
use url::Url;

/// Extracts every anchor target from an HTML document
///
/// # Extraction Rules
///
/// - Only `<a href="...">` elements are considered
/// - Each href is trimmed and resolved against `base_url` using standard URL
///   resolution, so relative paths, protocol-relative URLs (`//host/path`),
///   query-only and fragment-only references all become absolute URLs
/// - Hrefs that cannot be resolved are dropped individually
/// - Order follows the document; duplicates are kept, deduplication is the
///   registry's job
/// - Scheme filtering is left to the caller, so `mailto:` and friends are
///   returned as-is
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The URL the document was fetched from
///
/// # Example
///
/// ```
/// use link_crawler::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// assert_eq!(extract_links(html, &base_url), vec!["https://example.com/page"]);
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

/// Resolves a link href to an absolute URL
///
/// Returns None for empty hrefs and for hrefs the URL parser rejects.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => Some(absolute_url.to_string()),
        Err(e) => {
            tracing::debug!("Dropping unresolvable href {:?}: {}", href, e);
            None
        }
    }
}
