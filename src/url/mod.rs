//! URL handling module for link-crawler
//!
//! This module provides the crawlability and scope predicates used by the
//! traversal controller, plus seed validation and domain extraction.

mod domain;

use crate::{UrlError, UrlResult};
use serde::Deserialize;
use url::Url;

// Re-export main functions
pub use domain::{extract_domain, same_host};

/// How candidates outside the root domain are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScopePolicy {
    /// Only links inside the root domain are recorded
    #[default]
    RootDomain,
    /// Every crawlable link is recorded; scope only limits expansion
    RecordAll,
}

impl ScopePolicy {
    /// Returns true if an out-of-scope candidate should still be recorded
    pub fn records_out_of_scope(&self) -> bool {
        matches!(self, Self::RecordAll)
    }
}

/// Returns true if the URL uses a scheme the crawler can fetch
///
/// # Examples
///
/// ```
/// use url::Url;
/// use link_crawler::url::is_crawlable;
///
/// assert!(is_crawlable(&Url::parse("https://example.com/").unwrap()));
/// assert!(!is_crawlable(&Url::parse("mailto:someone@example.com").unwrap()));
/// ```
pub fn is_crawlable(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Returns true if the URL's host is the root domain or one of its subdomains
///
/// The comparison is a suffix match on label boundaries, so `blog.example.com`
/// is in scope of `example.com` while `notexample.com` is not.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use link_crawler::url::is_in_scope;
///
/// let url = Url::parse("https://blog.example.com/post").unwrap();
/// assert!(is_in_scope(&url, "example.com"));
/// assert!(!is_in_scope(&url, "other.com"));
/// ```
pub fn is_in_scope(url: &Url, root_domain: &str) -> bool {
    let Some(host) = extract_domain(url) else {
        return false;
    };
    let root = root_domain.to_lowercase();

    host == root
        || host
            .strip_suffix(root.as_str())
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Extracts the root domain that bounds a crawl started at `seed`
pub fn root_domain(seed: &Url) -> UrlResult<String> {
    extract_domain(seed).ok_or_else(|| UrlError::MissingHost(seed.to_string()))
}

/// Parses and validates a seed URL
///
/// Seeds must be absolute http(s) URLs with a host.
pub fn parse_seed(input: &str) -> UrlResult<Url> {
    let url = Url::parse(input.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if !is_crawlable(&url) {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost(input.to_string()));
    }

    Ok(url)
}
