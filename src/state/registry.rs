//! Registry of links discovered during a crawl run

use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;

/// Placeholder shown when a link's host could not be resolved
pub const ADDRESS_NOT_FOUND: &str = "IP not found";

/// Result of the best-effort address lookup for a link's host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedAddress {
    /// The host resolved to this address
    Found(IpAddr),
    /// Resolution failed; the crawl carried on regardless
    NotFound,
}

impl From<Option<IpAddr>> for ResolvedAddress {
    fn from(ip: Option<IpAddr>) -> Self {
        ip.map_or(Self::NotFound, Self::Found)
    }
}

impl fmt::Display for ResolvedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found(ip) => write!(f, "{}", ip),
            Self::NotFound => f.write_str(ADDRESS_NOT_FOUND),
        }
    }
}

/// Metadata captured for one discovered link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkMetadata {
    /// Depth of the page on which the link was first found, plus one
    pub discovered_at_depth: u32,

    /// Status code of the link's own fetch, if the crawler expanded it
    pub status_code: Option<u16>,

    /// Address of the link's host, if address capture is enabled
    pub resolved_address: Option<ResolvedAddress>,
}

impl LinkMetadata {
    pub fn at_depth(depth: u32) -> Self {
        Self {
            discovered_at_depth: depth,
            status_code: None,
            resolved_address: None,
        }
    }

    pub fn with_address(mut self, address: ResolvedAddress) -> Self {
        self.resolved_address = Some(address);
        self
    }

    /// The single most informative value, used by one-column exports
    ///
    /// Prefers the resolved address, then the status code, then the depth.
    pub fn primary_value(&self) -> String {
        if let Some(address) = &self.resolved_address {
            address.to_string()
        } else if let Some(code) = self.status_code {
            code.to_string()
        } else {
            self.discovered_at_depth.to_string()
        }
    }
}

impl fmt::Display for LinkMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "depth: {}", self.discovered_at_depth)?;
        if let Some(code) = self.status_code {
            write!(f, ", status: {}", code)?;
        }
        if let Some(address) = &self.resolved_address {
            write!(f, ", IP: {}", address)?;
        }
        Ok(())
    }
}

/// Every link discovered during one crawl run, in discovery order
///
/// A URL is recorded at most once. Keys are the literal resolved URL strings,
/// so `https://a.test/x` and `https://a.test/x/` are distinct entries. Only
/// the crawler mutates a registry; callers receive it read-only at the end
/// of a run.
#[derive(Debug, Clone, Default)]
pub struct VisitedRegistry {
    entries: Vec<(String, LinkMetadata)>,
    index: HashMap<String, usize>,
}

impl VisitedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.index.contains_key(url)
    }

    pub fn get(&self, url: &str) -> Option<&LinkMetadata> {
        self.index.get(url).map(|&i| &self.entries[i].1)
    }

    /// Records a newly discovered link
    ///
    /// Returns false and leaves the existing entry untouched if the URL is
    /// already present.
    pub(crate) fn insert(&mut self, url: String, metadata: LinkMetadata) -> bool {
        if self.index.contains_key(&url) {
            return false;
        }
        self.index.insert(url.clone(), self.entries.len());
        self.entries.push((url, metadata));
        true
    }

    /// Fills the status code slot of a recorded link
    ///
    /// The slot is written at most once; returns false if the URL is unknown
    /// or already carries a status code.
    pub(crate) fn record_status(&mut self, url: &str, status_code: u16) -> bool {
        let Some(&i) = self.index.get(url) else {
            return false;
        };
        let slot = &mut self.entries[i].1.status_code;
        if slot.is_some() {
            return false;
        }
        *slot = Some(status_code);
        true
    }

    /// Iterates over `(url, metadata)` pairs in discovery order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LinkMetadata)> {
        self.entries.iter().map(|(url, meta)| (url.as_str(), meta))
    }

    /// Iterates over the recorded URLs in discovery order
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(url, _)| url.as_str())
    }
}
