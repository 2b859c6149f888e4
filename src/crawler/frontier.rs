//! Worklist types for the traversal controller
//!
//! Depth-first crawls keep a stack of `PageFrame`s, one per page whose links
//! are still being walked, which reproduces the order a recursive crawler
//! would visit pages in. Breadth-first crawls keep one `Vec<CrawlTarget>` per
//! level.

use url::Url;

/// A page scheduled for fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    /// The page to fetch
    pub url: Url,

    /// Distance from the seed, which is at depth 0
    pub depth: u32,
}

impl CrawlTarget {
    pub fn seed(url: Url) -> Self {
        Self { url, depth: 0 }
    }

    /// A target one level below this one
    pub fn child(&self, url: Url) -> Self {
        Self {
            url,
            depth: self.depth + 1,
        }
    }
}

/// A fetched page whose candidate links have not all been processed
#[derive(Debug)]
pub struct PageFrame {
    pub page: CrawlTarget,
    candidates: std::vec::IntoIter<String>,
}

impl PageFrame {
    pub fn new(page: CrawlTarget, candidates: Vec<String>) -> Self {
        Self {
            page,
            candidates: candidates.into_iter(),
        }
    }

    /// Takes the next candidate in extraction order
    pub fn next_candidate(&mut self) -> Option<String> {
        self.candidates.next()
    }
}

/// Why a traversal ended before its worklist ran dry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halt {
    /// The stop signal was observed
    Stopped,
    /// The registry reached `max-urls`
    UrlLimit,
}
