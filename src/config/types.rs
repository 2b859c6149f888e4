use crate::output::OutputFormat;
use crate::url::ScopePolicy;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for link-crawler
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum depth to crawl from the seed URL (unbounded when absent)
    pub max_depth: Option<u32>,

    /// Maximum number of links to record (unbounded when absent)
    pub max_urls: Option<usize>,

    /// Maximum number of HTTP requests in flight at once
    pub max_concurrent_requests: u32,

    /// Timeout for a single fetch attempt (seconds)
    pub request_timeout: u64,

    /// Total number of attempts per URL before giving up
    pub max_retries: u32,

    /// Length of one backoff unit (milliseconds); attempt `n` waits `2^n` units
    pub backoff_unit_ms: u64,

    /// Order in which the frontier is expanded
    pub traversal: TraversalOrder,

    /// Whether links outside the root domain are recorded
    pub scope: ScopePolicy,

    /// Whether each recorded link's host is resolved to an IP address
    pub resolve_addresses: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            max_urls: None,
            max_concurrent_requests: 10,
            request_timeout: 10,
            max_retries: 3,
            backoff_unit_ms: 1000,
            traversal: TraversalOrder::default(),
            scope: ScopePolicy::default(),
            resolve_addresses: true,
        }
    }
}

impl CrawlerConfig {
    pub fn limits(&self) -> CrawlLimits {
        CrawlLimits {
            max_depth: self.max_depth,
            max_urls: self.max_urls,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn backoff_unit(&self) -> Duration {
        Duration::from_millis(self.backoff_unit_ms)
    }

    /// Replaces both limits with the preset of the given mode
    pub fn apply_mode(&mut self, mode: CrawlMode) {
        let limits = mode.limits();
        self.max_depth = limits.max_depth;
        self.max_urls = limits.max_urls;
    }
}

/// Depth and URL-count bounds of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CrawlLimits {
    pub max_depth: Option<u32>,
    pub max_urls: Option<usize>,
}

impl CrawlLimits {
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Returns true if a target at `depth` must not be fetched
    pub fn depth_exhausted(&self, depth: u32) -> bool {
        self.max_depth.is_some_and(|max| depth >= max)
    }

    /// Returns true if a registry holding `recorded` links is full
    pub fn url_limit_reached(&self, recorded: usize) -> bool {
        self.max_urls.is_some_and(|max| recorded >= max)
    }
}

/// Preset limit profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CrawlMode {
    /// Shallow and capped: depth 3, at most 50 links
    Fast,
    /// No depth or count limit
    Slow,
}

impl CrawlMode {
    pub fn limits(&self) -> CrawlLimits {
        match self {
            Self::Fast => CrawlLimits {
                max_depth: Some(3),
                max_urls: Some(50),
            },
            Self::Slow => CrawlLimits::unbounded(),
        }
    }
}

/// Order in which the crawl frontier is expanded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TraversalOrder {
    /// Follow each link to the bottom before its next sibling; one fetch at a time
    #[default]
    DepthFirst,
    /// Expand level by level, fetching the targets of a level concurrently
    BreadthFirst,
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Where to save the discovered links (not saved when absent)
    pub links_path: Option<PathBuf>,

    /// Format of the links file
    pub format: OutputFormat,

    /// Where to save the site structure report (not saved when absent)
    pub structure_path: Option<PathBuf>,
}
