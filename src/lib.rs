//! link-crawler: a bounded, cancellable same-site link crawler
//!
//! This crate implements a web crawler that starts from a seed URL, follows
//! links on the seed's host, and records every in-scope link it discovers
//! together with its discovery depth, status code, and resolved address.
//! Crawls can be paused, resumed, and stopped by an operator while they run.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for link-crawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for link-crawler operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, CrawlLimits, CrawlMode};
pub use crawler::{CrawlOutcome, CrawlSignals, Crawler};
pub use output::SiteStructure;
pub use state::{CrawlState, LinkMetadata, ResolvedAddress, VisitedRegistry};
pub use crate::url::{is_crawlable, is_in_scope, root_domain, ScopePolicy};
