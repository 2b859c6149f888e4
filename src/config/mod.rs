//! Configuration module for link-crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key is optional; a missing file section falls back to the defaults.
//!
//! # Example
//!
//! ```no_run
//! use link_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Crawler will use max depth: {:?}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlLimits, CrawlMode, CrawlerConfig, OutputConfig, TraversalOrder};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
pub(crate) use validation::validate_crawler_config;
