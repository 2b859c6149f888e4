//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with bounded concurrency and retry logic
//! - HTML parsing and link extraction
//! - Pause and stop control signals
//! - Best-effort address resolution
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod resolver;
mod signals;

pub use coordinator::{CrawlOutcome, Crawler, LogCallback};
pub use fetcher::{build_http_client, FetchError, FetchResult, Fetcher};
pub use frontier::CrawlTarget;
pub use parser::extract_links;
pub use resolver::{AddressResolver, SystemResolver};
pub use signals::{CrawlSignals, OperatorCommand};

use crate::config::CrawlerConfig;
use std::sync::Arc;
use url::Url;

/// Runs a complete crawl with default wiring
///
/// Builds a crawler from `config` with fresh signals and crawls `seed`.
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `seed` - Where to start
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - The crawl ran (possibly stopped early)
/// * `Err(CrawlError)` - The crawler could not be built
///
/// # Example
///
/// ```no_run
/// use link_crawler::config::CrawlerConfig;
/// use link_crawler::crawler::crawl;
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let seed = Url::parse("https://example.com/")?;
/// let outcome = crawl(CrawlerConfig::default(), &seed).await?;
/// println!("found {} links", outcome.registry.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: CrawlerConfig, seed: &Url) -> crate::Result<CrawlOutcome> {
    let crawler = Crawler::new(config, Arc::new(CrawlSignals::new()))?;
    Ok(crawler.crawl(seed).await)
}
