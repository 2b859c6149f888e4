//! Statistics generation from a finished crawl
//!
//! This module provides functionality for summarising a `CrawlOutcome` and
//! displaying the summary.

use crate::crawler::CrawlOutcome;
use crate::state::{CrawlState, ResolvedAddress};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use url::Url;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Total number of links recorded
    pub total_links: usize,

    /// Count of links by discovery depth
    pub links_by_depth: BTreeMap<u32, usize>,

    /// Count of links by host
    pub links_by_host: HashMap<String, usize>,

    /// Count of links by the status code of their own fetch
    pub links_by_status: BTreeMap<u16, usize>,

    /// Links whose host could not be resolved
    pub unresolved_links: usize,

    /// Fetches that returned a page
    pub pages_fetched: usize,

    /// Fetches that gave up
    pub fetch_failures: usize,

    /// How the run ended
    pub final_state: CrawlState,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl CrawlStatistics {
    /// Summarises a finished crawl
    pub fn from_outcome(outcome: &CrawlOutcome) -> Self {
        let mut links_by_depth = BTreeMap::new();
        let mut links_by_host = HashMap::new();
        let mut links_by_status = BTreeMap::new();
        let mut unresolved_links = 0;

        for (url, metadata) in outcome.registry.iter() {
            *links_by_depth
                .entry(metadata.discovered_at_depth)
                .or_insert(0) += 1;

            if let Some(host) = Url::parse(url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_lowercase))
            {
                *links_by_host.entry(host).or_insert(0) += 1;
            }

            if let Some(code) = metadata.status_code {
                *links_by_status.entry(code).or_insert(0) += 1;
            }

            if metadata.resolved_address == Some(ResolvedAddress::NotFound) {
                unresolved_links += 1;
            }
        }

        Self {
            total_links: outcome.registry.len(),
            links_by_depth,
            links_by_host,
            links_by_status,
            unresolved_links,
            pages_fetched: outcome.pages_fetched,
            fetch_failures: outcome.fetch_failures,
            final_state: outcome.final_state,
            started_at: outcome.started_at,
            elapsed: outcome.elapsed,
        }
    }

    /// Hosts sorted by link count (descending), then by name
    pub fn top_hosts(&self, limit: usize) -> Vec<(&str, usize)> {
        let mut hosts: Vec<_> = self
            .links_by_host
            .iter()
            .map(|(host, count)| (host.as_str(), *count))
            .collect();
        hosts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        hosts.truncate(limit);
        hosts
    }

    /// Share of fetches that returned a page, in percent
    pub fn success_rate(&self) -> f64 {
        let attempted = self.pages_fetched + self.fetch_failures;
        if attempted > 0 {
            (self.pages_fetched as f64 / attempted as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!(
        "  Started: {}",
        stats.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  Finished: {}", stats.final_state);
    println!("  Total links found: {}", stats.total_links);
    println!("  Unique hosts: {}", stats.links_by_host.len());
    println!("  Pages fetched: {}", stats.pages_fetched);
    println!("  Fetch failures: {}", stats.fetch_failures);
    if stats.unresolved_links > 0 {
        println!("  Unresolved hosts: {} links", stats.unresolved_links);
    }
    println!();

    if !stats.links_by_depth.is_empty() {
        println!("Links by Depth:");
        for (depth, count) in &stats.links_by_depth {
            let percentage = (*count as f64 / stats.total_links as f64) * 100.0;
            println!("  Depth {}: {} ({:.1}%)", depth, count, percentage);
        }
        println!();
    }

    if !stats.links_by_status.is_empty() {
        println!("Status Codes:");
        for (code, count) in &stats.links_by_status {
            println!("  {}: {}", code, count);
        }
        println!();
    }

    if !stats.links_by_host.is_empty() {
        println!("Top Hosts:");
        for (host, count) in stats.top_hosts(10) {
            println!("  - {} ({})", host, count);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} fetches returned a page)",
        stats.success_rate(),
        stats.pages_fetched,
        stats.pages_fetched + stats.fetch_failures
    );
    println!(
        "Crawling completed in {:.2} seconds.",
        stats.elapsed.as_secs_f64()
    );
}
