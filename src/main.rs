//! link-crawler main entry point
//!
//! This is the command-line interface for the link-crawler same-site crawler.

use anyhow::Context;
use clap::Parser;
use link_crawler::config::{load_config, validate, Config, CrawlMode, TraversalOrder};
use link_crawler::crawler::{CrawlSignals, Crawler, LogCallback, OperatorCommand};
use link_crawler::output::{
    print_statistics, save_links, save_structure, CrawlStatistics, OutputFormat, SiteStructure,
};
use link_crawler::url::{parse_seed, ScopePolicy};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use url::Url;

/// link-crawler: a bounded, cancellable same-site link crawler
///
/// Starts at URL, follows links on the same host, and records every link it
/// finds inside the site's domain. While it runs, type `pause`, `resume`, or
/// `stop` and press Enter; Ctrl+C stops the crawl, a second Ctrl+C exits.
#[derive(Parser, Debug)]
#[command(name = "link-crawler")]
#[command(version)]
#[command(about = "A bounded, cancellable same-site link crawler", long_about = None)]
struct Cli {
    /// Seed URL (http or https)
    #[arg(value_name = "URL", value_parser = parse_seed_arg)]
    url: Url,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Limit preset: fast (depth 3, 50 links) or slow (unbounded)
    #[arg(short, long, value_enum)]
    mode: Option<CrawlMode>,

    /// Maximum crawl depth
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Maximum number of links to record
    #[arg(long, value_name = "N")]
    max_urls: Option<usize>,

    /// Maximum number of requests in flight
    #[arg(long, value_name = "N")]
    concurrency: Option<u32>,

    /// Per-attempt request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Attempts per URL before giving up
    #[arg(long, value_name = "N")]
    retries: Option<u32>,

    /// Traversal order
    #[arg(long, value_enum)]
    order: Option<TraversalOrder>,

    /// Record links outside the seed's domain too (they are never followed)
    #[arg(long)]
    record_all: bool,

    /// Do not resolve host addresses
    #[arg(long)]
    no_resolve: bool,

    /// Save discovered links to this file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Format of the links file
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Save the site structure report to this file
    #[arg(long, value_name = "FILE")]
    structure: Option<PathBuf>,

    /// Print the site structure after the crawl
    #[arg(long)]
    print_structure: bool,

    /// Show the effective configuration without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the file configuration
    fn apply_to(&self, config: &mut Config) {
        let crawler = &mut config.crawler;

        if let Some(mode) = self.mode {
            crawler.apply_mode(mode);
        }
        if self.max_depth.is_some() {
            crawler.max_depth = self.max_depth;
        }
        if self.max_urls.is_some() {
            crawler.max_urls = self.max_urls;
        }
        if let Some(concurrency) = self.concurrency {
            crawler.max_concurrent_requests = concurrency;
        }
        if let Some(timeout) = self.timeout {
            crawler.request_timeout = timeout;
        }
        if let Some(retries) = self.retries {
            crawler.max_retries = retries;
        }
        if let Some(order) = self.order {
            crawler.traversal = order;
        }
        if self.record_all {
            crawler.scope = ScopePolicy::RecordAll;
        }
        if self.no_resolve {
            crawler.resolve_addresses = false;
        }

        if self.output.is_some() {
            config.output.links_path = self.output.clone();
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if self.structure.is_some() {
            config.output.structure_path = self.structure.clone();
        }
    }
}

fn parse_seed_arg(input: &str) -> Result<Url, String> {
    parse_seed(input).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };
    cli.apply_to(&mut config);
    validate(&config).context("Invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&cli.url, &config);
        return Ok(());
    }

    handle_crawl(&cli, config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("link_crawler=info,warn"),
            1 => EnvFilter::new("link_crawler=debug,info"),
            2 => EnvFilter::new("link_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(seed: &Url, config: &Config) {
    let crawler = &config.crawler;

    println!("=== link-crawler Dry Run ===\n");
    println!("Seed: {}\n", seed);

    println!("Crawler Configuration:");
    println!("  Max depth: {}", describe_limit(crawler.max_depth));
    println!("  Max links: {}", describe_limit(crawler.max_urls));
    println!("  Max concurrent requests: {}", crawler.max_concurrent_requests);
    println!("  Request timeout: {}s", crawler.request_timeout);
    println!("  Attempts per URL: {}", crawler.max_retries);
    println!("  Backoff unit: {}ms", crawler.backoff_unit_ms);
    println!("  Traversal: {:?}", crawler.traversal);
    println!("  Scope: {:?}", crawler.scope);
    println!("  Resolve addresses: {}", crawler.resolve_addresses);

    println!("\nOutput:");
    match &config.output.links_path {
        Some(path) => println!("  Links: {} ({})", path.display(), config.output.format),
        None => println!("  Links: not saved"),
    }
    match &config.output.structure_path {
        Some(path) => println!("  Structure: {}", path.display()),
        None => println!("  Structure: not saved"),
    }

    println!("\n✓ Configuration is valid");
}

fn describe_limit<T: std::fmt::Display>(limit: Option<T>) -> String {
    limit.map_or_else(|| "unlimited".to_string(), |value| value.to_string())
}

/// Handles the main crawl operation
async fn handle_crawl(cli: &Cli, config: Config) -> anyhow::Result<()> {
    let signals = Arc::new(CrawlSignals::new());
    spawn_interrupt_handler(Arc::clone(&signals));
    spawn_operator_console(Arc::clone(&signals));

    let mut crawler = Crawler::new(config.crawler.clone(), Arc::clone(&signals))
        .context("Failed to build crawler")?;
    if !cli.quiet {
        let printer: LogCallback = Arc::new(|line: &str| println!("{}", line));
        crawler = crawler.with_log_callback(printer);
        println!("\nLinks found on {}:\n", cli.url);
    }

    let outcome = crawler.crawl(&cli.url).await;

    if !cli.quiet {
        println!();
        print_statistics(&CrawlStatistics::from_outcome(&outcome));
    }

    if let Some(path) = &config.output.links_path {
        save_links(&outcome.registry, config.output.format, path)
            .with_context(|| format!("Failed to save links to {}", path.display()))?;
        if !cli.quiet {
            println!("\nLinks saved to {}", path.display());
        }
    }

    if config.output.structure_path.is_some() || cli.print_structure {
        let structure = SiteStructure::from_urls(outcome.registry.urls());

        if let Some(path) = &config.output.structure_path {
            save_structure(&structure, path)
                .with_context(|| format!("Failed to save structure to {}", path.display()))?;
            if !cli.quiet {
                println!("Website structure saved to {}", path.display());
            }
        }

        if cli.print_structure {
            println!("\nWebsite structure:\n");
            print!("{}", structure);
        }
    }

    Ok(())
}

/// First Ctrl+C stops the crawl; the second exits immediately
fn spawn_interrupt_handler(signals: Arc<CrawlSignals>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        eprintln!("\nStopping the crawling process...");
        signals.set_stopped();
        eprintln!("Press Ctrl+C again to exit the program.");

        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Exiting the program...");
            std::process::exit(130);
        }
    });
}

/// Reads pause/resume/stop commands from stdin on a plain thread
fn spawn_operator_console(signals: Arc<CrawlSignals>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            match line.parse::<OperatorCommand>() {
                Ok(command) => command.apply(&signals),
                Err(e) => eprintln!("{}", e),
            }

            if signals.is_stopped() {
                break;
            }
        }
    });
}
