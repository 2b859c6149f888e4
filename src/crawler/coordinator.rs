//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the traversal controller, which coordinates:
//! - Walking the frontier depth-first or breadth-first
//! - Fetching pages and extracting candidate links
//! - Deciding which candidates are recorded and which are expanded
//! - Honouring depth and URL limits
//! - Observing pause and stop signals between steps
//!
//! All registry decisions are made sequentially by the controller, even when
//! breadth-first fetches of one level run concurrently.

use crate::config::{validate_crawler_config, CrawlLimits, CrawlerConfig, TraversalOrder};
use crate::crawler::fetcher::{FetchResult, Fetcher};
use crate::crawler::frontier::{CrawlTarget, Halt, PageFrame};
use crate::crawler::parser::extract_links;
use crate::crawler::resolver::{resolve_address, AddressResolver, SystemResolver};
use crate::crawler::signals::CrawlSignals;
use crate::state::{CrawlState, LinkMetadata, ResolvedAddress, VisitedRegistry};
use crate::url::{is_crawlable, is_in_scope, root_domain, same_host};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Receives human-readable progress lines from a crawl
pub type LogCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Everything a finished crawl run produced
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Every recorded link with its metadata
    pub registry: VisitedRegistry,

    /// `Done` or `Stopped`
    pub final_state: CrawlState,

    /// Fetches that returned a page
    pub pages_fetched: usize,

    /// Fetches that gave up without a page
    pub fetch_failures: usize,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// How long the run took
    pub elapsed: Duration,
}

impl CrawlOutcome {
    pub fn link_count(&self) -> usize {
        self.registry.len()
    }

    pub fn was_stopped(&self) -> bool {
        self.final_state.was_stopped()
    }
}

/// Main crawler structure
///
/// A crawler can run any number of crawls; each gets a fresh registry. The
/// fetch limiter and the control signals are shared by all of them.
pub struct Crawler {
    config: CrawlerConfig,
    fetcher: Fetcher,
    signals: Arc<CrawlSignals>,
    resolver: Option<Arc<dyn AddressResolver>>,
    log_callback: Option<LogCallback>,
}

impl Crawler {
    /// Creates a new crawler
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `signals` - Pause and stop flags the operator drives
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Successfully created crawler
    /// * `Err(CrawlError)` - The config is out of range or the HTTP client
    ///   could not be built
    pub fn new(config: CrawlerConfig, signals: Arc<CrawlSignals>) -> crate::Result<Self> {
        validate_crawler_config(&config)?;
        let fetcher = Fetcher::new(&config)?;
        let resolver: Option<Arc<dyn AddressResolver>> = if config.resolve_addresses {
            Some(Arc::new(SystemResolver))
        } else {
            None
        };

        Ok(Self {
            config,
            fetcher,
            signals,
            resolver,
            log_callback: None,
        })
    }

    /// Replaces the address resolver and turns address capture on
    pub fn with_resolver(mut self, resolver: Arc<dyn AddressResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Turns address capture off
    pub fn without_resolver(mut self) -> Self {
        self.resolver = None;
        self
    }

    pub fn with_log_callback(mut self, callback: LogCallback) -> Self {
        self.log_callback = Some(callback);
        self
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    pub fn signals(&self) -> &Arc<CrawlSignals> {
        &self.signals
    }

    /// Crawls outward from `seed` until the frontier is exhausted, a limit is
    /// hit, or the stop signal is raised
    ///
    /// # Crawl Flow
    ///
    /// For every target taken from the frontier:
    /// 1. Stop if the stop signal is set
    /// 2. Skip if the target's depth has reached `max-depth`
    /// 3. Wait while paused, then check stop again
    /// 4. Fetch; a failed fetch ends only this branch
    /// 5. For each extracted candidate in document order:
    ///    a. Stop if the stop signal is set (waiting out a pause first)
    ///    b. End the crawl if the registry holds `max-urls` links
    ///    c. Skip non-http(s) and already recorded candidates
    ///    d. Skip candidates outside the root domain unless recording all
    ///    e. Record at the target's depth plus one
    ///    f. Expand the candidate if it is on exactly the target's host
    ///
    /// The seed itself is not recorded. This never fails: problems are logged
    /// and the registry gathered so far is returned.
    pub async fn crawl(&self, seed: &Url) -> CrawlOutcome {
        let started_at = Utc::now();
        let timer = Instant::now();

        tracing::info!(
            "Starting {:?} crawl of {} (max depth: {:?}, max links: {:?})",
            self.config.traversal,
            seed,
            self.config.max_depth,
            self.config.max_urls
        );

        let (mut run, flow) = match root_domain(seed) {
            Ok(domain) => {
                let mut run = CrawlRun::new(self, domain);
                let target = CrawlTarget::seed(seed.clone());
                let flow = match self.config.traversal {
                    TraversalOrder::DepthFirst => run.depth_first(target).await,
                    TraversalOrder::BreadthFirst => run.breadth_first(target).await,
                };
                (run, flow)
            }
            Err(e) => {
                tracing::warn!("Cannot crawl {}: {}", seed, e);
                (CrawlRun::new(self, String::new()), ControlFlow::Continue(()))
            }
        };

        let final_state = match flow {
            ControlFlow::Break(Halt::Stopped) => CrawlState::Stopped,
            _ if self.signals.is_stopped() => CrawlState::Stopped,
            ControlFlow::Break(Halt::UrlLimit) => {
                tracing::info!("Reached the limit of {} links", run.registry.len());
                CrawlState::Done
            }
            ControlFlow::Continue(()) => CrawlState::Done,
        };

        let elapsed = timer.elapsed();
        tracing::info!(
            "Crawl {}: {} links, {} pages fetched, {} failures in {:?}",
            final_state,
            run.registry.len(),
            run.pages_fetched,
            run.fetch_failures,
            elapsed
        );
        self.emit(&format!("Done. Found {} links.", run.registry.len()));

        CrawlOutcome {
            registry: std::mem::take(&mut run.registry),
            final_state,
            pages_fetched: run.pages_fetched,
            fetch_failures: run.fetch_failures,
            started_at,
            elapsed,
        }
    }

    /// Fetches once not paused, or returns None if stopped first
    async fn fetch_unless_stopped(&self, url: &Url) -> Option<FetchResult> {
        self.signals.wait_while_paused().await;
        if self.signals.is_stopped() {
            return None;
        }
        Some(self.fetcher.fetch(url).await)
    }

    fn emit(&self, message: &str) {
        if let Some(callback) = &self.log_callback {
            callback(message);
        }
    }
}

/// State owned by a single crawl run
struct CrawlRun<'a> {
    crawler: &'a Crawler,
    root_domain: String,
    limits: CrawlLimits,
    registry: VisitedRegistry,
    pages_fetched: usize,
    fetch_failures: usize,
}

impl<'a> CrawlRun<'a> {
    fn new(crawler: &'a Crawler, root_domain: String) -> Self {
        Self {
            crawler,
            root_domain,
            limits: crawler.config.limits(),
            registry: VisitedRegistry::new(),
            pages_fetched: 0,
            fetch_failures: 0,
        }
    }

    async fn depth_first(&mut self, seed: CrawlTarget) -> ControlFlow<Halt> {
        let mut stack: Vec<PageFrame> = Vec::new();
        if let Some(frame) = self.visit(seed).await? {
            stack.push(frame);
        }

        while let Some(frame) = stack.last_mut() {
            let Some(candidate) = frame.next_candidate() else {
                stack.pop();
                continue;
            };

            if let Some(child) = self.accept_candidate(&candidate, &frame.page).await? {
                if let Some(child_frame) = self.visit(child).await? {
                    stack.push(child_frame);
                }
            }
        }

        ControlFlow::Continue(())
    }

    async fn breadth_first(&mut self, seed: CrawlTarget) -> ControlFlow<Halt> {
        let crawler = self.crawler;
        let mut level = vec![seed];

        while let Some(first) = level.first() {
            self.check_stopped()?;

            let depth = first.depth;
            if self.limits.depth_exhausted(depth) {
                tracing::debug!("Depth limit reached at level {}", depth);
                break;
            }

            tracing::debug!("Fetching {} page(s) at depth {}", level.len(), depth);
            let mut fetches = stream::iter(level)
                .map(move |target| async move {
                    let result = crawler.fetch_unless_stopped(&target.url).await;
                    (target, result)
                })
                .buffered(crawler.config.max_concurrent_requests as usize);

            let mut next_level = Vec::new();
            while let Some((target, result)) = fetches.next().await {
                self.check_stopped()?;
                crawler.signals.wait_while_paused().await;
                self.check_stopped()?;

                let Some(result) = result else {
                    continue;
                };
                let Some(html) = self.apply_fetch(&target, result) else {
                    continue;
                };

                for candidate in extract_links(&html, &target.url) {
                    if let Some(child) = self.accept_candidate(&candidate, &target).await? {
                        next_level.push(child);
                    }
                }
            }

            level = next_level;
        }

        ControlFlow::Continue(())
    }

    /// Fetches a target and returns a frame over its links
    ///
    /// Continues with None when the branch ends here: depth exhausted or
    /// fetch failed.
    async fn visit(&mut self, target: CrawlTarget) -> ControlFlow<Halt, Option<PageFrame>> {
        self.check_stopped()?;

        if self.limits.depth_exhausted(target.depth) {
            tracing::debug!("Not fetching {} at depth {}", target.url, target.depth);
            return ControlFlow::Continue(None);
        }

        let Some(result) = self.crawler.fetch_unless_stopped(&target.url).await else {
            return ControlFlow::Break(Halt::Stopped);
        };
        self.check_stopped()?;

        let frame = self.apply_fetch(&target, result).map(|html| {
            let candidates = extract_links(&html, &target.url);
            tracing::debug!("Found {} candidate(s) on {}", candidates.len(), target.url);
            PageFrame::new(target, candidates)
        });
        ControlFlow::Continue(frame)
    }

    /// Books a completed fetch and hands back the body if there is one
    fn apply_fetch(&mut self, target: &CrawlTarget, result: FetchResult) -> Option<String> {
        if let Some(code) = result.status_code() {
            self.registry.record_status(target.url.as_str(), code);
        }

        match result {
            FetchResult::Page { body, .. } => {
                self.pages_fetched += 1;
                Some(body)
            }
            FetchResult::Failed { error, .. } => {
                self.fetch_failures += 1;
                self.crawler
                    .emit(&format!("Error fetching {}: {}", target.url, error));
                None
            }
        }
    }

    /// Decides what happens to one candidate link found on `parent`
    ///
    /// Continues with the target to expand, if any.
    async fn accept_candidate(
        &mut self,
        candidate: &str,
        parent: &CrawlTarget,
    ) -> ControlFlow<Halt, Option<CrawlTarget>> {
        self.check_stopped()?;
        self.crawler.signals.wait_while_paused().await;
        self.check_stopped()?;

        if self.limits.url_limit_reached(self.registry.len()) {
            return ControlFlow::Break(Halt::UrlLimit);
        }

        let url = match Url::parse(candidate) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Dropping candidate {}: {}", candidate, e);
                return ControlFlow::Continue(None);
            }
        };

        if !is_crawlable(&url) || self.registry.contains(candidate) {
            return ControlFlow::Continue(None);
        }

        let in_scope = is_in_scope(&url, &self.root_domain);
        if !in_scope && !self.crawler.config.scope.records_out_of_scope() {
            tracing::debug!("Skipping {} (outside {})", url, self.root_domain);
            return ControlFlow::Continue(None);
        }

        let child = parent.child(url);
        let mut metadata = LinkMetadata::at_depth(child.depth);
        if let Some(resolver) = &self.crawler.resolver {
            let address = match child.url.host_str() {
                Some(host) => resolve_address(Arc::clone(resolver), host.to_string()).await,
                None => ResolvedAddress::NotFound,
            };
            metadata = metadata.with_address(address);
        }

        // The lookup may have raced a stop
        self.check_stopped()?;

        let message = accepted_message(candidate, &metadata);
        self.registry.insert(candidate.to_string(), metadata);
        tracing::debug!("Recorded {}", candidate);
        self.crawler.emit(&message);

        if in_scope && same_host(&child.url, &parent.url) {
            ControlFlow::Continue(Some(child))
        } else {
            ControlFlow::Continue(None)
        }
    }

    fn check_stopped(&self) -> ControlFlow<Halt> {
        if self.crawler.signals.is_stopped() {
            ControlFlow::Break(Halt::Stopped)
        } else {
            ControlFlow::Continue(())
        }
    }
}

fn accepted_message(url: &str, metadata: &LinkMetadata) -> String {
    match &metadata.resolved_address {
        Some(address) => format!("   - URL: {} (IP: {})", url, address),
        None => format!("   - URL: {} ({})", url, metadata),
    }
}
