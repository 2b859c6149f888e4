//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use link_crawler::config::{CrawlerConfig, TraversalOrder};
use link_crawler::CrawlOutcome;
use link_crawler::crawler::{AddressResolver, CrawlSignals, Crawler, LogCallback};
use link_crawler::state::{CrawlState, ResolvedAddress};
use link_crawler::url::ScopePolicy;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fast-failing configuration without address lookups
fn create_test_config() -> CrawlerConfig {
    CrawlerConfig {
        max_retries: 2,
        backoff_unit_ms: 5,
        request_timeout: 5,
        resolve_addresses: false,
        ..CrawlerConfig::default()
    }
}

fn create_crawler(config: CrawlerConfig) -> Crawler {
    Crawler::new(config, Arc::new(CrawlSignals::new())).expect("Failed to build crawler")
}

/// Builds an HTML page linking to each href
fn page(hrefs: &[&str]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!("<a href=\"{}\">link</a>\n", href))
        .collect();
    format!("<html><body>\n{}</body></html>", anchors)
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn seed(server: &MockServer) -> Url {
    Url::parse(&format!("{}/", server.uri())).expect("Failed to parse mock server URI")
}

fn link(server: &MockServer, page_path: &str) -> String {
    format!("{}{}", server.uri(), page_path)
}

async fn requests_for(server: &MockServer, page_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == page_path)
        .count()
}

fn recorded(outcome: &CrawlOutcome) -> Vec<String> {
    outcome
        .registry
        .urls()
        .map(str::to_string)
        .collect()
}

/// Collects every line passed to the log callback
fn capture_log() -> (Arc<Mutex<Vec<String>>>, LogCallback) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&lines);
    let callback: LogCallback = Arc::new(move |line: &str| sink.lock().unwrap().push(line.to_string()));
    (lines, callback)
}

#[tokio::test]
async fn test_records_and_expands_same_host_links() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page(&["/x", "/y", "https://b.test/z"]),
    )
    .await;
    mount_page(&server, "/x", page(&[])).await;
    mount_page(&server, "/y", page(&[])).await;

    let config = CrawlerConfig {
        max_depth: Some(2),
        scope: ScopePolicy::RecordAll,
        ..create_test_config()
    };
    let outcome = create_crawler(config).crawl(&seed(&server)).await;

    assert_eq!(
        recorded(&outcome),
        vec![link(&server, "/x"), link(&server, "/y"), "https://b.test/z".to_string()]
    );
    assert_eq!(outcome.final_state, CrawlState::Done);
    assert_eq!(requests_for(&server, "/x").await, 1);
    assert_eq!(requests_for(&server, "/y").await, 1);
    assert_eq!(outcome.pages_fetched, 3);

    // Expanded links carry the status of their own fetch, the other does not
    let registry = &outcome.registry;
    assert_eq!(registry.get(&link(&server, "/x")).unwrap().status_code, Some(200));
    assert_eq!(registry.get("https://b.test/z").unwrap().status_code, None);
    assert_eq!(registry.get("https://b.test/z").unwrap().discovered_at_depth, 1);
}

#[tokio::test]
async fn test_out_of_scope_links_skipped_by_default() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page(&["/x", "https://b.test/z"])).await;
    mount_page(&server, "/x", page(&[])).await;

    let outcome = create_crawler(create_test_config())
        .crawl(&seed(&server))
        .await;

    assert_eq!(recorded(&outcome), vec![link(&server, "/x")]);
}

#[tokio::test]
async fn test_depth_limit_records_but_does_not_fetch() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page(&["/x", "/y", "https://b.test/z"])).await;
    mount_page(&server, "/x", page(&["/deeper"])).await;
    mount_page(&server, "/y", page(&[])).await;

    let config = CrawlerConfig {
        max_depth: Some(1),
        scope: ScopePolicy::RecordAll,
        ..create_test_config()
    };
    let outcome = create_crawler(config).crawl(&seed(&server)).await;

    assert_eq!(outcome.registry.len(), 3);
    assert_eq!(requests_for(&server, "/").await, 1);
    assert_eq!(requests_for(&server, "/x").await, 0);
    assert_eq!(requests_for(&server, "/y").await, 0);
    assert!(outcome
        .registry
        .iter()
        .all(|(_, metadata)| metadata.discovered_at_depth <= 1));
}

#[tokio::test]
async fn test_zero_depth_fetches_nothing() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page(&["/x"])).await;

    let config = CrawlerConfig {
        max_depth: Some(0),
        ..create_test_config()
    };
    let outcome = create_crawler(config).crawl(&seed(&server)).await;

    assert!(outcome.registry.is_empty());
    assert_eq!(requests_for(&server, "/").await, 0);
}

#[tokio::test]
async fn test_each_url_recorded_and_fetched_once() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page(&["/a", "/a", "/b"])).await;
    mount_page(&server, "/a", page(&["/", "/b"])).await;
    mount_page(&server, "/b", page(&["/a"])).await;

    let outcome = create_crawler(create_test_config())
        .crawl(&seed(&server))
        .await;

    // Depth-first: /a is walked to the bottom before the seed's next link
    assert_eq!(
        recorded(&outcome),
        vec![link(&server, "/a"), link(&server, "/"), link(&server, "/b")]
    );
    assert_eq!(requests_for(&server, "/a").await, 1);
    assert_eq!(requests_for(&server, "/b").await, 1);
    // Once as the seed, once as a recorded link
    assert_eq!(requests_for(&server, "/").await, 2);
}

#[tokio::test]
async fn test_breadth_first_order() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page(&["/a", "/a", "/b"])).await;
    mount_page(&server, "/a", page(&["/", "/b"])).await;
    mount_page(&server, "/b", page(&["/a"])).await;

    let config = CrawlerConfig {
        traversal: TraversalOrder::BreadthFirst,
        ..create_test_config()
    };
    let outcome = create_crawler(config).crawl(&seed(&server)).await;

    assert_eq!(
        recorded(&outcome),
        vec![link(&server, "/a"), link(&server, "/b"), link(&server, "/")]
    );
    let registry = &outcome.registry;
    assert_eq!(registry.get(&link(&server, "/b")).unwrap().discovered_at_depth, 1);
    assert_eq!(registry.get(&link(&server, "/")).unwrap().discovered_at_depth, 2);
    assert_eq!(requests_for(&server, "/a").await, 1);
    assert_eq!(requests_for(&server, "/b").await, 1);
}

#[tokio::test]
async fn test_breadth_first_respects_concurrency_limit() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page(&["/p1", "/p2", "/p3", "/p4"])).await;
    for slow in ["/p1", "/p2", "/p3", "/p4"] {
        Mock::given(method("GET"))
            .and(path(slow))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(150)))
            .mount(&server)
            .await;
    }

    let config = CrawlerConfig {
        traversal: TraversalOrder::BreadthFirst,
        max_concurrent_requests: 2,
        ..create_test_config()
    };
    let started = Instant::now();
    let outcome = create_crawler(config).crawl(&seed(&server)).await;

    assert_eq!(outcome.registry.len(), 4);
    assert_eq!(outcome.pages_fetched, 5);
    // Four delayed pages, two at a time
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_url_limit_keeps_first_links() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page(&["/1", "/2", "/3", "/4", "/5"])).await;

    let config = CrawlerConfig {
        max_urls: Some(2),
        ..create_test_config()
    };
    let outcome = create_crawler(config).crawl(&seed(&server)).await;

    assert_eq!(recorded(&outcome), vec![link(&server, "/1"), link(&server, "/2")]);
    assert_eq!(outcome.final_state, CrawlState::Done);
}

#[tokio::test]
async fn test_malformed_html_yields_empty_registry() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<<<>>> <a <<div>> not really html".to_string()).await;

    let outcome = create_crawler(create_test_config())
        .crawl(&seed(&server))
        .await;

    assert!(outcome.registry.is_empty());
    assert_eq!(outcome.final_state, CrawlState::Done);
    assert_eq!(outcome.pages_fetched, 1);
}

#[tokio::test]
async fn test_non_http_links_ignored() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page(&["mailto:someone@example.com", "javascript:void(0)", "ftp://files.test/", "/ok"]),
    )
    .await;
    mount_page(&server, "/ok", page(&[])).await;

    let outcome = create_crawler(create_test_config())
        .crawl(&seed(&server))
        .await;

    assert_eq!(recorded(&outcome), vec![link(&server, "/ok")]);
}

#[tokio::test]
async fn test_retry_with_backoff_then_success() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page(&["/flaky"])).await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    mount_page(&server, "/flaky", page(&["/found"])).await;
    mount_page(&server, "/found", page(&[])).await;

    let config = CrawlerConfig {
        max_retries: 3,
        backoff_unit_ms: 40,
        ..create_test_config()
    };
    let started = Instant::now();
    let outcome = create_crawler(config).crawl(&seed(&server)).await;

    // 1 + 2 backoff units before the third attempt
    assert!(started.elapsed() >= Duration::from_millis(120));
    assert_eq!(requests_for(&server, "/flaky").await, 3);
    assert_eq!(
        outcome.registry.get(&link(&server, "/flaky")).unwrap().status_code,
        Some(200)
    );
    assert!(outcome.registry.contains(&link(&server, "/found")));
    assert_eq!(outcome.fetch_failures, 0);
}

#[tokio::test]
async fn test_fetch_failure_is_contained() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page(&["/broken", "/ok"])).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_page(&server, "/ok", page(&["/deep"])).await;
    mount_page(&server, "/deep", page(&[])).await;

    let (lines, callback) = capture_log();
    let crawler = create_crawler(create_test_config()).with_log_callback(callback);
    let outcome = crawler.crawl(&seed(&server)).await;

    assert_eq!(
        recorded(&outcome),
        vec![link(&server, "/broken"), link(&server, "/ok"), link(&server, "/deep")]
    );
    assert_eq!(outcome.fetch_failures, 1);
    assert_eq!(requests_for(&server, "/broken").await, 2);
    assert_eq!(
        outcome.registry.get(&link(&server, "/broken")).unwrap().status_code,
        Some(503)
    );

    let lines = lines.lock().unwrap();
    assert!(lines
        .iter()
        .any(|line| line.starts_with(&format!("Error fetching {}", link(&server, "/broken")))));
    assert_eq!(lines.last().unwrap(), "Done. Found 3 links.");
}

#[tokio::test]
async fn test_client_error_page_still_expanded() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page(&["/gone"])).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string(page(&["/home"])))
        .mount(&server)
        .await;
    mount_page(&server, "/home", page(&[])).await;

    let outcome = create_crawler(create_test_config())
        .crawl(&seed(&server))
        .await;

    assert_eq!(
        outcome.registry.get(&link(&server, "/gone")).unwrap().status_code,
        Some(404)
    );
    assert_eq!(requests_for(&server, "/gone").await, 1);
    assert!(outcome.registry.contains(&link(&server, "/home")));
}

#[tokio::test]
async fn test_other_port_recorded_but_not_followed() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;
    mount_page(&server, "/", page(&[&link(&other, "/elsewhere")])).await;
    mount_page(&other, "/elsewhere", page(&[])).await;

    let outcome = create_crawler(create_test_config())
        .crawl(&seed(&server))
        .await;

    // Same host name, so in scope; different port, so not expanded
    assert_eq!(recorded(&outcome), vec![link(&other, "/elsewhere")]);
    assert!(other.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_pause_before_start_then_stop() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page(&["/x"])).await;

    let signals = Arc::new(CrawlSignals::new());
    signals.set_paused(true);
    let crawler = Crawler::new(create_test_config(), Arc::clone(&signals)).unwrap();
    let seed = seed(&server);
    let handle = tokio::spawn(async move { crawler.crawl(&seed).await });

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!handle.is_finished());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());

    signals.set_stopped();
    let outcome = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("crawl should end after stop")
        .unwrap();

    assert_eq!(outcome.final_state, CrawlState::Stopped);
    assert!(outcome.registry.is_empty());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_pause_then_resume_completes() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page(&["/x"])).await;
    mount_page(&server, "/x", page(&[])).await;

    let signals = Arc::new(CrawlSignals::new());
    signals.set_paused(true);
    let crawler = Crawler::new(create_test_config(), Arc::clone(&signals)).unwrap();
    let seed = seed(&server);
    let handle = tokio::spawn(async move { crawler.crawl(&seed).await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(server.received_requests().await.unwrap_or_default().is_empty());

    signals.set_paused(false);
    let outcome = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("crawl should finish after resume")
        .unwrap();

    assert_eq!(outcome.final_state, CrawlState::Done);
    assert_eq!(recorded(&outcome), vec![link(&server, "/x")]);
}

/// Pauses on the first recorded link, then stops while paused
async fn pause_mid_crawl_then_stop(traversal: TraversalOrder) {
    let server = MockServer::start().await;
    mount_page(&server, "/", page(&["/1", "/2", "/3"])).await;
    mount_page(&server, "/1", page(&["/1a"])).await;

    let signals = Arc::new(CrawlSignals::new());
    let pauser = Arc::clone(&signals);
    let logged = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&logged);
    let config = CrawlerConfig {
        traversal,
        ..create_test_config()
    };
    let crawler = Crawler::new(config, Arc::clone(&signals))
        .unwrap()
        .with_log_callback(Arc::new(move |line: &str| {
            let Some(rest) = line.strip_prefix("   - URL: ") else {
                return;
            };
            let mut urls = sink.lock().unwrap();
            urls.push(rest.split(' ').next().unwrap_or_default().to_string());
            if urls.len() == 1 {
                pauser.set_paused(true);
            }
        }));

    let seed = seed(&server);
    let handle = tokio::spawn(async move { crawler.crawl(&seed).await });

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(signals.is_paused());
    assert!(!handle.is_finished());
    let requests_at_pause = server.received_requests().await.unwrap_or_default().len();
    assert_eq!(requests_at_pause, 1);
    let snapshot = logged.lock().unwrap().clone();
    assert_eq!(snapshot, vec![link(&server, "/1")]);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(
        server.received_requests().await.unwrap_or_default().len(),
        requests_at_pause
    );
    assert_eq!(*logged.lock().unwrap(), snapshot);

    signals.set_stopped();
    let outcome = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("crawl should end after stop")
        .unwrap();

    assert_eq!(outcome.final_state, CrawlState::Stopped);
    assert_eq!(recorded(&outcome), snapshot);
    assert_eq!(requests_for(&server, "/1").await, 0);
    assert_eq!(
        server.received_requests().await.unwrap_or_default().len(),
        requests_at_pause
    );
}

#[tokio::test]
async fn test_stop_while_paused_mid_crawl_depth_first() {
    pause_mid_crawl_then_stop(TraversalOrder::DepthFirst).await;
}

#[tokio::test]
async fn test_stop_while_paused_mid_crawl_breadth_first() {
    pause_mid_crawl_then_stop(TraversalOrder::BreadthFirst).await;
}

#[tokio::test]
async fn test_stop_freezes_registry() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page(&["/1", "/2", "/3", "/4"])).await;
    mount_page(&server, "/1", page(&["/1a", "/1b"])).await;

    let signals = Arc::new(CrawlSignals::new());
    let stopper = Arc::clone(&signals);
    let crawler = Crawler::new(create_test_config(), Arc::clone(&signals))
        .unwrap()
        .with_log_callback(Arc::new(move |line: &str| {
            if line.starts_with("   - URL:") {
                stopper.set_stopped();
            }
        }));

    let outcome = crawler.crawl(&seed(&server)).await;

    assert_eq!(outcome.final_state, CrawlState::Stopped);
    assert_eq!(recorded(&outcome), vec![link(&server, "/1")]);
    assert_eq!(requests_for(&server, "/1").await, 0);
}

#[tokio::test]
async fn test_stop_in_breadth_first_mode() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page(&["/1", "/2", "/3"])).await;

    let signals = Arc::new(CrawlSignals::new());
    let stopper = Arc::clone(&signals);
    let config = CrawlerConfig {
        traversal: TraversalOrder::BreadthFirst,
        ..create_test_config()
    };
    let crawler = Crawler::new(config, Arc::clone(&signals))
        .unwrap()
        .with_log_callback(Arc::new(move |line: &str| {
            if line.starts_with("   - URL:") {
                stopper.set_stopped();
            }
        }));

    let outcome = crawler.crawl(&seed(&server)).await;

    assert_eq!(outcome.final_state, CrawlState::Stopped);
    assert_eq!(outcome.registry.len(), 1);
    assert_eq!(outcome.pages_fetched, 1);
}

struct FixedResolver;

impl AddressResolver for FixedResolver {
    fn resolve(&self, host: &str) -> Option<IpAddr> {
        (host == "127.0.0.1").then_some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7)))
    }
}

#[tokio::test]
async fn test_address_capture_with_sentinel() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page(&["/x", "https://b.test/z"])).await;
    mount_page(&server, "/x", page(&[])).await;

    let (lines, callback) = capture_log();
    let config = CrawlerConfig {
        scope: ScopePolicy::RecordAll,
        ..create_test_config()
    };
    let crawler = create_crawler(config)
        .with_resolver(Arc::new(FixedResolver))
        .with_log_callback(callback);
    let outcome = crawler.crawl(&seed(&server)).await;

    let registry = &outcome.registry;
    assert_eq!(
        registry.get(&link(&server, "/x")).unwrap().resolved_address,
        Some(ResolvedAddress::Found(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7))))
    );
    assert_eq!(
        registry.get("https://b.test/z").unwrap().resolved_address,
        Some(ResolvedAddress::NotFound)
    );

    let lines = lines.lock().unwrap();
    assert!(lines.contains(&format!("   - URL: {} (IP: 10.0.0.7)", link(&server, "/x"))));
    assert!(lines.contains(&"   - URL: https://b.test/z (IP: IP not found)".to_string()));
}

#[tokio::test]
async fn test_each_run_gets_a_fresh_registry() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page(&["/x"])).await;
    mount_page(&server, "/x", page(&[])).await;

    let crawler = create_crawler(create_test_config());
    let first = crawler.crawl(&seed(&server)).await;
    let second = crawler.crawl(&seed(&server)).await;

    assert_eq!(recorded(&first), recorded(&second));
    assert_eq!(requests_for(&server, "/x").await, 2);
}
