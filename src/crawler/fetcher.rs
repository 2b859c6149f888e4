//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with a per-attempt timeout
//! - Bounding the number of in-flight requests with a shared limiter
//! - Retry logic with exponential backoff for transient failures
//! - Error classification

use crate::config::CrawlerConfig;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use url::Url;

/// Why a fetch produced no page
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("server responded with status {0}")]
    ServerStatus(u16),

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("request limiter closed")]
    LimiterClosed,
}

impl FetchError {
    /// Returns true if another attempt could succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_)
                | Self::Connect(_)
                | Self::ServerStatus(_)
                | Self::Request(_)
                | Self::Body(_)
        )
    }

    fn from_send(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else if error.is_connect() {
            Self::Connect(error.to_string())
        } else if error.is_builder() {
            Self::InvalidRequest(error.to_string())
        } else {
            Self::Request(error.to_string())
        }
    }

    fn from_body(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else {
            Self::Body(error.to_string())
        }
    }
}

/// Result of a fetch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// A response was received; any status outside 5xx lands here
    Page {
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
        /// Number of attempts it took
        attempts: u32,
    },

    /// No usable response after all attempts
    Failed {
        /// The last error seen
        error: FetchError,
        /// Number of attempts made
        attempts: u32,
    },
}

impl FetchResult {
    /// The last HTTP status seen, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Page { status_code, .. } => Some(*status_code),
            Self::Failed {
                error: FetchError::ServerStatus(code),
                ..
            } => Some(*code),
            Self::Failed { .. } => None,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Page { attempts, .. } | Self::Failed { attempts, .. } => *attempts,
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(config.request_timeout())
        .build()
}

/// Bounded-concurrency HTTP GET with retry and backoff
///
/// Cloning is cheap and every clone shares the same limiter, so a whole
/// crawl never has more than `max-concurrent-requests` requests in flight.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    limiter: Arc<Semaphore>,
    max_attempts: u32,
    backoff_unit: Duration,
}

impl Fetcher {
    /// Creates a fetcher with a fresh client and limiter sized from the config
    pub fn new(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config)?;
        let limiter = Arc::new(Semaphore::new(config.max_concurrent_requests as usize));
        Ok(Self::with_client(
            client,
            limiter,
            config.max_retries,
            config.backoff_unit(),
        ))
    }

    /// Creates a fetcher around an existing client and limiter
    pub fn with_client(
        client: Client,
        limiter: Arc<Semaphore>,
        max_attempts: u32,
        backoff_unit: Duration,
    ) -> Self {
        Self {
            client,
            limiter,
            max_attempts: max_attempts.max(1),
            backoff_unit,
        }
    }

    /// Fetches a URL, retrying transient failures
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Any non-5xx response | Return immediately with body |
    /// | HTTP 5xx | Retry |
    /// | Timeout / connection error | Retry |
    /// | Body read error | Retry |
    /// | Request could not be built | Immediate failure |
    ///
    /// Attempt `n` (counting from 0) that fails transiently is followed by a
    /// sleep of `2^n` backoff units, except after the last attempt. A limiter
    /// permit is held for each attempt only, never across the sleep.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to fetch
    ///
    /// # Returns
    ///
    /// A FetchResult holding either the page or the last error
    pub async fn fetch(&self, url: &Url) -> FetchResult {
        let mut attempt = 0;

        loop {
            let outcome = match self.limiter.acquire().await {
                Ok(_permit) => self.attempt(url).await,
                Err(_) => Err(FetchError::LimiterClosed),
            };
            let attempts = attempt + 1;

            match outcome {
                Ok((status_code, body)) => {
                    tracing::debug!(
                        "Fetched {} ({}) after {} attempt(s)",
                        url,
                        status_code,
                        attempts
                    );
                    return FetchResult::Page {
                        status_code,
                        body,
                        attempts,
                    };
                }
                Err(error) if !error.is_transient() || attempts >= self.max_attempts => {
                    tracing::warn!("Giving up on {} after {} attempt(s): {}", url, attempts, error);
                    return FetchResult::Failed { error, attempts };
                }
                Err(error) => {
                    let delay = self.backoff_delay(attempt);
                    tracing::debug!(
                        "Attempt {} for {} failed ({}), retrying in {:?}",
                        attempts,
                        url,
                        error,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }

            attempt += 1;
        }
    }

    /// Delay after the failed attempt with zero-based index `attempt`
    fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff_unit
            .saturating_mul(1u32.checked_shl(attempt).unwrap_or(u32::MAX))
    }

    async fn attempt(&self, url: &Url) -> Result<(u16, String), FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(FetchError::from_send)?;

        let status = response.status();
        if status.is_server_error() {
            return Err(FetchError::ServerStatus(status.as_u16()));
        }

        let body = response.text().await.map_err(FetchError::from_body)?;
        Ok((status.as_u16(), body))
    }
}
