//! HTTP client for fetching letting pages with rate limiting and error handling
//!
//! Provides the `PageFetcher` seam the pipeline depends on, and the reqwest
//! implementation used in production: bounded timeout, polite request rate
//! and a single retry on transient transport failures.

use async_trait::async_trait;
use governor::{
    clock::DefaultClock,
    state::{direct::NotKeyed, InMemoryState},
    Quota, RateLimiter,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::infrastructure::config::defaults;
use crate::infrastructure::retry::{fetch_with_retry, RetryPolicy};

/// Why a page could not be fetched
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Request timed out: {url}")]
    Timeout { url: String },

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP request failed with status {status}: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Failed to read response body from {url}: {message}")]
    Body { url: String, message: String },

    #[error("Failed to create HTTP client: {message}")]
    ClientBuild { message: String },
}

impl FetchError {
    /// Timeouts, connection failures, 5xx and 429 are worth one more attempt
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Transport { .. } => true,
            Self::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            Self::InvalidUrl { .. } | Self::Body { .. } | Self::ClientBuild { .. } => false,
        }
    }

    /// Short text recorded against a contract in the run summary
    pub fn reason(&self) -> String {
        match self {
            Self::Timeout { .. } => "timeout".to_string(),
            Self::HttpStatus { status, .. } => format!("HTTP {status}"),
            Self::Transport { message, .. } => format!("transport error: {message}"),
            Self::Body { message, .. } => format!("unreadable response: {message}"),
            Self::InvalidUrl { reason, .. } => format!("invalid URL: {reason}"),
            Self::ClientBuild { message } => format!("client error: {message}"),
        }
    }

    fn from_reqwest(url: &Url, error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout { url: url.to_string() }
        } else if let Some(status) = error.status() {
            Self::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            }
        } else if error.is_body() || error.is_decode() {
            Self::Body {
                url: url.to_string(),
                message: error.to_string(),
            }
        } else {
            Self::Transport {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

/// Anything that can turn a URL into page HTML
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_html(&self, url: &Url) -> Result<String, FetchError>;
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    pub user_agent: String,

    /// Per-attempt request timeout in seconds
    pub timeout_seconds: u64,

    /// Retries after the first attempt, transient failures only
    pub max_retries: u32,

    pub retry_delay_ms: u64,

    /// 0 disables rate limiting
    pub max_requests_per_second: u32,

    pub follow_redirects: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::USER_AGENT.to_string(),
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            max_retries: defaults::MAX_RETRIES,
            retry_delay_ms: defaults::RETRY_DELAY_MS,
            max_requests_per_second: defaults::MAX_REQUESTS_PER_SECOND,
            follow_redirects: true,
        }
    }
}

/// reqwest-backed page fetcher
pub struct HttpClient {
    client: Client,
    rate_limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration
    pub fn new(config: HttpClientConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .cookie_store(true)
            .gzip(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .map_err(|e| FetchError::ClientBuild { message: e.to_string() })?;

        let rate_limiter = NonZeroU32::new(config.max_requests_per_second)
            .map(|rate| RateLimiter::direct(Quota::per_second(rate)));

        Ok(Self {
            client,
            rate_limiter,
            config,
        })
    }

    /// Get the configuration
    pub const fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    async fn fetch_once(&self, url: &Url) -> Result<String, FetchError> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, &e))?;

        debug!("Successfully fetched: {} ({} chars)", url, text.len());
        Ok(text)
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch_html(&self, url: &Url) -> Result<String, FetchError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        fetch_with_retry(RetryPolicy::from(&self.config), url, || self.fetch_once(url)).await
    }
}
