//! Fixed-delay retry for page fetches
//!
//! Transient failures (see [`FetchError::is_transient`]) get up to
//! `max_retries` more attempts, each after the same delay. Anything else is
//! returned at once.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};
use url::Url;

use crate::infrastructure::http_client::{FetchError, HttpClientConfig};

/// How often and how patiently to retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one; 0 disables retrying
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }
}

impl From<&HttpClientConfig> for RetryPolicy {
    fn from(config: &HttpClientConfig) -> Self {
        Self::new(config.max_retries, Duration::from_millis(config.retry_delay_ms))
    }
}

/// Run `attempt` until it succeeds, fails permanently or the retries run out
pub async fn fetch_with_retry<F, Fut>(policy: RetryPolicy, url: &Url, mut attempt: F) -> Result<String, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, FetchError>>,
{
    let mut retries = 0;
    loop {
        match attempt().await {
            Ok(text) => {
                if retries > 0 {
                    info!("Fetched {} on attempt {}", url, retries + 1);
                }
                return Ok(text);
            }
            Err(error) if error.is_transient() && retries < policy.max_retries => {
                warn!(
                    "Failed to fetch {} (attempt {}), retrying in {:?}: {}",
                    url,
                    retries + 1,
                    policy.delay,
                    error
                );
                retries += 1;
                sleep(policy.delay).await;
            }
            Err(error) => return Err(error),
        }
    }
}
