//! Configuration infrastructure
//!
//! Settings for one scraper instance: HTTP behaviour, pipeline limits,
//! parsing labels and logging. Values come from defaults, an optional config
//! file and `BIDSCRAPE__*` environment variables, in that order of precedence.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::infrastructure::http_client::HttpClientConfig;
use crate::infrastructure::parsing::ParsingConfig;

/// Environment variable prefix, e.g. `BIDSCRAPE__HTTP__TIMEOUT_SECONDS=10`
pub const ENV_PREFIX: &str = "BIDSCRAPE";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {source}")]
    FileLoad {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

/// Complete scraper configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub http: HttpClientConfig,
    pub pipeline: PipelineConfig,
    pub parsing: ParsingConfig,
    pub logging: LoggingConfig,
}

/// Limits for one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Detail pages fetched at once; 1 is strictly sequential
    pub max_concurrent_details: usize,

    /// Upper bound for the whole listing fetch, retries included
    pub listing_timeout_secs: u64,

    /// Upper bound for one detail fetch, retries included
    pub detail_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_details: defaults::MAX_CONCURRENT_DETAILS,
            listing_timeout_secs: defaults::FETCH_DEADLINE_SECONDS,
            detail_timeout_secs: defaults::FETCH_DEADLINE_SECONDS,
        }
    }
}

impl PipelineConfig {
    pub const fn listing_timeout(&self) -> Duration {
        Duration::from_secs(self.listing_timeout_secs)
    }

    pub const fn detail_timeout(&self) -> Duration {
        Duration::from_secs(self.detail_timeout_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level for this crate: trace, debug, info, warn, error
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    pub json_format: bool,

    /// Include the module path of each event
    pub with_target: bool,

    /// Stream log events are written to
    pub output: LogOutput,
}

/// Where log events go; stdout stays free for command output by default
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stderr,
    Stdout,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            with_target: false,
            output: LogOutput::default(),
        }
    }
}

impl ScraperConfig {
    /// Load from an optional file plus the environment, then validate
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;

        info!(
            "Scraper config loaded (timeout={}s, concurrency={}, retries={})",
            config.http.timeout_seconds, config.pipeline.max_concurrent_details, config.http.max_retries
        );
        Ok(config)
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: &str| ConfigError::Validation { message: message.to_string() };

        if self.http.timeout_seconds == 0 {
            return Err(invalid("http.timeout_seconds must be greater than 0"));
        }
        if self.pipeline.max_concurrent_details == 0 {
            return Err(invalid("pipeline.max_concurrent_details must be greater than 0"));
        }
        if self.pipeline.listing_timeout_secs == 0 || self.pipeline.detail_timeout_secs == 0 {
            return Err(invalid("pipeline timeouts must be greater than 0"));
        }
        self.parsing
            .validate()
            .map_err(|message| ConfigError::Validation { message })
    }
}

/// Default configuration values
pub mod defaults {
    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    /// One retry on transient failures
    pub const MAX_RETRIES: u32 = 1;

    /// Delay before the retry in milliseconds
    pub const RETRY_DELAY_MS: u64 = 1000;

    /// Politeness limit towards the letting site
    pub const MAX_REQUESTS_PER_SECOND: u32 = 5;

    /// Detail pages fetched concurrently
    pub const MAX_CONCURRENT_DETAILS: usize = 4;

    /// Deadline for one fetch including its retry
    pub const FETCH_DEADLINE_SECONDS: u64 = 75;

    pub const USER_AGENT: &str =
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) letting-scraper/0.1";
}
