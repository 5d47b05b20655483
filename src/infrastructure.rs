//! Infrastructure layer: HTTP fetching, HTML parsing, export and configuration
//!
//! Everything that touches the network, markup or output formats lives here;
//! the domain layer stays pure.

pub mod config; // Configuration loading and defaults
pub mod export; // Delimited-text table serializer
pub mod http_client;
pub mod logging; // Logging infrastructure
pub mod parsing; // Listing and detail page parsers
pub mod parsing_error;
pub mod retry; // Fixed-delay retry for transient fetch failures

// Re-export commonly used items
pub use config::{ConfigError, LogOutput, LoggingConfig, PipelineConfig, ScraperConfig};
pub use export::{ExportFormat, ExportPayload, TableSerializer};
pub use http_client::{FetchError, HttpClient, HttpClientConfig, PageFetcher};
pub use logging::{init_logging, init_logging_with_config};
pub use retry::{fetch_with_retry, RetryPolicy};
pub use parsing::{ContextualParser, DetailParser, ListingParser, ParsingConfig, ParsingError, ParsingResult};
