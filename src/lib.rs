//! Letting Scraper - contract award extraction for bid-letting repository pages
//!
//! Given one repository page listing many contracts, the pipeline filters them
//! by county and status, visits each matching contract's detail page, extracts
//! the award fields and assembles a delimited-text export.

// Module declarations
pub mod application;
pub mod commands;
pub mod domain;
pub mod infrastructure;

// Re-export the invocation contract for easier access
pub use application::{Pipeline, PipelineOutput, ScrapeError, ScrapeRequest, ScrapeResponse};
pub use commands::{scrape_repository, scrape_repository_with_config, validate_repository_url};
pub use domain::{ContractResult, ContractSummary, ExtractionOutcome, FilterCriteria, RunSummary};
pub use infrastructure::{PageFetcher, ScraperConfig};
