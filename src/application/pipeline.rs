//! Pipeline orchestrator
//!
//! Drives one run: fetch listing → parse → filter → scrape details → aggregate.
//! Listing problems abort the run. Each detail page is isolated: its fetch or
//! parse failure becomes a `Failure` result and the run carries on.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::fmt;
use std::pin::pin;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, info_span, warn, Instrument};
use url::Url;
use uuid::Uuid;

use super::error::ScrapeError;
use crate::domain::{ContractResult, ContractSummary, ExportTable, ExtractionOutcome, FilterCriteria, RunSummary};
use crate::infrastructure::config::{PipelineConfig, ScraperConfig};
use crate::infrastructure::parsing::{
    ContextualParser, DetailContext, DetailParser, ListingContext, ListingParser, ParsingConfig,
};
use crate::infrastructure::{FetchError, HttpClient, PageFetcher};

/// Stage of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    FetchingListing,
    ParsingListing,
    Filtering,
    ScrapingDetails,
    Aggregating,
    Done,
    ListingFetchFailed,
    ListingParseFailed,
}

impl RunState {
    /// Next stage on the success path; terminal states stay put
    pub const fn next(self) -> Self {
        match self {
            Self::FetchingListing => Self::ParsingListing,
            Self::ParsingListing => Self::Filtering,
            Self::Filtering => Self::ScrapingDetails,
            Self::ScrapingDetails => Self::Aggregating,
            Self::Aggregating | Self::Done => Self::Done,
            Self::ListingFetchFailed => Self::ListingFetchFailed,
            Self::ListingParseFailed => Self::ListingParseFailed,
        }
    }

    /// Terminal failure for the listing stages; later stages cannot fail the run
    pub const fn failed(self) -> Self {
        match self {
            Self::FetchingListing => Self::ListingFetchFailed,
            Self::ParsingListing => Self::ListingParseFailed,
            other => other,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::ListingFetchFailed | Self::ListingParseFailed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FetchingListing => "fetching listing",
            Self::ParsingListing => "parsing listing",
            Self::Filtering => "filtering",
            Self::ScrapingDetails => "scraping details",
            Self::Aggregating => "aggregating",
            Self::Done => "done",
            Self::ListingFetchFailed => "listing fetch failed",
            Self::ListingParseFailed => "listing parse failed",
        };
        f.write_str(name)
    }
}

/// Tracks the run state and logs each transition
#[derive(Debug)]
struct RunTracker {
    state: RunState,
}

impl RunTracker {
    const fn new() -> Self {
        Self {
            state: RunState::FetchingListing,
        }
    }

    fn advance(&mut self) {
        let next = self.state.next();
        debug!("Run state: {} -> {}", self.state, next);
        self.state = next;
    }

    fn fail(&mut self) -> RunState {
        let failed = self.state.failed();
        debug!("Run state: {} -> {}", self.state, failed);
        self.state = failed;
        failed
    }
}

/// Progress after one contract has been processed
#[derive(Debug, Clone)]
pub struct ContractProgress<'a> {
    /// 1-based position among the matched contracts
    pub index: usize,
    pub total: usize,
    pub contract_id: &'a str,
    pub outcome: &'a ExtractionOutcome,
}

/// Receives per-contract progress, e.g. for a front end progress bar
pub trait ProgressObserver: Send + Sync {
    fn on_contract(&self, progress: &ContractProgress<'_>);
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub table: ExportTable,
    pub summary: RunSummary,
    /// Every matched contract in listing order, failures included
    pub results: Vec<ContractResult>,
}

/// The extraction pipeline over some page fetcher
pub struct Pipeline<F: PageFetcher> {
    fetcher: F,
    listing_parser: ListingParser,
    detail_parser: DetailParser,
    config: PipelineConfig,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl Pipeline<HttpClient> {
    /// Production pipeline backed by reqwest
    pub fn from_config(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        let client = HttpClient::new(config.http.clone())
            .map_err(|e| ScrapeError::Configuration(e.to_string()))?;
        Self::with_parsing(client, &config.parsing, config.pipeline.clone())
    }
}

impl<F: PageFetcher> Pipeline<F> {
    /// Pipeline with the default site labels
    pub fn new(fetcher: F, config: PipelineConfig) -> Result<Self, ScrapeError> {
        Self::with_parsing(fetcher, &ParsingConfig::default(), config)
    }

    pub fn with_parsing(fetcher: F, parsing: &ParsingConfig, config: PipelineConfig) -> Result<Self, ScrapeError> {
        Ok(Self {
            fetcher,
            listing_parser: ListingParser::with_config(&parsing.listing)?,
            detail_parser: DetailParser::with_config(&parsing.detail)?,
            config,
            observer: None,
        })
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub const fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Run the whole pipeline for one repository page
    pub async fn run(&self, repository_url: &Url, criteria: &FilterCriteria) -> Result<PipelineOutput, ScrapeError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("scrape_run", %run_id, repository_url = %repository_url);
        self.execute(run_id, repository_url, criteria).instrument(span).await
    }

    async fn execute(
        &self,
        run_id: Uuid,
        repository_url: &Url,
        criteria: &FilterCriteria,
    ) -> Result<PipelineOutput, ScrapeError> {
        let mut tracker = RunTracker::new();
        let mut summary = RunSummary::new(run_id, Utc::now());
        info!("Starting run for {}", repository_url);

        let html = match self.fetch(repository_url, self.config.listing_timeout()).await {
            Ok(html) => html,
            Err(error) => {
                tracker.fail();
                warn!("Repository page unreachable: {}", error);
                return Err(ScrapeError::ListingFetch(error));
            }
        };
        tracker.advance();

        let listing = match self
            .listing_parser
            .parse_document(&html, &ListingContext::new(repository_url.clone()))
        {
            Ok(listing) => listing,
            Err(error) => {
                tracker.fail();
                warn!("Repository page malformed: {}", error);
                return Err(ScrapeError::ListingParse(error));
            }
        };
        tracker.advance();

        summary.total_listed = listing.summaries.len();
        summary.malformed_rows = listing.diagnostics.len();
        let selected: Vec<ContractSummary> = criteria
            .select(&listing.summaries)
            .into_iter()
            .cloned()
            .collect();
        summary.total_matched_filter = selected.len();
        info!(
            "{} contracts listed, {} matched filter, {} rows skipped",
            summary.total_listed, summary.total_matched_filter, summary.malformed_rows
        );
        tracker.advance();

        let results = self.scrape_details(selected).await;
        tracker.advance();

        let mut table = ExportTable::new();
        for result in &results {
            summary.record(result);
            table.push(result);
        }
        let summary = summary.finish(Utc::now());
        tracker.advance();

        info!(
            "Run finished: {} succeeded, {} failed, {} exported",
            summary.total_succeeded,
            summary.total_failed,
            table.len()
        );
        debug_assert!(tracker.state.is_terminal());

        Ok(PipelineOutput { table, summary, results })
    }

    /// Fetch and parse every selected contract, at most `max_concurrent_details` at a time.
    ///
    /// `buffered` yields in input order, so the results keep listing order no
    /// matter which fetch finishes first.
    async fn scrape_details(&self, selected: Vec<ContractSummary>) -> Vec<ContractResult> {
        let total = selected.len();
        let mut results = Vec::with_capacity(total);
        let mut pending = pin!(
            stream::iter(selected)
                .map(|summary| self.scrape_contract(summary))
                .buffered(self.config.max_concurrent_details.max(1))
        );

        while let Some(result) = pending.next().await {
            if let Some(observer) = &self.observer {
                observer.on_contract(&ContractProgress {
                    index: results.len() + 1,
                    total,
                    contract_id: &result.contract_id,
                    outcome: &result.outcome,
                });
            }
            results.push(result);
        }
        results
    }

    /// One contract, with every error turned into a `Failure` result
    async fn scrape_contract(&self, summary: ContractSummary) -> ContractResult {
        let html = match self.fetch(&summary.detail_url, self.config.detail_timeout()).await {
            Ok(html) => html,
            Err(error) => {
                warn!("Contract {}: fetch failed: {}", summary.contract_id, error);
                return ContractResult::failed(summary, error.reason());
            }
        };

        let context = DetailContext::new(summary.contract_id.clone(), summary.detail_url.clone());
        match self.detail_parser.parse_document(&html, &context) {
            Ok(fields) => {
                let result = ContractResult::from_fields(summary, fields);
                debug!("Contract {}: {}", result.contract_id, result.outcome);
                result
            }
            Err(error) => {
                warn!("Contract {}: {}", summary.contract_id, error);
                ContractResult::failed(summary, error.reason())
            }
        }
    }

    async fn fetch(&self, url: &Url, deadline: std::time::Duration) -> Result<String, FetchError> {
        timeout(deadline, self.fetcher.fetch_html(url))
            .await
            .unwrap_or_else(|_| Err(FetchError::Timeout { url: url.to_string() }))
    }
}
