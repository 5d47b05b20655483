//! Run aggregates: the export table and the run summary

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::contract::{ContractResult, ExtractionOutcome};

/// One failed contract, as reported to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureEntry {
    pub contract_id: String,
    pub reason: String,
}

/// Aggregate counts for one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub run_id: Uuid,
    pub total_listed: usize,
    pub total_matched_filter: usize,
    pub total_succeeded: usize,
    pub total_failed: usize,
    /// Listing rows skipped because they carried no usable detail link
    pub malformed_rows: usize,
    pub failures: Vec<FailureEntry>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunSummary {
    pub fn new(run_id: Uuid, started_at: DateTime<Utc>) -> Self {
        Self {
            run_id,
            total_listed: 0,
            total_matched_filter: 0,
            total_succeeded: 0,
            total_failed: 0,
            malformed_rows: 0,
            failures: Vec::new(),
            started_at,
            finished_at: None,
        }
    }

    /// Count one contract outcome
    pub fn record(&mut self, result: &ContractResult) {
        match &result.outcome {
            ExtractionOutcome::Failure { reason } => {
                self.total_failed += 1;
                self.failures.push(FailureEntry {
                    contract_id: result.contract_id.clone(),
                    reason: reason.clone(),
                });
            }
            ExtractionOutcome::Success | ExtractionOutcome::PartialSuccess { .. } => {
                self.total_succeeded += 1;
            }
        }
    }

    /// Stamp the completion time
    #[must_use]
    pub fn finish(mut self, finished_at: DateTime<Utc>) -> Self {
        self.finished_at = Some(finished_at);
        self
    }
}

/// Fixed export column order
pub const EXPORT_COLUMNS: [&str; 6] =
    ["contractId", "county", "status", "lowBidderName", "bidAmount", "awardee"];

/// One exported contract row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub contract_id: String,
    pub county: String,
    pub status: String,
    pub low_bidder_name: Option<String>,
    pub bid_amount: Option<Decimal>,
    pub awardee: Option<String>,
}

impl From<&ContractResult> for ExportRow {
    fn from(result: &ContractResult) -> Self {
        Self {
            contract_id: result.contract_id.clone(),
            county: result.county.clone(),
            status: result.status.clone(),
            low_bidder_name: result.low_bidder_name.clone(),
            bid_amount: result.bid_amount,
            awardee: result.awardee.clone(),
        }
    }
}

/// Ordered export rows; failed contracts never appear here
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTable {
    rows: Vec<ExportRow>,
}

impl ExportTable {
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Append a result if it is exportable; returns whether a row was added
    pub fn push(&mut self, result: &ContractResult) -> bool {
        if !result.is_exportable() {
            return false;
        }
        self.rows.push(ExportRow::from(result));
        true
    }

    pub fn rows(&self) -> &[ExportRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
