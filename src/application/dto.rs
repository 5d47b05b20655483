//! Request and response types for the invocation contract
//!
//! These cross the boundary to the (external) front end, so field names are
//! camelCase JSON.

use serde::{Deserialize, Serialize};

use super::error::{ErrorKind, ScrapeError};
use crate::domain::constants::{DEFAULT_COUNTIES, DEFAULT_STATUSES};
use crate::domain::{FilterCriteria, RunSummary};
use crate::infrastructure::ExportPayload;

/// One scrape request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest {
    /// Absolute http(s) URL of the repository page
    pub repository_url: String,

    /// Counties to keep; the Chicago-metro set when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_counties: Option<Vec<String>>,

    /// Statuses to keep; Active, Executed and Awarded when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_statuses: Option<Vec<String>>,
}

impl ScrapeRequest {
    pub fn new(repository_url: impl Into<String>) -> Self {
        Self {
            repository_url: repository_url.into(),
            allowed_counties: None,
            allowed_statuses: None,
        }
    }

    /// Filter criteria with defaults filled in
    pub fn criteria(&self) -> FilterCriteria {
        let counties: Vec<&str> = self.allowed_counties.as_ref().map_or_else(
            || DEFAULT_COUNTIES.to_vec(),
            |c| c.iter().map(String::as_str).collect(),
        );
        let statuses: Vec<&str> = self.allowed_statuses.as_ref().map_or_else(
            || DEFAULT_STATUSES.to_vec(),
            |s| s.iter().map(String::as_str).collect(),
        );
        FilterCriteria::new(counties, statuses)
    }
}

/// Error body returned when a run cannot produce a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ScrapeError> for ErrorBody {
    fn from(error: &ScrapeError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Outcome of one scrape request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ScrapeResponse {
    #[serde(rename_all = "camelCase")]
    Completed {
        run_summary: RunSummary,
        export_payload: ExportPayload,
        message: String,
    },
    Failed { error: ErrorBody },
}

impl ScrapeResponse {
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

impl From<ScrapeError> for ScrapeResponse {
    fn from(error: ScrapeError) -> Self {
        Self::Failed {
            error: ErrorBody::from(&error),
        }
    }
}
