//! Run-level errors
//!
//! Only listing-level problems end a run. Per-contract failures are data and
//! never surface here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::export::ExportError;
use crate::infrastructure::{FetchError, ParsingError};

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Invalid repository URL '{url}': {reason}")]
    InvalidInput { url: String, reason: String },

    #[error("Failed to fetch repository page: {0}")]
    ListingFetch(#[source] FetchError),

    #[error("Failed to parse repository page: {0}")]
    ListingParse(#[source] ParsingError),

    #[error("Failed to serialize export table: {0}")]
    Export(#[from] ExportError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Error categories reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    ListingUnreachable,
    ListingMalformed,
    Internal,
}

impl ScrapeError {
    pub fn invalid_input(url: &str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::ListingFetch(_) => ErrorKind::ListingUnreachable,
            Self::ListingParse(_) => ErrorKind::ListingMalformed,
            Self::Export(_) | Self::Configuration(_) => ErrorKind::Internal,
        }
    }
}

impl From<ParsingError> for ScrapeError {
    fn from(error: ParsingError) -> Self {
        match error {
            ParsingError::InvalidSelector { .. } => Self::Configuration(error.to_string()),
            other => Self::ListingParse(other),
        }
    }
}
