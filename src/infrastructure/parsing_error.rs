//! Parsing error types for the listing and detail parsers
//!
//! Page-level failures only. A missing award field is not an error; it is
//! reported through `ExtractionOutcome::PartialSuccess`.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    #[error("Malformed listing: {reason}")]
    MalformedListing {
        reason: String,
        tried_labels: Vec<String>,
    },

    #[error("Detail page has no content block ({reason})")]
    MissingContentBlock { reason: String, url: Option<String> },

    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },
}

impl ParsingError {
    /// Create a malformed listing error listing the header labels that were looked for
    pub fn malformed_listing(reason: &str, tried_labels: Vec<String>) -> Self {
        Self::MalformedListing {
            reason: reason.to_string(),
            tried_labels,
        }
    }

    pub fn missing_content_block(reason: &str, url: Option<&str>) -> Self {
        Self::MissingContentBlock {
            reason: reason.to_string(),
            url: url.map(ToString::to_string),
        }
    }

    pub fn invalid_selector(selector: &str, reason: impl ToString) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Short text recorded against a contract in the run summary
    pub fn reason(&self) -> String {
        match self {
            Self::MalformedListing { reason, .. } => format!("malformed listing: {reason}"),
            Self::MissingContentBlock { reason, .. } => format!("unexpected page layout: {reason}"),
            Self::InvalidSelector { selector, .. } => format!("invalid selector {selector}"),
        }
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;
