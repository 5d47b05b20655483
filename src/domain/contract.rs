//! Contract records produced by the listing and detail parsers

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// One row of the repository table, before detail-page enrichment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractSummary {
    /// Source-assigned contract identifier
    pub contract_id: String,

    /// County as shown on the listing (canonical spelling when recognized)
    pub county: String,

    /// Letting status as shown on the listing
    pub status: String,

    /// Absolute link to the contract detail page
    pub detail_url: Url,

    /// Position of the data row within the listing table
    pub row_index: usize,
}

/// The award fields a detail page can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AwardField {
    LowBidderName,
    BidAmount,
    Awardee,
}

impl AwardField {
    /// Fixed order used for missing-field reporting
    pub const ALL: [Self; 3] = [Self::LowBidderName, Self::BidAmount, Self::Awardee];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LowBidderName => "lowBidderName",
            Self::BidAmount => "bidAmount",
            Self::Awardee => "awardee",
        }
    }
}

impl fmt::Display for AwardField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Award fields extracted from one detail page, each independently optional
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwardFields {
    pub low_bidder_name: Option<String>,
    pub bid_amount: Option<Decimal>,
    pub awardee: Option<String>,
}

impl AwardFields {
    /// Fields that are absent, in [`AwardField::ALL`] order
    pub fn missing(&self) -> Vec<AwardField> {
        AwardField::ALL
            .into_iter()
            .filter(|field| match field {
                AwardField::LowBidderName => self.low_bidder_name.is_none(),
                AwardField::BidAmount => self.bid_amount.is_none(),
                AwardField::Awardee => self.awardee.is_none(),
            })
            .collect()
    }
}

/// How far extraction got for one contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExtractionOutcome {
    Success,
    #[serde(rename_all = "camelCase")]
    PartialSuccess { missing_fields: Vec<AwardField> },
    Failure { reason: String },
}

impl ExtractionOutcome {
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }
}

impl fmt::Display for ExtractionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::PartialSuccess { missing_fields } => {
                let names: Vec<&str> = missing_fields.iter().map(|m| m.as_str()).collect();
                write!(f, "partial (missing {})", names.join(", "))
            }
            Self::Failure { reason } => write!(f, "failure ({reason})"),
        }
    }
}

/// A contract after its detail page has been visited
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractResult {
    pub contract_id: String,
    pub county: String,
    pub status: String,
    pub detail_url: Url,
    pub low_bidder_name: Option<String>,
    pub bid_amount: Option<Decimal>,
    pub awardee: Option<String>,
    pub outcome: ExtractionOutcome,
}

impl ContractResult {
    /// Build a result from parsed award fields; the outcome follows from which fields are present
    pub fn from_fields(summary: ContractSummary, fields: AwardFields) -> Self {
        let missing = fields.missing();
        let outcome = if missing.is_empty() {
            ExtractionOutcome::Success
        } else {
            ExtractionOutcome::PartialSuccess { missing_fields: missing }
        };

        Self {
            contract_id: summary.contract_id,
            county: summary.county,
            status: summary.status,
            detail_url: summary.detail_url,
            low_bidder_name: fields.low_bidder_name,
            bid_amount: fields.bid_amount,
            awardee: fields.awardee,
            outcome,
        }
    }

    /// Build a failed result; no award fields are kept
    pub fn failed(summary: ContractSummary, reason: impl Into<String>) -> Self {
        Self {
            contract_id: summary.contract_id,
            county: summary.county,
            status: summary.status,
            detail_url: summary.detail_url,
            low_bidder_name: None,
            bid_amount: None,
            awardee: None,
            outcome: ExtractionOutcome::Failure { reason: reason.into() },
        }
    }

    /// Success and partial results go to the export table
    pub const fn is_exportable(&self) -> bool {
        !self.outcome.is_failure()
    }
}
