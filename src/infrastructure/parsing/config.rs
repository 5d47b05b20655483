//! Parsing configuration for HTML extraction
//!
//! Header labels, vocabularies, CSS selectors and detail-page field labels.
//! Everything the extractors match against lives here so that markup drift on
//! the letting site is a configuration change, not a code change.

use serde::{Deserialize, Serialize};

use crate::domain::constants::{DEFAULT_COUNTIES, KNOWN_STATUSES};

/// Main parsing configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    /// Repository page rules
    pub listing: ListingLabels,

    /// Contract detail page rules
    pub detail: DetailLabels,
}

/// Rules for locating the contract table on a repository page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingLabels {
    /// Header text identifying the county column
    pub county_headers: Vec<String>,

    /// Header text identifying the status column
    pub status_headers: Vec<String>,

    /// Header text identifying the contract identifier column (optional column)
    pub contract_id_headers: Vec<String>,

    /// Selectors for the detail link inside a row, tried in order
    pub detail_link_selectors: Vec<String>,

    /// Link texts that say nothing about the contract ("View", "Details")
    pub generic_link_texts: Vec<String>,

    /// Canonical county spellings
    pub known_counties: Vec<String>,

    /// Canonical status spellings
    pub known_statuses: Vec<String>,
}

impl Default for ListingLabels {
    fn default() -> Self {
        Self {
            county_headers: strings(&["county"]),
            status_headers: strings(&["status"]),
            contract_id_headers: strings(&["contract", "item", "number"]),
            detail_link_selectors: strings(&["a[href*='LbContractDetail']", "a[href]"]),
            generic_link_texts: strings(&["view", "details", "detail", "view details", "more", "more info", "open", "link"]),
            known_counties: strings(DEFAULT_COUNTIES),
            known_statuses: strings(KNOWN_STATUSES),
        }
    }
}

/// Rules for reading award fields off a contract detail page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailLabels {
    /// Main content region, first match wins
    pub content_region_selectors: Vec<String>,

    pub low_bidder: Vec<String>,
    pub bid_amount: Vec<String>,
    pub awardee: Vec<String>,

    /// Cell values that mean "no value"
    pub placeholder_values: Vec<String>,
}

impl Default for DetailLabels {
    fn default() -> Self {
        Self {
            content_region_selectors: strings(&["#main-content", "main", "#content", ".content", "body"]),
            low_bidder: strings(&["low bidder", "lowest bidder", "apparent low bidder"]),
            bid_amount: strings(&["low bid amount", "bid amount", "low bid", "lowest bid", "amount"]),
            awardee: strings(&["awardee", "awarded to", "award to", "contractor awarded"]),
            placeholder_values: strings(&["-", "--", "n/a", "na", "tbd", "not found", "none"]),
        }
    }
}

impl ParsingConfig {
    /// Every label set must have at least one entry
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("listing.county_headers", &self.listing.county_headers),
            ("listing.status_headers", &self.listing.status_headers),
            ("listing.detail_link_selectors", &self.listing.detail_link_selectors),
            ("detail.content_region_selectors", &self.detail.content_region_selectors),
            ("detail.low_bidder", &self.detail.low_bidder),
            ("detail.bid_amount", &self.detail.bid_amount),
            ("detail.awardee", &self.detail.awardee),
        ];

        for (name, values) in required {
            if values.iter().all(|v| v.trim().is_empty()) {
                return Err(format!("{name} must contain at least one entry"));
            }
        }
        Ok(())
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}
