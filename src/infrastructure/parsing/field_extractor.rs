//! Named award-field extractors
//!
//! The detail parser gathers label/value candidates from the page in document
//! order; each extractor then picks its field out of that list. Extractors are
//! independent, so one unreadable field never affects another.

use rust_decimal::Decimal;
use std::collections::HashSet;

use super::config::DetailLabels;
use super::text::{normalize_label_text, parse_currency};
use crate::domain::{AwardField, AwardFields};

/// A label followed by its value somewhere in the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledValue {
    /// Normalized label text
    pub label: String,

    /// Raw value text, whitespace collapsed
    pub value: String,

    /// Index into the collected table rows when the pair came from a table
    pub row: Option<usize>,
}

/// How an extractor interprets its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Currency,
}

/// Result of one extractor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Amount(Decimal),
}

/// Extracts one award field by label
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    pub field: AwardField,
    pub kind: ValueKind,
    labels: HashSet<String>,
}

impl FieldExtractor {
    pub fn new(field: AwardField, kind: ValueKind, labels: &[String]) -> Self {
        Self {
            field,
            kind,
            labels: labels
                .iter()
                .map(|l| normalize_label_text(l))
                .filter(|l| !l.is_empty())
                .collect(),
        }
    }

    pub fn accepts(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// First candidate carrying one of this extractor's labels
    pub fn locate<'a>(&self, candidates: &'a [LabeledValue]) -> Option<&'a LabeledValue> {
        candidates.iter().find(|c| self.accepts(&c.label))
    }

    /// Interpret a located value; placeholders and unparseable amounts are absences
    pub fn interpret(&self, raw: &str, placeholders: &HashSet<String>) -> Option<FieldValue> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || placeholders.contains(&trimmed.to_lowercase()) {
            return None;
        }
        match self.kind {
            ValueKind::Text => Some(FieldValue::Text(trimmed.to_string())),
            ValueKind::Currency => parse_currency(trimmed).map(FieldValue::Amount),
        }
    }
}

/// The ordered extractor set for a detail page
#[derive(Debug, Clone)]
pub struct AwardExtractors {
    extractors: Vec<FieldExtractor>,
    placeholders: HashSet<String>,
}

impl AwardExtractors {
    pub fn from_labels(labels: &DetailLabels) -> Self {
        Self {
            extractors: vec![
                FieldExtractor::new(AwardField::LowBidderName, ValueKind::Text, &labels.low_bidder),
                FieldExtractor::new(AwardField::BidAmount, ValueKind::Currency, &labels.bid_amount),
                FieldExtractor::new(AwardField::Awardee, ValueKind::Text, &labels.awardee),
            ],
            placeholders: labels
                .placeholder_values
                .iter()
                .map(|p| p.trim().to_lowercase())
                .collect(),
        }
    }

    /// True when any extractor recognizes the label
    pub fn is_known_label(&self, label: &str) -> bool {
        self.extractors.iter().any(|e| e.accepts(label))
    }

    /// Run every extractor over the candidates.
    ///
    /// `rows` holds the cell texts of the table rows the candidates point at.
    /// When no bid amount label exists at all, a `$` cell on the low bidder's
    /// row (or the row after it) stands in for the amount.
    pub fn extract(&self, candidates: &[LabeledValue], rows: &[Vec<String>]) -> AwardFields {
        let mut fields = AwardFields::default();
        let mut low_bidder_row = None;
        let mut amount_labeled = false;

        for extractor in &self.extractors {
            let Some(candidate) = extractor.locate(candidates) else {
                continue;
            };
            let value = extractor.interpret(&candidate.value, &self.placeholders);

            match (extractor.field, value) {
                (AwardField::LowBidderName, Some(FieldValue::Text(name))) => {
                    low_bidder_row = candidate.row;
                    fields.low_bidder_name = Some(name);
                }
                (AwardField::BidAmount, value) => {
                    amount_labeled = true;
                    if let Some(FieldValue::Amount(amount)) = value {
                        fields.bid_amount = Some(amount);
                    }
                }
                (AwardField::Awardee, Some(FieldValue::Text(name))) => {
                    fields.awardee = Some(name);
                }
                _ => {}
            }
        }

        if !amount_labeled {
            if let Some(row) = low_bidder_row {
                fields.bid_amount = dollar_cell(rows, row);
            }
        }

        fields
    }
}

fn dollar_cell(rows: &[Vec<String>], row: usize) -> Option<Decimal> {
    rows.iter()
        .skip(row)
        .take(2)
        .flat_map(|cells| cells.iter())
        .filter(|cell| cell.contains('$'))
        .find_map(|cell| parse_currency(cell))
}
