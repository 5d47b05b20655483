//! Export table serialization
//!
//! Writes the export table as delimited text with a fixed header row. Quoting
//! of embedded delimiters, quotes and line breaks is left to the `csv` writer;
//! bid amounts are rendered with fixed decimal precision.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::summary::EXPORT_COLUMNS;
use crate::domain::{ExportRow, ExportTable};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write export row: {0}")]
    Write(#[from] csv::Error),

    #[error("Failed to finish export: {0}")]
    Flush(String),

    #[error("Export is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Delimited text flavours offered for download
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Tsv,
}

impl ExportFormat {
    pub const fn delimiter(self) -> u8 {
        match self {
            Self::Csv => b',',
            Self::Tsv => b'\t',
        }
    }

    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Tsv => "text/tab-separated-values",
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
        }
    }
}

/// Serialized table ready for client-side download
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    pub content_type: String,
    pub file_name: String,
    pub body: String,
}

/// Turns an export table into delimited text
#[derive(Debug, Clone, Copy)]
pub struct TableSerializer {
    format: ExportFormat,
    amount_scale: u32,
}

impl Default for TableSerializer {
    fn default() -> Self {
        Self::new(ExportFormat::Csv)
    }
}

impl TableSerializer {
    pub const fn new(format: ExportFormat) -> Self {
        Self { format, amount_scale: 2 }
    }

    /// Digits after the decimal point for bid amounts
    #[must_use]
    pub const fn with_amount_scale(mut self, scale: u32) -> Self {
        self.amount_scale = scale;
        self
    }

    pub const fn format(&self) -> ExportFormat {
        self.format
    }

    /// Render an amount with exactly `amount_scale` decimals, half-cents rounded up
    pub fn format_amount(&self, amount: Decimal) -> String {
        let mut rounded = amount.round_dp_with_strategy(self.amount_scale, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(self.amount_scale);
        rounded.to_string()
    }

    fn record(&self, row: &ExportRow) -> [String; 6] {
        [
            row.contract_id.clone(),
            row.county.clone(),
            row.status.clone(),
            row.low_bidder_name.clone().unwrap_or_default(),
            row.bid_amount.map(|a| self.format_amount(a)).unwrap_or_default(),
            row.awardee.clone().unwrap_or_default(),
        ]
    }

    /// Header row plus one line per exported contract
    pub fn serialize(&self, table: &ExportTable) -> Result<String, ExportError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.format.delimiter())
            .from_writer(Vec::new());

        writer.write_record(EXPORT_COLUMNS)?;
        for row in table.rows() {
            writer.write_record(self.record(row))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ExportError::Flush(e.error().to_string()))?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Serialize and wrap with download metadata
    pub fn payload(&self, table: &ExportTable, generated_at: DateTime<Utc>) -> Result<ExportPayload, ExportError> {
        Ok(ExportPayload {
            content_type: self.format.content_type().to_string(),
            file_name: format!(
                "contract-awards-{}.{}",
                generated_at.format("%Y%m%d-%H%M%S"),
                self.format.extension()
            ),
            body: self.serialize(table)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AwardFields, ContractResult, ContractSummary};
    use chrono::TimeZone;
    use std::str::FromStr;
    use url::Url;

    fn table(rows: Vec<(&str, Option<&str>, Option<&str>, Option<&str>)>) -> ExportTable {
        let mut table = ExportTable::new();
        for (id, bidder, amount, awardee) in rows {
            let summary = ContractSummary {
                contract_id: id.to_string(),
                county: "Cook".to_string(),
                status: "Awarded".to_string(),
                detail_url: Url::parse("https://example.com/d").unwrap(),
                row_index: 0,
            };
            let fields = AwardFields {
                low_bidder_name: bidder.map(ToString::to_string),
                bid_amount: amount.map(|a| Decimal::from_str(a).unwrap()),
                awardee: awardee.map(ToString::to_string),
            };
            table.push(&ContractResult::from_fields(summary, fields));
        }
        table
    }

    #[test]
    fn writes_header_and_fixed_precision_amounts() {
        let out = TableSerializer::default()
            .serialize(&table(vec![("62A01", Some("Acme"), Some("10"), None)]))
            .unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "contractId,county,status,lowBidderName,bidAmount,awardee");
        assert_eq!(lines[1], "62A01,Cook,Awarded,Acme,10.00,");
    }

    #[test]
    fn quotes_embedded_delimiters() {
        let out = TableSerializer::default()
            .serialize(&table(vec![("1", Some("Smith, Jones \"& Sons\""), None, None)]))
            .unwrap();
        assert!(out.contains("\"Smith, Jones \"\"& Sons\"\"\""));
    }

    #[test]
    fn empty_table_is_header_only() {
        let out = TableSerializer::default().serialize(&ExportTable::new()).unwrap();
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn amount_rounding() {
        let serializer = TableSerializer::default();
        assert_eq!(serializer.format_amount(Decimal::from_str("1234567.89").unwrap()), "1234567.89");
        assert_eq!(serializer.format_amount(Decimal::from_str("0.005").unwrap()), "0.01");
        assert_eq!(serializer.with_amount_scale(0).format_amount(Decimal::from_str("99.5").unwrap()), "100");
    }

    #[test]
    fn tsv_payload_metadata() {
        let generated = Utc.with_ymd_and_hms(2024, 11, 8, 14, 30, 0).unwrap();
        let payload = TableSerializer::new(ExportFormat::Tsv)
            .payload(&table(vec![("1", Some("A"), Some("1"), Some("A"))]), generated)
            .unwrap();
        assert_eq!(payload.content_type, "text/tab-separated-values");
        assert_eq!(payload.file_name, "contract-awards-20241108-143000.tsv");
        assert!(payload.body.starts_with("contractId\tcounty"));
    }
}
