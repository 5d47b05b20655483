//! Domain layer for contract award extraction
//!
//! Plain data types and pure rules: listing summaries, per-contract results,
//! the jurisdiction/status filter and the run aggregates.

pub mod constants;
pub mod contract;
pub mod filter;
pub mod summary;

pub use contract::{AwardField, AwardFields, ContractResult, ContractSummary, ExtractionOutcome};
pub use filter::FilterCriteria;
pub use summary::{ExportRow, ExportTable, FailureEntry, RunSummary};
