//! HTML parsing infrastructure
//!
//! Trait-based parsers for the two page kinds the scraper visits: the
//! repository listing and the per-contract detail page.

pub mod config;
pub mod context;
pub mod detail_parser;
pub mod error;
pub mod field_extractor;
pub mod listing_parser;
pub mod text;

// Re-export public types
pub use config::{DetailLabels, ListingLabels, ParsingConfig};
pub use context::{DetailContext, ListingContext};
pub use detail_parser::DetailParser;
pub use error::{ParsingError, ParsingResult};
pub use listing_parser::{ListingDiagnostic, ListingParse, ListingParser};

use scraper::Html;

/// Parser trait with context support
pub trait ContextualParser {
    type Output;
    type Context;

    /// Parse an already-built document with contextual information
    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output>;

    /// Build the document from raw HTML and parse it.
    ///
    /// The `Html` tree is not `Send`, so it never outlives this call.
    fn parse_document(&self, html: &str, context: &Self::Context) -> ParsingResult<Self::Output> {
        let document = Html::parse_document(html);
        self.parse_with_context(&document, context)
    }
}
