//! Text helpers shared by the listing and detail parsers

use regex::Regex;
use rust_decimal::Decimal;
use scraper::{ElementRef, Selector};
use std::str::FromStr;
use std::sync::LazyLock;

use super::{ParsingError, ParsingResult};

static CURRENCY_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)usd|[\s$,\u{00a0}]").expect("currency pattern is valid"));

/// Visible text of an element with runs of whitespace collapsed to one space
pub fn element_text(element: &ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a label cell for comparison: collapsed, lower-cased, trailing colon dropped
pub fn normalize_label_text(text: &str) -> String {
    collapse_whitespace(text)
        .trim_end_matches(':')
        .trim()
        .to_lowercase()
}

/// Parse a currency amount such as `$1,234,567.89`.
///
/// Currency symbols, thousands separators and whitespace are stripped; any
/// other leftover character makes the value absent.
pub fn parse_currency(text: &str) -> Option<Decimal> {
    let stripped = CURRENCY_NOISE.replace_all(text, "");
    if stripped.is_empty() {
        return None;
    }
    Decimal::from_str(&stripped).ok()
}

/// Compile selector strings, failing on the first invalid one
pub fn compile_selectors(selector_strings: &[String]) -> ParsingResult<Vec<Selector>> {
    selector_strings
        .iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| Selector::parse(s).map_err(|e| ParsingError::invalid_selector(s, e)))
        .collect()
}

/// Compile a selector known at build time
pub fn static_selector(selector: &str) -> ParsingResult<Selector> {
    Selector::parse(selector).map_err(|e| ParsingError::invalid_selector(selector, e))
}
