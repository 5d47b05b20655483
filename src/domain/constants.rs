//! Site vocabulary for the Illinois DOT letting pages
//!
//! Canonical spellings of the county and status values that appear in the
//! repository table. Matching is always trimmed and case-insensitive.

/// Chicago-metro counties selected when a request names none
pub const DEFAULT_COUNTIES: &[&str] = &[
    "Boone", "Cook", "DuPage", "Grundy", "Kane", "Kendall", "Lake", "McHenry", "Will", "Various",
];

/// Contract statuses selected when a request names none
pub const DEFAULT_STATUSES: &[&str] = &["Active", "Executed", "Awarded"];

/// Every status the letting site is known to publish
pub const KNOWN_STATUSES: &[&str] = &[
    "Active", "Executed", "Awarded", "Rejected", "Cancelled", "Deferred", "Pending",
];

/// Trim and lower-case a label for set membership checks
pub fn normalize_label(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Map a raw cell value onto its canonical spelling, passing unknown values through trimmed
pub fn canonicalize<'a>(raw: &str, vocabulary: impl IntoIterator<Item = &'a str>) -> String {
    let trimmed = raw.trim();
    vocabulary
        .into_iter()
        .find(|known| known.eq_ignore_ascii_case(trimmed))
        .map_or_else(|| trimmed.to_string(), ToString::to_string)
}
