//! Contract detail parser
//!
//! Reads the low bidder, bid amount and awardee off one contract detail page.
//! Label/value candidates are collected from the main content region in
//! document order (table rows, definition lists, `Label: value` paragraphs)
//! and handed to the named field extractors.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::config::DetailLabels;
use super::context::DetailContext;
use super::field_extractor::{AwardExtractors, LabeledValue};
use super::text::{collapse_whitespace, compile_selectors, element_text, normalize_label_text, static_selector};
use super::{ContextualParser, ParsingError, ParsingResult};
use crate::domain::AwardFields;

/// Parser for contract detail pages
pub struct DetailParser {
    content_region_selectors: Vec<Selector>,
    anchor_selector: Selector,
    block_selector: Selector,
    cell_selector: Selector,
    definition_item_selector: Selector,
    extractors: AwardExtractors,
}

impl DetailParser {
    /// Create a detail parser with the default site labels
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&DetailLabels::default())
    }

    pub fn with_config(labels: &DetailLabels) -> ParsingResult<Self> {
        Ok(Self {
            content_region_selectors: compile_selectors(&labels.content_region_selectors)?,
            anchor_selector: static_selector("table, dl")?,
            block_selector: static_selector("tr, dl, p, li")?,
            cell_selector: static_selector("td, th")?,
            definition_item_selector: static_selector("dt, dd")?,
            extractors: AwardExtractors::from_labels(labels),
        })
    }

    fn content_region<'a>(&self, html: &'a Html) -> Option<ElementRef<'a>> {
        self.content_region_selectors
            .iter()
            .find_map(|selector| html.select(selector).next())
    }

    /// Collect label/value candidates in document order
    fn collect_candidates(&self, region: ElementRef) -> (Vec<LabeledValue>, Vec<Vec<String>>) {
        let mut candidates = Vec::new();
        let mut rows = Vec::new();
        let mut pending_header: Option<(Option<ElementRef>, Vec<String>)> = None;

        for block in region.select(&self.block_selector) {
            match block.value().name() {
                "tr" => {
                    let cells: Vec<ElementRef> = block
                        .children()
                        .filter_map(ElementRef::wrap)
                        .filter(|c| self.cell_selector.matches(c))
                        .collect();
                    let texts: Vec<String> = cells.iter().map(element_text).collect();
                    let row = rows.len();
                    let table = owning_table(block);

                    // Values under a column-header row sit at the same index one row down
                    if let Some((header_table, labels)) = pending_header.take() {
                        if header_table == table {
                            candidates.extend(column_pairs(&labels, &texts, row));
                        }
                    }

                    if self.is_header_row(&cells, &texts) {
                        let labels: Vec<String> = texts.iter().map(|t| normalize_label_text(t)).collect();
                        pending_header = Some((table, labels));
                    } else {
                        candidates.extend(row_pairs(&texts, row));
                    }
                    rows.push(texts);
                }
                "dl" => candidates.extend(self.definition_pairs(block)),
                _ => {
                    let text = block.text().collect::<String>();
                    candidates.extend(text.lines().filter_map(|line| self.colon_pair(line)));
                }
            }
        }

        // A label sitting where a value belongs is layout, not data
        candidates.retain(|c| !self.extractors.is_known_label(&normalize_label_text(&c.value)));
        (candidates, rows)
    }

    /// All-`th` rows, or rows made only of known labels, name the columns below them
    fn is_header_row(&self, cells: &[ElementRef], texts: &[String]) -> bool {
        let filled: Vec<&String> = texts.iter().filter(|t| !t.is_empty()).collect();
        if filled.len() < 2 {
            return false;
        }
        cells.iter().all(|c| c.value().name() == "th")
            || filled
                .iter()
                .all(|t| self.extractors.is_known_label(&normalize_label_text(t)))
    }

    /// Each `dt` with the `dd` elements that follow it, up to the next `dt`
    fn definition_pairs(&self, list: ElementRef) -> Vec<LabeledValue> {
        let mut pairs = Vec::new();
        let mut term: Option<String> = None;

        for item in list.select(&self.definition_item_selector) {
            match item.value().name() {
                "dt" => term = Some(normalize_label_text(&element_text(&item))),
                _ => {
                    if let Some(label) = &term {
                        pairs.push(LabeledValue {
                            label: label.clone(),
                            value: element_text(&item),
                            row: None,
                        });
                    }
                }
            }
        }
        pairs
    }

    /// `Low Bidder: Acme Paving` style text, only for recognized labels
    fn colon_pair(&self, line: &str) -> Option<LabeledValue> {
        let (label, value) = line.split_once(':')?;
        let label = normalize_label_text(label);
        if !self.extractors.is_known_label(&label) {
            return None;
        }
        Some(LabeledValue {
            label,
            value: collapse_whitespace(value),
            row: None,
        })
    }
}

/// Nearest enclosing table of a row
fn owning_table(row: ElementRef<'_>) -> Option<ElementRef<'_>> {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "table")
}

/// Header labels paired by column index with the cells of the row below
fn column_pairs(labels: &[String], cells: &[String], row: usize) -> Vec<LabeledValue> {
    labels
        .iter()
        .zip(cells)
        .filter(|(label, _)| !label.is_empty())
        .map(|(label, value)| LabeledValue {
            label: label.clone(),
            value: value.clone(),
            row: Some(row),
        })
        .collect()
}

/// Every non-empty cell paired with the next non-empty cell of the row
fn row_pairs(cells: &[String], row: usize) -> Vec<LabeledValue> {
    let filled: Vec<&String> = cells.iter().filter(|c| !c.is_empty()).collect();
    filled
        .windows(2)
        .map(|pair| LabeledValue {
            label: normalize_label_text(pair[0]),
            value: pair[1].clone(),
            row: Some(row),
        })
        .collect()
}

impl ContextualParser for DetailParser {
    type Output = AwardFields;
    type Context = DetailContext;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output> {
        debug!("Parsing detail page for contract {} ({})", context.contract_id, context.url);

        let region = self.content_region(html).ok_or_else(|| {
            ParsingError::missing_content_block("no main content region", Some(context.url.as_str()))
        })?;

        if region.select(&self.anchor_selector).next().is_none() {
            return Err(ParsingError::missing_content_block(
                "no table or definition list in content region",
                Some(context.url.as_str()),
            ));
        }

        let (candidates, rows) = self.collect_candidates(region);
        let fields = self.extractors.extract(&candidates, &rows);

        debug!(
            "Contract {}: {} candidates, missing {:?}",
            context.contract_id,
            candidates.len(),
            fields.missing()
        );
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use url::Url;

    fn parse(html: &str) -> ParsingResult<AwardFields> {
        let parser = DetailParser::new().unwrap();
        let context = DetailContext::new(
            "62A01".to_string(),
            Url::parse("https://example.com/LbContractDetail/62A01").unwrap(),
        );
        parser.parse_document(html, &context)
    }

    #[test]
    fn reads_labeled_table_rows() {
        let html = r#"
            <html><body><div id="main-content">
              <table>
                <tr><th>Low Bidder</th><td>Acme Paving Inc.</td></tr>
                <tr><th>Bid Amount</th><td>$1,234,567.89</td></tr>
                <tr><th>Awardee:</th><td>Acme Paving Inc.</td></tr>
              </table>
            </div></body></html>"#;
        let fields = parse(html).unwrap();
        assert_eq!(fields.low_bidder_name.as_deref(), Some("Acme Paving Inc."));
        assert_eq!(fields.bid_amount, Some(Decimal::from_str("1234567.89").unwrap()));
        assert_eq!(fields.awardee.as_deref(), Some("Acme Paving Inc."));
    }

    #[test]
    fn reads_definition_lists_and_colon_text() {
        let html = r#"
            <html><body><main>
              <dl><dt>Low Bidder</dt><dd>Builders United LLC</dd>
                  <dt>Low Bid Amount</dt><dd>$98,000.00</dd></dl>
              <p>Awarded To: Builders United LLC</p>
            </main></body></html>"#;
        let fields = parse(html).unwrap();
        assert_eq!(fields.low_bidder_name.as_deref(), Some("Builders United LLC"));
        assert_eq!(fields.bid_amount, Some(Decimal::from_str("98000.00").unwrap()));
        assert_eq!(fields.awardee.as_deref(), Some("Builders United LLC"));
    }

    #[test]
    fn active_contract_without_awardee_is_partial() {
        let html = r#"
            <html><body><div id="main-content"><table>
              <tr><td>Status</td><td>Active</td></tr>
              <tr><td>Low Bidder</td><td>Acme Paving Inc.</td><td>$10,500.00</td></tr>
            </table></div></body></html>"#;
        let fields = parse(html).unwrap();
        assert_eq!(fields.low_bidder_name.as_deref(), Some("Acme Paving Inc."));
        assert_eq!(fields.bid_amount, Some(Decimal::from_str("10500.00").unwrap()));
        assert_eq!(fields.missing(), vec![crate::domain::AwardField::Awardee]);
    }

    #[test]
    fn main_content_wins_over_boilerplate() {
        let html = r#"
            <html><body>
              <div id="main-content"><table>
                <tr><td>Awardee</td><td>Real Awardee Co.</td></tr>
              </table></div>
              <footer><table><tr><td>Awardee</td><td>Footer Sample Co.</td></tr></table></footer>
            </body></html>"#;
        assert_eq!(parse(html).unwrap().awardee.as_deref(), Some("Real Awardee Co."));
    }

    #[test]
    fn page_without_table_is_a_layout_failure() {
        let html = "<html><body><h1>Service unavailable</h1><p>Try again later.</p></body></html>";
        let err = parse(html).unwrap_err();
        assert!(matches!(err, ParsingError::MissingContentBlock { .. }));
    }

    #[test]
    fn table_without_award_labels_is_all_missing_not_failure() {
        let html = "<html><body><table><tr><td>Letting Date</td><td>2024-11-08</td></tr></table></body></html>";
        let fields = parse(html).unwrap();
        assert_eq!(fields.missing().len(), 3);
    }

    #[test]
    fn column_header_table_reads_values_from_the_row_below() {
        let html = r#"
            <html><body><div id="main-content"><table>
              <tr><th>Low Bidder</th><th>Bid Amount</th><th>Awardee</th></tr>
              <tr><td>Acme Paving Inc.</td><td>$1,000.00</td><td>Acme Paving Inc.</td></tr>
            </table></div></body></html>"#;
        let fields = parse(html).unwrap();
        assert_eq!(fields.low_bidder_name.as_deref(), Some("Acme Paving Inc."));
        assert_eq!(fields.bid_amount, Some(Decimal::from_str("1000.00").unwrap()));
        assert_eq!(fields.awardee.as_deref(), Some("Acme Paving Inc."));
    }

    #[test]
    fn header_row_of_plain_cells_is_recognized_by_its_labels() {
        let html = r#"
            <html><body><main><table>
              <tr><td>Low Bidder</td><td>Bid Amount</td></tr>
              <tr><td>Builders United LLC</td><td>$98,000</td></tr>
            </table></main></body></html>"#;
        let fields = parse(html).unwrap();
        assert_eq!(fields.low_bidder_name.as_deref(), Some("Builders United LLC"));
        assert_eq!(fields.bid_amount, Some(Decimal::from_str("98000").unwrap()));
        assert_eq!(fields.awardee, None);
    }

    #[test]
    fn label_is_never_taken_as_a_value() {
        let html = r#"
            <html><body><div id="main-content"><table>
              <tr><td>Low Bidder</td><td>Awardee</td></tr>
            </table></div></body></html>"#;
        let fields = parse(html).unwrap();
        assert_eq!(fields.low_bidder_name, None);
        assert_eq!(fields.awardee, None);
    }

    #[test]
    fn definition_terms_pair_with_their_own_definitions() {
        let html = r#"
            <html><body><main><dl>
              <dt>Letting Date</dt>
              <dt>Low Bidder</dt><dd>Prairie Materials</dd><dd>Runner-up Co.</dd>
              <dt>Awardee</dt><dd>Prairie Materials</dd>
            </dl></main></body></html>"#;
        let fields = parse(html).unwrap();
        assert_eq!(fields.low_bidder_name.as_deref(), Some("Prairie Materials"));
        assert_eq!(fields.awardee.as_deref(), Some("Prairie Materials"));
    }
}
