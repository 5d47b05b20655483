//! Repository (listing) page parser
//!
//! Finds the contract table by its header labels and turns every data row into
//! a `ContractSummary`. A row without a usable detail link is skipped and
//! reported as a diagnostic; it never fails the whole page.

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use super::config::ListingLabels;
use super::context::ListingContext;
use super::text::{compile_selectors, element_text, normalize_label_text, static_selector};
use super::{ContextualParser, ParsingError, ParsingResult};
use crate::domain::constants::canonicalize;
use crate::domain::ContractSummary;

/// Why a listing row was skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ListingDiagnostic {
    #[serde(rename_all = "camelCase")]
    MalformedRow { row_index: usize, reason: String },
}

/// Parsed repository page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingParse {
    pub summaries: Vec<ContractSummary>,
    pub diagnostics: Vec<ListingDiagnostic>,
}

/// Column positions resolved from the header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnMap {
    county: usize,
    status: usize,
    contract_id: Option<usize>,
}

impl ColumnMap {
    const fn required_cells(self) -> usize {
        if self.county > self.status { self.county + 1 } else { self.status + 1 }
    }
}

/// Parser for repository pages
pub struct ListingParser {
    table_selector: Selector,
    row_selector: Selector,
    cell_selector: Selector,
    header_cell_selector: Selector,
    detail_link_selectors: Vec<Selector>,
    labels: ListingLabels,
}

impl ListingParser {
    /// Create a listing parser with the default site labels
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&ListingLabels::default())
    }

    pub fn with_config(labels: &ListingLabels) -> ParsingResult<Self> {
        Ok(Self {
            table_selector: static_selector("table")?,
            row_selector: static_selector("tr")?,
            cell_selector: static_selector("td, th")?,
            header_cell_selector: static_selector("th")?,
            detail_link_selectors: compile_selectors(&labels.detail_link_selectors)?,
            labels: labels.clone(),
        })
    }

    /// Rows that belong to this table, not to a table nested inside it
    fn own_rows<'a>(&self, table: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        table
            .select(&self.row_selector)
            .filter(|row| {
                row.ancestors()
                    .find(|n| n.value().as_element().is_some_and(|e| e.name() == "table"))
                    .is_some_and(|owner| owner.id() == table.id())
            })
            .collect()
    }

    fn cells<'a>(&self, row: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        row.children()
            .filter_map(ElementRef::wrap)
            .filter(|c| self.cell_selector.matches(c))
            .collect()
    }

    fn column_for(headers: &[String], labels: &[String], taken: &[usize]) -> Option<usize> {
        let labels: Vec<String> = labels.iter().map(|l| normalize_label_text(l)).collect();
        headers.iter().enumerate().find_map(|(i, header)| {
            (!taken.contains(&i) && labels.iter().any(|l| !l.is_empty() && header.contains(l.as_str())))
                .then_some(i)
        })
    }

    /// Header row of a table: the first row with `th` cells, else the first row
    fn header_row<'a>(&self, rows: &[ElementRef<'a>]) -> Option<(usize, ElementRef<'a>)> {
        rows.iter()
            .position(|row| row.select(&self.header_cell_selector).next().is_some())
            .or_else(|| (!rows.is_empty()).then_some(0))
            .map(|i| (i, rows[i]))
    }

    fn map_columns(&self, header: ElementRef) -> Option<ColumnMap> {
        let headers: Vec<String> = self
            .cells(header)
            .iter()
            .map(|c| normalize_label_text(&element_text(c)))
            .collect();

        let county = Self::column_for(&headers, &self.labels.county_headers, &[])?;
        let status = Self::column_for(&headers, &self.labels.status_headers, &[county])?;
        let contract_id = Self::column_for(&headers, &self.labels.contract_id_headers, &[county, status]);

        Some(ColumnMap { county, status, contract_id })
    }

    /// First table whose header names both a county and a status column
    fn locate_table<'a>(&self, html: &'a Html) -> Option<(ColumnMap, Vec<ElementRef<'a>>)> {
        html.select(&self.table_selector).find_map(|table| {
            let rows = self.own_rows(table);
            let (header_index, header) = self.header_row(&rows)?;
            let columns = self.map_columns(header)?;
            Some((columns, rows.into_iter().skip(header_index + 1).collect()))
        })
    }

    /// First usable link in the row, resolved against the page URL
    fn detail_link<'a>(&self, row: ElementRef<'a>, base_url: &Url) -> Result<(Url, ElementRef<'a>), String> {
        let anchor = self
            .detail_link_selectors
            .iter()
            .flat_map(|selector| row.select(selector))
            .find(|a| a.value().attr("href").is_some_and(is_followable))
            .ok_or_else(|| "no detail link".to_string())?;

        let href = anchor.value().attr("href").unwrap_or_default().trim();
        let url = base_url
            .join(href)
            .map_err(|e| format!("unresolvable detail link '{href}': {e}"))?;
        Ok((url, anchor))
    }

    /// Empty or boilerplate anchor text that cannot serve as a contract id
    fn is_generic_link_text(&self, text: &str) -> bool {
        let text = normalize_label_text(text);
        text.is_empty() || self.labels.generic_link_texts.iter().any(|g| normalize_label_text(g) == text)
    }

    fn summarize(
        &self,
        row: ElementRef,
        row_index: usize,
        columns: ColumnMap,
        context: &ListingContext,
    ) -> Result<ContractSummary, String> {
        let cells: Vec<String> = self.cells(row).iter().map(element_text).collect();
        if cells.len() < columns.required_cells() {
            return Err(format!(
                "row has {} cells, expected at least {}",
                cells.len(),
                columns.required_cells()
            ));
        }

        let (detail_url, anchor) = self.detail_link(row, &context.base_url)?;

        let contract_id = columns
            .contract_id
            .and_then(|i| cells.get(i))
            .filter(|id| !id.is_empty())
            .cloned()
            .or_else(|| Some(element_text(&anchor)).filter(|text| !self.is_generic_link_text(text)))
            .or_else(|| url_identifier(&detail_url))
            .unwrap_or_else(|| detail_url.to_string());

        Ok(ContractSummary {
            contract_id,
            county: canonicalize(&cells[columns.county], self.labels.known_counties.iter().map(String::as_str)),
            status: canonicalize(&cells[columns.status], self.labels.known_statuses.iter().map(String::as_str)),
            detail_url,
            row_index,
        })
    }
}

/// Identifier carried by a detail URL: the last query value, else the last path segment
fn url_identifier(url: &Url) -> Option<String> {
    url.query_pairs()
        .filter(|(_, value)| !value.trim().is_empty())
        .last()
        .map(|(_, value)| value.trim().to_string())
        .or_else(|| {
            url.path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(ToString::to_string))
        })
}

fn is_followable(href: &str) -> bool {
    let href = href.trim();
    !href.is_empty()
        && !href.starts_with('#')
        && !href.to_ascii_lowercase().starts_with("javascript:")
        && !href.to_ascii_lowercase().starts_with("mailto:")
}

impl ContextualParser for ListingParser {
    type Output = ListingParse;
    type Context = ListingContext;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output> {
        debug!("Parsing repository page {}", context.base_url);

        let (columns, rows) = self.locate_table(html).ok_or_else(|| {
            let mut tried = self.labels.county_headers.clone();
            tried.extend(self.labels.status_headers.iter().cloned());
            ParsingError::malformed_listing("no table with county and status columns", tried)
        })?;

        let mut parsed = ListingParse::default();
        let data_rows = rows
            .into_iter()
            .filter(|row| row.children().filter_map(ElementRef::wrap).any(|c| c.value().name() == "td"));

        for (row_index, row) in data_rows.enumerate() {
            match self.summarize(row, row_index, columns, context) {
                Ok(summary) => parsed.summaries.push(summary),
                Err(reason) => {
                    warn!("Skipping listing row {}: {}", row_index, reason);
                    parsed.diagnostics.push(ListingDiagnostic::MalformedRow { row_index, reason });
                }
            }
        }

        debug!(
            "Repository page yielded {} contracts, {} skipped rows",
            parsed.summaries.len(),
            parsed.diagnostics.len()
        );
        Ok(parsed)
    }
}
