//! Jurisdiction and status filter
//!
//! The criteria are an explicit value threaded through each run rather than
//! process-wide constants, so a run is fully determined by its inputs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::constants::{normalize_label, DEFAULT_COUNTIES, DEFAULT_STATUSES};
use super::contract::ContractSummary;

/// Allowed counties and statuses for one run, stored trimmed and lower-cased
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    allowed_counties: BTreeSet<String>,
    allowed_statuses: BTreeSet<String>,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTIES.iter().copied(), DEFAULT_STATUSES.iter().copied())
    }
}

impl FilterCriteria {
    pub fn new<C, S>(counties: C, statuses: S) -> Self
    where
        C: IntoIterator,
        C::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        Self {
            allowed_counties: normalize_set(counties),
            allowed_statuses: normalize_set(statuses),
        }
    }

    /// Replace the county set, keeping the statuses
    #[must_use]
    pub fn with_counties<C>(self, counties: C) -> Self
    where
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        Self { allowed_counties: normalize_set(counties), ..self }
    }

    /// Replace the status set, keeping the counties
    #[must_use]
    pub fn with_statuses<S>(self, statuses: S) -> Self
    where
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        Self { allowed_statuses: normalize_set(statuses), ..self }
    }

    pub const fn allowed_counties(&self) -> &BTreeSet<String> {
        &self.allowed_counties
    }

    pub const fn allowed_statuses(&self) -> &BTreeSet<String> {
        &self.allowed_statuses
    }

    /// True when both county and status are allowed
    pub fn matches(&self, summary: &ContractSummary) -> bool {
        self.allowed_counties.contains(&normalize_label(&summary.county))
            && self.allowed_statuses.contains(&normalize_label(&summary.status))
    }

    /// Matching summaries, in their original order
    pub fn select<'a>(&self, summaries: &'a [ContractSummary]) -> Vec<&'a ContractSummary> {
        summaries.iter().filter(|s| self.matches(s)).collect()
    }
}

fn normalize_set<I>(values: I) -> BTreeSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    values
        .into_iter()
        .map(|v| normalize_label(v.as_ref()))
        .filter(|v| !v.is_empty())
        .collect()
}
