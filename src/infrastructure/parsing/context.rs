//! Parsing context for listing and detail pages

use url::Url;

/// Context for parsing a repository (listing) page
#[derive(Debug, Clone)]
pub struct ListingContext {
    /// Address the listing was fetched from; relative detail links resolve against it
    pub base_url: Url,
}

impl ListingContext {
    pub const fn new(base_url: Url) -> Self {
        Self { base_url }
    }
}

/// Context for parsing one contract detail page
#[derive(Debug, Clone)]
pub struct DetailContext {
    /// Contract the page belongs to
    pub contract_id: String,

    /// Address the page was fetched from
    pub url: Url,
}

impl DetailContext {
    pub const fn new(contract_id: String, url: Url) -> Self {
        Self { contract_id, url }
    }
}
