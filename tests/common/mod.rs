//! Shared fixtures for the pipeline integration tests: an in-memory page
//! fetcher and a few repository/detail pages.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use letting_scraper::infrastructure::{FetchError, PageFetcher};
use url::Url;

pub const REPOSITORY_URL: &str = "https://webapps.example.gov/Lettings/Repository";

/// What the stub answers for one URL
#[derive(Debug, Clone)]
pub enum StubPage {
    Html(String),
    Error(FetchError),
    /// Answers after a delay (virtual time under `start_paused`)
    Delayed(Duration, String),
    /// Never answers
    Hang,
}

/// Serves canned pages and records every requested URL
#[derive(Debug, Default)]
pub struct StubFetcher {
    pages: HashMap<String, StubPage>,
    requests: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), StubPage::Html(html.into()));
        self
    }

    pub fn respond(mut self, url: &str, page: StubPage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch_html(&self, url: &Url) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.pages.get(url.as_str()).cloned() {
            Some(StubPage::Html(html)) => Ok(html),
            Some(StubPage::Error(error)) => Err(error),
            Some(StubPage::Delayed(delay, html)) => {
                tokio::time::sleep(delay).await;
                Ok(html)
            }
            Some(StubPage::Hang) => std::future::pending().await,
            None => Err(FetchError::HttpStatus { status: 404, url: url.to_string() }),
        }
    }
}

pub fn detail_url(contract_id: &str) -> String {
    format!("https://webapps.example.gov/Lettings/LbContractDetail/{contract_id}")
}

/// Repository page with one row per (contract id, county, status)
pub fn listing_page(rows: &[(&str, &str, &str)]) -> String {
    let body: String = rows
        .iter()
        .map(|(id, county, status)| {
            format!(
                "<tr><td>{id}</td><td>{county}</td><td>{status}</td>\
                 <td><a href=\"LbContractDetail/{id}\">View</a></td></tr>"
            )
        })
        .collect();
    format!(
        "<html><body><h1>Letting Repository</h1><table>\
         <tr><th>Contract No.</th><th>County</th><th>Status</th><th>Details</th></tr>\
         {body}</table></body></html>"
    )
}

/// Detail page of an awarded contract
pub fn awarded_page(bidder: &str, amount: &str, awardee: &str) -> String {
    format!(
        "<html><body><div id=\"main-content\"><table>\
         <tr><th>Low Bidder</th><td>{bidder}</td></tr>\
         <tr><th>Bid Amount</th><td>{amount}</td></tr>\
         <tr><th>Awardee</th><td>{awardee}</td></tr>\
         </table></div></body></html>"
    )
}

/// Detail page of an active contract: bids are in, no award yet
pub fn active_page(bidder: &str, amount: &str) -> String {
    format!(
        "<html><body><div id=\"main-content\"><table>\
         <tr><th>Low Bidder</th><td>{bidder}</td></tr>\
         <tr><th>Bid Amount</th><td>{amount}</td></tr>\
         </table></div></body></html>"
    )
}
