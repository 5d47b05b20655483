//! Command-line runner: scrape one repository page and print the response as JSON.
//!
//! Usage: `letting-scraper <repository-url> [config-file]`

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use letting_scraper::infrastructure::{LogOutput, LoggingConfig, init_logging_with_config};
use letting_scraper::{ScrapeRequest, ScraperConfig, scrape_repository_with_config};

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(repository_url) = args.next() else {
        bail!("usage: letting-scraper <repository-url> [config-file]");
    };
    let config_path = args.next().map(PathBuf::from);

    let config = ScraperConfig::load(config_path.as_deref()).context("Failed to load configuration")?;
    // stdout carries the JSON response
    init_logging_with_config(&LoggingConfig {
        output: LogOutput::Stderr,
        ..config.logging.clone()
    })?;

    let response = scrape_repository_with_config(&config, &ScrapeRequest::new(repository_url)).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if !response.is_completed() {
        std::process::exit(1);
    }
    Ok(())
}
