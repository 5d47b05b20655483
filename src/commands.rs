//! Invocation contract for the front end
//!
//! `scrape_repository` is the single entry point: validate the request, run
//! the pipeline, serialize the table. It always answers with a
//! `ScrapeResponse`; errors are folded into the `Failed` variant.

use chrono::Utc;
use tracing::{error, info};
use url::Url;

use crate::application::{Pipeline, PipelineOutput, ScrapeError, ScrapeRequest, ScrapeResponse};
use crate::infrastructure::{PageFetcher, ScraperConfig, TableSerializer};

/// Check that the repository URL is an absolute http(s) URL with a host
pub fn validate_repository_url(raw: &str) -> Result<Url, ScrapeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ScrapeError::invalid_input(raw, "no repository URL provided"));
    }

    let url = Url::parse(trimmed).map_err(|e| ScrapeError::invalid_input(trimmed, e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ScrapeError::invalid_input(
            trimmed,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ScrapeError::invalid_input(trimmed, "URL has no host"));
    }
    Ok(url)
}

/// Human-readable line for the front end
pub fn completion_message(output: &PipelineOutput) -> String {
    let summary = &output.summary;
    if summary.total_matched_filter == 0 {
        return "No contracts matched the filter".to_string();
    }
    let mut message = format!("Successfully scraped {} contracts", output.table.len());
    if summary.total_failed > 0 {
        message.push_str(&format!(" ({} failed)", summary.total_failed));
    }
    message
}

/// Run one scrape request against an existing pipeline
pub async fn scrape_repository<F: PageFetcher>(
    pipeline: &Pipeline<F>,
    serializer: &TableSerializer,
    request: &ScrapeRequest,
) -> ScrapeResponse {
    match run_request(pipeline, serializer, request).await {
        Ok(response) => response,
        Err(err) => {
            error!("Scrape request failed: {}", err);
            ScrapeResponse::from(err)
        }
    }
}

/// Build a reqwest-backed pipeline from configuration and run one request
pub async fn scrape_repository_with_config(config: &ScraperConfig, request: &ScrapeRequest) -> ScrapeResponse {
    if let Err(err) = validate_repository_url(&request.repository_url) {
        return ScrapeResponse::from(err);
    }
    match Pipeline::from_config(config) {
        Ok(pipeline) => scrape_repository(&pipeline, &TableSerializer::default(), request).await,
        Err(err) => ScrapeResponse::from(err),
    }
}

async fn run_request<F: PageFetcher>(
    pipeline: &Pipeline<F>,
    serializer: &TableSerializer,
    request: &ScrapeRequest,
) -> Result<ScrapeResponse, ScrapeError> {
    let url = validate_repository_url(&request.repository_url)?;
    let output = pipeline.run(&url, &request.criteria()).await?;

    let generated_at = output.summary.finished_at.unwrap_or_else(Utc::now);
    let export_payload = serializer.payload(&output.table, generated_at)?;
    let message = completion_message(&output);
    info!("{}", message);

    Ok(ScrapeResponse::Completed {
        run_summary: output.summary,
        export_payload,
        message,
    })
}
