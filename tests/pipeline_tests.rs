//! End-to-end pipeline runs against an in-memory fetcher
mod common;

use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::{StubFetcher, StubPage, REPOSITORY_URL, active_page, awarded_page, detail_url, listing_page};
use letting_scraper::application::{ContractProgress, ErrorKind, ProgressObserver};
use letting_scraper::domain::{AwardField, ExtractionOutcome, FilterCriteria};
use letting_scraper::infrastructure::{FetchError, PipelineConfig};
use letting_scraper::{Pipeline, ScrapeError};
use rust_decimal::Decimal;
use url::Url;

fn repository() -> Url {
    Url::parse(REPOSITORY_URL).unwrap()
}

fn pipeline(fetcher: StubFetcher) -> Pipeline<StubFetcher> {
    Pipeline::new(fetcher, PipelineConfig::default()).unwrap()
}

fn ids<'a>(items: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    items.into_iter().collect()
}

#[tokio::test]
async fn three_row_example_keeps_metro_rows_only() {
    let fetcher = StubFetcher::new()
        .page(
            REPOSITORY_URL,
            listing_page(&[("A", "Cook", "Awarded"), ("B", "Peoria", "Awarded"), ("C", "Cook", "Active")]),
        )
        .page(&detail_url("A"), awarded_page("Acme Paving Inc.", "$1,234,567.89", "Acme Paving Inc."))
        .page(&detail_url("B"), awarded_page("Should Not", "$1.00", "Be Fetched"))
        .page(&detail_url("C"), active_page("Builders United LLC", "$98,000"));

    let pipeline = pipeline(fetcher);
    let output = pipeline.run(&repository(), &FilterCriteria::default()).await.unwrap();

    let summary = &output.summary;
    assert_eq!(summary.total_listed, 3);
    assert_eq!(summary.total_matched_filter, 2);
    assert_eq!(summary.total_succeeded, 2);
    assert_eq!(summary.total_failed, 0);
    assert!(summary.failures.is_empty());
    assert!(summary.finished_at.is_some());

    let exported = ids(output.table.rows().iter().map(|r| r.contract_id.as_str()));
    assert_eq!(exported, vec!["A", "C"]);

    let first = &output.table.rows()[0];
    assert_eq!(first.bid_amount, Some(Decimal::from_str("1234567.89").unwrap()));
    assert_eq!(first.awardee.as_deref(), Some("Acme Paving Inc."));

    assert_eq!(output.results[0].outcome, ExtractionOutcome::Success);
    assert_eq!(
        output.results[1].outcome,
        ExtractionOutcome::PartialSuccess { missing_fields: vec![AwardField::Awardee] }
    );
}

#[tokio::test]
async fn unmatched_rows_are_never_fetched() {
    let fetcher = StubFetcher::new()
        .page(REPOSITORY_URL, listing_page(&[("A", "Cook", "Awarded"), ("B", "Peoria", "Awarded")]))
        .page(&detail_url("A"), awarded_page("X", "$1", "X"));

    let pipeline = pipeline(fetcher);
    pipeline.run(&repository(), &FilterCriteria::default()).await.unwrap();

    // Only the listing and A's detail page
    assert_eq!(pipeline.fetcher().requests(), vec![REPOSITORY_URL.to_string(), detail_url("A")]);
}

#[tokio::test]
async fn zero_matches_is_an_empty_success() {
    let fetcher = StubFetcher::new()
        .page(REPOSITORY_URL, listing_page(&[("B", "Peoria", "Awarded"), ("D", "Cook", "Cancelled")]));

    let output = pipeline(fetcher).run(&repository(), &FilterCriteria::default()).await.unwrap();

    assert_eq!(output.summary.total_listed, 2);
    assert_eq!(output.summary.total_matched_filter, 0);
    assert!(output.table.is_empty());
    assert!(output.results.is_empty());
}

#[tokio::test]
async fn one_transport_error_leaves_other_contracts_untouched() {
    let rows = [("A", "Cook", "Awarded"), ("B", "Will", "Awarded"), ("C", "Kane", "Awarded")];
    let healthy = || {
        StubFetcher::new()
            .page(REPOSITORY_URL, listing_page(&rows))
            .page(&detail_url("A"), awarded_page("Acme", "$10", "Acme"))
            .page(&detail_url("C"), awarded_page("Zenith", "$30", "Zenith"))
    };

    let baseline = pipeline(healthy().page(&detail_url("B"), awarded_page("Bolt", "$20", "Bolt")))
        .run(&repository(), &FilterCriteria::default())
        .await
        .unwrap();

    let broken = pipeline(healthy().respond(
        &detail_url("B"),
        StubPage::Error(FetchError::Transport {
            url: detail_url("B"),
            message: "connection reset".to_string(),
        }),
    ))
    .run(&repository(), &FilterCriteria::default())
    .await
    .unwrap();

    assert_eq!(broken.results[0], baseline.results[0]);
    assert_eq!(broken.results[2], baseline.results[2]);
    assert!(broken.results[1].outcome.is_failure());
    assert_eq!(broken.results[1].low_bidder_name, None);

    assert_eq!(broken.summary.total_succeeded, 2);
    assert_eq!(broken.summary.total_failed, 1);
    assert_eq!(broken.summary.failures[0].contract_id, "B");
    assert_eq!(broken.summary.failures[0].reason, "transport error: connection reset");
    assert_eq!(ids(broken.table.rows().iter().map(|r| r.contract_id.as_str())), vec!["A", "C"]);
}

#[tokio::test(start_paused = true)]
async fn detail_timeout_is_one_failure_entry() {
    let fetcher = StubFetcher::new()
        .page(REPOSITORY_URL, listing_page(&[("A", "Cook", "Awarded"), ("B", "Lake", "Executed")]))
        .page(&detail_url("A"), awarded_page("Acme", "$10", "Acme"))
        .respond(&detail_url("B"), StubPage::Hang);

    let config = PipelineConfig {
        detail_timeout_secs: 5,
        ..PipelineConfig::default()
    };
    let output = Pipeline::new(fetcher, config)
        .unwrap()
        .run(&repository(), &FilterCriteria::default())
        .await
        .unwrap();

    assert_eq!(output.summary.failures.len(), 1);
    assert_eq!(output.summary.failures[0].contract_id, "B");
    assert_eq!(output.summary.failures[0].reason, "timeout");
    assert_eq!(output.table.len(), 1);
    assert_eq!(output.table.rows()[0].contract_id, "A");
}

#[tokio::test]
async fn detail_page_without_table_is_a_failure() {
    let fetcher = StubFetcher::new()
        .page(REPOSITORY_URL, listing_page(&[("A", "Cook", "Awarded")]))
        .page(&detail_url("A"), "<html><body><p>Page under maintenance</p></body></html>");

    let output = pipeline(fetcher).run(&repository(), &FilterCriteria::default()).await.unwrap();

    assert_eq!(output.summary.total_failed, 1);
    assert!(output.summary.failures[0].reason.starts_with("unexpected page layout"));
    assert!(output.table.is_empty());
}

#[tokio::test]
async fn unreachable_listing_aborts_the_run() {
    let fetcher = StubFetcher::new().respond(
        REPOSITORY_URL,
        StubPage::Error(FetchError::HttpStatus { status: 503, url: REPOSITORY_URL.to_string() }),
    );

    let error = pipeline(fetcher).run(&repository(), &FilterCriteria::default()).await.unwrap_err();

    assert!(matches!(error, ScrapeError::ListingFetch(FetchError::HttpStatus { status: 503, .. })));
    assert_eq!(error.kind(), ErrorKind::ListingUnreachable);
}

#[tokio::test]
async fn malformed_listing_aborts_the_run() {
    let fetcher = StubFetcher::new().page(REPOSITORY_URL, "<html><body><p>No lettings today</p></body></html>");

    let pipeline = pipeline(fetcher);
    let error = pipeline.run(&repository(), &FilterCriteria::default()).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::ListingMalformed);
    assert_eq!(pipeline.fetcher().requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn concurrent_fetches_keep_listing_order() {
    let rows = [
        ("A", "Cook", "Awarded"),
        ("B", "Cook", "Awarded"),
        ("C", "Cook", "Awarded"),
        ("D", "Cook", "Awarded"),
        ("E", "Cook", "Awarded"),
    ];
    // Earlier rows answer later, so completion order is the reverse of listing order
    let mut fetcher = StubFetcher::new().page(REPOSITORY_URL, listing_page(&rows));
    for (position, (id, _, _)) in rows.iter().enumerate() {
        let delay = Duration::from_millis(100 * (rows.len() - position) as u64);
        fetcher = fetcher.respond(&detail_url(id), StubPage::Delayed(delay, awarded_page(id, "$1", id)));
    }

    let config = PipelineConfig {
        max_concurrent_details: 5,
        ..PipelineConfig::default()
    };
    let output = Pipeline::new(fetcher, config)
        .unwrap()
        .run(&repository(), &FilterCriteria::default())
        .await
        .unwrap();

    let exported = ids(output.table.rows().iter().map(|r| r.contract_id.as_str()));
    assert_eq!(exported, vec!["A", "B", "C", "D", "E"]);
}

#[derive(Default)]
struct RecordingObserver {
    seen: Mutex<Vec<(usize, usize, String, bool)>>,
}

impl ProgressObserver for RecordingObserver {
    fn on_contract(&self, progress: &ContractProgress<'_>) {
        self.seen.lock().unwrap().push((
            progress.index,
            progress.total,
            progress.contract_id.to_string(),
            progress.outcome.is_failure(),
        ));
    }
}

#[tokio::test]
async fn observer_sees_every_contract_in_order() {
    let fetcher = StubFetcher::new()
        .page(REPOSITORY_URL, listing_page(&[("A", "Cook", "Awarded"), ("B", "Will", "Awarded")]))
        .page(&detail_url("A"), awarded_page("Acme", "$10", "Acme"));

    let observer = Arc::new(RecordingObserver::default());
    let pipeline = pipeline(fetcher).with_observer(observer.clone());
    pipeline.run(&repository(), &FilterCriteria::default()).await.unwrap();

    let seen = observer.seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![(1, 2, "A".to_string(), false), (2, 2, "B".to_string(), true)]
    );
}

#[tokio::test]
async fn caller_criteria_replace_the_defaults() {
    let fetcher = StubFetcher::new()
        .page(REPOSITORY_URL, listing_page(&[("A", "Cook", "Awarded"), ("B", "Peoria", "Let")]))
        .page(&detail_url("B"), awarded_page("Prairie", "$5", "Prairie"));

    let criteria = FilterCriteria::new(["peoria"], ["LET"]);
    let output = pipeline(fetcher).run(&repository(), &criteria).await.unwrap();

    assert_eq!(output.summary.total_matched_filter, 1);
    assert_eq!(output.table.rows()[0].contract_id, "B");
}
