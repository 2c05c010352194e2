//! SCB API Verification Integration Tests
//!
//! These tests hit the live PxWeb API to verify that the configured tables
//! are still reachable and still declare the dimensions this service
//! queries. All of them are `#[ignore]`d: run explicitly with
//! `cargo test --test scb_api_verification -- --ignored --nocapture`
//! before pointing the service at a new table id or after an SCB change
//! notice.

use scb_insights::config::ServiceConfig;
use scb_insights::fetch::{DataService, FetchRequest, PeriodSelection};
use scb_insights::ingest::scb::{self, SCB_BASE_URL};
use scb_insights::logging::{self, LogLevel};
use scb_insights::verify::{self, VerificationStatus};

#[test]
#[ignore]
fn test_dataset_verification() {
    logging::init_logger(LogLevel::Info, None, false);
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .unwrap();

    println!("\n🔍 Verifying SCB datasets:");
    println!("═══════════════════════════════════════════════════════════");

    let report = verify::verify_all(&client, SCB_BASE_URL, "en");

    for result in &report.results {
        println!("\n{}", result.dataset_id);
        println!("  Status: {:?}", result.status);
        println!("  Metadata: {}", if result.metadata_available { "Available" } else { "Not available" });
        if let Some(title) = &result.table_title {
            println!("  Title: {}", title);
        }
        println!("  Dimensions: {} expected, {} missing",
            result.dimensions_expected.len(),
            result.dimensions_missing.len());
        println!("  Sample Data: {} rows", result.sample_row_count);

        if let Some(error) = &result.error_message {
            println!("  Error: {}", error);
        }
    }

    println!("\n═══════════════════════════════════════════════════════════");
    println!("Summary: {}/{} working, {} failed",
        report.summary.working, report.summary.total, report.summary.failed);
    println!("═══════════════════════════════════════════════════════════\n");

    assert!(report.summary.working > 0, "No SCB datasets are reachable!");
    assert!(
        report.results.iter().all(|r| r.status != VerificationStatus::Failed),
        "At least one dataset failed verification!"
    );
}

#[test]
#[ignore]
fn test_live_cpi_fetch_normalizes() {
    logging::init_logger(LogLevel::Debug, None, true);
    let config = ServiceConfig::default();
    let mut service = DataService::new(&config).unwrap();

    println!("\n🔍 Fetching a small live CPI slice:");

    let request = FetchRequest::new(&scb::CPI_DATASET)
        .with_filter("VaruTjanstegrupp", vec!["00".to_string()])
        .with_periods(PeriodSelection::LastN(3));
    let table = service.fetch(&request).unwrap();

    println!("  Rows: {}", table.len());
    println!("  Dim columns: {:?}", table.dim_columns);
    println!("  Value columns: {:?}", table.value_columns);
    if let Some(latest) = table.latest_period() {
        println!("  Latest month: {}", latest);
    }

    assert!(!table.is_empty(), "Live CPI fetch returned no rows!");
    assert!(table.has_value_column("Index"));
    assert!(table.latest_period().is_some(), "No month parsed from the live payload!");

    // Second fetch of the same request must be served from the cache and
    // agree with the first.
    let cached = service.fetch(&request).unwrap();
    assert_eq!(cached, table);
}

#[test]
#[ignore]
fn test_live_group_labels_cover_top_level_codes() {
    let config = ServiceConfig::default();
    let service = DataService::new(&config).unwrap();

    let labels = service.top_level_group_labels();
    println!("\n🔍 Top-level COICOP labels from live metadata:");
    for label in &labels {
        println!("  {}", label);
    }

    // Degraded metadata legitimately yields an empty list; anything else
    // should cover the 12 COICOP divisions plus the aggregate.
    if !labels.is_empty() {
        assert!(labels.len() >= 12, "Suspiciously few product groups: {}", labels.len());
    }
}
