//! Dataset Verification Module
//!
//! Framework for testing the configured SCB datasets against the live API
//! to determine whether the tables are still reachable and still declare
//! the dimensions this service queries.
//!
//! Use this before pointing the service at a new table id or after an SCB
//! API change notice. Only `#[ignore]`d integration tests call into here;
//! normal builds never touch the network.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::ingest::scb::{self, Dataset, TableQuery};
use crate::normalize;

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum VerificationStatus {
    Success,
    PartialSuccess,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetVerification {
    pub dataset_id: String,
    pub status: VerificationStatus,
    /// Table metadata was retrievable.
    pub metadata_available: bool,
    pub table_title: Option<String>,
    /// Variable codes this service queries.
    pub dimensions_expected: Vec<String>,
    /// Expected variable codes the live table no longer declares.
    pub dimensions_missing: Vec<String>,
    /// Rows in a one-period sample fetch.
    pub sample_row_count: usize,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub working: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub results: Vec<DatasetVerification>,
    pub summary: VerificationSummary,
}

// ============================================================================
// Verification Functions
// ============================================================================

fn expected_dimensions(dataset: &Dataset) -> Vec<String> {
    vec![
        dataset.classification_code.to_string(),
        dataset.time_code.to_string(),
        dataset.contents_code.to_string(),
    ]
}

/// Verify one dataset against the live API.
///
/// Checks that metadata is retrievable, that every variable code this
/// service queries still exists, and that a minimal one-period data fetch
/// normalizes cleanly.
pub fn verify_dataset(
    client: &reqwest::blocking::Client,
    base: &str,
    language: &str,
    dataset: &'static Dataset,
) -> DatasetVerification {
    let dimensions_expected = expected_dimensions(dataset);
    let mut result = DatasetVerification {
        dataset_id: dataset.id.to_string(),
        status: VerificationStatus::Failed,
        metadata_available: false,
        table_title: None,
        dimensions_expected: dimensions_expected.clone(),
        dimensions_missing: Vec::new(),
        sample_row_count: 0,
        error_message: None,
    };

    let metadata = match scb::fetch_metadata(client, base, language, dataset) {
        Ok(metadata) => metadata,
        Err(e) => {
            result.error_message = Some(format!("metadata fetch failed: {}", e));
            return result;
        }
    };
    result.metadata_available = true;
    result.table_title = Some(metadata.title.clone());
    result.dimensions_missing = dimensions_expected
        .iter()
        .filter(|code| metadata.variable(code).is_none())
        .cloned()
        .collect();

    // Sample fetch: latest period, first classification value, to keep
    // the request far below PxWeb's cell limit.
    let mut query = TableQuery::new();
    if let Some(last_period) = metadata.time_values(dataset.time_code).last() {
        query = query.select_items(dataset.time_code, [last_period.clone()]);
    }
    if let Some(first_code) = metadata
        .variable(dataset.classification_code)
        .and_then(|v| v.values.first())
    {
        query = query.select_items(dataset.classification_code, [first_code.clone()]);
    }

    match scb::fetch_table(client, base, language, dataset, &query)
        .and_then(|payload| normalize::payload_to_table(&payload))
    {
        Ok(table) => {
            result.sample_row_count = table.len();
            result.status = if result.dimensions_missing.is_empty() && !table.is_empty() {
                VerificationStatus::Success
            } else {
                VerificationStatus::PartialSuccess
            };
        }
        Err(e) => {
            result.error_message = Some(format!("sample fetch failed: {}", e));
            result.status = if result.dimensions_missing.is_empty() {
                VerificationStatus::PartialSuccess
            } else {
                VerificationStatus::Failed
            };
        }
    }

    result
}

/// Verify every configured dataset and summarize.
pub fn verify_all(
    client: &reqwest::blocking::Client,
    base: &str,
    language: &str,
) -> VerificationReport {
    let results: Vec<DatasetVerification> = [&scb::CPI_DATASET, &scb::MIGRATION_DATASET]
        .into_iter()
        .map(|dataset| verify_dataset(client, base, language, dataset))
        .collect();

    let working = results
        .iter()
        .filter(|r| r.status != VerificationStatus::Failed)
        .count();
    let summary = VerificationSummary {
        total: results.len(),
        working,
        failed: results.len() - working,
    };

    VerificationReport {
        timestamp: Utc::now().to_rfc3339(),
        results,
        summary,
    }
}
