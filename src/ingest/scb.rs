/// SCB (Statistics Sweden) PxWeb API Client
///
/// Retrieves table data and metadata from SCB's open statistical database
/// for the CPI and migration dashboards.
///
/// API documentation: https://www.scb.se/en/services/open-data-api/
/// Console: https://api.scb.se/OV0104/v1/doris/en/ssd/
///
/// A table lives under a navigation path (subject area / statistic /
/// table id). GET on the table URL returns metadata (dimensions with
/// their codes, values and display texts); POST with a query document
/// returns the keyed-tuple data payload.

use serde::{Deserialize, Serialize};

use crate::model::{RawPayload, ScbError};

/// Default PxWeb database root. The language segment is appended per
/// request ("en"/"sv"), followed by "ssd" and the table path.
pub const SCB_BASE_URL: &str = "https://api.scb.se/OV0104/v1/doris";

/// Upstream calls block; 30 seconds bounds a slow SCB response.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Dataset descriptors
// ============================================================================

/// A known SCB table and the PxWeb variable codes this service uses in it.
///
/// The service imports exactly two fixed-shape tables; descriptors keep
/// their navigation paths and variable codes in one place instead of
/// scattering magic strings across query construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    /// Short identifier used in logs and cache keys.
    pub id: &'static str,
    /// Navigation path from the database root to the table.
    pub path: &'static [&'static str],
    /// Variable code of the classification dimension
    /// (product group / country of birth).
    pub classification_code: &'static str,
    /// Variable code of the time dimension.
    pub time_code: &'static str,
    /// Variable code of the observations dimension.
    pub contents_code: &'static str,
    /// Declared column text → canonical column label, applied after
    /// normalization so analysis code sees stable names regardless of
    /// SCB's phrasing ("country of birth" → "countrycode").
    pub dim_renames: &'static [(&'static str, &'static str)],
}

/// CPI by COICOP product group, monthly, base 2020 = 100.
pub static CPI_DATASET: Dataset = Dataset {
    id: "cpi",
    path: &["PR", "PR0101", "PR0101A", "KPI2020COICOPM"],
    classification_code: "VaruTjanstegrupp",
    time_code: "Tid",
    contents_code: "ContentsCode",
    dim_renames: &[],
};

/// Immigration and emigration by country of birth, sex and year.
pub static MIGRATION_DATASET: Dataset = Dataset {
    id: "migration",
    path: &["BE", "BE0101", "BE0101J", "ImmiEmiFod"],
    classification_code: "Fodelseland",
    time_code: "Tid",
    contents_code: "ContentsCode",
    dim_renames: &[("country of birth", "countrycode"), ("sex", "gender")],
};

/// Full table URL for a dataset: `{base}/{lang}/ssd/{path...}`.
pub fn table_url(base: &str, language: &str, dataset: &Dataset) -> String {
    let mut url = format!("{}/{}/ssd", base.trim_end_matches('/'), language);
    for segment in dataset.path {
        url.push('/');
        url.push_str(segment);
    }
    url
}

// ============================================================================
// Query document
// ============================================================================

/// Selection over one dimension: `{filter: "item", values: [codes...]}`.
#[derive(Debug, Clone, Serialize)]
pub struct Selection {
    pub filter: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryDimension {
    pub code: String,
    pub selection: Selection,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    pub format: String,
}

/// The POST body of a PxWeb data request.
#[derive(Debug, Clone, Serialize)]
pub struct TableQuery {
    pub query: Vec<QueryDimension>,
    pub response: ResponseFormat,
}

impl TableQuery {
    /// An empty query requesting the keyed-tuple JSON format. Dimensions
    /// left unconstrained return all their values.
    pub fn new() -> Self {
        Self {
            query: Vec::new(),
            response: ResponseFormat {
                format: "json".to_string(),
            },
        }
    }

    /// Constrain a dimension to an explicit code list ("item" filter).
    /// An empty value list is skipped; PxWeb rejects empty selections,
    /// and "no constraint" already means "everything".
    pub fn select_items<S: Into<String>>(
        mut self,
        code: &str,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if !values.is_empty() {
            self.query.push(QueryDimension {
                code: code.to_string(),
                selection: Selection {
                    filter: "item".to_string(),
                    values,
                },
            });
        }
        self
    }
}

impl Default for TableQuery {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Metadata response structures
// ============================================================================

/// One dimension from a table's metadata response.
#[derive(Debug, Clone, Deserialize)]
pub struct VariableMetadata {
    pub code: String,
    pub text: String,
    pub values: Vec<String>,
    #[serde(rename = "valueTexts")]
    pub value_texts: Vec<String>,
    #[serde(default)]
    pub time: bool,
    #[serde(default)]
    pub elimination: bool,
}

/// Table metadata: title plus its dimensions.
#[derive(Debug, Clone, Deserialize)]
pub struct TableMetadata {
    pub title: String,
    pub variables: Vec<VariableMetadata>,
}

impl TableMetadata {
    pub fn variable(&self, code: &str) -> Option<&VariableMetadata> {
        self.variables.iter().find(|v| v.code == code)
    }

    /// Declared display labels for a dimension, in declared order. The
    /// resolver zips these against the sorted observed codes.
    pub fn declared_labels(&self, code: &str) -> Vec<String> {
        self.variable(code)
            .map(|v| v.value_texts.clone())
            .unwrap_or_default()
    }

    /// All period codes of the time dimension, oldest first (PxWeb
    /// declares them chronologically). Used for last-N-period selection.
    pub fn time_values(&self, time_code: &str) -> Vec<String> {
        self.variable(time_code)
            .map(|v| v.values.clone())
            .unwrap_or_default()
    }
}

// ============================================================================
// API client functions
// ============================================================================

/// Build the blocking HTTP client used for all SCB calls.
pub fn build_client(timeout_secs: u64) -> Result<reqwest::blocking::Client, ScbError> {
    reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ScbError::Upstream(e.to_string()))
}

/// Fetch a table's metadata (dimensions, value codes, display texts).
///
/// Callers treat a failure here as degraded metadata, not a failed
/// fetch; the resolver falls back to raw codes.
pub fn fetch_metadata(
    client: &reqwest::blocking::Client,
    base: &str,
    language: &str,
    dataset: &Dataset,
) -> Result<TableMetadata, ScbError> {
    let url = table_url(base, language, dataset);

    let response = client
        .get(&url)
        .header("Accept", "application/json")
        .send()
        .map_err(|e| ScbError::Upstream(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ScbError::HttpStatus(status.as_u16()));
    }

    response
        .json::<TableMetadata>()
        .map_err(|e| ScbError::Parse(e.to_string()))
}

/// POST a query document and return the raw keyed-tuple payload.
pub fn fetch_table(
    client: &reqwest::blocking::Client,
    base: &str,
    language: &str,
    dataset: &Dataset,
    query: &TableQuery,
) -> Result<RawPayload, ScbError> {
    let url = table_url(base, language, dataset);

    let response = client
        .post(&url)
        .json(query)
        .send()
        .map_err(|e| ScbError::Upstream(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ScbError::HttpStatus(status.as_u16()));
    }

    // PxWeb prefixes the JSON body with a UTF-8 BOM.
    let body = response
        .text()
        .map_err(|e| ScbError::Upstream(e.to_string()))?;
    let trimmed = body.trim_start_matches('\u{feff}');
    serde_json::from_str(trimmed).map_err(|e| ScbError::Parse(e.to_string()))
}

// ============================================================================
// Tests
// ============================================================================
