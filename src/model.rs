/// Core data types for the SCB insights service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic beyond simple accessors, no I/O, and no network
/// dependencies; only types.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Well-known column labels
// ---------------------------------------------------------------------------
//
// SCB's English-language tables declare these column texts. All analysis
// modules reference columns through these constants rather than hardcoding
// strings at each call site.

/// CPI classification dimension (COICOP product group code).
pub const COL_PRODUCT_GROUP: &str = "Product group";

/// Resolved label column added by the resolver next to the code column.
pub const COL_PRODUCT_GROUP_LABEL: &str = "Product group_label";

/// CPI time dimension, values formatted "YYYYMnn".
pub const COL_MONTH: &str = "month";

/// CPI index level (base 2020 = 100).
pub const COL_INDEX: &str = "Index";

/// Annual (12-month) percentage change.
pub const COL_ANNUAL_CHANGES: &str = "Annual changes";

/// Basket weight as a percentage of total consumption.
pub const COL_WEIGHTS: &str = "Weights";

/// Migration country dimension (ISO 3166-1 alpha-2 code).
pub const COL_COUNTRY: &str = "countrycode";

/// Resolved country display name.
pub const COL_COUNTRY_NAME: &str = "countryname";

/// Migration time dimension, values formatted "YYYY".
pub const COL_YEAR: &str = "year";

pub const COL_IMMIGRATION: &str = "Immigration";
pub const COL_EMIGRATION: &str = "Emigration";

/// Derived column produced by `analysis::migration::net_migration`.
pub const COL_NET_MIGRATION: &str = "net_migration";

/// Label of the all-groups aggregate row in the CPI table. Rankings must
/// exclude it or it dominates every top-N list.
pub const TOTAL_GROUP_LABEL: &str = "TOTAL";

// ---------------------------------------------------------------------------
// Raw PxWeb payload
// ---------------------------------------------------------------------------

/// Column kind discriminators used by the PxWeb JSON format:
/// "d" = dimension, "t" = time, "c" = content (value).
pub const COLUMN_DIMENSION: &str = "d";
pub const COLUMN_TIME: &str = "t";
pub const COLUMN_VALUE: &str = "c";

/// One column descriptor from a PxWeb response.
#[derive(Debug, Clone, Deserialize)]
pub struct RawColumn {
    pub code: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub comment: Option<String>,
}

impl RawColumn {
    /// Dimension and time columns both contribute to the composite row key.
    pub fn is_key(&self) -> bool {
        self.kind == COLUMN_DIMENSION || self.kind == COLUMN_TIME
    }

    pub fn is_value(&self) -> bool {
        self.kind == COLUMN_VALUE
    }
}

/// One data item: a composite key tuple plus the value strings for it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDataItem {
    pub key: Vec<String>,
    pub values: Vec<String>,
}

/// Deserialized PxWeb table response, before normalization.
///
/// Invariant (checked by the normalizer, not by serde): every item's
/// `key` length equals the number of key columns and every item's
/// `values` length equals the number of value columns.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPayload {
    pub columns: Vec<RawColumn>,
    #[serde(default)]
    pub data: Vec<RawDataItem>,
}

// ---------------------------------------------------------------------------
// Normalized observation types
// ---------------------------------------------------------------------------

/// Mapping from a dimension code to its human-readable display label.
pub type CodeLabelMap = BTreeMap<String, String>;

/// One normalized observation: a dimension tuple plus typed metric values.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRow {
    /// Dimension label → code (or resolved label for `*_label` columns).
    pub dims: BTreeMap<String, String>,
    /// Parsed calendar date for the month dimension, when present and valid.
    pub period: Option<NaiveDate>,
    /// Value label → numeric value. `None` means the upstream cell was
    /// missing or non-numeric, never that the column is absent.
    pub values: BTreeMap<String, Option<f64>>,
}

impl ObservationRow {
    pub fn dim(&self, column: &str) -> Option<&str> {
        self.dims.get(column).map(String::as_str)
    }

    /// Numeric value for `column`, flattening "column absent" and
    /// "cell is null" into `None`.
    pub fn value(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied().flatten()
    }

    /// Calendar year of this row: the parsed period if available, otherwise
    /// the `year` dimension (migration tables carry a plain "YYYY" key).
    pub fn year(&self) -> Option<i32> {
        if let Some(date) = self.period {
            return Some(date.year());
        }
        self.dim(COL_YEAR).and_then(|y| y.trim().parse().ok())
    }
}

/// An ordered sequence of observation rows sharing a schema.
///
/// Tables are immutable after construction: every pipeline stage consumes
/// a table by reference and produces a fresh one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObservationTable {
    /// Dimension column labels, in declared order (includes the time column).
    pub dim_columns: Vec<String>,
    /// The dimension recognized as the month/period column, if any.
    pub time_column: Option<String>,
    /// Value column labels, in declared order.
    pub value_columns: Vec<String>,
    pub rows: Vec<ObservationRow>,
}

impl ObservationTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_dim_column(&self, column: &str) -> bool {
        self.dim_columns.iter().any(|c| c == column)
    }

    pub fn has_value_column(&self, column: &str) -> bool {
        self.value_columns.iter().any(|c| c == column)
    }

    /// A table with the same schema and the given rows.
    pub fn with_rows(&self, rows: Vec<ObservationRow>) -> Self {
        Self {
            dim_columns: self.dim_columns.clone(),
            time_column: self.time_column.clone(),
            value_columns: self.value_columns.clone(),
            rows,
        }
    }

    /// Maximum parsed period across all rows. `None` when no row carries
    /// a parsed date; callers then treat the whole table as "latest".
    pub fn latest_period(&self) -> Option<NaiveDate> {
        self.rows.iter().filter_map(|r| r.period).max()
    }
}

// ---------------------------------------------------------------------------
// Derived record types (outbound to the presentation collaborator)
// ---------------------------------------------------------------------------

/// Aggregated directional migration between one country and Sweden.
///
/// Both coordinates are always present: countries without a known location
/// are dropped during flow construction rather than kept with nulls. The
/// record carries only the far endpoint and the volumes; drawing the
/// great-circle arc toward Sweden is a rendering concern, and the two
/// endpoints (not any interpolated intermediate points) are the
/// data-integrity-relevant output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowRecord {
    pub country_code: String,
    pub country_name: String,
    pub immigration: f64,
    pub emigration: f64,
    pub latitude: f64,
    pub longitude: f64,
}

/// One product group's share of overall inflation for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributionRecord {
    pub month: NaiveDate,
    pub group_label: String,
    pub annual_change_pct: f64,
    pub weight_pct: f64,
    /// `annual_change_pct * weight_pct / 100`.
    pub contribution_pct: f64,
}

/// What a base-year amount is worth at the latest available index level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InflationImpact {
    pub current_amount: f64,
    pub latest_index: f64,
    pub latest_month: Option<NaiveDate>,
    pub total_inflation_pct: f64,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching or normalizing SCB data.
///
/// Degraded metadata (no code→label map) and empty derived results are
/// deliberately NOT errors: the resolver returns an empty map and the
/// aggregators return empty tables, per the partial-failure policy.
#[derive(Debug, Clone, PartialEq)]
pub enum ScbError {
    /// A data item's key or value tuple does not match the declared
    /// column counts. Fatal to that fetch.
    Schema {
        row: usize,
        expected: usize,
        actual: usize,
        /// "key" or "values", whichever tuple was malformed.
        section: &'static str,
    },
    /// Non-2xx HTTP response from the SCB API.
    HttpStatus(u16),
    /// Transport-level failure or timeout talking to the SCB API.
    Upstream(String),
    /// The response body could not be deserialized.
    Parse(String),
}

impl std::fmt::Display for ScbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScbError::Schema {
                row,
                expected,
                actual,
                section,
            } => write!(
                f,
                "schema violation in data item {}: {} tuple has {} entries, expected {}",
                row, section, actual, expected
            ),
            ScbError::HttpStatus(code) => write!(f, "HTTP error: {}", code),
            ScbError::Upstream(msg) => write!(f, "upstream unavailable: {}", msg),
            ScbError::Parse(msg) => write!(f, "parse error: {}", msg),
        }
    }
}

impl std::error::Error for ScbError {}
