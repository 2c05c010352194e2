//! Inbound fetch surface.
//!
//! `DataService` is what the presentation collaborator calls: it owns the
//! HTTP client and the TTL cache, and turns a [`FetchRequest`] into a
//! normalized, labeled [`ObservationTable`]. One request triggers at most
//! one outbound data call (plus one metadata call), blocking until SCB
//! responds or the timeout fires. Payload-shape violations and upstream
//! connectivity failures propagate to the caller; degraded metadata does
//! not; it falls back to raw codes and logs a warning.

use std::collections::BTreeMap;

use crate::cache::TtlCache;
use crate::config::ServiceConfig;
use crate::ingest::scb::{self, Dataset, TableMetadata, TableQuery};
use crate::logging::{self, DataSource};
use crate::model::{CodeLabelMap, ObservationTable, RawPayload, ScbError, COL_COUNTRY};
use crate::normalize;
use crate::resolve;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// How the time dimension is constrained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodSelection {
    /// No time constraint: every period in the table.
    All,
    /// Explicit period codes ("2024M01", "2023").
    Explicit(Vec<String>),
    /// Inclusive month range, "YYYY-MM" bounds.
    Range { start: String, end: String },
    /// The latest N periods declared by table metadata.
    LastN(usize),
}

/// One fetch: a dataset, dimension filters, and a period selection.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub dataset: &'static Dataset,
    /// PxWeb variable code → selected value codes. Empty means the
    /// dimension is unconstrained.
    pub filters: BTreeMap<String, Vec<String>>,
    pub periods: PeriodSelection,
}

impl FetchRequest {
    pub fn new(dataset: &'static Dataset) -> Self {
        Self {
            dataset,
            filters: BTreeMap::new(),
            periods: PeriodSelection::All,
        }
    }

    pub fn with_filter<S: Into<String>>(
        mut self,
        code: &str,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        self.filters
            .insert(code.to_string(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_periods(mut self, periods: PeriodSelection) -> Self {
        self.periods = periods;
        self
    }

    /// Canonical cache key: dataset id, period selection, then filters in
    /// code order. Two requests differing only in filter insertion order
    /// produce the same key.
    pub fn cache_key(&self) -> String {
        let periods = match &self.periods {
            PeriodSelection::All => "all".to_string(),
            PeriodSelection::Explicit(values) => format!("explicit:{}", values.join(",")),
            PeriodSelection::Range { start, end } => format!("range:{}..{}", start, end),
            PeriodSelection::LastN(n) => format!("last:{}", n),
        };
        let mut key = format!("{}|{}", self.dataset.id, periods);
        for (code, values) in &self.filters {
            key.push_str(&format!("|{}={}", code, values.join(",")));
        }
        key
    }
}

/// Resolve a period selection into explicit codes for the query, or
/// `None` for "unconstrained".
///
/// A selection that resolves to no periods is an error, never an
/// unconstrained query: last-N without metadata has nothing to select
/// from, and a malformed or inverted range expands to nothing. Passing
/// either through would silently pull the entire table.
fn resolve_periods(
    selection: &PeriodSelection,
    metadata: Option<&TableMetadata>,
    time_code: &str,
) -> Result<Option<Vec<String>>, ScbError> {
    match selection {
        PeriodSelection::All => Ok(None),
        PeriodSelection::Explicit(values) => Ok(Some(values.clone())),
        PeriodSelection::Range { start, end } => {
            let months = normalize::months_range(start, end);
            if months.is_empty() {
                return Err(ScbError::Parse(format!(
                    "unusable month range: {}..{}",
                    start, end
                )));
            }
            Ok(Some(months))
        }
        PeriodSelection::LastN(n) => {
            let all = metadata
                .map(|m| m.time_values(time_code))
                .unwrap_or_default();
            if all.is_empty() {
                return Err(ScbError::Upstream(
                    "period metadata unavailable for last-N selection".to_string(),
                ));
            }
            let skip = all.len().saturating_sub(*n);
            Ok(Some(all[skip..].to_vec()))
        }
    }
}

// ---------------------------------------------------------------------------
// Data service
// ---------------------------------------------------------------------------

pub struct DataService {
    client: reqwest::blocking::Client,
    base_url: String,
    language: String,
    cache: TtlCache,
}

impl DataService {
    pub fn new(config: &ServiceConfig) -> Result<Self, ScbError> {
        Ok(Self {
            client: scb::build_client(config.timeout_secs)?,
            base_url: config.base_url.clone(),
            language: config.language.clone(),
            cache: TtlCache::new(config.cache_ttl_secs),
        })
    }

    /// Fetch a dataset as a normalized, labeled observation table.
    ///
    /// Consults the cache first; on a miss, retrieves metadata (degradable),
    /// posts the data query, normalizes, applies canonical renames and
    /// label resolution, and caches the result.
    pub fn fetch(&mut self, request: &FetchRequest) -> Result<ObservationTable, ScbError> {
        let dataset = request.dataset;
        let key = request.cache_key();
        if let Some(table) = self.cache.get(&key) {
            logging::debug(DataSource::Cache, Some(dataset.id), &format!("hit: {}", key));
            return Ok(table);
        }

        let metadata = self.metadata_or_degrade(dataset);
        let periods = resolve_periods(&request.periods, metadata.as_ref(), dataset.time_code)
            .inspect_err(|e| logging::log_fetch_failure(dataset.id, "period resolution", e))?;

        let mut query = TableQuery::new();
        for (code, values) in &request.filters {
            query = query.select_items(code, values.iter().cloned());
        }
        if let Some(periods) = periods {
            query = query.select_items(dataset.time_code, periods);
        }

        let payload =
            scb::fetch_table(&self.client, &self.base_url, &self.language, dataset, &query)
                .inspect_err(|e| logging::log_fetch_failure(dataset.id, "data fetch", e))?;
        let table = normalize::payload_to_table(&payload)
            .inspect_err(|e| logging::log_fetch_failure(dataset.id, "normalization", e))?;
        let table = label_table(dataset, &payload, table, metadata.as_ref());

        logging::info(
            DataSource::Scb,
            Some(dataset.id),
            &format!("fetched {} rows", table.len()),
        );
        self.cache.insert(&key, table.clone());
        Ok(table)
    }

    /// Raw table metadata, for building UI option lists.
    pub fn metadata(&self, dataset: &Dataset) -> Result<TableMetadata, ScbError> {
        scb::fetch_metadata(&self.client, &self.base_url, &self.language, dataset)
    }

    /// Labels of the top-level product groups, for the CPI group picker.
    ///
    /// Falls back to all declared labels when none of the codes look
    /// top-level, and to an empty list when metadata is unavailable;
    /// the picker then renders nothing rather than erroring the page.
    pub fn top_level_group_labels(&self) -> Vec<String> {
        let dataset = &scb::CPI_DATASET;
        let Some(metadata) = self.metadata_or_degrade(dataset) else {
            return Vec::new();
        };
        let Some(variable) = metadata.variable(dataset.classification_code) else {
            return Vec::new();
        };
        let map: CodeLabelMap = variable
            .values
            .iter()
            .cloned()
            .zip(variable.value_texts.iter().cloned())
            .collect();
        let top = crate::analysis::top_level_labels(&map);
        if top.is_empty() {
            variable.value_texts.clone()
        } else {
            top
        }
    }

    fn metadata_or_degrade(&self, dataset: &Dataset) -> Option<TableMetadata> {
        match self.metadata(dataset) {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                logging::log_metadata_degraded(dataset.id, &e.to_string());
                None
            }
        }
    }
}

/// Apply canonical renames and label resolution to a freshly normalized
/// table. With degraded metadata the label map is empty and every label
/// falls back to the raw code.
fn label_table(
    dataset: &Dataset,
    payload: &RawPayload,
    table: ObservationTable,
    metadata: Option<&TableMetadata>,
) -> ObservationTable {
    let mut table = table;
    for (from, to) in dataset.dim_renames {
        table = normalize::rename_dim_column(&table, from, to);
    }

    // Position of the classification dimension within the composite key.
    let position = payload
        .columns
        .iter()
        .filter(|c| c.is_key())
        .position(|c| c.code == dataset.classification_code);
    let Some(position) = position else {
        return table;
    };

    let declared = metadata
        .map(|m| m.declared_labels(dataset.classification_code))
        .unwrap_or_default();
    let map = resolve::build_code_label_map(&declared, payload, position);

    let label_target = classification_label(dataset, payload);
    if label_target.as_deref() == Some(COL_COUNTRY) {
        resolve::apply_country_names(&table, &map)
    } else if let Some(column) = label_target {
        resolve::apply_labels(&table, &column, &map)
    } else {
        table
    }
}

/// Post-rename column label of the classification dimension.
fn classification_label(dataset: &Dataset, payload: &RawPayload) -> Option<String> {
    let declared_text = payload
        .columns
        .iter()
        .find(|c| c.code == dataset.classification_code)
        .map(|c| c.text.as_str())?;
    let renamed = dataset
        .dim_renames
        .iter()
        .find(|(from, _)| *from == declared_text)
        .map(|(_, to)| *to)
        .unwrap_or(declared_text);
    Some(renamed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RawColumn, RawDataItem};

    fn metadata_with_months(months: &[&str]) -> TableMetadata {
        serde_json::from_value(serde_json::json!({
            "title": "CPI",
            "variables": [{
                "code": "Tid",
                "text": "month",
                "values": months,
                "valueTexts": months,
                "time": true
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_cache_key_is_canonical() {
        let a = FetchRequest::new(&scb::CPI_DATASET)
            .with_filter("VaruTjanstegrupp", ["00", "01"])
            .with_filter("ContentsCode", ["KPI"])
            .with_periods(PeriodSelection::LastN(60));
        let b = FetchRequest::new(&scb::CPI_DATASET)
            .with_filter("ContentsCode", ["KPI"])
            .with_filter("VaruTjanstegrupp", ["00", "01"])
            .with_periods(PeriodSelection::LastN(60));
        assert_eq!(a.cache_key(), b.cache_key());
        assert_eq!(
            a.cache_key(),
            "cpi|last:60|ContentsCode=KPI|VaruTjanstegrupp=00,01"
        );
    }

    #[test]
    fn test_cache_key_separates_datasets_and_periods() {
        let cpi = FetchRequest::new(&scb::CPI_DATASET);
        let migration = FetchRequest::new(&scb::MIGRATION_DATASET);
        assert_ne!(cpi.cache_key(), migration.cache_key());

        let last = FetchRequest::new(&scb::CPI_DATASET).with_periods(PeriodSelection::LastN(12));
        let range = FetchRequest::new(&scb::CPI_DATASET).with_periods(PeriodSelection::Range {
            start: "2023-01".to_string(),
            end: "2023-12".to_string(),
        });
        assert_ne!(last.cache_key(), range.cache_key());
    }

    #[test]
    fn test_resolve_periods_last_n() {
        let metadata = metadata_with_months(&["2024M01", "2024M02", "2024M03"]);
        let resolved =
            resolve_periods(&PeriodSelection::LastN(2), Some(&metadata), "Tid").unwrap();
        assert_eq!(resolved, Some(vec!["2024M02".to_string(), "2024M03".to_string()]));

        // Asking for more than exists returns everything.
        let resolved =
            resolve_periods(&PeriodSelection::LastN(99), Some(&metadata), "Tid").unwrap();
        assert_eq!(resolved.unwrap().len(), 3);
    }

    #[test]
    fn test_resolve_periods_last_n_without_metadata_fails() {
        let err = resolve_periods(&PeriodSelection::LastN(2), None, "Tid").unwrap_err();
        assert!(matches!(err, ScbError::Upstream(_)));
    }

    #[test]
    fn test_resolve_periods_range_and_all() {
        let range = PeriodSelection::Range {
            start: "2023-11".to_string(),
            end: "2024-01".to_string(),
        };
        let resolved = resolve_periods(&range, None, "Tid").unwrap().unwrap();
        assert_eq!(resolved, vec!["2023M11", "2023M12", "2024M01"]);

        assert_eq!(resolve_periods(&PeriodSelection::All, None, "Tid").unwrap(), None);
    }

    #[test]
    fn test_resolve_periods_empty_range_fails_instead_of_unconstraining() {
        // An empty expansion would vanish from the query document
        // entirely (select_items skips empty value lists), turning a
        // typo'd range into a whole-table fetch.
        let malformed = PeriodSelection::Range {
            start: "garbage".to_string(),
            end: "2021-01".to_string(),
        };
        let err = resolve_periods(&malformed, None, "Tid").unwrap_err();
        assert!(matches!(err, ScbError::Parse(_)));

        let inverted = PeriodSelection::Range {
            start: "2022-01".to_string(),
            end: "2021-01".to_string(),
        };
        assert!(resolve_periods(&inverted, None, "Tid").is_err());
    }

    #[test]
    fn test_label_table_applies_renames_and_country_names() {
        let payload = RawPayload {
            columns: vec![
                RawColumn {
                    code: "Fodelseland".to_string(),
                    text: "country of birth".to_string(),
                    kind: "d".to_string(),
                    comment: None,
                },
                RawColumn {
                    code: "Tid".to_string(),
                    text: "year".to_string(),
                    kind: "t".to_string(),
                    comment: None,
                },
                RawColumn {
                    code: "BE0101N1".to_string(),
                    text: "Immigration".to_string(),
                    kind: "c".to_string(),
                    comment: None,
                },
            ],
            data: vec![RawDataItem {
                key: vec!["NO".to_string(), "2023".to_string()],
                values: vec!["1200".to_string()],
            }],
        };
        let table = normalize::payload_to_table(&payload).unwrap();
        let labeled = label_table(&scb::MIGRATION_DATASET, &payload, table, None);

        assert!(labeled.has_dim_column(COL_COUNTRY));
        assert_eq!(labeled.rows[0].dim(COL_COUNTRY), Some("NO"));
        // Degraded metadata: the static registry still names the country.
        assert_eq!(labeled.rows[0].dim("countryname"), Some("Norway"));
    }
}
