//! Code → label resolution.
//!
//! SCB's data endpoint returns opaque dimension codes ("00", "01.1", "DK")
//! while the metadata endpoint declares display labels. The two are joined
//! positionally: the distinct codes observed in a payload, sorted, are
//! zipped against the declared label list. The upstream API guarantees
//! (informally) that declared label order equals sorted code order; this
//! module preserves that contract as-is rather than validating it.
//!
//! The metadata endpoint is observed to be unreliable, so resolution never
//! fails a fetch: degraded metadata yields an empty map and callers fall
//! back to raw codes.

use std::collections::BTreeSet;

use crate::countries;
use crate::logging::{self, DataSource};
use crate::model::{
    CodeLabelMap, ObservationTable, RawPayload, COL_COUNTRY, COL_COUNTRY_NAME,
};

/// Build a code → label map for the dimension at key position
/// `dim_position`, by positional zip of the sorted observed codes against
/// the declared label list.
///
/// An empty declared list (failed or empty metadata retrieval) degrades to
/// an empty map. A length mismatch between observed codes and declared
/// labels maps the overlapping prefix and logs the discrepancy; the
/// unmatched codes simply stay unresolved.
pub fn build_code_label_map(
    declared_labels: &[String],
    payload: &RawPayload,
    dim_position: usize,
) -> CodeLabelMap {
    if declared_labels.is_empty() {
        logging::warn(
            DataSource::Scb,
            None,
            "no declared labels for dimension; falling back to raw codes",
        );
        return CodeLabelMap::new();
    }

    // BTreeSet gives distinct codes in sorted order in one pass.
    let observed: BTreeSet<&str> = payload
        .data
        .iter()
        .filter_map(|item| item.key.get(dim_position))
        .map(String::as_str)
        .collect();

    if observed.len() != declared_labels.len() {
        logging::warn(
            DataSource::Scb,
            None,
            &format!(
                "observed {} distinct codes but metadata declared {} labels; \
                 mapping the overlap only",
                observed.len(),
                declared_labels.len()
            ),
        );
    }

    observed
        .into_iter()
        .zip(declared_labels)
        .map(|(code, label)| (code.to_string(), label.clone()))
        .collect()
}

/// Add a `<dim>_label` dimension next to `dim_column`, resolving each code
/// through `map` and falling back to the raw code for unmapped entries.
///
/// Returns the table unchanged when the column is absent. With an empty
/// map every label is the raw code, which is the degraded-metadata
/// rendering the callers expect.
pub fn apply_labels(
    table: &ObservationTable,
    dim_column: &str,
    map: &CodeLabelMap,
) -> ObservationTable {
    if !table.has_dim_column(dim_column) {
        return table.clone();
    }

    let label_column = format!("{}_label", dim_column);
    let mut labeled = table.clone();
    if !labeled.has_dim_column(&label_column) {
        labeled.dim_columns.push(label_column.clone());
    }
    for row in &mut labeled.rows {
        let code = row.dims.get(dim_column).cloned().unwrap_or_default();
        let label = map.get(&code).cloned().unwrap_or_else(|| code.clone());
        row.dims.insert(label_column.clone(), label);
    }
    labeled
}

/// Resolve a country code to a display name: live metadata first, then the
/// static registry, then the code itself. Never empty, never an error.
pub fn resolve_country_name(code: &str, live: &CodeLabelMap) -> String {
    if let Some(label) = live.get(code) {
        return label.clone();
    }
    countries::country_name(code)
        .map(str::to_string)
        .unwrap_or_else(|| code.to_string())
}

/// Add a `countryname` dimension to a migration table, resolving through
/// [`resolve_country_name`]. The code column is kept; flow construction
/// still needs it for coordinate lookup.
pub fn apply_country_names(table: &ObservationTable, live: &CodeLabelMap) -> ObservationTable {
    if !table.has_dim_column(COL_COUNTRY) {
        return table.clone();
    }

    let mut named = table.clone();
    if !named.has_dim_column(COL_COUNTRY_NAME) {
        named.dim_columns.push(COL_COUNTRY_NAME.to_string());
    }
    for row in &mut named.rows {
        let code = row.dims.get(COL_COUNTRY).cloned().unwrap_or_default();
        let name = resolve_country_name(&code, live);
        row.dims.insert(COL_COUNTRY_NAME.to_string(), name);
    }
    named
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RawColumn, RawDataItem};
    use crate::normalize::payload_to_table;

    fn payload_with_codes(codes: &[&str]) -> RawPayload {
        RawPayload {
            columns: vec![
                RawColumn {
                    code: "VaruTjanstegrupp".to_string(),
                    text: "Product group".to_string(),
                    kind: "d".to_string(),
                    comment: None,
                },
                RawColumn {
                    code: "KPI".to_string(),
                    text: "Index".to_string(),
                    kind: "c".to_string(),
                    comment: None,
                },
            ],
            data: codes
                .iter()
                .map(|c| RawDataItem {
                    key: vec![(*c).to_string()],
                    values: vec!["100.0".to_string()],
                })
                .collect(),
        }
    }

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_positional_zip_of_sorted_codes() {
        // Codes arrive unsorted and duplicated across months; the map is
        // built from the sorted distinct codes.
        let payload = payload_with_codes(&["01", "00", "01", "02"]);
        let declared = labels(&["TOTAL", "FOOD", "ALCOHOL"]);
        let map = build_code_label_map(&declared, &payload, 0);
        assert_eq!(map.get("00").map(String::as_str), Some("TOTAL"));
        assert_eq!(map.get("01").map(String::as_str), Some("FOOD"));
        assert_eq!(map.get("02").map(String::as_str), Some("ALCOHOL"));
    }

    #[test]
    fn test_empty_declared_labels_degrade_to_empty_map() {
        let payload = payload_with_codes(&["00", "01"]);
        let map = build_code_label_map(&[], &payload, 0);
        assert!(map.is_empty());
    }

    #[test]
    fn test_length_mismatch_maps_overlap_only() {
        let payload = payload_with_codes(&["00", "01", "02"]);
        let map = build_code_label_map(&labels(&["TOTAL", "FOOD"]), &payload, 0);
        assert_eq!(map.len(), 2);
        assert!(!map.contains_key("02"));
    }

    #[test]
    fn test_apply_labels_falls_back_to_raw_code() {
        let table = payload_to_table(&payload_with_codes(&["00", "99"])).unwrap();
        let mut map = CodeLabelMap::new();
        map.insert("00".to_string(), "TOTAL".to_string());

        let labeled = apply_labels(&table, "Product group", &map);
        assert!(labeled.has_dim_column("Product group_label"));
        assert_eq!(labeled.rows[0].dim("Product group_label"), Some("TOTAL"));
        // Unmapped code renders as itself, never as an empty string.
        assert_eq!(labeled.rows[1].dim("Product group_label"), Some("99"));
        // The source table is untouched.
        assert!(!table.has_dim_column("Product group_label"));
    }

    #[test]
    fn test_apply_labels_missing_column_is_identity() {
        let table = payload_to_table(&payload_with_codes(&["00"])).unwrap();
        let labeled = apply_labels(&table, "no such dimension", &CodeLabelMap::new());
        assert_eq!(labeled, table);
    }

    #[test]
    fn test_country_resolution_fallback_chain() {
        let mut live = CodeLabelMap::new();
        live.insert("DE".to_string(), "Germany (live)".to_string());

        // Live metadata wins over the static registry.
        assert_eq!(resolve_country_name("DE", &live), "Germany (live)");
        // Registry covers codes the live map misses.
        assert_eq!(resolve_country_name("NO", &live), "Norway");
        // Unknown everywhere: the code itself, never an empty string.
        assert_eq!(resolve_country_name("ZZ", &live), "ZZ");
    }
}
