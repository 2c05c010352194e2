/// Derived-metric computation over normalized observation tables.
///
/// Every operation here is a pure function: tables in, fresh tables or
/// record sequences out, no I/O and no shared state. All operations are
/// total; empty input or a missing column produces an empty (or
/// unchanged) result, never an error.
///
/// Submodules:
/// - `cpi`: inflation contributions, rankings, heatmap pivot, and the
///   inflation-adjusted amount projection.
/// - `migration`: net migration, yearly aggregation, and top
///   immigration/emigration countries.
/// - `flows`: directional country flow records for map rendering.

pub mod cpi;
pub mod flows;
pub mod migration;

use crate::model::ObservationTable;

// ---------------------------------------------------------------------------
// Hierarchical classification filter
// ---------------------------------------------------------------------------

/// True for a top-level classification code: exactly two ASCII digits.
///
/// COICOP nests sub-categories under dotted codes ("01.1", "01.10");
/// anything longer than two characters, or non-numeric, is a nested entry.
pub fn is_top_level_code(code: &str) -> bool {
    code.len() == 2 && code.chars().all(|c| c.is_ascii_digit())
}

/// Restrict a table to its top-level classification rows.
///
/// Purely structural: no knowledge of COICOP beyond "top level = exactly
/// two digits". Idempotent, and a table without the classification column
/// passes through unchanged.
pub fn filter_top_level(table: &ObservationTable, dim_column: &str) -> ObservationTable {
    if !table.has_dim_column(dim_column) {
        return table.clone();
    }
    let rows = table
        .rows
        .iter()
        .filter(|row| row.dim(dim_column).is_some_and(is_top_level_code))
        .cloned()
        .collect();
    table.with_rows(rows)
}

/// Labels of the top-level codes in a code → label map, in code order.
/// Used to present only top-level groups as selectable options.
pub fn top_level_labels(map: &crate::model::CodeLabelMap) -> Vec<String> {
    map.iter()
        .filter(|(code, _)| is_top_level_code(code))
        .map(|(_, label)| label.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CodeLabelMap, ObservationRow, COL_PRODUCT_GROUP};
    use std::collections::BTreeMap;

    fn row_with_group(code: &str) -> ObservationRow {
        let mut dims = BTreeMap::new();
        dims.insert(COL_PRODUCT_GROUP.to_string(), code.to_string());
        ObservationRow {
            dims,
            period: None,
            values: BTreeMap::new(),
        }
    }

    fn table_with_groups(codes: &[&str]) -> ObservationTable {
        ObservationTable {
            dim_columns: vec![COL_PRODUCT_GROUP.to_string()],
            time_column: None,
            value_columns: Vec::new(),
            rows: codes.iter().map(|c| row_with_group(c)).collect(),
        }
    }

    #[test]
    fn test_top_level_code_shapes() {
        assert!(is_top_level_code("00"));
        assert!(is_top_level_code("12"));
        assert!(!is_top_level_code("01.1"));
        assert!(!is_top_level_code("01.10"));
        assert!(!is_top_level_code("1"));
        assert!(!is_top_level_code("123"));
        assert!(!is_top_level_code("0A"));
        assert!(!is_top_level_code(""));
    }

    #[test]
    fn test_filter_drops_nested_codes_only() {
        let table = table_with_groups(&["00", "01.1", "01", "01.10", "07"]);
        let filtered = filter_top_level(&table, COL_PRODUCT_GROUP);
        let kept: Vec<_> = filtered
            .rows
            .iter()
            .map(|r| r.dim(COL_PRODUCT_GROUP).unwrap())
            .collect();
        assert_eq!(kept, vec!["00", "01", "07"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let table = table_with_groups(&["00", "01.1", "04"]);
        let once = filter_top_level(&table, COL_PRODUCT_GROUP);
        let twice = filter_top_level(&once, COL_PRODUCT_GROUP);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_filter_without_classification_column_is_identity() {
        let table = table_with_groups(&["00", "01.1"]);
        let filtered = filter_top_level(&table, "some other dimension");
        assert_eq!(filtered, table);
    }

    #[test]
    fn test_top_level_labels_keeps_code_order() {
        let mut map = CodeLabelMap::new();
        map.insert("01.1".to_string(), "FOOD SUBGROUP".to_string());
        map.insert("01".to_string(), "FOOD".to_string());
        map.insert("00".to_string(), "TOTAL".to_string());
        assert_eq!(top_level_labels(&map), vec!["TOTAL", "FOOD"]);
    }
}
