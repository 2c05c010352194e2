//! Migration-derived metrics: net migration, yearly aggregation, and
//! top immigration/emigration country rankings.
//!
//! The migration table keys rows by (country, gender, year); most
//! consumers want country-level numbers, so gender is summed out before
//! ranking. Sweden itself appears in the country dimension as the
//! domestic remainder and is excluded from every ranking; it is the
//! fixed endpoint of each flow, not a partner country.

use std::collections::BTreeMap;

use crate::model::{
    CodeLabelMap, ObservationRow, ObservationTable, COL_COUNTRY, COL_COUNTRY_NAME,
    COL_EMIGRATION, COL_IMMIGRATION, COL_NET_MIGRATION,
};
use crate::resolve;

/// Destination country code; never a ranking candidate.
const SWEDEN: &str = "SE";

/// One entry of a country ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryVolume {
    pub country_code: String,
    pub country_name: String,
    pub volume: f64,
}

// ---------------------------------------------------------------------------
// Net migration
// ---------------------------------------------------------------------------

/// Add a per-row `net_migration` column: immigration − emigration.
///
/// A null operand gives a null result; a missing count is unknown, not
/// zero. Tables without both source columns pass through unchanged.
pub fn net_migration(table: &ObservationTable) -> ObservationTable {
    if !table.has_value_column(COL_IMMIGRATION) || !table.has_value_column(COL_EMIGRATION) {
        return table.clone();
    }

    let mut out = table.clone();
    if !out.has_value_column(COL_NET_MIGRATION) {
        out.value_columns.push(COL_NET_MIGRATION.to_string());
    }
    for row in &mut out.rows {
        let net = match (row.value(COL_IMMIGRATION), row.value(COL_EMIGRATION)) {
            (Some(imm), Some(emi)) => Some(imm - emi),
            _ => None,
        };
        row.values.insert(COL_NET_MIGRATION.to_string(), net);
    }
    out
}

// ---------------------------------------------------------------------------
// Yearly aggregation
// ---------------------------------------------------------------------------

/// Columns summed by [`aggregate_by_year`], in output order.
const SUM_COLUMNS: [&str; 3] = [COL_IMMIGRATION, COL_EMIGRATION, COL_NET_MIGRATION];

/// Group rows by the given key columns, summing the migration volume
/// columns. Requested key columns absent from the table are dropped; if
/// none survive, or the table has no volume columns, the table passes
/// through unchanged. Null cells are skipped in sums (an all-null group
/// sums to zero). Output groups are ordered by key.
pub fn aggregate_by_year(table: &ObservationTable, group_by: &[&str]) -> ObservationTable {
    let keys: Vec<&str> = group_by
        .iter()
        .copied()
        .filter(|col| table.has_dim_column(col))
        .collect();
    let sum_columns: Vec<&str> = SUM_COLUMNS
        .iter()
        .copied()
        .filter(|col| table.has_value_column(col))
        .collect();
    if keys.is_empty() || sum_columns.is_empty() {
        return table.clone();
    }

    let mut groups: BTreeMap<Vec<String>, Vec<f64>> = BTreeMap::new();
    for row in &table.rows {
        let key: Vec<String> = keys
            .iter()
            .map(|col| row.dim(col).unwrap_or_default().to_string())
            .collect();
        let sums = groups.entry(key).or_insert_with(|| vec![0.0; sum_columns.len()]);
        for (slot, col) in sums.iter_mut().zip(&sum_columns) {
            if let Some(v) = row.value(col) {
                *slot += v;
            }
        }
    }

    let rows = groups
        .into_iter()
        .map(|(key, sums)| {
            let dims = keys
                .iter()
                .map(|col| (*col).to_string())
                .zip(key)
                .collect();
            let values = sum_columns
                .iter()
                .map(|col| (*col).to_string())
                .zip(sums.into_iter().map(Some))
                .collect();
            ObservationRow {
                dims,
                period: None,
                values,
            }
        })
        .collect();

    ObservationTable {
        dim_columns: keys.iter().map(|c| (*c).to_string()).collect(),
        time_column: None,
        value_columns: sum_columns.iter().map(|c| (*c).to_string()).collect(),
        rows,
    }
}

// ---------------------------------------------------------------------------
// Country rankings
// ---------------------------------------------------------------------------

/// Top `n` countries by immigration volume, for the requested year or
/// the latest year in the table when `year` is `None`.
pub fn top_immigration(table: &ObservationTable, n: usize, year: Option<i32>) -> Vec<CountryVolume> {
    top_countries(table, COL_IMMIGRATION, n, year)
}

/// Top `n` countries by emigration volume; same year semantics.
pub fn top_emigration(table: &ObservationTable, n: usize, year: Option<i32>) -> Vec<CountryVolume> {
    top_countries(table, COL_EMIGRATION, n, year)
}

fn top_countries(
    table: &ObservationTable,
    volume_column: &str,
    n: usize,
    year: Option<i32>,
) -> Vec<CountryVolume> {
    if !table.has_dim_column(COL_COUNTRY) || !table.has_value_column(volume_column) {
        return Vec::new();
    }

    let candidates: Vec<&ObservationRow> = table
        .rows
        .iter()
        .filter(|row| {
            row.dim(COL_COUNTRY)
                .is_some_and(|c| !c.eq_ignore_ascii_case(SWEDEN))
        })
        .collect();

    // Requested year, else the latest one present. Tables without any
    // year information rank over all rows.
    let target_year = year.or_else(|| candidates.iter().filter_map(|r| r.year()).max());
    let candidates: Vec<&ObservationRow> = match target_year {
        Some(y) => candidates
            .into_iter()
            .filter(|row| row.year() == Some(y))
            .collect(),
        None => candidates,
    };

    // Sum volumes per country across the remaining dimensions (gender).
    let mut sums: BTreeMap<String, f64> = BTreeMap::new();
    let mut names: BTreeMap<String, String> = BTreeMap::new();
    for row in candidates {
        let Some(code) = row.dim(COL_COUNTRY) else {
            continue;
        };
        if let Some(v) = row.value(volume_column) {
            *sums.entry(code.to_string()).or_insert(0.0) += v;
        }
        if let Some(name) = row.dim(COL_COUNTRY_NAME) {
            names.entry(code.to_string()).or_insert_with(|| name.to_string());
        }
    }

    let empty_live = CodeLabelMap::new();
    let mut ranking: Vec<CountryVolume> = sums
        .into_iter()
        .map(|(code, volume)| CountryVolume {
            country_name: names
                .get(&code)
                .cloned()
                .unwrap_or_else(|| resolve::resolve_country_name(&code, &empty_live)),
            country_code: code,
            volume,
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.volume
            .partial_cmp(&a.volume)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranking.truncate(n);
    ranking
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::COL_YEAR;

    fn migration_row(
        country: &str,
        gender: &str,
        year: &str,
        immigration: Option<f64>,
        emigration: Option<f64>,
    ) -> ObservationRow {
        let mut dims = BTreeMap::new();
        dims.insert(COL_COUNTRY.to_string(), country.to_string());
        dims.insert("gender".to_string(), gender.to_string());
        dims.insert(COL_YEAR.to_string(), year.to_string());
        let mut values = BTreeMap::new();
        values.insert(COL_IMMIGRATION.to_string(), immigration);
        values.insert(COL_EMIGRATION.to_string(), emigration);
        ObservationRow {
            dims,
            period: None,
            values,
        }
    }

    fn migration_table(rows: Vec<ObservationRow>) -> ObservationTable {
        ObservationTable {
            dim_columns: vec![
                COL_COUNTRY.to_string(),
                "gender".to_string(),
                COL_YEAR.to_string(),
            ],
            time_column: Some(COL_YEAR.to_string()),
            value_columns: vec![COL_IMMIGRATION.to_string(), COL_EMIGRATION.to_string()],
            rows,
        }
    }

    #[test]
    fn test_net_migration_per_row_and_null_propagation() {
        let table = migration_table(vec![
            migration_row("NO", "men", "2023", Some(120.0), Some(80.0)),
            migration_row("DK", "men", "2023", Some(50.0), None),
            migration_row("FI", "men", "2023", None, Some(30.0)),
        ]);
        let with_net = net_migration(&table);
        assert!(with_net.has_value_column(COL_NET_MIGRATION));
        assert_eq!(with_net.rows[0].value(COL_NET_MIGRATION), Some(40.0));
        assert_eq!(with_net.rows[1].value(COL_NET_MIGRATION), None);
        assert_eq!(with_net.rows[2].value(COL_NET_MIGRATION), None);
        // Input table untouched.
        assert!(!table.has_value_column(COL_NET_MIGRATION));
    }

    #[test]
    fn test_net_migration_without_columns_is_identity() {
        let mut table = migration_table(Vec::new());
        table.value_columns = vec![COL_IMMIGRATION.to_string()];
        assert_eq!(net_migration(&table), table);
    }

    #[test]
    fn test_aggregate_by_year_sums_genders() {
        let table = migration_table(vec![
            migration_row("NO", "men", "2022", Some(60.0), Some(20.0)),
            migration_row("NO", "women", "2022", Some(40.0), Some(30.0)),
            migration_row("NO", "men", "2023", Some(10.0), None),
        ]);
        let by_year = aggregate_by_year(&table, &[COL_YEAR]);
        assert_eq!(by_year.dim_columns, vec![COL_YEAR]);
        assert_eq!(by_year.len(), 2);
        assert_eq!(by_year.rows[0].dim(COL_YEAR), Some("2022"));
        assert_eq!(by_year.rows[0].value(COL_IMMIGRATION), Some(100.0));
        assert_eq!(by_year.rows[0].value(COL_EMIGRATION), Some(50.0));
        // Null cells are skipped, not poisoning the sum.
        assert_eq!(by_year.rows[1].value(COL_EMIGRATION), Some(0.0));
    }

    #[test]
    fn test_aggregate_drops_unknown_key_columns() {
        let table = migration_table(vec![migration_row("NO", "men", "2022", Some(1.0), None)]);
        let agg = aggregate_by_year(&table, &["region", COL_YEAR]);
        assert_eq!(agg.dim_columns, vec![COL_YEAR]);

        // No surviving key column at all: table passes through unchanged.
        let identity = aggregate_by_year(&table, &["region"]);
        assert_eq!(identity, table);
    }

    #[test]
    fn test_top_immigration_excludes_sweden_and_sums_genders() {
        let table = migration_table(vec![
            migration_row("SE", "men", "2023", Some(9999.0), Some(0.0)),
            migration_row("NO", "men", "2023", Some(60.0), Some(5.0)),
            migration_row("NO", "women", "2023", Some(50.0), Some(5.0)),
            migration_row("DK", "men", "2023", Some(80.0), Some(5.0)),
            migration_row("FI", "men", "2023", Some(30.0), Some(5.0)),
        ]);
        let top = top_immigration(&table, 2, None);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].country_code, "NO");
        assert_eq!(top[0].volume, 110.0);
        assert_eq!(top[0].country_name, "Norway");
        assert_eq!(top[1].country_code, "DK");
    }

    #[test]
    fn test_top_immigration_defaults_to_latest_year() {
        let table = migration_table(vec![
            migration_row("NO", "men", "2022", Some(500.0), None),
            migration_row("NO", "men", "2023", Some(60.0), None),
            migration_row("DK", "men", "2023", Some(70.0), None),
        ]);
        let top = top_immigration(&table, 5, None);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].country_code, "DK");

        let explicit = top_immigration(&table, 5, Some(2022));
        assert_eq!(explicit.len(), 1);
        assert_eq!(explicit[0].volume, 500.0);
    }

    #[test]
    fn test_top_emigration_uses_emigration_volume() {
        let table = migration_table(vec![
            migration_row("NO", "men", "2023", Some(1.0), Some(40.0)),
            migration_row("DK", "men", "2023", Some(99.0), Some(10.0)),
        ]);
        let top = top_emigration(&table, 5, None);
        assert_eq!(top[0].country_code, "NO");
        assert_eq!(top[0].volume, 40.0);
    }

    #[test]
    fn test_rankings_on_missing_columns_are_empty() {
        let mut table = migration_table(Vec::new());
        table.dim_columns.retain(|c| c != COL_COUNTRY);
        assert!(top_immigration(&table, 5, None).is_empty());
        assert!(top_emigration(&table, 5, None).is_empty());
    }

    #[test]
    fn test_unknown_country_ranks_under_its_code() {
        let table = migration_table(vec![migration_row("ZZ", "men", "2023", Some(10.0), None)]);
        let top = top_immigration(&table, 1, None);
        assert_eq!(top[0].country_name, "ZZ");
    }
}
