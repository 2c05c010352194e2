//! Flow-pair construction for the migration map.
//!
//! Aggregates the migration table to one directional record per country,
//! thresholds out small flows, and attaches static coordinates. Countries
//! without a registry location are dropped outright; an unmapped country
//! must vanish from the map, not render at (0, 0).

use std::collections::BTreeMap;

use crate::countries;
use crate::model::{
    FlowRecord, ObservationTable, COL_COUNTRY, COL_EMIGRATION, COL_IMMIGRATION,
};

/// Build flow records from a migration table.
///
/// `year` restricts the aggregation to a single year; `None` sums over
/// every year present. Immigration and emigration are summed per country
/// independently (gender and year are summed out), with null cells
/// treated as zero volume.
///
/// A country is kept when EITHER direction meets `min_flow`: one busy
/// direction makes a country map-worthy even if the other is quiet.
/// Output is ordered by country code.
pub fn build_flows(table: &ObservationTable, year: Option<i32>, min_flow: f64) -> Vec<FlowRecord> {
    if !table.has_dim_column(COL_COUNTRY) {
        return Vec::new();
    }
    let has_immigration = table.has_value_column(COL_IMMIGRATION);
    let has_emigration = table.has_value_column(COL_EMIGRATION);
    if !has_immigration && !has_emigration {
        return Vec::new();
    }

    // country code → (immigration sum, emigration sum)
    let mut sums: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for row in &table.rows {
        if let Some(y) = year {
            if row.year() != Some(y) {
                continue;
            }
        }
        let Some(code) = row.dim(COL_COUNTRY) else {
            continue;
        };
        let entry = sums.entry(code.to_string()).or_insert((0.0, 0.0));
        if let Some(v) = row.value(COL_IMMIGRATION) {
            entry.0 += v;
        }
        if let Some(v) = row.value(COL_EMIGRATION) {
            entry.1 += v;
        }
    }

    sums.into_iter()
        .filter(|(_, (immigration, emigration))| {
            *immigration >= min_flow || *emigration >= min_flow
        })
        .filter_map(|(code, (immigration, emigration))| {
            // No location in the registry: silently excluded.
            let (latitude, longitude) = countries::country_location(&code)?;
            let country_name = countries::country_name(&code)
                .map(str::to_string)
                .unwrap_or_else(|| code.clone());
            Some(FlowRecord {
                country_code: code,
                country_name,
                immigration,
                emigration,
                latitude,
                longitude,
            })
        })
        .collect()
}
