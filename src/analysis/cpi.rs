//! CPI-derived metrics: inflation contributions, rankings, the annual
//! changes heatmap pivot, and the inflation-adjusted amount projection.
//!
//! Group selection semantics: every operation takes a `groups` slice of
//! product-group labels; an empty slice means "all groups". Rows are
//! matched on the resolved label column when present, falling back to the
//! raw code column under degraded metadata.

use std::collections::BTreeMap;

use crate::model::{
    ContributionRecord, InflationImpact, ObservationRow, ObservationTable, COL_ANNUAL_CHANGES,
    COL_INDEX, COL_PRODUCT_GROUP, COL_PRODUCT_GROUP_LABEL, COL_WEIGHTS, TOTAL_GROUP_LABEL,
};

/// Index level in the base year; CPI with base 2020 = 100.
pub const BASE_INDEX: f64 = 100.0;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Group × year matrix of mean annual change, for heatmap rendering.
///
/// `cells[g][y]` is the mean annual change for `groups[g]` in `years[y]`,
/// or `None` where the group has no observations that year; missing
/// cells stay null, they are never folded into zero.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeatmapMatrix {
    /// Row labels, in first-observed order.
    pub groups: Vec<String>,
    /// Column years, ascending.
    pub years: Vec<i32>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl HeatmapMatrix {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Cell lookup by label and year; `None` for unknown coordinates too.
    pub fn cell(&self, group: &str, year: i32) -> Option<f64> {
        let g = self.groups.iter().position(|x| x == group)?;
        let y = self.years.iter().position(|x| *x == year)?;
        self.cells[g][y]
    }
}

/// One entry of a weight ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightEntry {
    pub group_label: String,
    pub weight_pct: f64,
}

/// One entry of an inflation-driver ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct InflationDriver {
    pub group_label: String,
    pub contribution_pct: f64,
    pub annual_change_pct: f64,
    pub weight_pct: f64,
}

/// Mean basket weight for one product group in one calendar year.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupYearWeight {
    pub year: i32,
    pub group_label: String,
    pub weight_pct: f64,
}

// ---------------------------------------------------------------------------
// Row helpers
// ---------------------------------------------------------------------------

fn group_label(row: &ObservationRow) -> Option<&str> {
    row.dim(COL_PRODUCT_GROUP_LABEL)
        .or_else(|| row.dim(COL_PRODUCT_GROUP))
}

fn in_selection(label: &str, groups: &[String]) -> bool {
    groups.is_empty() || groups.iter().any(|g| g == label)
}

/// The aggregate row is excluded from rankings by label substring, which
/// also catches localized variants like "TOTAL, fixed interest rate".
fn is_total_label(label: &str) -> bool {
    label.to_uppercase().contains(TOTAL_GROUP_LABEL)
}

/// Restrict rows to the most recent parsed period among them. Rows carry
/// no parsed date at all → the whole set is treated as "latest".
fn latest_rows<'a>(rows: Vec<&'a ObservationRow>) -> Vec<&'a ObservationRow> {
    match rows.iter().filter_map(|r| r.period).max() {
        Some(latest) => rows.into_iter().filter(|r| r.period == Some(latest)).collect(),
        None => rows,
    }
}

// ---------------------------------------------------------------------------
// Contribution series
// ---------------------------------------------------------------------------

/// Per-(month, group) inflation contribution: annual change × weight / 100.
///
/// Rows missing either input, or without a parsed month, are skipped.
pub fn contribution_series(table: &ObservationTable, groups: &[String]) -> Vec<ContributionRecord> {
    table
        .rows
        .iter()
        .filter_map(|row| {
            let label = group_label(row)?;
            if !in_selection(label, groups) {
                return None;
            }
            let month = row.period?;
            let annual = row.value(COL_ANNUAL_CHANGES)?;
            let weight = row.value(COL_WEIGHTS)?;
            Some(ContributionRecord {
                month,
                group_label: label.to_string(),
                annual_change_pct: annual,
                weight_pct: weight,
                contribution_pct: annual * weight / 100.0,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Heatmap pivot
// ---------------------------------------------------------------------------

/// Mean annual change by (group, calendar year), pivoted to a matrix.
pub fn heatmap_pivot(table: &ObservationTable, groups: &[String]) -> HeatmapMatrix {
    // (group, year) → (sum, count) accumulator.
    let mut sums: BTreeMap<(String, i32), (f64, usize)> = BTreeMap::new();
    let mut group_order: Vec<String> = Vec::new();
    let mut years: Vec<i32> = Vec::new();

    for row in &table.rows {
        let Some(label) = group_label(row) else {
            continue;
        };
        if !in_selection(label, groups) {
            continue;
        }
        let (Some(year), Some(annual)) = (row.year(), row.value(COL_ANNUAL_CHANGES)) else {
            continue;
        };
        if !group_order.iter().any(|g| g == label) {
            group_order.push(label.to_string());
        }
        if !years.contains(&year) {
            years.push(year);
        }
        let slot = sums.entry((label.to_string(), year)).or_insert((0.0, 0));
        slot.0 += annual;
        slot.1 += 1;
    }

    years.sort_unstable();

    let cells = group_order
        .iter()
        .map(|group| {
            years
                .iter()
                .map(|year| {
                    sums.get(&(group.clone(), *year))
                        .map(|(sum, count)| sum / *count as f64)
                })
                .collect()
        })
        .collect();

    HeatmapMatrix {
        groups: group_order,
        years,
        cells,
    }
}

// ---------------------------------------------------------------------------
// Rankings
// ---------------------------------------------------------------------------

/// Top `n` product groups by basket weight at the most recent month.
///
/// The TOTAL aggregate is always excluded; it would otherwise top every
/// list. Ties keep their original row order (stable descending sort).
pub fn top_by_weight(table: &ObservationTable, n: usize) -> Vec<WeightEntry> {
    let candidates: Vec<&ObservationRow> = table
        .rows
        .iter()
        .filter(|row| {
            group_label(row).is_some_and(|l| !is_total_label(l))
                && row.value(COL_WEIGHTS).is_some()
        })
        .collect();

    let mut entries: Vec<WeightEntry> = latest_rows(candidates)
        .into_iter()
        .filter_map(|row| {
            Some(WeightEntry {
                group_label: group_label(row)?.to_string(),
                weight_pct: row.value(COL_WEIGHTS)?,
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        b.weight_pct
            .partial_cmp(&a.weight_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    entries.truncate(n);
    entries
}

/// Top `n` inflation drivers at the most recent month, ranked by
/// contribution (annual change × weight / 100). Rows missing either input
/// are excluded, as is the TOTAL aggregate.
pub fn top_by_contribution(table: &ObservationTable, n: usize) -> Vec<InflationDriver> {
    let candidates: Vec<&ObservationRow> = table
        .rows
        .iter()
        .filter(|row| {
            group_label(row).is_some_and(|l| !is_total_label(l))
                && row.value(COL_ANNUAL_CHANGES).is_some()
                && row.value(COL_WEIGHTS).is_some()
        })
        .collect();

    let mut drivers: Vec<InflationDriver> = latest_rows(candidates)
        .into_iter()
        .filter_map(|row| {
            let annual = row.value(COL_ANNUAL_CHANGES)?;
            let weight = row.value(COL_WEIGHTS)?;
            Some(InflationDriver {
                group_label: group_label(row)?.to_string(),
                contribution_pct: annual * weight / 100.0,
                annual_change_pct: annual,
                weight_pct: weight,
            })
        })
        .collect();

    drivers.sort_by(|a, b| {
        b.contribution_pct
            .partial_cmp(&a.contribution_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    drivers.truncate(n);
    drivers
}

// ---------------------------------------------------------------------------
// Weights by year
// ---------------------------------------------------------------------------

/// Mean basket weight per (year, group). Weights only change yearly but
/// are published monthly, so the mean collapses the repetition. Output is
/// ordered by year, then label.
pub fn weights_by_year(table: &ObservationTable, groups: &[String]) -> Vec<GroupYearWeight> {
    let mut sums: BTreeMap<(i32, String), (f64, usize)> = BTreeMap::new();
    for row in &table.rows {
        let Some(label) = group_label(row) else {
            continue;
        };
        if !in_selection(label, groups) {
            continue;
        }
        let (Some(year), Some(weight)) = (row.year(), row.value(COL_WEIGHTS)) else {
            continue;
        };
        let slot = sums.entry((year, label.to_string())).or_insert((0.0, 0));
        slot.0 += weight;
        slot.1 += 1;
    }

    sums.into_iter()
        .map(|((year, group_label), (sum, count))| GroupYearWeight {
            year,
            group_label,
            weight_pct: sum / count as f64,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Inflation-adjusted amount
// ---------------------------------------------------------------------------

/// What `base_amount` from the base year is worth at the latest index
/// level of the TOTAL group.
///
/// Returns `None` when the table has no index column or no TOTAL rows
/// with a usable index value; the projection is then "unavailable",
/// never a guess from some other group.
pub fn inflation_adjusted_amount(
    table: &ObservationTable,
    base_amount: f64,
    base_index: f64,
) -> Option<InflationImpact> {
    if !table.has_value_column(COL_INDEX) {
        return None;
    }

    let total_rows: Vec<&ObservationRow> = table
        .rows
        .iter()
        .filter(|row| group_label(row) == Some(TOTAL_GROUP_LABEL))
        .collect();
    if total_rows.is_empty() {
        return None;
    }

    let latest = latest_rows(total_rows);
    let row = latest.iter().find(|r| r.value(COL_INDEX).is_some())?;
    let latest_index = row.value(COL_INDEX)?;

    Some(InflationImpact {
        current_amount: base_amount * (latest_index / base_index),
        latest_index,
        latest_month: row.period,
        total_inflation_pct: (latest_index - base_index) / base_index * 100.0,
    })
}
