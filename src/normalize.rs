//! Payload normalization.
//!
//! Converts the keyed-tuple PxWeb payload (`{columns, data}`) into an
//! [`ObservationTable`] with typed cells: dimension codes stay strings,
//! the month dimension is parsed to a calendar date, and value cells are
//! coerced to nullable floats. Cell-level problems degrade to nulls;
//! only a key/value tuple whose length disagrees with the declared
//! columns is fatal.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::model::{ObservationRow, ObservationTable, RawPayload, ScbError};

/// Markers SCB uses for missing or confidential cells.
const MISSING_MARKERS: [&str; 3] = ["..", ".", ""];

/// Normalize a raw PxWeb payload into an observation table.
///
/// Dimension and time columns become row keys in declared order; value
/// columns become nullable numeric fields. Output row count always equals
/// the payload's data item count.
pub fn payload_to_table(payload: &RawPayload) -> Result<ObservationTable, ScbError> {
    let key_columns: Vec<&str> = payload
        .columns
        .iter()
        .filter(|c| c.is_key())
        .map(|c| c.text.as_str())
        .collect();
    let value_columns: Vec<&str> = payload
        .columns
        .iter()
        .filter(|c| c.is_value())
        .map(|c| c.text.as_str())
        .collect();
    let time_column = payload
        .columns
        .iter()
        .find(|c| c.kind == crate::model::COLUMN_TIME)
        .map(|c| c.text.clone());

    let mut rows = Vec::with_capacity(payload.data.len());
    for (i, item) in payload.data.iter().enumerate() {
        if item.key.len() != key_columns.len() {
            return Err(ScbError::Schema {
                row: i,
                expected: key_columns.len(),
                actual: item.key.len(),
                section: "key",
            });
        }
        if item.values.len() != value_columns.len() {
            return Err(ScbError::Schema {
                row: i,
                expected: value_columns.len(),
                actual: item.values.len(),
                section: "values",
            });
        }

        let mut dims = BTreeMap::new();
        let mut period = None;
        for (column, code) in key_columns.iter().zip(&item.key) {
            if Some(*column) == time_column.as_deref() {
                period = parse_month(code);
            }
            dims.insert((*column).to_string(), code.clone());
        }

        let mut values = BTreeMap::new();
        for (column, raw) in value_columns.iter().zip(&item.values) {
            values.insert((*column).to_string(), coerce_numeric(raw));
        }

        rows.push(ObservationRow {
            dims,
            period,
            values,
        });
    }

    Ok(ObservationTable {
        dim_columns: key_columns.iter().map(|c| (*c).to_string()).collect(),
        time_column,
        value_columns: value_columns.iter().map(|c| (*c).to_string()).collect(),
        rows,
    })
}

/// Parse an SCB month key ("2024M03") into the first day of that month.
///
/// Anything that does not match the `YYYYMnn` shape yields `None`: a
/// null date, not an error. Migration tables put plain "2023" year keys
/// through here, which intentionally fall out as `None`.
pub fn parse_month(code: &str) -> Option<NaiveDate> {
    let code = code.trim();
    let (year, month) = code.split_once(['M', 'm'])?;
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Coerce a value cell to a nullable float. SCB's missing-data markers
/// and any other non-numeric token coerce to `None`, never an error.
pub fn coerce_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if MISSING_MARKERS.contains(&trimmed) {
        return None;
    }
    trimmed.parse().ok()
}

/// Rename a dimension column, returning a fresh table. A missing source
/// column is a no-op; datasets declare their renames statically and the
/// upstream table may simply not carry the column in some responses.
pub fn rename_dim_column(table: &ObservationTable, from: &str, to: &str) -> ObservationTable {
    if !table.has_dim_column(from) {
        return table.clone();
    }
    let mut renamed = table.clone();
    for column in &mut renamed.dim_columns {
        if column == from {
            *column = to.to_string();
        }
    }
    if renamed.time_column.as_deref() == Some(from) {
        renamed.time_column = Some(to.to_string());
    }
    for row in &mut renamed.rows {
        if let Some(value) = row.dims.remove(from) {
            row.dims.insert(to.to_string(), value);
        }
    }
    renamed
}

/// Expand an inclusive "YYYY-MM" range into SCB month keys.
///
/// `months_range("2020-11", "2021-02")` → `["2020M11", "2020M12",
/// "2021M01", "2021M02"]`. Malformed bounds or an inverted range give
/// an empty list.
pub fn months_range(start: &str, end: &str) -> Vec<String> {
    fn split_ym(s: &str) -> Option<(i32, u32)> {
        let (y, m) = s.trim().split_once('-')?;
        let year = y.parse().ok()?;
        let month: u32 = m.parse().ok()?;
        if (1..=12).contains(&month) {
            Some((year, month))
        } else {
            None
        }
    }

    let (Some((start_y, start_m)), Some((end_y, end_m))) = (split_ym(start), split_ym(end)) else {
        return Vec::new();
    };

    let mut months = Vec::new();
    let (mut year, mut month) = (start_y, start_m);
    while (year, month) <= (end_y, end_m) {
        months.push(format!("{}M{:02}", year, month));
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    months
}
