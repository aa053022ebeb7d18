//! FILENAME: core/cube-engine/src/drilldown.rs
//! Drill-Down Resolver - detail rows beneath one row-dimension value.

use std::cmp::Ordering;

use model::{Column, FactValue};
use smallvec::{smallvec, SmallVec};

use crate::definition::{Dimension, Measure};
use crate::engine::{compare_members, measure_index, measure_value};
use crate::error::{ConfigurationError, CubeError};
use crate::filter::WorkingSet;
use crate::view::DetailTable;

/// Columns surfaced beneath a value of `dimension`, measure last.
pub fn detail_columns(dimension: Dimension, measure: Measure) -> SmallVec<[Column; 4]> {
    match dimension {
        Dimension::Year => smallvec![
            Column::Year,
            Column::MonthName,
            Column::ProjectName,
            measure.column()
        ],
        Dimension::Industry => smallvec![
            Column::Industry,
            Column::ClientName,
            Column::ProjectName,
            measure.column()
        ],
        other => smallvec![other.column(), Column::ProjectName, measure.column()],
    }
}

/// Non-missing distinct values of `dimension` in the working set, in axis
/// order. These are the only values a drill-down may be asked for.
pub fn drill_values(rows: &WorkingSet<'_>, dimension: Dimension) -> Vec<FactValue> {
    let mut values: Vec<&FactValue> = rows
        .values(dimension.column())
        .map(|(_, v)| v)
        .filter(|v| !v.is_empty())
        .collect();
    values.sort_by(|a, b| compare_members(dimension, a, b));
    values.dedup();
    values.into_iter().cloned().collect()
}

/// Returns the rows of the working set whose `dimension` equals `value`,
/// projected onto the detail columns and sorted by `measure` descending.
///
/// Rows with a missing measure sort last; equal measures keep input order.
pub fn drill_down(
    rows: &WorkingSet<'_>,
    dimension: Dimension,
    value: &FactValue,
    measure: Measure,
) -> Result<DetailTable, CubeError> {
    let present = !value.is_empty() && rows.values(dimension.column()).any(|(_, v)| v == value);
    if !present {
        return Err(ConfigurationError::DrillValueNotPresent {
            dimension: dimension.key().to_string(),
            value: value.display_value(),
        }
        .into());
    }

    let table = rows.table();
    let measure_idx = measure_index(table, measure)?;
    let columns = detail_columns(dimension, measure);

    let mut matched: Vec<(Option<f64>, usize)> = Vec::new();
    for (row, v) in rows.values(dimension.column()) {
        if v == value {
            matched.push((measure_value(table, row, measure_idx, measure)?, row));
        }
    }

    matched.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    let detail_rows: Vec<Vec<FactValue>> = matched
        .iter()
        .map(|&(_, row)| columns.iter().map(|&c| table.get(row, c).clone()).collect())
        .collect();

    log::debug!(
        "drill {}={} -> {} rows",
        dimension.key(),
        value,
        detail_rows.len()
    );

    Ok(DetailTable {
        dimension,
        value: value.clone(),
        measure,
        columns: columns.iter().map(|c| c.name().to_string()).collect(),
        rows: detail_rows,
    })
}
