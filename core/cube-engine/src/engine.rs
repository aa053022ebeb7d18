//! FILENAME: core/cube-engine/src/engine.rs
//! Aggregation Engine - roll-up and pivot over a working set.
//!
//! Algorithm:
//! 1. Resolve the measure and dimension columns once
//! 2. Single pass over the working set, interning axis values into
//!    first-seen order and accumulating sums per group
//! 3. Order the axes (roll-up by total, pivot by value) and emit the view
//!
//! `run_query` strings filter, aggregation and drill-down together for one
//! interaction.

use std::cmp::Ordering;

use model::{FactTable, FactValue};
use rustc_hash::FxHashMap;

use crate::definition::{ColumnChoice, CubeQuery, Dimension, Measure};
use crate::drilldown::{drill_down, drill_values};
use crate::error::{CubeError, DataQualityError};
use crate::filter::{filter, WorkingSet};
use crate::normalize::month_ordinal;
use crate::view::{
    Aggregate, CubeReport, EmptyResult, Outcome, PivotTable, RollupRow, RollupTable,
};

// ============================================================================
// AXIS INTERNING
// ============================================================================

/// Distinct values of one axis in first-seen order.
struct AxisIndex<'a> {
    ids: FxHashMap<&'a FactValue, usize>,
    values: Vec<&'a FactValue>,
}

impl<'a> AxisIndex<'a> {
    fn new() -> Self {
        AxisIndex {
            ids: FxHashMap::default(),
            values: Vec::new(),
        }
    }

    fn intern(&mut self, value: &'a FactValue) -> usize {
        if let Some(&id) = self.ids.get(value) {
            return id;
        }
        let id = self.values.len();
        self.values.push(value);
        self.ids.insert(value, id);
        id
    }

    fn len(&self) -> usize {
        self.values.len()
    }
}

/// Axis ordering for a dimension: calendar order for month names, value
/// order otherwise.
pub(crate) fn compare_members(dimension: Dimension, a: &FactValue, b: &FactValue) -> Ordering {
    if dimension == Dimension::Month {
        let ord = |v: &FactValue| v.as_text().and_then(month_ordinal);
        match (ord(a), ord(b)) {
            (Some(x), Some(y)) => return x.cmp(&y),
            (Some(_), None) => return Ordering::Less,
            (None, Some(_)) => return Ordering::Greater,
            (None, None) => {}
        }
    }
    a.cmp(b)
}

// ============================================================================
// MEASURE ACCESS
// ============================================================================

/// Reads the measure for a row: `None` for a missing cell, an error for a
/// value that is not a number.
pub(crate) fn measure_value(
    table: &FactTable,
    row: usize,
    measure_idx: usize,
    measure: Measure,
) -> Result<Option<f64>, DataQualityError> {
    match table.value(row, measure_idx) {
        FactValue::Empty => Ok(None),
        FactValue::Number(n) if n.is_nan() => Ok(None),
        FactValue::Number(n) => Ok(Some(*n)),
        FactValue::Text(s) => Err(DataQualityError::NonNumericMeasure {
            row,
            column: measure.column().name().to_string(),
            value: s.clone(),
        }),
    }
}

pub(crate) fn measure_index(table: &FactTable, measure: Measure) -> Result<usize, DataQualityError> {
    table
        .index_of(measure.column())
        .ok_or_else(|| DataQualityError::MissingColumn(measure.column().name().to_string()))
}

fn dimension_value<'a>(table: &'a FactTable, row: usize, column: Option<usize>, dim: Dimension) -> &'a FactValue {
    match column {
        Some(idx) => table.value(row, idx),
        None => table.get(row, dim.column()),
    }
}

// ============================================================================
// ROLL-UP
// ============================================================================

/// Groups the working set by `dimension` and sums `measure` per group.
///
/// A missing dimension value forms its own group. Groups are sorted by
/// total descending; ties keep first-seen order.
pub fn rollup(
    rows: &WorkingSet<'_>,
    measure: Measure,
    dimension: Dimension,
) -> Result<RollupTable, CubeError> {
    let table = rows.table();
    let measure_idx = measure_index(table, measure)?;
    let dim_idx = table.index_of(dimension.column());

    let mut axis = AxisIndex::new();
    let mut totals: Vec<f64> = Vec::new();

    for &row in rows.row_indices() {
        let id = axis.intern(dimension_value(table, row, dim_idx, dimension));
        if id == totals.len() {
            totals.push(0.0);
        }
        if let Some(v) = measure_value(table, row, measure_idx, measure)? {
            totals[id] += v;
        }
    }

    let mut out: Vec<RollupRow> = axis
        .values
        .iter()
        .zip(totals)
        .map(|(key, total)| RollupRow {
            key: (*key).clone(),
            total,
        })
        .collect();
    out.sort_by(|a, b| b.total.total_cmp(&a.total));

    log::debug!(
        "rollup {} by {} -> {} groups",
        measure.key(),
        dimension.key(),
        out.len()
    );

    Ok(RollupTable {
        dimension,
        measure,
        rows: out,
    })
}

// ============================================================================
// PIVOT
// ============================================================================

/// Cross-tabulates `row_dim` x `col_dim`, summing `measure` per cell.
///
/// The output is rectangular over every observed value of both axes;
/// combinations without rows are zero. Rows missing either axis value are
/// left out of the cross-tab, unlike `rollup`, which keeps a missing group.
pub fn pivot(
    rows: &WorkingSet<'_>,
    measure: Measure,
    row_dim: Dimension,
    col_dim: Dimension,
) -> Result<PivotTable, CubeError> {
    let table = rows.table();
    let measure_idx = measure_index(table, measure)?;
    let row_idx = table.index_of(row_dim.column());
    let col_idx = table.index_of(col_dim.column());

    let mut row_axis = AxisIndex::new();
    let mut col_axis = AxisIndex::new();
    let mut sums: FxHashMap<(usize, usize), f64> = FxHashMap::default();

    for &row in rows.row_indices() {
        let row_value = dimension_value(table, row, row_idx, row_dim);
        let col_value = dimension_value(table, row, col_idx, col_dim);
        if row_value.is_empty() || col_value.is_empty() {
            continue;
        }
        let r = row_axis.intern(row_value);
        let c = col_axis.intern(col_value);
        let entry = sums.entry((r, c)).or_insert(0.0);
        if let Some(v) = measure_value(table, row, measure_idx, measure)? {
            *entry += v;
        }
    }

    let row_order = sorted_axis(&row_axis, row_dim);
    let col_order = sorted_axis(&col_axis, col_dim);

    let cells: Vec<Vec<f64>> = row_order
        .iter()
        .map(|&r| {
            col_order
                .iter()
                .map(|&c| sums.get(&(r, c)).copied().unwrap_or(0.0))
                .collect()
        })
        .collect();

    log::debug!(
        "pivot {} by {} x {} -> {}x{}",
        measure.key(),
        row_dim.key(),
        col_dim.key(),
        row_axis.len(),
        col_axis.len()
    );

    Ok(PivotTable {
        row_dimension: row_dim,
        col_dimension: col_dim,
        measure,
        row_keys: row_order.iter().map(|&i| row_axis.values[i].clone()).collect(),
        col_keys: col_order.iter().map(|&i| col_axis.values[i].clone()).collect(),
        cells,
    })
}

fn sorted_axis(axis: &AxisIndex<'_>, dimension: Dimension) -> Vec<usize> {
    let mut order: Vec<usize> = (0..axis.len()).collect();
    order.sort_by(|&a, &b| compare_members(dimension, axis.values[a], axis.values[b]));
    order
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Runs one interaction against a normalized table: filter, roll-up or
/// pivot, and the optional drill-down.
pub fn run_query(table: &FactTable, query: &CubeQuery) -> Result<Outcome<CubeReport>, CubeError> {
    if table.is_empty() {
        return Ok(Outcome::Empty(EmptyResult::EmptySnapshot));
    }

    let working = filter(table, &query.filter);
    if working.is_empty() {
        log::info!("query matched no rows");
        return Ok(Outcome::Empty(EmptyResult::NoMatchingRows));
    }

    let aggregate = match query.columns {
        ColumnChoice::None => Aggregate::Rollup(rollup(&working, query.measure, query.rows)?),
        ColumnChoice::Dimension(col) => {
            Aggregate::Pivot(pivot(&working, query.measure, query.rows, col)?)
        }
    };

    let drill = match &query.drill_value {
        Some(value) => Some(drill_down(&working, query.rows, value, query.measure)?),
        None => None,
    };

    let offered = drill_values(&working, query.rows);
    let drill_values = if offered.is_empty() {
        Outcome::Empty(EmptyResult::NoDimensionValues {
            dimension: query.rows,
        })
    } else {
        Outcome::Ready(offered)
    };

    Ok(Outcome::Ready(CubeReport {
        matched_rows: working.len(),
        aggregate,
        drill_values,
        drill,
    }))
}

/// Sum of a measure over the working set, skipping missing cells.
pub fn measure_total(rows: &WorkingSet<'_>, measure: Measure) -> Result<f64, CubeError> {
    let table = rows.table();
    let idx = measure_index(table, measure)?;
    let mut total = 0.0;
    for &row in rows.row_indices() {
        if let Some(v) = measure_value(table, row, idx, measure)? {
            total += v;
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::FilterSelection;
    use crate::error::ConfigurationError;
    use crate::normalize::{normalize, Locale};
    use model::Column;

    fn headers() -> Vec<String> {
        ["year", "full_date", "industry", "status", "project_name", "team_name", "budget"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn row(year: f64, date: &str, industry: &str, status: f64, project: &str, team: Option<&str>, budget: f64) -> Vec<FactValue> {
        vec![
            year.into(),
            date.into(),
            industry.into(),
            status.into(),
            project.into(),
            team.into(),
            budget.into(),
        ]
    }

    fn cube() -> FactTable {
        let raw = FactTable::from_rows(
            headers(),
            vec![
                row(2023.0, "2023-01-10", "Tech", 1.0, "A", Some("Red"), 100.0),
                row(2023.0, "2023-02-10", "Tech", 0.0, "B", Some("Blue"), 50.0),
                row(2024.0, "2024-03-10", "Retail", 1.0, "C", Some("Red"), 200.0),
                row(2024.0, "2024-01-10", "Retail", 0.0, "D", None, 25.0),
            ],
        );
        normalize(&raw, Locale::English).unwrap()
    }

    #[test]
    fn tech_rollup_over_one_year() {
        let table = cube();
        let sel = FilterSelection::all()
            .with_years(2023, 2023)
            .with_industries(["Tech"])
            .with_statuses(["completed", "in progress"]);
        let ws = filter(&table, &sel);
        let r = rollup(&ws, Measure::Budget, Dimension::Industry).unwrap();
        assert_eq!(r.rows, vec![RollupRow { key: "Tech".into(), total: 150.0 }]);
    }

    #[test]
    fn rollup_sorts_descending_and_keeps_missing_group() {
        let table = cube();
        let ws = WorkingSet::all(&table);
        let r = rollup(&ws, Measure::Budget, Dimension::Team).unwrap();
        let keys: Vec<FactValue> = r.rows.iter().map(|row| row.key.clone()).collect();
        assert_eq!(keys, vec!["Red".into(), "Blue".into(), FactValue::Empty]);
        assert_eq!(r.total_for(&"Red".into()), Some(300.0));
        assert_eq!(r.total_for(&FactValue::Empty), Some(25.0));
    }

    #[test]
    fn rollup_conserves_totals() {
        let table = cube();
        let ws = WorkingSet::all(&table);
        for dim in Dimension::ALL {
            let r = rollup(&ws, Measure::Budget, dim).unwrap();
            assert_eq!(r.grand_total(), measure_total(&ws, Measure::Budget).unwrap());
        }
    }

    #[test]
    fn pivot_is_rectangular_and_zero_filled() {
        let table = cube();
        let ws = WorkingSet::all(&table);
        let p = pivot(&ws, Measure::Budget, Dimension::Industry, Dimension::Year).unwrap();
        assert_eq!(p.row_keys, vec![FactValue::from("Retail"), FactValue::from("Tech")]);
        assert_eq!(p.col_keys, vec![FactValue::Number(2023.0), FactValue::Number(2024.0)]);
        assert!(p.cells.iter().all(|r| r.len() == p.col_keys.len()));
        assert_eq!(p.cell(&"Tech".into(), &2024.0.into()), Some(0.0));
        assert_eq!(p.cell(&"Retail".into(), &2024.0.into()), Some(225.0));
        assert_eq!(p.cell(&"Tech".into(), &2023.0.into()), Some(150.0));
        assert_eq!(p.grand_total(), 375.0);
    }

    #[test]
    fn pivot_orders_months_by_calendar() {
        let table = cube();
        let ws = WorkingSet::all(&table);
        let p = pivot(&ws, Measure::Budget, Dimension::Month, Dimension::Status).unwrap();
        assert_eq!(
            p.row_keys,
            vec![
                FactValue::from("January"),
                FactValue::from("February"),
                FactValue::from("March")
            ]
        );
    }

    #[test]
    fn pivot_same_dimension_is_diagonal() {
        let table = cube();
        let ws = WorkingSet::all(&table);
        let p = pivot(&ws, Measure::Budget, Dimension::Industry, Dimension::Industry).unwrap();
        assert_eq!(p.cell(&"Tech".into(), &"Tech".into()), Some(150.0));
        assert_eq!(p.cell(&"Tech".into(), &"Retail".into()), Some(0.0));
    }

    #[test]
    fn non_numeric_measure_is_a_data_quality_error() {
        let mut table = cube();
        let idx = table.index_of(Column::Budget).unwrap();
        table.set_value(1, idx, "fifty".into());
        let ws = WorkingSet::all(&table);
        let err = rollup(&ws, Measure::Budget, Dimension::Year).unwrap_err();
        assert!(matches!(
            err,
            CubeError::DataQuality(DataQualityError::NonNumericMeasure { row: 1, .. })
        ));
    }

    #[test]
    fn missing_measure_column_is_reported() {
        let table = cube();
        let ws = WorkingSet::all(&table);
        let err = rollup(&ws, Measure::DefectCost, Dimension::Year).unwrap_err();
        assert_eq!(
            err,
            CubeError::DataQuality(DataQualityError::MissingColumn("defect_cost".to_string()))
        );
    }

    #[test]
    fn run_query_reports_empty_selection() {
        let table = cube();
        let none: [&str; 0] = [];
        let query = CubeQuery::rollup(Measure::Budget, Dimension::Industry)
            .filtered(FilterSelection::all().with_industries(none));
        assert_eq!(
            run_query(&table, &query).unwrap(),
            Outcome::Empty(EmptyResult::NoMatchingRows)
        );
    }

    #[test]
    fn run_query_empty_snapshot() {
        let table = FactTable::new(headers());
        let query = CubeQuery::rollup(Measure::Budget, Dimension::Industry);
        assert_eq!(
            run_query(&table, &query).unwrap(),
            Outcome::Empty(EmptyResult::EmptySnapshot)
        );
    }

    #[test]
    fn run_query_pivot_with_drill() {
        let table = cube();
        let query = CubeQuery::pivot(Measure::Budget, Dimension::Industry, Dimension::Status)
            .drill("Retail");
        let report = run_query(&table, &query).unwrap().into_ready().unwrap();
        assert_eq!(report.matched_rows, 4);
        assert!(matches!(report.aggregate, Aggregate::Pivot(_)));
        let drill = report.drill.unwrap();
        assert_eq!(drill.rows.len(), 2);
        assert_eq!(
            report.drill_values,
            Outcome::Ready(vec!["Retail".into(), "Tech".into()])
        );
    }

    #[test]
    fn run_query_rejects_absent_drill_value() {
        let table = cube();
        let query = CubeQuery::rollup(Measure::Budget, Dimension::Industry).drill("Mining");
        assert!(matches!(
            run_query(&table, &query),
            Err(CubeError::Configuration(ConfigurationError::DrillValueNotPresent { .. }))
        ));
    }

    #[test]
    fn drill_values_empty_when_dimension_missing() {
        let table = cube();
        let query = CubeQuery::rollup(Measure::Budget, Dimension::Client);
        let report = run_query(&table, &query).unwrap().into_ready().unwrap();
        assert_eq!(
            report.drill_values,
            Outcome::Empty(EmptyResult::NoDimensionValues {
                dimension: Dimension::Client
            })
        );
    }

    #[test]
    fn pivot_leaves_out_missing_members() {
        let table = cube();
        let ws = WorkingSet::all(&table);

        let p = pivot(&ws, Measure::Budget, Dimension::Industry, Dimension::Team).unwrap();
        assert_eq!(p.col_keys, vec![FactValue::from("Blue"), FactValue::from("Red")]);
        assert_eq!(p.cell(&"Retail".into(), &"Red".into()), Some(200.0));
        assert_eq!(p.grand_total(), 350.0);

        let p = pivot(&ws, Measure::Budget, Dimension::Team, Dimension::Industry).unwrap();
        assert!(!p.row_keys.contains(&FactValue::Empty));

        // the roll-up keeps the group the pivot leaves out
        let r = rollup(&ws, Measure::Budget, Dimension::Team).unwrap();
        assert_eq!(r.total_for(&FactValue::Empty), Some(25.0));
    }
}
