//! FILENAME: core/cube-engine/src/view.rs
//! Cube views - the structured tables handed to the presentation layer.
//!
//! Nothing here formats or renders; each view is plain data that the
//! caller may print, serialize or chart.

use std::fmt;

use model::FactValue;
use serde::Serialize;

use crate::definition::{Dimension, Measure};

// ============================================================================
// OUTCOME
// ============================================================================

/// Why a request produced nothing to show. Not an error: callers render a
/// calm "no results" state and skip further work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum EmptyResult {
    /// The loaded snapshot has no rows at all.
    EmptySnapshot,
    /// The filter selection matched no rows.
    NoMatchingRows,
    /// The chosen dimension has no non-missing values in the working set.
    NoDimensionValues { dimension: Dimension },
}

impl fmt::Display for EmptyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyResult::EmptySnapshot => f.write_str("the snapshot contains no rows"),
            EmptyResult::NoMatchingRows => f.write_str("the selected filters match no projects"),
            EmptyResult::NoDimensionValues { dimension } => {
                write!(f, "no {} values are available for drill-down", dimension.label())
            }
        }
    }
}

/// Either a populated result or the reason there is none.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Outcome<T> {
    Ready(T),
    Empty(EmptyResult),
}

impl<T> Outcome<T> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::Empty(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Outcome::Ready(value) => Some(value),
            Outcome::Empty(_) => None,
        }
    }

    pub fn into_ready(self) -> Option<T> {
        match self {
            Outcome::Ready(value) => Some(value),
            Outcome::Empty(_) => None,
        }
    }

    pub fn empty_reason(&self) -> Option<&EmptyResult> {
        match self {
            Outcome::Ready(_) => None,
            Outcome::Empty(reason) => Some(reason),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Ready(value) => Outcome::Ready(f(value)),
            Outcome::Empty(reason) => Outcome::Empty(reason),
        }
    }
}

// ============================================================================
// ROLL-UP
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollupRow {
    pub key: FactValue,
    pub total: f64,
}

/// One row per distinct dimension value, sorted by total descending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollupTable {
    pub dimension: Dimension,
    pub measure: Measure,
    pub rows: Vec<RollupRow>,
}

impl RollupTable {
    pub fn total_for(&self, key: &FactValue) -> Option<f64> {
        self.rows.iter().find(|r| &r.key == key).map(|r| r.total)
    }

    pub fn grand_total(&self) -> f64 {
        self.rows.iter().map(|r| r.total).sum()
    }
}

// ============================================================================
// PIVOT
// ============================================================================

/// Rectangular cross-tab: `cells[r][c]` is the sum for `row_keys[r]` and
/// `col_keys[c]`, zero where no row has both.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotTable {
    pub row_dimension: Dimension,
    pub col_dimension: Dimension,
    pub measure: Measure,
    pub row_keys: Vec<FactValue>,
    pub col_keys: Vec<FactValue>,
    pub cells: Vec<Vec<f64>>,
}

impl PivotTable {
    pub fn cell(&self, row_key: &FactValue, col_key: &FactValue) -> Option<f64> {
        let r = self.row_keys.iter().position(|k| k == row_key)?;
        let c = self.col_keys.iter().position(|k| k == col_key)?;
        self.cells.get(r).and_then(|row| row.get(c)).copied()
    }

    pub fn grand_total(&self) -> f64 {
        self.cells.iter().flatten().sum()
    }
}

// ============================================================================
// DRILL-DOWN
// ============================================================================

/// Detail rows beneath one row-dimension value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailTable {
    pub dimension: Dimension,
    pub value: FactValue,
    pub measure: Measure,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<FactValue>>,
}

impl DetailTable {
    pub fn column(&self, name: &str) -> Option<Vec<&FactValue>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }
}

// ============================================================================
// REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Aggregate {
    Rollup(RollupTable),
    Pivot(PivotTable),
}

/// Everything one interaction produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CubeReport {
    pub matched_rows: usize,
    pub aggregate: Aggregate,
    /// Values the drill-down selector may offer for the row dimension.
    pub drill_values: Outcome<Vec<FactValue>>,
    pub drill: Option<DetailTable>,
}
