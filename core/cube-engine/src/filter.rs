//! FILENAME: core/cube-engine/src/filter.rs
//! Filter Engine - slice/dice over a normalized fact table.
//!
//! The predicate is a conjunction of a year range and set membership on
//! industry and status label. Rows with a missing value in any filtered
//! column never match. The result is a `WorkingSet` of row indices that
//! borrows the table, so no rows are copied per interaction.

use std::collections::BTreeSet;

use model::{Column, FactTable, FactValue};
use serde::Serialize;

use crate::definition::FilterSelection;

// ============================================================================
// WORKING SET
// ============================================================================

/// The request-scoped subset of rows that passed the active filter.
#[derive(Debug, Clone)]
pub struct WorkingSet<'a> {
    table: &'a FactTable,
    rows: Vec<usize>,
}

impl<'a> WorkingSet<'a> {
    /// A working set covering every row of the table.
    pub fn all(table: &'a FactTable) -> Self {
        WorkingSet {
            table,
            rows: (0..table.len()).collect(),
        }
    }

    pub fn table(&self) -> &'a FactTable {
        self.table
    }

    pub fn row_indices(&self) -> &[usize] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates `(row index, value)` for a known column.
    pub fn values(&self, column: Column) -> impl Iterator<Item = (usize, &'a FactValue)> + '_ {
        let table = self.table;
        let idx = table.index_of(column);
        self.rows.iter().map(move |&row| {
            let value = match idx {
                Some(i) => table.value(row, i),
                None => table.get(row, column),
            };
            (row, value)
        })
    }
}

// ============================================================================
// OBSERVED OPTIONS
// ============================================================================

/// The year control the presentation layer should offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum YearRange {
    /// No row carries a year.
    None,
    /// Only one distinct year; no range control is offered.
    Single { year: i32 },
    Range { min: i32, max: i32 },
}

impl YearRange {
    pub fn observe(table: &FactTable) -> Self {
        let years: BTreeSet<i32> = match table.index_of(Column::Year) {
            Some(idx) => (0..table.len())
                .filter_map(|row| year_of(table.value(row, idx)))
                .collect(),
            None => BTreeSet::new(),
        };
        match (years.first(), years.last()) {
            (Some(&min), Some(&max)) if min == max => YearRange::Single { year: min },
            (Some(&min), Some(&max)) => YearRange::Range { min, max },
            _ => YearRange::None,
        }
    }

    pub fn bounds(self) -> Option<(i32, i32)> {
        match self {
            YearRange::None => None,
            YearRange::Single { year } => Some((year, year)),
            YearRange::Range { min, max } => Some((min, max)),
        }
    }
}

/// Everything the filter controls can offer for a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub years: YearRange,
    pub industries: Vec<String>,
    pub statuses: Vec<String>,
}

impl FilterOptions {
    pub fn observe(table: &FactTable) -> Self {
        FilterOptions {
            years: YearRange::observe(table),
            industries: distinct_labels(table, Column::Industry),
            statuses: distinct_labels(table, Column::StatusLabel),
        }
    }
}

fn distinct_labels(table: &FactTable, column: Column) -> Vec<String> {
    let Some(idx) = table.index_of(column) else {
        return Vec::new();
    };
    let labels: BTreeSet<String> = (0..table.len())
        .filter_map(|row| label_of(table.value(row, idx)))
        .collect();
    labels.into_iter().collect()
}

fn year_of(value: &FactValue) -> Option<i32> {
    match value {
        FactValue::Number(n) if n.is_finite() && n.fract() == 0.0 => Some(*n as i32),
        _ => None,
    }
}

fn label_of(value: &FactValue) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.display_value())
    }
}

// ============================================================================
// FILTER
// ============================================================================

/// Applies `year_min <= year <= year_max AND industry IN industries AND
/// status_label IN statuses` to a normalized table.
///
/// Omitted bounds default to the observed year range of the whole table;
/// omitted sets accept every non-missing value.
pub fn filter<'a>(table: &'a FactTable, selection: &FilterSelection) -> WorkingSet<'a> {
    let observed = YearRange::observe(table).bounds();
    let year_min = selection.year_min.or(observed.map(|b| b.0));
    let year_max = selection.year_max.or(observed.map(|b| b.1));

    let year_idx = table.index_of(Column::Year);
    let industry_idx = table.index_of(Column::Industry);
    let status_idx = table.index_of(Column::StatusLabel);

    let rows: Vec<usize> = match (year_min, year_max, year_idx, industry_idx, status_idx) {
        (Some(lo), Some(hi), Some(y), Some(i), Some(s)) => (0..table.len())
            .filter(|&row| {
                let year_ok = year_of(table.value(row, y)).map_or(false, |yr| lo <= yr && yr <= hi);
                year_ok
                    && member_of(table.value(row, i), selection.industries.as_ref())
                    && member_of(table.value(row, s), selection.statuses.as_ref())
            })
            .collect(),
        // A filtered column (or every year) is missing: nothing can match.
        _ => Vec::new(),
    };

    log::debug!(
        "filter years={:?}..={:?} industries={:?} statuses={:?} -> {} of {} rows",
        year_min,
        year_max,
        selection.industries.as_ref().map(BTreeSet::len),
        selection.statuses.as_ref().map(BTreeSet::len),
        rows.len(),
        table.len()
    );

    WorkingSet { table, rows }
}

fn member_of(value: &FactValue, allowed: Option<&BTreeSet<String>>) -> bool {
    match label_of(value) {
        None => false,
        Some(label) => allowed.map_or(true, |set| set.contains(&label)),
    }
}
