//! FILENAME: core/model/src/table.rs
//! PURPOSE: Ordered, schema-agnostic table of fact rows.

use serde::{Deserialize, Serialize};

use crate::column::Column;
use crate::value::FactValue;

/// One fact row; positions follow `FactTable::columns`.
pub type Row = Vec<FactValue>;

static EMPTY: FactValue = FactValue::Empty;

/// A flat fact table: column names plus rows of equal width.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactTable {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl FactTable {
    pub fn new(columns: Vec<String>) -> Self {
        FactTable {
            columns,
            rows: Vec::new(),
        }
    }

    /// Builds a table from known columns, mostly for fixtures.
    pub fn with_columns(columns: &[Column]) -> Self {
        Self::new(columns.iter().map(|c| c.name().to_string()).collect())
    }

    /// Builds a table, padding or truncating each row to the column count.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Row>) {
        (self.columns, self.rows)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn index_of(&self, column: Column) -> Option<usize> {
        self.column_index(column.name())
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.index_of(column).is_some()
    }

    pub fn push_row(&mut self, mut row: Row) {
        row.resize(self.columns.len(), FactValue::Empty);
        self.rows.push(row);
    }

    /// Value at a row for a column index; absent cells read as `Empty`.
    pub fn value(&self, row: usize, column: usize) -> &FactValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY)
    }

    /// Value at a row for a known column; reads `Empty` when the table
    /// does not carry the column.
    pub fn get(&self, row: usize, column: Column) -> &FactValue {
        match self.index_of(column) {
            Some(idx) => self.value(row, idx),
            None => &EMPTY,
        }
    }

    pub fn set_value(&mut self, row: usize, column: usize, value: FactValue) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(column)) {
            *cell = value;
        }
    }

    /// Returns the index of `name`, appending it (filled with `Empty`) when
    /// missing.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(FactValue::Empty);
        }
        self.columns.len() - 1
    }

    /// Drops every column whose name matches `predicate`.
    pub fn retain_columns(&mut self, mut predicate: impl FnMut(&str) -> bool) {
        let keep: Vec<bool> = self.columns.iter().map(|c| predicate(c.as_str())).collect();
        if keep.iter().all(|k| *k) {
            return;
        }
        let mut flags = keep.iter();
        self.columns.retain(|_| *flags.next().unwrap_or(&true));
        for row in &mut self.rows {
            let mut flags = keep.iter();
            row.retain(|_| *flags.next().unwrap_or(&true));
        }
    }

    /// Copy of the table without the normalizer's derived columns.
    pub fn without_derived(&self) -> FactTable {
        let mut table = self.clone();
        table.retain_columns(|name| {
            !Column::from_header(name).map_or(false, Column::is_derived)
        });
        table
    }

    /// Reorders and widens this table's rows to match `columns`; columns
    /// the table lacks read as `Empty`.
    pub fn conform_to(self, columns: &[String]) -> FactTable {
        if self.columns == columns {
            return self;
        }
        let mapping: Vec<Option<usize>> = columns
            .iter()
            .map(|name| self.column_index(name))
            .collect();
        let rows = self
            .rows
            .into_iter()
            .map(|row| {
                mapping
                    .iter()
                    .map(|src| src.and_then(|i| row.get(i).cloned()).unwrap_or_default())
                    .collect()
            })
            .collect();
        FactTable {
            columns: columns.to_vec(),
            rows,
        }
    }

    pub fn extend_rows(&mut self, rows: impl IntoIterator<Item = Row>) {
        for row in rows {
            self.push_row(row);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FactTable {
        FactTable::from_rows(
            vec!["year".into(), "industry".into(), "region".into()],
            vec![
                vec![2023.0.into(), "Tech".into(), "North".into()],
                vec![2024.0.into(), "Retail".into()],
            ],
        )
    }

    #[test]
    fn pads_short_rows() {
        let table = sample();
        assert_eq!(table.value(1, 2), &FactValue::Empty);
        assert_eq!(table.width(), 3);
    }

    #[test]
    fn absent_known_column_reads_empty() {
        let table = sample();
        assert_eq!(table.get(0, Column::ClientName), &FactValue::Empty);
        assert_eq!(table.get(0, Column::Industry), &FactValue::text("Tech"));
    }

    #[test]
    fn ensure_column_is_idempotent() {
        let mut table = sample();
        let first = table.ensure_column("month_name");
        let second = table.ensure_column("month_name");
        assert_eq!(first, second);
        assert_eq!(table.width(), 4);
        assert!(table.rows().iter().all(|r| r.len() == 4));
    }

    #[test]
    fn without_derived_strips_normalizer_columns() {
        let mut table = sample();
        table.ensure_column("month_name");
        table.ensure_column("estado_texto");
        let stripped = table.without_derived();
        assert_eq!(stripped.columns(), &["year", "industry", "region"]);
        assert_eq!(stripped.rows()[0].len(), 3);
    }

    #[test]
    fn conform_reorders_and_widens() {
        let table = sample();
        let target = vec!["region".to_string(), "year".to_string(), "team_name".to_string()];
        let conformed = table.conform_to(&target);
        assert_eq!(conformed.columns(), target.as_slice());
        assert_eq!(
            conformed.rows()[0],
            vec![FactValue::text("North"), FactValue::Number(2023.0), FactValue::Empty]
        );
    }
}
