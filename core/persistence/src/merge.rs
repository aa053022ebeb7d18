//! FILENAME: core/persistence/src/merge.rs
//! Snapshot Merger - reconciles a fresh export with the stored snapshot.
//!
//! The merger is schema-agnostic: only `fact_id` has a meaning here, every
//! other column is carried through untouched. When both sides disagree on
//! the column set, the merged table carries the existing columns in order
//! followed by incoming-only columns.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use model::{Column, FactTable, FactValue};
use serde::{Deserialize, Serialize};

/// How an export combines with the snapshot already on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    /// Union, then drop duplicates keeping the last occurrence.
    #[default]
    Dedupe,
    /// Union without deduplication.
    Append,
    /// The export supersedes the snapshot.
    Replace,
}

impl MergePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            MergePolicy::Dedupe => "dedupe",
            MergePolicy::Append => "append",
            MergePolicy::Replace => "replace",
        }
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dedupe" => Ok(MergePolicy::Dedupe),
            "append" => Ok(MergePolicy::Append),
            "replace" => Ok(MergePolicy::Replace),
            other => Err(format!(
                "unknown merge policy '{}' (expected dedupe, append or replace)",
                other
            )),
        }
    }
}

/// Row counts for one merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub policy: MergePolicy,
    pub existing_rows: usize,
    pub incoming_rows: usize,
    pub output_rows: usize,
    /// Rows removed as duplicates (or superseded under `Replace`).
    pub dropped_rows: usize,
}

impl MergeReport {
    /// An empty merged snapshot is not an error here, but callers should
    /// warn about it.
    pub fn is_empty(&self) -> bool {
        self.output_rows == 0
    }
}

// ============================================================================
// DEDUPLICATION
// ============================================================================

#[derive(Hash, PartialEq, Eq)]
enum RowKey<'a> {
    Id(&'a FactValue),
    Row(&'a [FactValue]),
}

/// Drops duplicate rows, keeping each key's last occurrence in its original
/// position.
///
/// The key is `fact_id` when the table has that column and the row carries a
/// value; otherwise it is the whole row.
pub fn dedupe(table: &FactTable) -> FactTable {
    let id_idx = table.index_of(Column::FactId);
    let rows = table.rows();

    let mut seen: HashSet<RowKey<'_>> = HashSet::with_capacity(rows.len());
    let mut keep = vec![false; rows.len()];
    for (i, row) in rows.iter().enumerate().rev() {
        let key = match id_idx.map(|idx| &row[idx]) {
            Some(id) if !id.is_empty() => RowKey::Id(id),
            _ => RowKey::Row(row.as_slice()),
        };
        keep[i] = seen.insert(key);
    }

    let mut out = FactTable::new(table.columns().to_vec());
    out.extend_rows(
        rows.iter()
            .zip(keep)
            .filter(|(_, k)| *k)
            .map(|(row, _)| row.clone()),
    );
    out
}

// ============================================================================
// MERGE
// ============================================================================

fn union_columns(existing: &FactTable, incoming: &FactTable) -> Vec<String> {
    let mut columns = existing.columns().to_vec();
    for name in incoming.columns() {
        if !columns.contains(name) {
            columns.push(name.clone());
        }
    }
    columns
}

/// Merges `incoming` into `existing` under the default policy.
///
/// With no existing snapshot the incoming batch is returned unchanged.
pub fn merge(existing: Option<&FactTable>, incoming: &FactTable) -> FactTable {
    merge_with_policy(existing, incoming, MergePolicy::Dedupe).0
}

pub fn merge_with_policy(
    existing: Option<&FactTable>,
    incoming: &FactTable,
    policy: MergePolicy,
) -> (FactTable, MergeReport) {
    let existing_rows = existing.map_or(0, FactTable::len);
    let incoming_rows = incoming.len();

    let merged = match (existing, policy) {
        (None, _) | (Some(_), MergePolicy::Replace) => incoming.clone(),
        (Some(old), MergePolicy::Append | MergePolicy::Dedupe) => {
            let columns = union_columns(old, incoming);
            let mut combined = old.clone().conform_to(&columns);
            let (_, new_rows) = incoming.clone().conform_to(&columns).into_parts();
            combined.extend_rows(new_rows);
            if policy == MergePolicy::Dedupe {
                dedupe(&combined)
            } else {
                combined
            }
        }
    };

    let report = MergeReport {
        policy,
        existing_rows,
        incoming_rows,
        output_rows: merged.len(),
        dropped_rows: (existing_rows + incoming_rows).saturating_sub(merged.len()),
    };

    log::info!(
        "merge ({}): {} existing + {} incoming -> {} rows, {} dropped",
        policy,
        report.existing_rows,
        report.incoming_rows,
        report.output_rows,
        report.dropped_rows
    );
    if report.is_empty() {
        log::warn!("merge produced an empty snapshot");
    }

    (merged, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed(rows: &[(&str, f64)]) -> FactTable {
        FactTable::from_rows(
            vec!["fact_id".into(), "budget".into()],
            rows.iter()
                .map(|(id, budget)| vec![FactValue::from(*id), (*budget).into()])
                .collect(),
        )
    }

    fn ids(table: &FactTable) -> Vec<String> {
        table.rows().iter().map(|r| r[0].display_value()).collect()
    }

    #[test]
    fn first_export_is_incoming_unchanged() {
        let incoming = keyed(&[("F1", 1.0), ("F1", 2.0)]);
        assert_eq!(merge(None, &incoming), incoming);
    }

    #[test]
    fn incoming_wins_for_duplicate_keys() {
        let existing = keyed(&[("F1", 1.0), ("F2", 2.0), ("F3", 3.0)]);
        let incoming = keyed(&[("F2", 20.0), ("F4", 4.0)]);
        let merged = merge(Some(&existing), &incoming);

        assert_eq!(ids(&merged), vec!["F1", "F3", "F2", "F4"]);
        assert_eq!(merged.get(2, Column::Budget), &FactValue::Number(20.0));
    }

    #[test]
    fn merging_nothing_is_dedupe() {
        let existing = keyed(&[("F1", 1.0), ("F2", 2.0), ("F1", 3.0)]);
        let empty = keyed(&[]);
        assert_eq!(merge(Some(&existing), &empty), dedupe(&existing));
        assert_eq!(ids(&dedupe(&existing)), vec!["F2", "F1"]);
    }

    #[test]
    fn remerging_the_same_batch_is_stable() {
        let existing = keyed(&[("F1", 1.0), ("F2", 2.0)]);
        let batch = keyed(&[("F2", 5.0), ("F3", 3.0)]);
        let once = merge(Some(&existing), &batch);
        let twice = merge(Some(&once), &batch);
        assert_eq!(once, twice);
    }

    #[test]
    fn without_fact_id_rows_dedupe_by_content() {
        let table = FactTable::from_rows(
            vec!["project_name".into(), "budget".into()],
            vec![
                vec!["A".into(), 1.0.into()],
                vec!["B".into(), 2.0.into()],
                vec!["A".into(), 1.0.into()],
                vec!["A".into(), 9.0.into()],
            ],
        );
        let merged = merge(Some(&table), &FactTable::new(table.columns().to_vec()));
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.rows()[0][0], FactValue::from("B"));
    }

    #[test]
    fn empty_fact_ids_fall_back_to_row_equality() {
        let table = FactTable::from_rows(
            vec!["fact_id".into(), "budget".into()],
            vec![
                vec![FactValue::Empty, 1.0.into()],
                vec![FactValue::Empty, 2.0.into()],
                vec![FactValue::Empty, 1.0.into()],
            ],
        );
        assert_eq!(dedupe(&table).len(), 2);
    }

    #[test]
    fn extra_columns_are_preserved() {
        let existing = FactTable::from_rows(
            vec!["fact_id".into(), "budget".into(), "region".into()],
            vec![vec!["F1".into(), 1.0.into(), "North".into()]],
        );
        let incoming = FactTable::from_rows(
            vec!["fact_id".into(), "owner".into(), "budget".into()],
            vec![vec!["F2".into(), "Ana".into(), 2.0.into()]],
        );
        let merged = merge(Some(&existing), &incoming);
        assert_eq!(merged.columns(), &["fact_id", "budget", "region", "owner"]);
        assert_eq!(merged.rows()[0][3], FactValue::Empty);
        assert_eq!(merged.rows()[1][1], FactValue::Number(2.0));
        assert_eq!(merged.rows()[1][2], FactValue::Empty);
        assert_eq!(merged.rows()[1][3], FactValue::from("Ana"));
    }

    #[test]
    fn policies_report_counts() {
        let existing = keyed(&[("F1", 1.0), ("F2", 2.0)]);
        let incoming = keyed(&[("F2", 3.0)]);

        let (appended, report) = merge_with_policy(Some(&existing), &incoming, MergePolicy::Append);
        assert_eq!(appended.len(), 3);
        assert_eq!(report.dropped_rows, 0);

        let (replaced, report) = merge_with_policy(Some(&existing), &incoming, MergePolicy::Replace);
        assert_eq!(replaced, incoming);
        assert_eq!(report.dropped_rows, 2);

        let (_, report) = merge_with_policy(Some(&existing), &incoming, MergePolicy::Dedupe);
        assert_eq!(report.output_rows, 2);
        assert_eq!(report.dropped_rows, 1);
        assert!(!report.is_empty());
    }

    #[test]
    fn empty_merge_is_flagged() {
        let (_, report) = merge_with_policy(None, &keyed(&[]), MergePolicy::Dedupe);
        assert!(report.is_empty());
    }

    #[test]
    fn policy_parses_and_serializes() {
        assert_eq!("Append".parse::<MergePolicy>(), Ok(MergePolicy::Append));
        assert!("union".parse::<MergePolicy>().is_err());
        assert_eq!(serde_json::to_string(&MergePolicy::Replace).unwrap(), "\"replace\"");
    }
}
