//! FILENAME: app/cli/src/render.rs
//! PURPOSE: Plain-text rendering of cube results for the terminal.
//! CONTEXT: JSON output serializes the result types directly; this module
//! only covers the human-readable form.

use std::fmt::Write as _;

use cube_engine::{Aggregate, CubeReport, DetailTable, Outcome, PivotTable, RollupTable, YearRange};
use model::FactValue;

use crate::cube::OptionsResponse;
use crate::export::{ExportSummary, PublishStatus};

const EMPTY_LABEL: &str = "(empty)";

/// Totals print without decimals when integral, otherwise with two.
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn member_label(value: &FactValue) -> String {
    if value.is_empty() {
        EMPTY_LABEL.to_string()
    } else {
        value.display_value()
    }
}

fn cell_label(value: &FactValue) -> String {
    match value {
        FactValue::Number(n) => format_amount(*n),
        other => member_label(other),
    }
}

/// Left-aligned columns separated by two spaces, with a rule under the
/// header.
pub fn text_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    let line = |out: &mut String, cells: &[String]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect();
        let _ = writeln!(out, "{}", padded.join("  ").trim_end());
    };

    line(&mut out, headers);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    line(&mut out, &rule);
    for row in rows {
        line(&mut out, row);
    }
    out
}

fn render_rollup(rollup: &RollupTable) -> String {
    let headers = vec![
        rollup.dimension.label().to_string(),
        rollup.measure.label().to_string(),
    ];
    let rows: Vec<Vec<String>> = rollup
        .rows
        .iter()
        .map(|r| vec![member_label(&r.key), format_amount(r.total)])
        .collect();
    text_table(&headers, &rows)
}

fn render_pivot(pivot: &PivotTable) -> String {
    let mut headers = vec![format!(
        "{} \\ {}",
        pivot.row_dimension.label(),
        pivot.col_dimension.label()
    )];
    headers.extend(pivot.col_keys.iter().map(member_label));

    let rows: Vec<Vec<String>> = pivot
        .row_keys
        .iter()
        .zip(&pivot.cells)
        .map(|(key, cells)| {
            let mut row = vec![member_label(key)];
            row.extend(cells.iter().map(|v| format_amount(*v)));
            row
        })
        .collect();

    let mut out = format!("{}\n", pivot.measure.label());
    out.push_str(&text_table(&headers, &rows));
    out
}

fn render_detail(detail: &DetailTable) -> String {
    let rows: Vec<Vec<String>> = detail
        .rows
        .iter()
        .map(|r| r.iter().map(cell_label).collect())
        .collect();
    let mut out = format!(
        "Detail for {} = {}\n",
        detail.dimension.label(),
        member_label(&detail.value)
    );
    out.push_str(&text_table(&detail.columns, &rows));
    out
}

pub fn render_report(outcome: &Outcome<CubeReport>) -> String {
    let report = match outcome {
        Outcome::Empty(reason) => return format!("No results: {}.\n", reason),
        Outcome::Ready(report) => report,
    };

    let mut out = format!("{} matching rows\n\n", report.matched_rows);
    match &report.aggregate {
        Aggregate::Rollup(rollup) => out.push_str(&render_rollup(rollup)),
        Aggregate::Pivot(pivot) => out.push_str(&render_pivot(pivot)),
    }

    match &report.drill_values {
        Outcome::Ready(values) => {
            let labels: Vec<String> = values.iter().map(member_label).collect();
            let _ = write!(out, "\nDrill-down values: {}\n", labels.join(", "));
        }
        Outcome::Empty(reason) => {
            let _ = write!(out, "\nDrill-down unavailable: {}.\n", reason);
        }
    }

    if let Some(detail) = &report.drill {
        out.push('\n');
        out.push_str(&render_detail(detail));
    }
    out
}

pub fn render_options(options: &OptionsResponse) -> String {
    let years = match options.years {
        YearRange::None => "(none)".to_string(),
        YearRange::Single { year } => year.to_string(),
        YearRange::Range { min, max } => format!("{}-{}", min, max),
    };
    let keys = |items: &[crate::cube::ChoiceItem]| {
        items.iter().map(|c| c.key.as_str()).collect::<Vec<_>>().join(", ")
    };

    let mut out = String::new();
    let _ = writeln!(out, "Snapshot rows: {}", options.snapshot_rows);
    let _ = writeln!(out, "Years:         {}", years);
    let _ = writeln!(out, "Industries:    {}", options.industries.join(", "));
    let _ = writeln!(out, "Statuses:      {}", options.statuses.join(", "));
    let _ = writeln!(out, "Measures:      {}", keys(&options.measures));
    let _ = writeln!(out, "Dimensions:    {}", keys(&options.dimensions));
    let _ = writeln!(out, "Columns:       {}", keys(&options.column_choices));
    out
}

pub fn render_export(summary: &ExportSummary) -> String {
    let merge = &summary.merge;
    let mut out = format!(
        "Exported {} -> {}\n  policy: {}\n  existing: {}  incoming: {}  written: {}  dropped: {}\n",
        summary.source,
        summary.snapshot.display(),
        merge.policy,
        merge.existing_rows,
        merge.incoming_rows,
        merge.output_rows,
        merge.dropped_rows
    );
    if merge.is_empty() {
        out.push_str("  warning: the snapshot is empty\n");
    }
    let publish = match &summary.publish {
        PublishStatus::Skipped => "skipped".to_string(),
        PublishStatus::Published => "published".to_string(),
        PublishStatus::Failed { reason } => format!("failed ({})", reason),
    };
    let _ = writeln!(out, "  publish: {}", publish);
    out
}
