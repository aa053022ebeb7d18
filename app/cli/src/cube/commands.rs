//! FILENAME: app/cli/src/cube/commands.rs
//! PURPOSE: Entry points the presentation layer calls per interaction.

use cube_engine::{run_query, CubeReport, FilterOptions, Outcome};

use crate::cube::operations::CubeState;
use crate::cube::types::*;
use crate::cube::utils::*;
use crate::{log_debug, log_info};

// ============================================================================
// COMMANDS
// ============================================================================

/// Runs one query against the current snapshot.
pub fn query_cube(state: &CubeState, request: QueryRequest) -> Result<Outcome<CubeReport>, QueryError> {
    log_info!(
        "CUBE",
        "query_cube measure={} rows={} cols={:?} drill={:?}",
        request.measure,
        request.rows,
        request.columns,
        request.drill_value
    );

    // Validate choices before touching the snapshot
    let query = request_to_query(&request)?;
    let table = state.current_table()?;
    let outcome = run_query(&table, &query)?;

    match &outcome {
        Outcome::Ready(report) => {
            log_debug!("CUBE", "query matched {} rows", report.matched_rows)
        }
        Outcome::Empty(reason) => log_info!("CUBE", "query empty: {}", reason),
    }
    Ok(outcome)
}

/// Lists what the selectors may offer for the current snapshot.
pub fn cube_options(state: &CubeState) -> Result<OptionsResponse, QueryError> {
    log_debug!("CUBE", "cube_options");

    let table = state.current_table()?;
    let observed = FilterOptions::observe(&table);

    Ok(OptionsResponse {
        snapshot_rows: table.len(),
        years: observed.years,
        industries: observed.industries,
        statuses: observed.statuses,
        measures: measure_choices(),
        dimensions: dimension_choices(),
        column_choices: column_choices(),
    })
}
