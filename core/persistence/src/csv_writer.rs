//! FILENAME: core/persistence/src/csv_writer.rs

use std::io::Write;
use std::path::Path;

use model::FactTable;
use tempfile::NamedTempFile;

use crate::PersistenceError;

/// Writes the header row and every record of `table` as comma-separated
/// UTF-8. Missing cells become empty fields.
pub fn write_table<W: Write>(writer: W, table: &FactTable) -> Result<(), PersistenceError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(table.columns())?;
    for row in table.rows() {
        csv_writer.write_record(row.iter().map(|v| v.display_value()))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Replaces the snapshot at `path` wholesale.
///
/// The table is written to a temporary file in the same directory and
/// renamed over the target, so readers see either the old or the new
/// snapshot, never a partial one.
pub fn save_snapshot(path: &Path, table: &FactTable) -> Result<(), PersistenceError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    write_table(&mut tmp, table)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| PersistenceError::Io(e.error))?;

    log::info!("saved snapshot {} ({} rows)", path.display(), table.len());
    Ok(())
}
