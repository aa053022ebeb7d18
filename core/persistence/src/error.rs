//! FILENAME: core/persistence/src/error.rs

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    CsvWrite(#[from] csv::Error),

    #[error("CSV parse error at record {row}: {reason}")]
    Parse { row: u64, reason: String },

    #[error("snapshot input is empty (no header row)")]
    EmptyInput,

    #[error("column '{0}' appears more than once in the header")]
    DuplicateColumn(String),

    /// Another export holds the snapshot, or a killed one left its lock
    /// file behind. `pid` is read from the lock file when it holds one.
    #[error(
        "snapshot is locked by another export (pid {}); if no export is running, delete {}",
        .pid.map_or_else(|| "unknown".to_string(), |p| p.to_string()),
        .path.display()
    )]
    Locked { path: PathBuf, pid: Option<u32> },
}

impl PersistenceError {
    /// Maps a read-side csv error, keeping IO failures distinct.
    pub(crate) fn from_csv_read(err: csv::Error, fallback_row: u64) -> Self {
        let reason = err.to_string();
        let pos = err.position().cloned();

        match err.into_kind() {
            csv::ErrorKind::Io(e) => PersistenceError::Io(e),
            _ => {
                let row = pos
                    .map(|p| p.record())
                    .filter(|r| *r > 0)
                    .unwrap_or(fallback_row);
                PersistenceError::Parse { row, reason }
            }
        }
    }
}
