//! FILENAME: core/persistence/src/stamp.rs

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use crate::PersistenceError;

/// Modification identity of a snapshot file. Two equal stamps mean the
/// cached load of the file is still current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapshotStamp {
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl SnapshotStamp {
    pub fn of(path: &Path) -> Result<SnapshotStamp, PersistenceError> {
        let meta = fs::metadata(path)?;
        Ok(SnapshotStamp {
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}
