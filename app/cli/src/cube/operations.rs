//! FILENAME: app/cli/src/cube/operations.rs
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use cube_engine::{normalize, Locale};
use model::FactTable;
use persistence::{load_snapshot, PersistenceError, SnapshotStamp};

use crate::cube::types::QueryError;
use crate::{log_debug, log_info, log_warn};

// ============================================================================
// STATE
// ============================================================================

/// The normalized snapshot together with the file identity it was loaded
/// from.
#[derive(Debug, Clone)]
pub(crate) struct CachedSnapshot {
    pub(crate) stamp: SnapshotStamp,
    pub(crate) table: Arc<FactTable>,
}

/// Query-side state: the last successfully loaded snapshot, reloaded when
/// the file's stamp changes.
pub struct CubeState {
    snapshot_path: PathBuf,
    locale: Locale,
    pub(crate) cache: Mutex<Option<CachedSnapshot>>,
}

impl CubeState {
    pub fn new(snapshot_path: impl Into<PathBuf>, locale: Locale) -> Self {
        CubeState {
            snapshot_path: snapshot_path.into(),
            locale,
            cache: Mutex::new(None),
        }
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Drops the cached snapshot so the next request reloads it.
    pub fn invalidate(&self) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        *cache = None;
    }

    /// Returns the current normalized snapshot.
    ///
    /// When the file cannot be read but an earlier load is cached, the
    /// cached snapshot keeps serving queries.
    pub fn current_table(&self) -> Result<Arc<FactTable>, QueryError> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());

        let stamp = match SnapshotStamp::of(&self.snapshot_path) {
            Ok(stamp) => stamp,
            Err(e) => return serve_cached(cache.as_ref(), e),
        };

        if let Some(cached) = cache.as_ref() {
            if cached.stamp == stamp {
                log_debug!("CUBE", "snapshot cache hit ({} rows)", cached.table.len());
                return Ok(Arc::clone(&cached.table));
            }
        }

        let raw = match load_snapshot(&self.snapshot_path) {
            Ok(raw) => raw,
            Err(e) => return serve_cached(cache.as_ref(), e),
        };
        let table = Arc::new(normalize(&raw, self.locale)?);

        log_info!(
            "CUBE",
            "loaded snapshot {} ({} rows)",
            self.snapshot_path.display(),
            table.len()
        );
        *cache = Some(CachedSnapshot {
            stamp,
            table: Arc::clone(&table),
        });
        Ok(table)
    }
}

fn serve_cached(
    cached: Option<&CachedSnapshot>,
    error: PersistenceError,
) -> Result<Arc<FactTable>, QueryError> {
    match cached {
        Some(cached) => {
            log_warn!(
                "CUBE",
                "snapshot reload failed, serving last loaded snapshot: {}",
                error
            );
            Ok(Arc::clone(&cached.table))
        }
        None => Err(QueryError::Persistence(error)),
    }
}
