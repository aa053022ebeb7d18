//! FILENAME: app/cli/src/export.rs
//! PURPOSE: Export path - fetch, merge, validate, overwrite, publish.
//! CONTEXT: The merge-and-overwrite runs under `ExportLock` so two exports
//! can never interleave and lose rows.

use std::path::PathBuf;

use cube_engine::{normalize, DataQualityError};
use persistence::{
    load_snapshot_if_exists, merge_with_policy, save_snapshot, ExportLock, MergeReport,
    PersistenceError,
};
use serde::Serialize;
use thiserror::Error;

use crate::config::CubeConfig;
use crate::publish::Publisher;
use crate::source::{FactSource, SourceError};
use crate::{log_enter_info, log_error, log_exit_info, log_info, log_warn};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("fact source: {0}")]
    Source(#[from] SourceError),

    #[error("snapshot: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("data quality: {0}")]
    DataQuality(#[from] DataQualityError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PublishStatus {
    Skipped,
    Published,
    /// The snapshot was written but publishing failed.
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub snapshot: PathBuf,
    pub source: String,
    pub merge: MergeReport,
    pub publish: PublishStatus,
}

/// Runs one export.
///
/// The merged snapshot is normalized as a data-quality gate before it may
/// replace the stored one; the derived columns themselves are never
/// written. `publisher` runs only after a successful write.
pub fn run_export(
    config: &CubeConfig,
    source: &dyn FactSource,
    publisher: Option<&dyn Publisher>,
) -> Result<ExportSummary, ExportError> {
    let path = config.snapshot_path.as_path();
    log_enter_info!(
        "EXPORT",
        "run_export",
        "snapshot={} source={} policy={}",
        path.display(),
        source.describe(),
        config.merge_policy
    );

    let lock = ExportLock::acquire(path)?;

    let incoming = source.fetch()?.without_derived();
    let existing = load_snapshot_if_exists(path)?.map(|t| t.without_derived());
    if existing.is_none() {
        log_info!("EXPORT", "no snapshot at {}, creating it", path.display());
    }

    let (merged, report) = merge_with_policy(existing.as_ref(), &incoming, config.merge_policy);
    if report.is_empty() {
        log_warn!("EXPORT", "merged snapshot is empty");
    } else {
        normalize(&merged, config.locale)?;
    }

    save_snapshot(path, &merged)?;
    drop(lock);

    let publish = match publisher {
        None => PublishStatus::Skipped,
        Some(publisher) => match publisher.publish(path) {
            Ok(()) => PublishStatus::Published,
            Err(e) => {
                log_error!("EXPORT", "publish failed, snapshot kept: {}", e);
                PublishStatus::Failed {
                    reason: e.to_string(),
                }
            }
        },
    };

    log_exit_info!(
        "EXPORT",
        "run_export",
        "rows={} dropped={} publish={:?}",
        report.output_rows,
        report.dropped_rows,
        publish
    );

    Ok(ExportSummary {
        snapshot: path.to_path_buf(),
        source: source.describe(),
        merge: report,
        publish,
    })
}
