//! FILENAME: core/persistence/src/lib.rs
//! Snapshot persistence for the project cube.
//!
//! The snapshot is a single comma-separated file, read whole at load time
//! and replaced whole at export time. Exports serialize through
//! `ExportLock`; queries detect changes through `SnapshotStamp`.

mod csv_reader;
mod csv_writer;
mod error;
mod lock;
mod merge;
mod stamp;

pub use csv_reader::{load_snapshot, load_snapshot_if_exists, read_table};
pub use csv_writer::{save_snapshot, write_table};
pub use error::PersistenceError;
pub use lock::{lock_path, ExportLock};
pub use merge::{dedupe, merge, merge_with_policy, MergePolicy, MergeReport};
pub use stamp::SnapshotStamp;
