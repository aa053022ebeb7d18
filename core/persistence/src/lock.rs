//! FILENAME: core/persistence/src/lock.rs

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::PersistenceError;

/// Path of the lock file guarding `snapshot`: the snapshot path with
/// `.lock` appended.
pub fn lock_path(snapshot: &Path) -> PathBuf {
    let mut name: OsString = snapshot.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

/// Exclusive hold on a snapshot for one merge-and-overwrite.
///
/// Acquired by creating the lock file; released (deleted) on drop. A second
/// exporter that finds the file present gets `PersistenceError::Locked`
/// instead of racing the first one.
#[derive(Debug)]
pub struct ExportLock {
    path: PathBuf,
}

impl ExportLock {
    pub fn acquire(snapshot: &Path) -> Result<ExportLock, PersistenceError> {
        let path = lock_path(snapshot);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                let pid = holder_pid(&path);
                return Err(PersistenceError::Locked { path, pid });
            }
            Err(e) => return Err(PersistenceError::Io(e)),
        };
        let lock = ExportLock { path };
        writeln!(file, "{}", std::process::id())?;
        log::debug!("acquired export lock {}", lock.path.display());
        Ok(lock)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// PID recorded by the exporter holding `path`, if the file is readable.
fn holder_pid(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

impl Drop for ExportLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            log::warn!("failed to release export lock {}: {}", self.path.display(), e);
        }
    }
}
