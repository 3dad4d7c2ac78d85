use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::{Result, StoreError};

/// Name of the lock file kept inside each database directory. It has no
/// collection extension, so enumeration never reports it.
pub(crate) const LOCK_FILE: &str = ".nobox.lock";

/// An advisory exclusive lock (`flock(2)` on Unix) on a database.
///
/// Released when dropped, as the underlying descriptor is closed.
#[derive(Debug)]
pub(crate) struct DbLock {
    _file: File,
    path: PathBuf,
}

impl DbLock {
    /// Lock the database at `db_dir`, blocking until the lock is free.
    ///
    /// The directory must already exist; the lock file is created on demand.
    pub(crate) fn exclusive(db_dir: &Path) -> Result<Self> {
        let path = db_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;

        file.lock_exclusive().map_err(|e| StoreError::io(&path, e))?;
        tracing::trace!(path = %path.display(), "acquired database lock");

        Ok(Self { _file: file, path })
    }

    /// Try to lock without blocking. Returns `Ok(None)` if another holder
    /// has it.
    #[cfg(test)]
    pub(crate) fn try_exclusive(db_dir: &Path) -> Result<Option<Self>> {
        let path = db_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self { _file: file, path })),
            Err(_) => Ok(None),
        }
    }
}

impl Drop for DbLock {
    fn drop(&mut self) {
        tracing::trace!(path = %self.path.display(), "released database lock");
    }
}
