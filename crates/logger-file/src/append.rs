//! Append-only log file that is never rotated

use crate::error::{Error, Result};
use crate::registry;

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

/// A log file opened in append mode. It grows without bound.
#[derive(Debug)]
pub struct AppendFile {
    path: PathBuf,
    file: Mutex<File>,
}

impl AppendFile {
    /// Opens `path` for appending, creating it if needed.
    ///
    /// The parent directory must already exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the path is already
    /// open as a rotating file.
    pub fn open(path: impl AsRef<Path>) -> Result<Arc<Self>> {
        registry::open_shared(path.as_ref(), |path| {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|source| Error::Open {
                    path: path.clone(),
                    source,
                })?;

            Ok(Self {
                path,
                file: Mutex::new(file),
            })
        })
    }

    /// Absolute path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `bytes` as one uninterrupted write.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn write(&self, bytes: &[u8]) -> Result<()> {
        self.file
            .lock()
            .write_all(bytes)
            .map_err(|e| Error::Io("error writing log file", e))
    }

    /// Flushes and syncs written data to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync fails.
    pub fn flush(&self) -> Result<()> {
        let mut file = self.file.lock();
        file.flush()
            .map_err(|e| Error::Io("error flushing log file", e))?;
        file.sync_data()
            .map_err(|e| Error::Io("error syncing log file", e))
    }
}
