//! Size-rotated log file with count and age retention

use crate::backup::{Backup, BackupNaming, compressed_path};
use crate::compress::compress_backup;
use crate::config::RotationPolicy;
use crate::error::{Error, Result};
use crate::registry;

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, error, warn};

/// A log file that is archived and replaced once it grows past
/// [`RotationPolicy::max_bytes`].
///
/// Every write, rotation and retention pass for one path runs under a single
/// lock, so writers never observe a half-rotated file and lines from
/// concurrent writers never interleave.
#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    policy: RotationPolicy,
    naming: BackupNaming,
    state: Mutex<State>,
}

#[derive(Debug)]
struct State {
    file: Option<File>,
    size: u64,
    last_rotation: Option<DateTime<Utc>>,
}

impl RotatingFile {
    /// Opens `path` for appending, creating missing parent directories.
    ///
    /// If the path is already open elsewhere in the process, the existing
    /// handle (and its policy) is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be created.
    pub fn open(path: impl AsRef<Path>, policy: RotationPolicy) -> Result<Arc<Self>> {
        let path = path.as_ref();

        // The directory must exist before the registry can resolve the path
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| Error::CreateDirectory {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        registry::open_shared(path, |path| {
            let naming = BackupNaming::new(&path, policy.local_time);
            let (file, size) = open_for_append(&path)?;

            Ok(Self {
                path,
                policy,
                naming,
                state: Mutex::new(State {
                    file: Some(file),
                    size,
                    last_rotation: None,
                }),
            })
        })
    }

    /// Absolute path of the active file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rotation settings in effect.
    pub const fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Bytes written to the active file since it was opened or last rotated.
    pub fn size(&self) -> u64 {
        self.state.lock().size
    }

    /// Backups currently on disk, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub fn backups(&self) -> Result<Vec<Backup>> {
        self.naming.list()
    }

    /// Appends `bytes`, rotating first if they would push the file past the
    /// size limit.
    ///
    /// A failed rotation is reported through `tracing` and the write still
    /// goes to the original path.
    ///
    /// # Errors
    ///
    /// Returns an error only if the bytes could not be written.
    pub fn write(&self, bytes: &[u8]) -> Result<()> {
        let mut state = self.state.lock();
        let incoming = bytes.len() as u64;

        if state.size > 0 && state.size.saturating_add(incoming) > self.policy.max_bytes() {
            if let Err(e) = self.rotate_locked(&mut state) {
                error!(path = %self.path.display(), "{e}");
            }
        }

        if state.file.is_none() {
            let (file, size) = open_for_append(&self.path)?;
            state.file = Some(file);
            state.size = size;
        }

        let file = state
            .file
            .as_mut()
            .ok_or_else(|| Error::NotOpen(self.path.clone()))?;

        file.write_all(bytes)
            .map_err(|e| Error::Io("error writing log file", e))?;
        state.size += incoming;

        Ok(())
    }

    /// Rotates immediately, regardless of the current size.
    ///
    /// # Errors
    ///
    /// Returns an error if the active file could not be archived or
    /// reopened.
    pub fn rotate(&self) -> Result<()> {
        let mut state = self.state.lock();
        self.rotate_locked(&mut state)
    }

    /// Flushes and syncs written data to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync fails.
    pub fn flush(&self) -> Result<()> {
        let mut state = self.state.lock();
        let Some(file) = state.file.as_mut() else {
            return Ok(());
        };

        file.flush()
            .map_err(|e| Error::Io("error flushing log file", e))?;
        file.sync_data()
            .map_err(|e| Error::Io("error syncing log file", e))
    }

    fn rotate_locked(&self, state: &mut State) -> Result<()> {
        if let Some(mut file) = state.file.take() {
            let _ = file.flush();
        }

        // Backup stamps strictly increase so name order matches rotation order
        let now = match state.last_rotation {
            Some(last) => Utc::now().max(last + chrono::Duration::milliseconds(1)),
            None => Utc::now(),
        };
        state.last_rotation = Some(now);
        let backup = self.naming.next_backup_path(now);

        if let Err(rename_err) = fs::rename(&self.path, &backup) {
            // Keep appending to the original file
            match open_for_append(&self.path) {
                Ok((file, size)) => {
                    state.file = Some(file);
                    state.size = size;
                }
                Err(e) => warn!(path = %self.path.display(), "reopen after failed rotation: {e}"),
            }

            return Err(Error::Rotation(format!(
                "renaming {} to {}: {rename_err}",
                self.path.display(),
                backup.display()
            )));
        }

        let archived = if self.policy.compress {
            compress_backup(&backup).unwrap_or_else(|e| {
                warn!("{e}");
                backup
            })
        } else {
            backup
        };

        let (file, _) = open_for_append(&self.path)
            .map_err(|e| Error::Rotation(format!("reopening after rotation: {e}")))?;
        state.file = Some(file);
        state.size = 0;

        debug!(
            path = %self.path.display(),
            backup = %archived.display(),
            "rotated log file"
        );

        self.enforce_retention();

        Ok(())
    }

    /// Removes expired and surplus backups, then compresses whatever
    /// uncompressed backups remain. Failures are logged and skipped.
    fn enforce_retention(&self) {
        let mut backups = match self.naming.list() {
            Ok(backups) => backups,
            Err(e) => {
                warn!(path = %self.path.display(), "listing backups: {e}");
                return;
            }
        };

        if self.policy.compress {
            // An archive was persisted but its source could not be removed
            backups.retain(|backup| {
                if !backup.compressed && compressed_path(&backup.path).exists() {
                    remove_backup(backup);
                    false
                } else {
                    true
                }
            });
        }

        let cutoff = self
            .policy
            .max_age()
            .and_then(|max_age| Utc::now().checked_sub_signed(max_age));

        if let Some(cutoff) = cutoff {
            backups.retain(|backup| {
                if backup.timestamp < cutoff {
                    remove_backup(backup);
                    false
                } else {
                    true
                }
            });
        }

        let max_backups = self.policy.max_backups;
        if max_backups > 0 && backups.len() > max_backups {
            for backup in backups.drain(max_backups..) {
                remove_backup(&backup);
            }
        }

        if self.policy.compress {
            for backup in backups.iter().filter(|backup| !backup.compressed) {
                if let Err(e) = compress_backup(&backup.path) {
                    warn!("{e}");
                }
            }
        }
    }
}

fn open_for_append(path: &Path) -> Result<(File, u64)> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let size = file
        .metadata()
        .map_err(|e| Error::Io("error reading log file metadata", e))?
        .len();

    Ok((file, size))
}

fn remove_backup(backup: &Backup) {
    match fs::remove_file(&backup.path) {
        Ok(()) => debug!(backup = %backup.path.display(), "removed log backup"),
        Err(e) => warn!(backup = %backup.path.display(), "removing log backup: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;
    use tracing_test::traced_test;

    fn uncompressed() -> RotationPolicy {
        RotationPolicy::default()
            .with_compress(false)
            .with_max_backups(0)
            .with_max_age_days(0)
    }

    #[test]
    fn test_picks_up_existing_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "0123456789").unwrap();

        let file = RotatingFile::open(&path, uncompressed()).unwrap();

        assert_eq!(file.size(), 10);
    }

    #[test]
    fn test_creates_missing_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("app.log");

        let file = RotatingFile::open(&path, uncompressed()).unwrap();
        file.write(b"hello\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_manual_rotation_resets_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");

        let file = RotatingFile::open(&path, uncompressed()).unwrap();
        file.write(b"before rotation\n").unwrap();
        file.rotate().unwrap();
        file.write(b"after\n").unwrap();

        assert_eq!(file.size(), 6);
        assert_eq!(fs::read_to_string(&path).unwrap(), "after\n");

        let backups = file.backups().unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(
            fs::read_to_string(&backups[0].path).unwrap(),
            "before rotation\n"
        );
    }

    #[test]
    fn test_oversized_write_into_empty_file_does_not_rotate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");

        let file = RotatingFile::open(&path, uncompressed()).unwrap();
        let big = vec![b'x'; (file.policy().max_bytes() + 10) as usize];
        file.write(&big).unwrap();

        assert!(file.backups().unwrap().is_empty());
        assert_eq!(file.size(), big.len() as u64);
    }

    #[traced_test]
    #[test]
    fn test_failed_rename_keeps_appending() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");

        let file = RotatingFile::open(&path, uncompressed()).unwrap();
        file.write(b"first\n").unwrap();

        // The rename inside the next rotation has nothing to move
        fs::remove_file(&path).unwrap();

        let big = vec![b'x'; file.policy().max_bytes() as usize];
        file.write(&big).unwrap();

        assert!(logs_contain("failed to rotate log file"));
        assert!(file.backups().unwrap().is_empty());
        assert_eq!(fs::read(&path).unwrap(), big);
        assert_eq!(file.size(), big.len() as u64);
    }
}
