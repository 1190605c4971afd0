//! Naming and discovery of rotated backups
//!
//! A backup of `dir/app.log` is named `dir/app-2024-01-15T14-30-45.123.log`,
//! with a trailing `.gz` once compressed. The timestamp is written so that
//! lexical order equals chronological order.

use crate::error::{Error, Result};

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

/// Timestamp layout embedded in backup file names
pub const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";

/// Suffix appended to compressed backups
pub const COMPRESS_SUFFIX: &str = ".gz";

/// A rotated copy of a log file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backup {
    /// Location of the backup
    pub path: PathBuf,
    /// When the backup was rotated, as recorded in its name
    pub timestamp: DateTime<Utc>,
    /// Whether the backup carries the compression suffix
    pub compressed: bool,
}

/// Derives backup names for one log file path.
#[derive(Debug, Clone)]
pub struct BackupNaming {
    dir: PathBuf,
    prefix: String,
    extension: String,
    local_time: bool,
}

impl BackupNaming {
    /// Naming scheme for backups of `path`.
    pub fn new(path: &Path, local_time: bool) -> Self {
        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        Self {
            dir,
            prefix: format!("{stem}-"),
            extension,
            local_time,
        }
    }

    /// Directory holding the log file and its backups.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Picks a backup path for a rotation happening at `now` that collides
    /// with no existing backup, compressed or not.
    pub fn next_backup_path(&self, now: DateTime<Utc>) -> PathBuf {
        let mut stamp = self.naive(now);

        loop {
            let candidate = self.dir.join(self.file_name(stamp));
            if !candidate.exists() && !compressed_path(&candidate).exists() {
                return candidate;
            }
            stamp += chrono::Duration::milliseconds(1);
        }
    }

    /// File name of the backup stamped with `stamp`.
    pub fn file_name(&self, stamp: NaiveDateTime) -> String {
        format!(
            "{}{}{}",
            self.prefix,
            stamp.format(BACKUP_TIME_FORMAT),
            self.extension
        )
    }

    /// Recovers the rotation time and compression state from a file name,
    /// or `None` when the name is not a backup of this log.
    pub fn parse(&self, file_name: &str) -> Option<(DateTime<Utc>, bool)> {
        let rest = file_name.strip_prefix(&self.prefix)?;

        let (rest, compressed) = match rest.strip_suffix(COMPRESS_SUFFIX) {
            Some(rest) => (rest, true),
            None => (rest, false),
        };

        let stamp = rest.strip_suffix(self.extension.as_str())?;
        let naive = NaiveDateTime::parse_from_str(stamp, BACKUP_TIME_FORMAT).ok()?;

        Some((self.to_utc(naive)?, compressed))
    }

    /// Lists every backup of this log, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub fn list(&self) -> Result<Vec<Backup>> {
        let entries =
            fs::read_dir(&self.dir).map_err(|e| Error::Io("error reading log directory", e))?;

        let mut backups = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::Io("error reading log directory entry", e))?;

            if !entry.file_type().is_ok_and(|kind| kind.is_file()) {
                continue;
            }

            let Some(file_name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };

            if let Some((timestamp, compressed)) = self.parse(&file_name) {
                backups.push(Backup {
                    path: entry.path(),
                    timestamp,
                    compressed,
                });
            }
        }

        backups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(backups)
    }

    fn naive(&self, now: DateTime<Utc>) -> NaiveDateTime {
        if self.local_time {
            now.with_timezone(&Local).naive_local()
        } else {
            now.naive_utc()
        }
    }

    fn to_utc(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        if self.local_time {
            Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|local| local.with_timezone(&Utc))
        } else {
            Some(Utc.from_utc_datetime(&naive))
        }
    }
}

/// `path` with the compression suffix appended.
pub fn compressed_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(COMPRESS_SUFFIX);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn stamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_milli_opt(14, 30, 45, 123)
            .unwrap()
    }

    #[test]
    fn test_file_name_layout() {
        let naming = BackupNaming::new(Path::new("/var/log/app.log"), false);

        assert_eq!(naming.file_name(stamp()), "app-2024-01-15T14-30-45.123.log");
        assert_eq!(naming.dir(), Path::new("/var/log"));
    }

    #[test]
    fn test_file_name_without_extension() {
        let naming = BackupNaming::new(Path::new("server"), false);

        assert_eq!(naming.file_name(stamp()), "server-2024-01-15T14-30-45.123");
        assert_eq!(naming.dir(), Path::new("."));
    }

    #[test]
    fn test_parse_recovers_timestamp() {
        let naming = BackupNaming::new(Path::new("/var/log/app.log"), false);

        let (timestamp, compressed) = naming.parse("app-2024-01-15T14-30-45.123.log").unwrap();
        assert_eq!(timestamp, Utc.from_utc_datetime(&stamp()));
        assert!(!compressed);

        let (_, compressed) = naming
            .parse("app-2024-01-15T14-30-45.123.log.gz")
            .unwrap();
        assert!(compressed);
    }

    #[test]
    fn test_parse_ignores_foreign_files() {
        let naming = BackupNaming::new(Path::new("/var/log/app.log"), false);

        assert!(naming.parse("app.log").is_none());
        assert!(naming.parse("app-notatime.log").is_none());
        assert!(naming.parse("other-2024-01-15T14-30-45.123.log").is_none());
        assert!(naming.parse("app-2024-01-15T14-30-45.123.txt").is_none());
    }

    #[test]
    fn test_names_sort_chronologically() {
        let naming = BackupNaming::new(Path::new("app.log"), false);
        let earlier = naming.file_name(stamp());
        let later = naming.file_name(stamp() + chrono::Duration::milliseconds(1));

        assert!(earlier < later);
    }

    #[test]
    fn test_next_backup_path_skips_taken_names() {
        let dir = tempdir().unwrap();
        let naming = BackupNaming::new(&dir.path().join("app.log"), false);
        let now = Utc.from_utc_datetime(&stamp());

        let first = naming.next_backup_path(now);
        fs::write(compressed_path(&first), b"").unwrap();

        let second = naming.next_backup_path(now);
        assert_ne!(first, second);
        assert_eq!(
            second.file_name().unwrap(),
            "app-2024-01-15T14-30-45.124.log"
        );
    }

    #[test]
    fn test_list_newest_first() {
        let dir = tempdir().unwrap();
        let naming = BackupNaming::new(&dir.path().join("app.log"), false);

        let old = naming.file_name(stamp());
        let new = naming.file_name(stamp() + chrono::Duration::hours(1));
        fs::write(dir.path().join(&old), b"old").unwrap();
        fs::write(dir.path().join(format!("{new}.gz")), b"new").unwrap();
        fs::write(dir.path().join("app.log"), b"active").unwrap();
        fs::write(dir.path().join("unrelated.txt"), b"x").unwrap();

        let backups = naming.list().unwrap();
        assert_eq!(backups.len(), 2);
        assert!(backups[0].compressed);
        assert!(!backups[1].compressed);
        assert!(backups[0].timestamp > backups[1].timestamp);
    }
}
