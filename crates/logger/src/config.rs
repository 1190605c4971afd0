//! Logger configuration

use crate::{Level, LevelParser};

use proven_logger_file::RotationPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default timestamp layout, millisecond precision
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Fully resolved logger settings.
///
/// Which of `log_file` and `err_file` are set selects the output mode; see
/// [`Mode`](crate::Mode).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Threshold level name; unknown names resolve to `level_fallback`
    pub level: String,
    /// Primary log file. Unset or empty means console only
    pub log_file: Option<PathBuf>,
    /// Error log file. Only used together with `log_file`
    pub err_file: Option<PathBuf>,
    /// Megabytes before a rotating file is rotated (0 = 100)
    pub max_size: u64,
    /// Rotated backups to keep (0 = unlimited)
    pub max_backup: usize,
    /// Days to keep rotated backups (0 = unlimited)
    pub max_age: u32,
    /// Gzip rotated backups
    pub compress: bool,
    /// Stamp backup names in local time rather than UTC
    pub localtime: bool,
    /// chrono strftime pattern for record timestamps
    pub format_time: String,
    /// Print full level names instead of four-letter abbreviations
    pub show_full_level: bool,
    /// Never color output, even on a terminal
    pub no_colors: bool,
    /// Level used when `level` is not a known name
    pub level_fallback: Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: "trace".to_string(),
            log_file: None,
            err_file: None,
            max_size: 1,
            max_backup: 3,
            max_age: 1,
            compress: true,
            localtime: true,
            format_time: DEFAULT_TIME_FORMAT.to_string(),
            show_full_level: false,
            no_colors: false,
            level_fallback: Level::Trace,
        }
    }
}

impl Config {
    /// Set the threshold level name
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Set the primary log file
    #[must_use]
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// Set the error log file
    #[must_use]
    pub fn with_err_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.err_file = Some(path.into());
        self
    }

    /// Set the rotation size in megabytes
    #[must_use]
    pub const fn with_max_size(mut self, megabytes: u64) -> Self {
        self.max_size = megabytes;
        self
    }

    /// Set the number of retained backups
    #[must_use]
    pub const fn with_max_backup(mut self, backups: usize) -> Self {
        self.max_backup = backups;
        self
    }

    /// Set the backup retention in days
    #[must_use]
    pub const fn with_max_age(mut self, days: u32) -> Self {
        self.max_age = days;
        self
    }

    /// Enable or disable backup compression
    #[must_use]
    pub const fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Choose local time or UTC for backup names
    #[must_use]
    pub const fn with_localtime(mut self, localtime: bool) -> Self {
        self.localtime = localtime;
        self
    }

    /// Set the timestamp pattern
    #[must_use]
    pub fn with_format_time(mut self, pattern: impl Into<String>) -> Self {
        self.format_time = pattern.into();
        self
    }

    /// Print full level names
    #[must_use]
    pub const fn with_show_full_level(mut self, show: bool) -> Self {
        self.show_full_level = show;
        self
    }

    /// Disable colors
    #[must_use]
    pub const fn with_no_colors(mut self, no_colors: bool) -> Self {
        self.no_colors = no_colors;
        self
    }

    /// Set the level used for unrecognized names
    #[must_use]
    pub const fn with_level_fallback(mut self, level: Level) -> Self {
        self.level_fallback = level;
        self
    }

    /// The configured threshold
    pub fn threshold(&self) -> Level {
        LevelParser::new(self.level_fallback).parse(&self.level)
    }

    /// Primary file path, if set and non-empty
    pub fn log_file(&self) -> Option<&Path> {
        non_empty(self.log_file.as_deref())
    }

    /// Error file path, if set and non-empty
    pub fn err_file(&self) -> Option<&Path> {
        non_empty(self.err_file.as_deref())
    }

    /// Rotation settings for both rotating files
    pub const fn rotation_policy(&self) -> RotationPolicy {
        RotationPolicy {
            max_size_mb: self.max_size,
            max_backups: self.max_backup,
            max_age_days: self.max_age,
            compress: self.compress,
            local_time: self.localtime,
        }
    }
}

fn non_empty(path: Option<&Path>) -> Option<&Path> {
    path.filter(|path| !path.as_os_str().is_empty())
}
