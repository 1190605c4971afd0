//! Rotation and retention settings shared by rotating log files

use serde::{Deserialize, Serialize};

const BYTES_PER_MEGABYTE: u64 = 1024 * 1024;

/// Size limit used when `max_size_mb` is `0`
pub const DEFAULT_MAX_SIZE_MB: u64 = 100;
const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Limits applied to a rotating log file and its backups.
///
/// A value of `0` for `max_backups` or `max_age_days` disables that
/// pruning dimension. A `max_size_mb` of `0` means [`DEFAULT_MAX_SIZE_MB`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationPolicy {
    /// Size in megabytes the active file may reach before it is rotated,
    /// `0` for [`DEFAULT_MAX_SIZE_MB`]
    pub max_size_mb: u64,
    /// Number of rotated backups to retain
    pub max_backups: usize,
    /// Age in days after which a backup is removed
    pub max_age_days: u32,
    /// Gzip rotated backups
    pub compress: bool,
    /// Stamp backup names with local time instead of UTC
    pub local_time: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_size_mb: 1,
            max_backups: 3,
            max_age_days: 1,
            compress: true,
            local_time: true,
        }
    }
}

impl RotationPolicy {
    /// Set the maximum size in megabytes
    #[must_use]
    pub const fn with_max_size_mb(mut self, max_size_mb: u64) -> Self {
        self.max_size_mb = max_size_mb;
        self
    }

    /// Set the number of retained backups
    #[must_use]
    pub const fn with_max_backups(mut self, max_backups: usize) -> Self {
        self.max_backups = max_backups;
        self
    }

    /// Set the maximum backup age in days
    #[must_use]
    pub const fn with_max_age_days(mut self, max_age_days: u32) -> Self {
        self.max_age_days = max_age_days;
        self
    }

    /// Enable or disable gzip compression of backups
    #[must_use]
    pub const fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Choose local time or UTC for backup timestamps
    #[must_use]
    pub const fn with_local_time(mut self, local_time: bool) -> Self {
        self.local_time = local_time;
        self
    }

    /// Size limit in bytes.
    #[must_use]
    pub const fn max_bytes(&self) -> u64 {
        let megabytes = match self.max_size_mb {
            0 => DEFAULT_MAX_SIZE_MB,
            megabytes => megabytes,
        };
        megabytes.saturating_mul(BYTES_PER_MEGABYTE)
    }

    /// Maximum backup age, or `None` when age pruning is disabled.
    #[must_use]
    pub fn max_age(&self) -> Option<chrono::Duration> {
        (self.max_age_days > 0)
            .then(|| chrono::Duration::seconds(i64::from(self.max_age_days) * SECONDS_PER_DAY))
    }
}
