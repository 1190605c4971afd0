//! File destinations for log output, with size-based rotation
//!
//! This crate provides the two on-disk log destinations:
//! - [`AppendFile`]: a plain append-only file that is never rotated
//! - [`RotatingFile`]: a file that is archived once it grows past a size
//!   limit, with backups pruned by count and age and optionally gzipped
//!
//! Each distinct path is backed by exactly one open handle per process;
//! opening a path that is already open returns the shared handle.

#![warn(missing_docs, unreachable_pub)]
#![forbid(unsafe_code)]

mod append;
mod backup;
mod compress;
mod config;
mod error;
mod registry;
mod rotating;

pub use append::AppendFile;
pub use backup::{BACKUP_TIME_FORMAT, Backup, BackupNaming, COMPRESS_SUFFIX, compressed_path};
pub use compress::compress_backup;
pub use config::{DEFAULT_MAX_SIZE_MB, RotationPolicy};
pub use error::{Error, Result};
pub use rotating::RotatingFile;
