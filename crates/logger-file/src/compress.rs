//! Gzip compression of rotated backups

use crate::backup::compressed_path;
use crate::error::{Error, Result};

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use tempfile::NamedTempFile;

/// Compresses `path` into `<path>.gz` and removes the original.
///
/// The compressed stream is written to a temporary file in the same
/// directory and renamed into place only once complete, so the `.gz` name
/// never refers to a partial archive.
///
/// # Errors
///
/// Returns an error if the backup cannot be read, or the archive cannot be
/// written or moved into place. The uncompressed backup is left untouched in
/// that case.
pub fn compress_backup(path: &Path) -> Result<PathBuf> {
    let target = compressed_path(path);
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let fail = |source: io::Error| Error::Compression {
        path: path.to_path_buf(),
        source,
    };

    let mut source = File::open(path).map_err(fail)?;
    let staging = NamedTempFile::new_in(dir).map_err(fail)?;

    let mut encoder = GzEncoder::new(staging, Compression::default());
    io::copy(&mut source, &mut encoder).map_err(fail)?;
    let staging = encoder.finish().map_err(fail)?;
    staging.as_file().sync_all().map_err(fail)?;

    staging.persist(&target).map_err(|e| fail(e.error))?;

    fs::remove_file(path).map_err(|e| Error::Io("error removing compressed backup source", e))?;

    Ok(target)
}
