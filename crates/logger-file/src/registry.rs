//! Process-wide table of open log files, keyed by resolved path

use crate::error::{Error, Result};

use std::any::Any;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Weak};

use parking_lot::Mutex;

type Slot = Weak<dyn Any + Send + Sync>;

static OPEN_FILES: LazyLock<Mutex<HashMap<PathBuf, Slot>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Returns the live handle for `path`, or opens one with `open`.
///
/// A path stays registered for as long as any `Arc` to its handle exists, so
/// every writer of one path shares one file handle and one lock.
pub(crate) fn open_shared<T, F>(path: &Path, open: F) -> Result<Arc<T>>
where
    T: Any + Send + Sync,
    F: FnOnce(PathBuf) -> Result<T>,
{
    let key = resolve(path)?;

    let mut files = OPEN_FILES.lock();
    files.retain(|_, slot| slot.strong_count() > 0);

    if let Some(existing) = files.get(&key).and_then(Weak::upgrade) {
        return existing
            .downcast::<T>()
            .map_err(|_| Error::InUse(key.clone()))
            .inspect(|_| tracing::debug!(path = %key.display(), "reusing open log file"));
    }

    let handle = Arc::new(open(key.clone())?);
    let erased: Arc<dyn Any + Send + Sync> = handle.clone();
    files.insert(key, Arc::downgrade(&erased));

    Ok(handle)
}

/// Absolute form of `path` with its directory resolved through `..` and
/// symlinks. Falls back to the plain absolute path while the directory does
/// not exist.
fn resolve(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|e| Error::Open {
        path: path.to_path_buf(),
        source: e,
    })?;

    let (Some(dir), Some(name)) = (absolute.parent(), absolute.file_name()) else {
        return Ok(absolute);
    };

    match fs::canonicalize(dir) {
        Ok(dir) => Ok(dir.join(name)),
        Err(_) => Ok(absolute),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    #[derive(Debug)]
    struct Dummy(u32);

    #[test]
    fn test_same_path_shares_handle() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shared.log");

        let first = open_shared(&path, |_| Ok(Dummy(1))).unwrap();
        let second = open_shared(&path, |_| Ok(Dummy(2))).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.0, 1);
    }

    #[test]
    fn test_dropped_handle_is_reopened() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dropped.log");

        drop(open_shared(&path, |_| Ok(Dummy(1))).unwrap());
        let reopened = open_shared(&path, |_| Ok(Dummy(2))).unwrap();

        assert_eq!(reopened.0, 2);
    }

    #[test]
    fn test_equivalent_spellings_share_handle() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("logs")).unwrap();
        let direct = dir.path().join("logs").join("app.log");
        let detour = dir.path().join("logs").join("..").join("logs").join("app.log");

        let first = open_shared(&direct, |_| Ok(Dummy(1))).unwrap();
        let second = open_shared(&detour, |_| Ok(Dummy(2))).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_shares_handle() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("real")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();

        let real = dir.path().join("real").join("app.log");
        let linked = dir.path().join("link").join("app.log");

        let first = open_shared(&real, |_| Ok(Dummy(1))).unwrap();
        let second = open_shared(&linked, |_| Ok(Dummy(2))).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_kind_mismatch_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mismatch.log");

        let _held = open_shared(&path, |_| Ok(Dummy(1))).unwrap();
        let other = open_shared(&path, |_| Ok(String::from("other")));

        assert!(matches!(other, Err(Error::InUse(_))));
    }
}
