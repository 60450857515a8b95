use std::{fs, path::Path};

use rocksdb::{DBWithThreadMode, ErrorKind, Options, SingleThreaded, WriteOptions};
use tracing::debug;

use crate::error::StoreError;

/// Handle on the node's chain database. Opened for a single operation and
/// dropped right after, so the exclusive lock is never held longer than needed.
pub(crate) struct RocksDBBackend {
    db: DBWithThreadMode<SingleThreaded>,
}

impl RocksDBBackend {
    /// Opens an existing store for writing. Never creates one.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        ensure_rocksdb_store(path)?;
        let mut opts = Options::default();
        opts.create_if_missing(false);
        let db = DBWithThreadMode::open(&opts, path).map_err(|e| map_open_error(path, e))?;
        debug!(path = %path.display(), "Opened chain database");
        Ok(Self { db })
    }

    /// Read-only handle. Works next to another reader but still fails while a
    /// writer holds the lock on some platforms.
    pub fn open_read_only(path: &Path) -> Result<Self, StoreError> {
        ensure_rocksdb_store(path)?;
        let db = DBWithThreadMode::open_for_read_only(&Options::default(), path, false)
            .map_err(|e| map_open_error(path, e))?;
        debug!(path = %path.display(), "Opened chain database (read-only)");
        Ok(Self { db })
    }

    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.db.get(key)?)
    }

    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        Ok(self.db.put_opt(key, value, &sync_writes())?)
    }

    pub fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        Ok(self.db.delete_opt(key, &sync_writes())?)
    }
}

fn sync_writes() -> WriteOptions {
    let mut opts = WriteOptions::default();
    opts.set_sync(true);
    opts
}

/// Pebble keeps `marker.format-version.*` and `marker.manifest.*` files next
/// to its tables. RocksDB must not be pointed at such a directory.
const PEBBLE_MARKERS: [&str; 2] = ["marker.format-version.", "marker.manifest."];

const LOCK_FILE_SUFFIX: &str = "/LOCK";
const LOCK_HELD_IN_PROCESS: &str = "lock hold by current process";

fn ensure_rocksdb_store(path: &Path) -> Result<(), StoreError> {
    if !path.is_dir() {
        return Err(StoreError::MissingStore(path.to_path_buf()));
    }
    // unreadable directories are left for RocksDB to report
    let Ok(entries) = fs::read_dir(path) else {
        return Ok(());
    };
    let is_pebble = entries.filter_map(Result::ok).any(|entry| {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        PEBBLE_MARKERS.iter().any(|marker| name.starts_with(marker))
    });
    if is_pebble {
        return Err(StoreError::UnsupportedEngine {
            path: path.to_path_buf(),
            engine: "Pebble",
        });
    }
    Ok(())
}

fn map_open_error(path: &Path, err: rocksdb::Error) -> StoreError {
    if is_lock_error(err.kind(), &err.to_string()) {
        StoreError::Locked(path.to_path_buf())
    } else {
        StoreError::RocksdbError(err)
    }
}

/// A held LOCK file surfaces as an IO error naming the file, or as an
/// in-process lock message when the same process already has it open.
fn is_lock_error(kind: ErrorKind, message: &str) -> bool {
    matches!(kind, ErrorKind::IOError)
        && (message.contains(LOCK_FILE_SUFFIX) || message.contains(LOCK_HELD_IN_PROCESS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_lock_file_is_a_lock_error() {
        assert!(is_lock_error(
            ErrorKind::IOError,
            "IO error: While lock file: /data/bor/chaindata/LOCK: Resource temporarily unavailable"
        ));
        assert!(is_lock_error(
            ErrorKind::IOError,
            "IO error: lock hold by current process, acquire time 1700000000 acquiring thread 1: /data/bor/chaindata/LOCK: No locks available"
        ));
    }

    #[test]
    fn corruption_is_not_a_lock_error() {
        assert!(!is_lock_error(
            ErrorKind::Corruption,
            "Corruption: block checksum mismatch: stored = 1, computed = 2 in /data/bor/chaindata/000009.sst offset 0 size 4096"
        ));
        assert!(!is_lock_error(
            ErrorKind::IOError,
            "IO error: No such file or directory: While reading block at /data/bor/chaindata/000009.sst"
        ));
    }

    #[test]
    fn pebble_store_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("marker.format-version.000004.016"), b"").unwrap();
        assert!(matches!(
            RocksDBBackend::open(dir.path()),
            Err(StoreError::UnsupportedEngine { engine: "Pebble", .. })
        ));
        assert!(matches!(
            RocksDBBackend::open_read_only(dir.path()),
            Err(StoreError::UnsupportedEngine { .. })
        ));
    }
}
