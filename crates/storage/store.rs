use std::path::{Path, PathBuf};

use bor_backfill_common::{constants::CHAINDATA_SUBPATH, types::WriteInstruction};
use tracing::{debug, info};

use crate::{backend::RocksDBBackend, error::StoreError};

/// Result of a delete. A missing key is reported, not treated as a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub written: usize,
}

/// Applies raw key-value operations to a stopped node's chain database.
///
/// Every operation opens the database, performs one action and closes it
/// again. The node must not be running: the database takes an exclusive lock
/// and a held lock surfaces as [`StoreError::Locked`].
#[derive(Debug, Clone)]
pub struct KvApplier {
    db_path: PathBuf,
}

impl KvApplier {
    /// Targets the chain database under a node data directory
    /// (`<data_dir>/bor/chaindata`).
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let db_path = CHAINDATA_SUBPATH
            .iter()
            .fold(data_dir.as_ref().to_path_buf(), |path, part| path.join(part));
        Self { db_path }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let db = RocksDBBackend::open(&self.db_path)?;
        db.put(key, value)?;
        debug!(key = %hex(key), value_len = value.len(), "Put key");
        Ok(())
    }

    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let db = RocksDBBackend::open_read_only(&self.db_path)?;
        db.get(key)
    }

    pub fn delete(&self, key: &[u8]) -> Result<DeleteOutcome, StoreError> {
        let db = RocksDBBackend::open(&self.db_path)?;
        if db.get(key)?.is_none() {
            debug!(key = %hex(key), "Key not found, nothing to delete");
            return Ok(DeleteOutcome::NotFound);
        }
        db.delete(key)?;
        debug!(key = %hex(key), "Deleted key");
        Ok(DeleteOutcome::Deleted)
    }

    /// Writes every instruction in order. All instructions are decoded before
    /// the first write, so a malformed batch leaves the store untouched. The
    /// first storage error stops the batch; re-running it is safe since puts
    /// overwrite.
    pub fn apply(&self, instructions: &[WriteInstruction]) -> Result<ApplySummary, StoreError> {
        let decoded = instructions
            .iter()
            .enumerate()
            .map(|(index, instruction)| {
                instruction
                    .decode()
                    .map_err(|source| StoreError::InvalidInstruction { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut summary = ApplySummary::default();
        for (key, value) in &decoded {
            self.put(key, value)?;
            summary.written += 1;
        }
        info!(
            written = summary.written,
            path = %self.db_path.display(),
            "Applied write instructions"
        );
        Ok(summary)
    }
}

fn hex(bytes: &[u8]) -> String {
    bor_backfill_common::utils::encode_prefixed_hex(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chaindata_lives_under_bor() {
        let applier = KvApplier::new("/data/node");
        assert_eq!(applier.db_path(), Path::new("/data/node/bor/chaindata"));
    }

    #[test]
    fn missing_store_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let applier = KvApplier::new(dir.path());
        assert!(matches!(
            applier.get(b"anything"),
            Err(StoreError::MissingStore(path)) if path == applier.db_path()
        ));
    }

    #[test]
    fn invalid_instruction_aborts_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let applier = KvApplier::new(dir.path());
        let batch = vec![
            WriteInstruction::new(b"a", b"1"),
            WriteInstruction {
                key: "0x02".to_string(),
                value: "zz".to_string(),
            },
        ];
        // Fails on decode, so the missing store is never touched.
        assert!(matches!(
            applier.apply(&batch),
            Err(StoreError::InvalidInstruction { index: 1, .. })
        ));
    }
}
