use std::path::PathBuf;

use bor_backfill_common::errors::CodecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Rocksdb error: {0}")]
    RocksdbError(#[from] rocksdb::Error),
    #[error("no store found at {0}")]
    MissingStore(PathBuf),
    #[error("store at {0} is locked, stop the node before writing to it")]
    Locked(PathBuf),
    #[error(
        "store at {path} was written by {engine}, only RocksDB stores are supported (node started with --db.engine rocksdb)"
    )]
    UnsupportedEngine { path: PathBuf, engine: &'static str },
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("instruction #{index} is invalid: {source}")]
    InvalidInstruction { index: usize, source: CodecError },
    #[error("could not access instruction file {path}: {source}")]
    InstructionFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to serialize write instructions: {0}")]
    SerializeInstructions(serde_json::Error),
    #[error("malformed instruction file {path}: {source}")]
    MalformedInstructions {
        path: PathBuf,
        source: serde_json::Error,
    },
}
