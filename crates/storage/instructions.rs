use std::{
    fs,
    path::{Path, PathBuf},
};

use bor_backfill_common::types::WriteInstruction;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::info;

use crate::error::StoreError;

const INDENT: &[u8] = b"    ";

/// JSON file holding the write instructions between discovery and apply.
#[derive(Debug, Clone)]
pub struct InstructionStore {
    path: PathBuf,
}

impl InstructionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `instructions` as a 4-space indented JSON array, replacing any
    /// previous content.
    pub fn write(&self, instructions: &[WriteInstruction]) -> Result<(), StoreError> {
        let json = to_indented_json(instructions)?;
        fs::write(&self.path, json).map_err(|source| StoreError::InstructionFile {
            path: self.path.clone(),
            source,
        })?;
        info!(
            count = instructions.len(),
            path = %self.path.display(),
            "Wrote write instructions"
        );
        Ok(())
    }

    pub fn read(&self) -> Result<Vec<WriteInstruction>, StoreError> {
        let data = fs::read(&self.path).map_err(|source| StoreError::InstructionFile {
            path: self.path.clone(),
            source,
        })?;
        // An empty scan serializes its nil list as `null`.
        let instructions: Option<Vec<WriteInstruction>> =
            serde_json::from_slice(&data).map_err(|source| StoreError::MalformedInstructions {
                path: self.path.clone(),
                source,
            })?;
        Ok(instructions.unwrap_or_default())
    }
}

fn to_indented_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, StoreError> {
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(INDENT));
    value
        .serialize(&mut serializer)
        .map_err(StoreError::SerializeInstructions)?;
    Ok(out)
}
