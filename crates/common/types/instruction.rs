use serde::{Deserialize, Serialize};

use crate::errors::CodecError;
use crate::utils::{decode_prefixed_hex, encode_prefixed_hex};

/// A pending key-value mutation against the node's store, kept as `0x` hex so
/// the instruction file stays reviewable and hand-editable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteInstruction {
    pub key: String,
    pub value: String,
}

impl WriteInstruction {
    pub fn new(key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Self {
        Self {
            key: encode_prefixed_hex(key),
            value: encode_prefixed_hex(value),
        }
    }

    /// Raw key and value bytes.
    pub fn decode(&self) -> Result<(Vec<u8>, Vec<u8>), CodecError> {
        Ok((
            decode_prefixed_hex(&self.key)?,
            decode_prefixed_hex(&self.value)?,
        ))
    }
}
