//! Key layout of the node's state-sync index.
//!
//! Two records are kept per state-sync transaction:
//! - lookup entry: `tx_lookup_prefix || tx_hash (32)` -> block number (8 BE)
//! - receipt: `receipt_prefix || block_number (8 BE) || block_hash (32)` -> stored receipt
//!
//! Block numbers are big-endian so keys sort by height, matching the node.

use bor_backfill_common::{
    H256,
    constants::{BOR_RECEIPT_PREFIX, BOR_TX_LOOKUP_PREFIX},
    errors::CodecError,
    types::{BlockHash, BlockNumber, ChainTransaction, WriteInstruction},
    utils::{encode_prefixed_hex, parse_hash},
};

const BLOCK_NUMBER_LEN: usize = 8;
const HASH_LEN: usize = 32;

/// Key prefixes used by the node's storage layer. They change between node
/// versions, so they are configurable rather than baked into the codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPrefixes {
    pub tx_lookup: Vec<u8>,
    pub receipt: Vec<u8>,
}

impl Default for KeyPrefixes {
    fn default() -> Self {
        Self {
            tx_lookup: BOR_TX_LOOKUP_PREFIX.to_vec(),
            receipt: BOR_RECEIPT_PREFIX.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyCodec {
    prefixes: KeyPrefixes,
}

impl KeyCodec {
    pub fn new(prefixes: KeyPrefixes) -> Self {
        Self { prefixes }
    }

    pub fn tx_lookup_key(&self, tx_hash: &H256) -> Vec<u8> {
        let mut key = Vec::with_capacity(self.prefixes.tx_lookup.len() + HASH_LEN);
        key.extend_from_slice(&self.prefixes.tx_lookup);
        key.extend_from_slice(tx_hash.as_bytes());
        key
    }

    pub fn receipt_key(&self, block_number: BlockNumber, block_hash: &BlockHash) -> Vec<u8> {
        let mut key =
            Vec::with_capacity(self.prefixes.receipt.len() + BLOCK_NUMBER_LEN + HASH_LEN);
        key.extend_from_slice(&self.prefixes.receipt);
        key.extend_from_slice(&block_number.to_be_bytes());
        key.extend_from_slice(block_hash.as_bytes());
        key
    }

    /// Hex-in, hex-out variant of [`Self::tx_lookup_key`] for operator input.
    pub fn encode_tx_lookup_key(&self, tx_hash: &str) -> Result<String, CodecError> {
        let tx_hash = parse_hash(tx_hash)?;
        Ok(encode_prefixed_hex(self.tx_lookup_key(&tx_hash)))
    }

    /// Hex-in, hex-out variant of [`Self::receipt_key`] for operator input.
    pub fn encode_receipt_key(
        &self,
        block_number: BlockNumber,
        block_hash: &str,
    ) -> Result<String, CodecError> {
        let block_hash = parse_hash(block_hash)?;
        Ok(encode_prefixed_hex(
            self.receipt_key(block_number, &block_hash),
        ))
    }

    pub fn decode_tx_lookup_key(&self, key: &[u8]) -> Option<H256> {
        let hash = key.strip_prefix(self.prefixes.tx_lookup.as_slice())?;
        (hash.len() == HASH_LEN).then(|| H256::from_slice(hash))
    }

    /// Splits a receipt key into block number and block hash. `None` if the
    /// key has another prefix or the wrong length.
    pub fn decode_receipt_key(&self, key: &[u8]) -> Option<(BlockNumber, BlockHash)> {
        let rest = key.strip_prefix(self.prefixes.receipt.as_slice())?;
        if rest.len() != BLOCK_NUMBER_LEN + HASH_LEN {
            return None;
        }
        let (number, hash) = rest.split_at(BLOCK_NUMBER_LEN);
        let number = BlockNumber::from_be_bytes(number.try_into().ok()?);
        Some((number, BlockHash::from_slice(hash)))
    }

    /// Lookup entry for `tx`: its key and the block number as value.
    pub fn tx_lookup_instruction(&self, tx: &ChainTransaction) -> WriteInstruction {
        WriteInstruction::new(
            self.tx_lookup_key(&tx.tx_hash),
            tx_lookup_value(tx.block_number),
        )
    }

    /// Receipt record for `tx` given its already encoded stored receipt.
    pub fn receipt_instruction(&self, tx: &ChainTransaction, receipt: &[u8]) -> WriteInstruction {
        WriteInstruction::new(self.receipt_key(tx.block_number, &tx.block_hash), receipt)
    }
}

pub fn tx_lookup_value(block_number: BlockNumber) -> [u8; BLOCK_NUMBER_LEN] {
    block_number.to_be_bytes()
}

/// Reads a lookup entry value. Besides the 8-byte form, shorter big-endian
/// values (minimal big integer encoding) are accepted, as older nodes wrote them.
pub fn decode_tx_lookup_value(value: &[u8]) -> Option<BlockNumber> {
    if value.len() > BLOCK_NUMBER_LEN {
        return None;
    }
    let mut padded = [0u8; BLOCK_NUMBER_LEN];
    padded[BLOCK_NUMBER_LEN - value.len()..].copy_from_slice(value);
    Some(BlockNumber::from_be_bytes(padded))
}
