use bor_backfill_common::{
    Address, Bytes, H256,
    serde_utils,
    types::{BlockNumber, StoredLog},
};
use serde::{Deserialize, Serialize};

/// Log as returned by `eth_getLogs` and inside `eth_getTransactionReceipt`.
/// Location fields are absent for pending logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcLog {
    pub address: Address,
    pub topics: Vec<H256>,
    #[serde(with = "serde_utils::bytes")]
    pub data: Bytes,
    #[serde(default, with = "serde_utils::number::hex_str_opt")]
    pub block_number: Option<BlockNumber>,
    #[serde(default)]
    pub block_hash: Option<H256>,
    #[serde(default)]
    pub transaction_hash: Option<H256>,
    #[serde(default, with = "serde_utils::number::hex_str_opt")]
    pub transaction_index: Option<u64>,
    #[serde(default, with = "serde_utils::number::hex_str_opt")]
    pub log_index: Option<u64>,
    #[serde(default)]
    pub removed: bool,
}

impl From<RpcLog> for StoredLog {
    fn from(log: RpcLog) -> Self {
        StoredLog {
            address: log.address,
            topics: log.topics,
            data: log.data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcReceipt {
    pub transaction_hash: H256,
    pub block_hash: H256,
    #[serde(with = "serde_utils::number::hex_str")]
    pub block_number: BlockNumber,
    /// Missing on pre-Byzantium receipts, which carry a state root instead.
    #[serde(default, with = "serde_utils::number::hex_str_opt")]
    pub status: Option<u64>,
    #[serde(default, with = "serde_utils::number::hex_str_opt")]
    pub cumulative_gas_used: Option<u64>,
    pub logs: Vec<RpcLog>,
}
