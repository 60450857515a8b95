use bor_backfill_common::{Address, H256, serde_utils, types::BlockNumber};
use serde::{Deserialize, Serialize};

/// Subset of `eth_getTransactionByHash` needed to tell whether a node knows a
/// transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransaction {
    pub hash: H256,
    #[serde(default)]
    pub block_hash: Option<H256>,
    #[serde(default, with = "serde_utils::number::hex_str_opt")]
    pub block_number: Option<BlockNumber>,
    pub from: Address,
    #[serde(default)]
    pub to: Option<Address>,
}
