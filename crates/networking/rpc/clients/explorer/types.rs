use bor_backfill_common::{Address, H256, serde_utils, types::BlockNumber};
use serde::{Deserialize, Deserializer, Serialize};

/// Envelope of the explorer's `account/txlist` endpoint. On success `result`
/// is a list; on failure it is a human readable string.
#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerResponse {
    pub status: String,
    pub message: String,
    pub result: ExplorerResult,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExplorerResult {
    Transactions(Vec<ExplorerTransaction>),
    Message(String),
}

/// One `txlist` entry. The explorer sends every field as a string, numbers in
/// decimal. Fields the backfill does not use are left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerTransaction {
    #[serde(with = "serde_utils::number::dec_str")]
    pub block_number: BlockNumber,
    pub hash: H256,
    pub block_hash: H256,
    #[serde(default, deserialize_with = "address_or_empty")]
    pub from: Option<Address>,
    #[serde(default, deserialize_with = "address_or_empty")]
    pub to: Option<Address>,
}

/// Contract creations carry an empty `to`.
fn address_or_empty<'de, D>(d: D) -> Result<Option<Address>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(d)?;
    match value.as_deref() {
        None | Some("") => Ok(None),
        Some(address) => serde_json::from_value(serde_json::Value::String(address.to_string()))
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
