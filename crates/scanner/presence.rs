use async_trait::async_trait;
use bor_backfill_common::H256;
use bor_backfill_rpc::{EthClient, clients::EthClientError};

/// Answers whether a node already has a transaction indexed. Used against the
/// local node to emit only what it is missing.
#[async_trait]
pub trait TransactionLookup: Send + Sync {
    async fn has_transaction(&self, tx_hash: H256) -> Result<bool, EthClientError>;
}

#[async_trait]
impl TransactionLookup for EthClient {
    async fn has_transaction(&self, tx_hash: H256) -> Result<bool, EthClientError> {
        Ok(self.get_transaction_by_hash(tx_hash).await?.is_some())
    }
}
