use std::sync::Arc;

use async_trait::async_trait;
use bor_backfill_common::{
    H256,
    types::{StoredLog, StoredReceipt},
};
use bor_backfill_rpc::{EthClient, clients::EthClientError, types::receipt::RpcReceipt};
use tracing::debug;

use crate::error::ReceiptFetchError;

/// Where receipts are fetched from. Implemented by [`EthClient`].
#[async_trait]
pub trait ReceiptSource: Send + Sync {
    async fn transaction_receipt(&self, tx_hash: H256)
    -> Result<Option<RpcReceipt>, EthClientError>;
}

#[async_trait]
impl ReceiptSource for EthClient {
    async fn transaction_receipt(
        &self,
        tx_hash: H256,
    ) -> Result<Option<RpcReceipt>, EthClientError> {
        self.get_transaction_receipt(tx_hash).await
    }
}

/// Rebuilds the receipt record the node stores for a state-sync transaction.
///
/// Only the logs are taken from the remote receipt. Status is always
/// `Successful` and cumulative gas zero, which is how the node defines
/// state-sync transactions, whatever the remote endpoint reports.
#[derive(Clone)]
pub struct ReceiptFetcher {
    source: Arc<dyn ReceiptSource>,
}

impl ReceiptFetcher {
    pub fn new(source: Arc<dyn ReceiptSource>) -> Self {
        Self { source }
    }

    pub async fn fetch(&self, tx_hash: H256) -> Result<StoredReceipt, ReceiptFetchError> {
        let receipt = self
            .source
            .transaction_receipt(tx_hash)
            .await?
            .ok_or(ReceiptFetchError::NotFound(tx_hash))?;

        if receipt.status != Some(1) {
            debug!(
                tx_hash = %format!("{tx_hash:#x}"),
                remote_status = ?receipt.status,
                "Storing state-sync receipt as successful"
            );
        }

        Ok(StoredReceipt::successful(
            receipt.logs.into_iter().map(StoredLog::from).collect(),
        ))
    }

    /// Encoded receipt value, ready to be written under the receipt key.
    pub async fn fetch_encoded(&self, tx_hash: H256) -> Result<Vec<u8>, ReceiptFetchError> {
        Ok(self.fetch(tx_hash).await?.encode_to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bor_backfill_common::{
        Address, Bytes,
        types::ReceiptStatus,
    };
    use bor_backfill_rpc::{
        clients::eth::errors::RpcRequestError, types::receipt::RpcLog,
    };

    struct FixedReceipt(Option<u64>);

    #[async_trait]
    impl ReceiptSource for FixedReceipt {
        async fn transaction_receipt(
            &self,
            tx_hash: H256,
        ) -> Result<Option<RpcReceipt>, EthClientError> {
            if tx_hash == H256::zero() {
                return Ok(None);
            }
            if tx_hash == H256::repeat_byte(0xee) {
                return Err(RpcRequestError::RPCError {
                    method: "eth_getTransactionReceipt".to_string(),
                    code: -32000,
                    message: "boom".to_string(),
                    data: None,
                }
                .into());
            }
            Ok(Some(RpcReceipt {
                transaction_hash: tx_hash,
                block_hash: H256::repeat_byte(2),
                block_number: 1,
                status: self.0,
                cumulative_gas_used: Some(21_000),
                logs: vec![RpcLog {
                    address: Address::from_low_u64_be(0x1001),
                    topics: vec![H256::repeat_byte(0x5a)],
                    data: Bytes::from_static(b"\x01"),
                    block_number: Some(1),
                    block_hash: Some(H256::repeat_byte(2)),
                    transaction_hash: Some(tx_hash),
                    transaction_index: Some(0),
                    log_index: Some(0),
                    removed: false,
                }],
            }))
        }
    }

    #[tokio::test]
    async fn status_is_forced_to_successful() {
        for remote_status in [Some(0), Some(1), None] {
            let fetcher = ReceiptFetcher::new(Arc::new(FixedReceipt(remote_status)));
            let encoded = fetcher.fetch_encoded(H256::repeat_byte(1)).await.unwrap();
            let decoded = StoredReceipt::decode_from_slice(&encoded).unwrap();
            assert_eq!(decoded.status, ReceiptStatus::Successful);
            assert_eq!(decoded.cumulative_gas_used, 0);
            assert_eq!(decoded.logs.len(), 1);
            assert_eq!(decoded.logs[0].address, Address::from_low_u64_be(0x1001));
        }
    }

    #[tokio::test]
    async fn missing_receipt_is_reported() {
        let fetcher = ReceiptFetcher::new(Arc::new(FixedReceipt(Some(1))));
        assert!(matches!(
            fetcher.fetch(H256::zero()).await,
            Err(ReceiptFetchError::NotFound(hash)) if hash == H256::zero()
        ));
    }

    #[tokio::test]
    async fn rpc_failure_is_reported() {
        let fetcher = ReceiptFetcher::new(Arc::new(FixedReceipt(Some(1))));
        assert!(matches!(
            fetcher.fetch(H256::repeat_byte(0xee)).await,
            Err(ReceiptFetchError::Rpc(_))
        ));
    }
}
