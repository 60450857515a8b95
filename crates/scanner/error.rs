use bor_backfill_common::H256;
use bor_backfill_rpc::clients::{EthClientError, ExplorerError};

#[derive(Debug, thiserror::Error)]
pub enum ReceiptFetchError {
    #[error("RPC error: {0}")]
    Rpc(#[from] EthClientError),
    #[error("receipt for transaction {0:#x} not found")]
    NotFound(H256),
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("RPC error: {0}")]
    Rpc(#[from] EthClientError),
    #[error("explorer error: {0}")]
    Explorer(#[from] ExplorerError),
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("scan interval must be greater than zero")]
    InvalidInterval,
    #[error("scan cancelled")]
    Cancelled,
    #[error("failed to build receipt for transaction {tx_hash:#x}: {source}")]
    Receipt {
        tx_hash: H256,
        source: ReceiptFetchError,
    },
}
