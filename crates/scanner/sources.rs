use std::collections::HashSet;

use async_trait::async_trait;
use bor_backfill_common::{
    Address, H256,
    types::{BlockRange, ChainTransaction},
};
use bor_backfill_rpc::{EthClient, ExplorerClient, types::receipt::RpcLog};
use tracing::warn;

use crate::error::SourceError;

/// A place state-sync transactions can be listed from, one block range at a
/// time.
#[async_trait]
pub trait StateSyncSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn state_sync_transactions(
        &self,
        range: &BlockRange,
    ) -> Result<Vec<ChainTransaction>, SourceError>;
}

/// Finds state-sync transactions through the `StateCommitted` events of the
/// state receiver contract. Needs nothing but an RPC endpoint.
pub struct LogFilterSource {
    client: EthClient,
    state_receiver: Address,
    topic: H256,
}

impl LogFilterSource {
    pub fn new(client: EthClient, state_receiver: Address, topic: H256) -> Self {
        Self {
            client,
            state_receiver,
            topic,
        }
    }
}

#[async_trait]
impl StateSyncSource for LogFilterSource {
    fn name(&self) -> &'static str {
        "log-filter"
    }

    async fn state_sync_transactions(
        &self,
        range: &BlockRange,
    ) -> Result<Vec<ChainTransaction>, SourceError> {
        let Some(last) = range.last() else {
            return Ok(Vec::new());
        };
        let logs = self
            .client
            .get_logs(range.start, last, self.state_receiver, vec![self.topic])
            .await?;
        Ok(transactions_from_logs(logs))
    }
}

/// One entry per transaction, in log order. A state-sync transaction emits a
/// log per committed state, so repeated hashes are collapsed. Removed logs and
/// logs without a location are dropped.
pub fn transactions_from_logs(logs: Vec<RpcLog>) -> Vec<ChainTransaction> {
    let mut seen = HashSet::new();
    let mut transactions = Vec::new();
    for log in logs {
        if log.removed {
            continue;
        }
        let (Some(block_number), Some(block_hash), Some(tx_hash)) =
            (log.block_number, log.block_hash, log.transaction_hash)
        else {
            warn!(?log, "Ignoring log without block or transaction");
            continue;
        };
        if seen.insert(tx_hash) {
            transactions.push(ChainTransaction {
                block_number,
                block_hash,
                tx_hash,
            });
        }
    }
    transactions
}

/// Lists state-sync transactions through a block explorer's transaction index.
pub struct ExplorerSource {
    client: ExplorerClient,
}

impl ExplorerSource {
    pub fn new(client: ExplorerClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StateSyncSource for ExplorerSource {
    fn name(&self) -> &'static str {
        "explorer"
    }

    async fn state_sync_transactions(
        &self,
        range: &BlockRange,
    ) -> Result<Vec<ChainTransaction>, SourceError> {
        Ok(self.client.get_state_sync_transactions(range).await?)
    }
}
