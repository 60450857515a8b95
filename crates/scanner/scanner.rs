use std::{sync::Arc, time::Duration};

use bor_backfill_common::{
    H256,
    types::{BlockRange, ChainTransaction, WriteInstruction},
};
use bor_backfill_storage::KeyCodec;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    error::ScanError, presence::TransactionLookup, receipt_fetcher::ReceiptFetcher,
    sources::StateSyncSource,
};

/// What to do when a discovered transaction's receipt cannot be rebuilt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log it and leave the transaction out of the instructions.
    #[default]
    Skip,
    /// Fail the whole scan.
    Abort,
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Blocks per source query.
    pub interval: u64,
    /// Pause after every `pause_every`-th sub-range, counting from the first.
    /// Zero disables pacing.
    pub pause_every: usize,
    pub pause: Duration,
    pub on_receipt_error: FailurePolicy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interval: 1000,
            pause_every: 5,
            pause: Duration::from_secs(1),
            on_receipt_error: FailurePolicy::Skip,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Lookup and receipt instructions, in that order for each transaction.
    pub instructions: Vec<WriteInstruction>,
    /// Transactions the source returned.
    pub discovered: usize,
    /// Transactions the local node already had, left out of `instructions`.
    pub already_present: usize,
    /// Sub-ranges whose source query failed.
    pub skipped_ranges: Vec<BlockRange>,
    /// Transactions whose receipt could not be rebuilt.
    pub skipped_transactions: Vec<H256>,
}

impl ScanResult {
    pub fn emitted(&self) -> usize {
        self.instructions.len() / 2
    }
}

/// Walks a block range in fixed size steps and turns every state-sync
/// transaction found into the lookup and receipt records the node is missing.
pub struct ChainScanner {
    source: Arc<dyn StateSyncSource>,
    fetcher: ReceiptFetcher,
    codec: KeyCodec,
    local: Option<Arc<dyn TransactionLookup>>,
    config: ScanConfig,
    cancel_token: CancellationToken,
}

impl ChainScanner {
    pub fn new(
        source: Arc<dyn StateSyncSource>,
        fetcher: ReceiptFetcher,
        codec: KeyCodec,
        config: ScanConfig,
    ) -> Self {
        Self {
            source,
            fetcher,
            codec,
            local: None,
            config,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Only emit transactions `local` does not know about.
    pub fn with_local_lookup(mut self, local: Arc<dyn TransactionLookup>) -> Self {
        self.local = Some(local);
        self
    }

    pub fn with_cancel_token(mut self, cancel_token: CancellationToken) -> Self {
        self.cancel_token = cancel_token;
        self
    }

    pub async fn scan(&self, range: BlockRange) -> Result<ScanResult, ScanError> {
        if self.config.interval == 0 {
            return Err(ScanError::InvalidInterval);
        }
        info!(
            block_range = %range,
            interval = self.config.interval,
            source = self.source.name(),
            "Scanning for state-sync transactions"
        );

        let mut result = ScanResult::default();
        for (iteration, chunk) in range.chunks(self.config.interval).enumerate() {
            self.check_cancelled()?;

            match self.source.state_sync_transactions(&chunk).await {
                Ok(transactions) => {
                    debug!(block_range = %chunk, found = transactions.len(), "Queried sub-range");
                    for tx in transactions {
                        self.process(tx, &mut result).await?;
                    }
                }
                Err(error) => {
                    warn!(block_range = %chunk, %error, "Skipping sub-range");
                    result.skipped_ranges.push(chunk);
                }
            }

            if self.should_pause(iteration) {
                tokio::select! {
                    _ = sleep(self.config.pause) => {}
                    _ = self.cancel_token.cancelled() => return Err(ScanError::Cancelled),
                }
            }
        }

        info!(
            discovered = result.discovered,
            already_present = result.already_present,
            emitted = result.emitted(),
            skipped_ranges = result.skipped_ranges.len(),
            skipped_transactions = result.skipped_transactions.len(),
            "Scan finished"
        );
        Ok(result)
    }

    async fn process(&self, tx: ChainTransaction, result: &mut ScanResult) -> Result<(), ScanError> {
        self.check_cancelled()?;
        result.discovered += 1;

        if let Some(local) = &self.local {
            match local.has_transaction(tx.tx_hash).await {
                Ok(true) => {
                    debug!(tx_hash = ?tx.tx_hash, "Already known locally");
                    result.already_present += 1;
                    return Ok(());
                }
                Ok(false) => {}
                Err(error) => {
                    warn!(tx_hash = ?tx.tx_hash, %error, "Local lookup failed, treating as missing");
                }
            }
        }

        match self.fetcher.fetch_encoded(tx.tx_hash).await {
            Ok(receipt) => {
                result.instructions.push(self.codec.tx_lookup_instruction(&tx));
                result
                    .instructions
                    .push(self.codec.receipt_instruction(&tx, &receipt));
                Ok(())
            }
            Err(source) => match self.config.on_receipt_error {
                FailurePolicy::Skip => {
                    warn!(tx_hash = ?tx.tx_hash, error = %source, "Skipping transaction");
                    result.skipped_transactions.push(tx.tx_hash);
                    Ok(())
                }
                FailurePolicy::Abort => Err(ScanError::Receipt {
                    tx_hash: tx.tx_hash,
                    source,
                }),
            },
        }
    }

    fn should_pause(&self, iteration: usize) -> bool {
        self.config.pause_every > 0
            && !self.config.pause.is_zero()
            && iteration % self.config.pause_every == 0
    }

    fn check_cancelled(&self) -> Result<(), ScanError> {
        if self.cancel_token.is_cancelled() {
            return Err(ScanError::Cancelled);
        }
        Ok(())
    }
}
