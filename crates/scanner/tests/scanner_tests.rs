#![allow(clippy::unwrap_used)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use bor_backfill_common::{
    H256,
    types::{BlockHash, BlockRange, ChainTransaction, ReceiptStatus, StoredReceipt},
};
use bor_backfill_rpc::{
    clients::{EthClientError, eth::errors::RpcRequestError},
    types::receipt::RpcReceipt,
};
use bor_backfill_scanner::{
    ChainScanner, FailurePolicy, ReceiptFetcher, ReceiptSource, ScanConfig, ScanError,
    SourceError, StateSyncSource, TransactionLookup,
};
use bor_backfill_storage::KeyCodec;
use tokio_util::sync::CancellationToken;

fn tx(byte: u8, block: u64) -> ChainTransaction {
    ChainTransaction {
        block_number: block,
        block_hash: BlockHash::from_low_u64_be(block),
        tx_hash: H256::repeat_byte(byte),
    }
}

fn rpc_error() -> EthClientError {
    RpcRequestError::RPCError {
        method: "test".to_string(),
        code: -32000,
        message: "unavailable".to_string(),
        data: None,
    }
    .into()
}

/// Serves a fixed set of transactions and records every range it was asked for.
#[derive(Default)]
struct MockSource {
    transactions: Vec<ChainTransaction>,
    failing_starts: Vec<u64>,
    queried: Mutex<Vec<BlockRange>>,
}

#[async_trait]
impl StateSyncSource for MockSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn state_sync_transactions(
        &self,
        range: &BlockRange,
    ) -> Result<Vec<ChainTransaction>, SourceError> {
        self.queried.lock().unwrap().push(*range);
        if self.failing_starts.contains(&range.start) {
            return Err(rpc_error().into());
        }
        Ok(self
            .transactions
            .iter()
            .filter(|tx| range.contains(tx.block_number))
            .copied()
            .collect())
    }
}

/// Returns a failed receipt with one log for every hash except `missing`.
#[derive(Default)]
struct MockReceipts {
    missing: Vec<H256>,
}

#[async_trait]
impl ReceiptSource for MockReceipts {
    async fn transaction_receipt(
        &self,
        tx_hash: H256,
    ) -> Result<Option<RpcReceipt>, EthClientError> {
        if self.missing.contains(&tx_hash) {
            return Ok(None);
        }
        Ok(Some(RpcReceipt {
            transaction_hash: tx_hash,
            block_hash: H256::zero(),
            block_number: 0,
            status: Some(0),
            cumulative_gas_used: None,
            logs: vec![],
        }))
    }
}

struct MockLocal(HashMap<H256, Result<bool, ()>>);

#[async_trait]
impl TransactionLookup for MockLocal {
    async fn has_transaction(&self, tx_hash: H256) -> Result<bool, EthClientError> {
        match self.0.get(&tx_hash) {
            Some(Ok(known)) => Ok(*known),
            Some(Err(())) => Err(rpc_error()),
            None => Ok(false),
        }
    }
}

fn config(interval: u64) -> ScanConfig {
    ScanConfig {
        interval,
        pause_every: 5,
        pause: Duration::ZERO,
        on_receipt_error: FailurePolicy::Skip,
    }
}

fn scanner(source: Arc<MockSource>, receipts: MockReceipts, config: ScanConfig) -> ChainScanner {
    ChainScanner::new(
        source,
        ReceiptFetcher::new(Arc::new(receipts)),
        KeyCodec::default(),
        config,
    )
}

#[tokio::test]
async fn queries_clamped_sub_ranges() {
    let source = Arc::new(MockSource::default());
    scanner(source.clone(), MockReceipts::default(), config(30))
        .scan(BlockRange::new(0, 100))
        .await
        .unwrap();

    assert_eq!(
        *source.queried.lock().unwrap(),
        vec![
            BlockRange::new(0, 30),
            BlockRange::new(30, 60),
            BlockRange::new(60, 90),
            BlockRange::new(90, 100),
        ]
    );
}

#[tokio::test]
async fn emits_lookup_then_receipt_per_transaction() {
    let found = vec![tx(1, 5), tx(2, 35), tx(3, 99)];
    let source = Arc::new(MockSource {
        transactions: found.clone(),
        ..Default::default()
    });
    let result = scanner(source, MockReceipts::default(), config(30))
        .scan(BlockRange::new(0, 100))
        .await
        .unwrap();

    assert_eq!(result.discovered, 3);
    assert_eq!(result.instructions.len(), 2 * found.len());

    let codec = KeyCodec::default();
    for (pair, tx) in result.instructions.chunks(2).zip(&found) {
        let (lookup_key, lookup_value) = pair[0].decode().unwrap();
        assert_eq!(codec.decode_tx_lookup_key(&lookup_key), Some(tx.tx_hash));
        assert_eq!(lookup_value, tx.block_number.to_be_bytes().to_vec());

        let (receipt_key, receipt_value) = pair[1].decode().unwrap();
        assert_eq!(
            codec.decode_receipt_key(&receipt_key),
            Some((tx.block_number, tx.block_hash))
        );
        // the mock reports a failed receipt
        let receipt = StoredReceipt::decode_from_slice(&receipt_value).unwrap();
        assert_eq!(receipt.status, ReceiptStatus::Successful);
    }
}

#[tokio::test]
async fn failed_sub_range_is_skipped() {
    let source = Arc::new(MockSource {
        transactions: vec![tx(1, 5), tx(2, 35), tx(3, 65)],
        failing_starts: vec![30],
        ..Default::default()
    });
    let result = scanner(source.clone(), MockReceipts::default(), config(30))
        .scan(BlockRange::new(0, 100))
        .await
        .unwrap();

    assert_eq!(result.skipped_ranges, vec![BlockRange::new(30, 60)]);
    assert_eq!(result.discovered, 2);
    assert_eq!(result.instructions.len(), 4);
    assert_eq!(source.queried.lock().unwrap().len(), 4);
}

#[tokio::test]
async fn receipt_failure_skips_transaction_by_default() {
    let source = Arc::new(MockSource {
        transactions: vec![tx(1, 5), tx(2, 6)],
        ..Default::default()
    });
    let receipts = MockReceipts {
        missing: vec![H256::repeat_byte(1)],
    };
    let result = scanner(source, receipts, config(10))
        .scan(BlockRange::new(0, 10))
        .await
        .unwrap();

    assert_eq!(result.skipped_transactions, vec![H256::repeat_byte(1)]);
    assert_eq!(result.emitted(), 1);
    assert_eq!(result.instructions.len(), 2);
}

#[tokio::test]
async fn receipt_failure_can_abort() {
    let source = Arc::new(MockSource {
        transactions: vec![tx(1, 5)],
        ..Default::default()
    });
    let receipts = MockReceipts {
        missing: vec![H256::repeat_byte(1)],
    };
    let mut config = config(10);
    config.on_receipt_error = FailurePolicy::Abort;
    let result = scanner(source, receipts, config)
        .scan(BlockRange::new(0, 10))
        .await;

    assert!(matches!(
        result,
        Err(ScanError::Receipt { tx_hash, .. }) if tx_hash == H256::repeat_byte(1)
    ));
}

#[tokio::test]
async fn known_transactions_are_left_out() {
    let source = Arc::new(MockSource {
        transactions: vec![tx(1, 1), tx(2, 2), tx(3, 3)],
        ..Default::default()
    });
    let local = MockLocal(HashMap::from([
        (H256::repeat_byte(1), Ok(true)),
        (H256::repeat_byte(2), Err(())),
    ]));
    let result = scanner(source, MockReceipts::default(), config(10))
        .with_local_lookup(Arc::new(local))
        .scan(BlockRange::new(0, 10))
        .await
        .unwrap();

    assert_eq!(result.discovered, 3);
    assert_eq!(result.already_present, 1);
    // a failed local lookup counts as missing
    assert_eq!(result.emitted(), 2);
}

#[tokio::test]
async fn zero_interval_is_rejected() {
    let source = Arc::new(MockSource::default());
    let result = scanner(source, MockReceipts::default(), config(0))
        .scan(BlockRange::new(0, 10))
        .await;
    assert!(matches!(result, Err(ScanError::InvalidInterval)));
}

#[tokio::test]
async fn empty_range_queries_nothing() {
    let source = Arc::new(MockSource::default());
    let result = scanner(source.clone(), MockReceipts::default(), config(10))
        .scan(BlockRange::new(50, 50))
        .await
        .unwrap();
    assert!(result.instructions.is_empty());
    assert!(source.queried.lock().unwrap().is_empty());
}

#[tokio::test]
async fn cancelled_scan_returns_no_result() {
    let source = Arc::new(MockSource {
        transactions: vec![tx(1, 1)],
        ..Default::default()
    });
    let token = CancellationToken::new();
    token.cancel();
    let result = scanner(source.clone(), MockReceipts::default(), config(10))
        .with_cancel_token(token)
        .scan(BlockRange::new(0, 100))
        .await;

    assert!(matches!(result, Err(ScanError::Cancelled)));
    assert!(source.queried.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn pauses_every_fifth_sub_range() {
    let source = Arc::new(MockSource::default());
    let mut config = config(10);
    config.pause = Duration::from_secs(1);

    let started = tokio::time::Instant::now();
    // 11 sub-ranges: pauses after the 1st, 6th and 11th
    scanner(source, MockReceipts::default(), config)
        .scan(BlockRange::new(0, 110))
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_secs(3));
    assert!(elapsed < Duration::from_secs(4));
}
