use std::{path::PathBuf, sync::Arc, time::Duration};

use bor_backfill_common::{
    Address, H256,
    constants::{STATE_COMMITTED_TOPIC, STATE_RECEIVER_ADDRESS},
    types::{BlockRange, StoredReceipt},
    utils::{decode_prefixed_hex, encode_prefixed_hex},
};
use bor_backfill_rpc::{EthClient, ExplorerClient};
use bor_backfill_scanner::{
    ChainScanner, ExplorerSource, FailurePolicy, LogFilterSource, ReceiptFetcher, ScanConfig,
    StateSyncSource,
};
use bor_backfill_storage::{
    DeleteOutcome, InstructionStore, KeyCodec, KeyPrefixes, KvApplier,
    keys::decode_tx_lookup_value,
};
use clap::{Parser as ClapParser, Subcommand as ClapSubcommand, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{Level, info, warn};

use crate::utils::{parse_address, parse_hash, parse_prefix};

pub const VERSION_STRING: &str = env!("CARGO_PKG_VERSION");

#[allow(clippy::upper_case_acronyms)]
#[derive(ClapParser)]
#[command(
    name = "bor-backfill",
    author,
    version = VERSION_STRING,
    about = "Finds state-sync transactions missing from a Bor node and writes them into its database",
    long_about = None
)]
pub struct CLI {
    #[arg(
        long = "log.level",
        default_value_t = Level::INFO,
        value_name = "LOG_LEVEL",
        global = true
    )]
    pub log_level: Level,
    #[command(subcommand)]
    pub command: Subcommand,
}

/// Key layout of the node's storage. Only needs changing for node versions
/// with other prefixes. Plain text, or hex when `0x`-prefixed.
#[derive(ClapParser, Debug, Clone)]
pub struct KeyOptions {
    #[arg(
        long = "tx-lookup-prefix",
        env = "BOR_TX_LOOKUP_PREFIX",
        default_value = "matic-bor-tx-lookup-",
        value_name = "PREFIX",
        help_heading = "Storage layout options"
    )]
    pub tx_lookup_prefix: String,
    #[arg(
        long = "receipt-prefix",
        env = "BOR_RECEIPT_PREFIX",
        default_value = "matic-bor-receipt-",
        value_name = "PREFIX",
        help_heading = "Storage layout options"
    )]
    pub receipt_prefix: String,
}

impl KeyOptions {
    pub fn codec(&self) -> eyre::Result<KeyCodec> {
        Ok(KeyCodec::new(KeyPrefixes {
            tx_lookup: parse_prefix(&self.tx_lookup_prefix)?,
            receipt: parse_prefix(&self.receipt_prefix)?,
        }))
    }
}

#[derive(ClapParser, Debug, Clone)]
pub struct RpcOptions {
    #[arg(
        long = "rpc-timeout",
        default_value_t = 30,
        value_name = "SECONDS",
        help = "Timeout for every RPC and explorer request"
    )]
    pub rpc_timeout: u64,
}

impl RpcOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout)
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptErrorPolicy {
    /// Leave the transaction out and keep scanning
    Skip,
    /// Stop the scan
    Abort,
}

impl From<ReceiptErrorPolicy> for FailurePolicy {
    fn from(policy: ReceiptErrorPolicy) -> Self {
        match policy {
            ReceiptErrorPolicy::Skip => FailurePolicy::Skip,
            ReceiptErrorPolicy::Abort => FailurePolicy::Abort,
        }
    }
}

#[derive(ClapSubcommand)]
pub enum Subcommand {
    #[command(
        name = "find-all-state-sync-tx",
        about = "Scan a block range for state-sync transactions and write the records to restore"
    )]
    FindAllStateSyncTx {
        #[arg(long = "start-block", value_name = "NUMBER")]
        start_block: u64,
        #[arg(long = "end-block", value_name = "NUMBER", help = "First block not scanned")]
        end_block: u64,
        #[arg(long = "interval", default_value_t = 1000, value_name = "BLOCKS")]
        interval: u64,
        #[arg(long = "remote-rpc", value_name = "URL", help = "Source-of-truth RPC")]
        remote_rpc: String,
        #[arg(
            long = "polygon-scan-api",
            value_name = "URL",
            help = "Explorer API base URL with apikey (and chainid) set. Without it, transactions are found through eth_getLogs"
        )]
        polygon_scan_api: Option<String>,
        #[arg(
            long = "local-rpc",
            value_name = "URL",
            help = "RPC of the node being repaired. Transactions it already knows are not emitted"
        )]
        local_rpc: Option<String>,
        #[arg(long = "output-file", value_name = "FILE")]
        output_file: PathBuf,
        #[arg(
            long = "state-receiver",
            env = "BOR_STATE_RECEIVER",
            value_parser = parse_address,
            value_name = "ADDRESS",
            help = "State receiver contract [default: 0x0000000000000000000000000000000000001001]"
        )]
        state_receiver: Option<Address>,
        #[arg(
            long = "state-sync-topic",
            env = "BOR_STATE_SYNC_TOPIC",
            value_parser = parse_hash,
            value_name = "TOPIC",
            help = "StateCommitted event topic [default: 0x5a22725590b0a51c923940223f7458512164b1113359a735e86e7f27f44791ee]"
        )]
        state_sync_topic: Option<H256>,
        #[arg(long = "rate-limit-every", default_value_t = 5, value_name = "SUB_RANGES")]
        rate_limit_every: usize,
        #[arg(long = "rate-limit-pause-ms", default_value_t = 1000, value_name = "MILLIS")]
        rate_limit_pause_ms: u64,
        #[arg(long = "on-receipt-error", value_enum, default_value_t = ReceiptErrorPolicy::Skip)]
        on_receipt_error: ReceiptErrorPolicy,
        #[command(flatten)]
        keys: KeyOptions,
        #[command(flatten)]
        rpc: RpcOptions,
    },
    #[command(
        name = "write-missing-state-sync-tx",
        about = "Write the records of an instruction file into a stopped node's database"
    )]
    WriteMissingStateSyncTx {
        #[arg(long = "data-path", value_name = "DATADIR")]
        data_path: PathBuf,
        #[arg(long = "state-missing-transactions-file", value_name = "FILE")]
        state_missing_transactions_file: PathBuf,
    },
    #[command(name = "debug-delete-key", about = "Delete a key from the node's database")]
    DebugDeleteKey {
        #[arg(long = "data-path", value_name = "DATADIR")]
        data_path: PathBuf,
        #[arg(long = "key", value_name = "HEX")]
        key: String,
    },
    #[command(name = "debug-read-key", about = "Print the value stored under a key")]
    DebugReadKey {
        #[arg(long = "data-path", value_name = "DATADIR")]
        data_path: PathBuf,
        #[arg(long = "key", value_name = "HEX")]
        key: String,
        #[command(flatten)]
        keys: KeyOptions,
    },
    #[command(name = "debug-write-key", about = "Store a value under a key")]
    DebugWriteKey {
        #[arg(long = "data-path", value_name = "DATADIR")]
        data_path: PathBuf,
        #[arg(long = "key", value_name = "HEX")]
        key: String,
        #[arg(long = "value", value_name = "HEX")]
        value: String,
    },
    #[command(name = "debug-encode-bor-receipt-key", about = "Print the receipt key of a block")]
    DebugEncodeBorReceiptKey {
        #[arg(long = "number", value_name = "BLOCK_NUMBER")]
        number: u64,
        #[arg(long = "hash", value_name = "BLOCK_HASH")]
        hash: String,
        #[command(flatten)]
        keys: KeyOptions,
    },
    #[command(
        name = "debug-encode-bor-tx-lookup-entry",
        about = "Print the lookup key of a transaction"
    )]
    DebugEncodeBorTxLookupEntry {
        #[arg(long = "hash", value_name = "TX_HASH")]
        hash: String,
        #[command(flatten)]
        keys: KeyOptions,
    },
    #[command(
        name = "debug-encode-bor-receipt-value",
        about = "Fetch a transaction's receipt and print it in storage encoding"
    )]
    DebugEncodeBorReceiptValue {
        #[arg(long = "hash", value_name = "TX_HASH")]
        hash: String,
        #[arg(long = "remote-rpc", value_name = "URL")]
        remote_rpc: String,
        #[command(flatten)]
        rpc: RpcOptions,
    },
}

impl Subcommand {
    pub async fn run(self) -> eyre::Result<()> {
        match self {
            Subcommand::FindAllStateSyncTx {
                start_block,
                end_block,
                interval,
                remote_rpc,
                polygon_scan_api,
                local_rpc,
                output_file,
                state_receiver,
                state_sync_topic,
                rate_limit_every,
                rate_limit_pause_ms,
                on_receipt_error,
                keys,
                rpc,
            } => {
                if start_block > end_block {
                    eyre::bail!("--start-block ({start_block}) is past --end-block ({end_block})");
                }
                let timeout = rpc.timeout();
                let remote = EthClient::new_with_timeout(&remote_rpc, timeout)?;

                let source: Arc<dyn StateSyncSource> = match polygon_scan_api {
                    Some(api) => Arc::new(ExplorerSource::new(ExplorerClient::new(&api, timeout)?)),
                    None => Arc::new(LogFilterSource::new(
                        remote.clone(),
                        state_receiver.unwrap_or(STATE_RECEIVER_ADDRESS),
                        state_sync_topic.unwrap_or(STATE_COMMITTED_TOPIC),
                    )),
                };
                let config = ScanConfig {
                    interval,
                    pause_every: rate_limit_every,
                    pause: Duration::from_millis(rate_limit_pause_ms),
                    on_receipt_error: on_receipt_error.into(),
                };
                let cancel_token = CancellationToken::new();
                let mut scanner = ChainScanner::new(
                    source,
                    ReceiptFetcher::new(Arc::new(remote)),
                    keys.codec()?,
                    config,
                )
                .with_cancel_token(cancel_token.clone());
                if let Some(local_rpc) = local_rpc {
                    let local = EthClient::new_with_timeout(&local_rpc, timeout)?;
                    scanner = scanner.with_local_lookup(Arc::new(local));
                }

                let ctrl_c = tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        warn!("Interrupted, stopping scan");
                        cancel_token.cancel();
                    }
                });
                let result = scanner.scan(BlockRange::new(start_block, end_block)).await;
                ctrl_c.abort();
                let result = result?;

                for range in &result.skipped_ranges {
                    warn!(block_range = %range, "Sub-range was not scanned, re-run it to complete the backfill");
                }
                InstructionStore::new(output_file).write(&result.instructions)?;
                info!(
                    discovered = result.discovered,
                    already_present = result.already_present,
                    emitted = result.emitted(),
                    "Done"
                );
            }
            Subcommand::WriteMissingStateSyncTx {
                data_path,
                state_missing_transactions_file,
            } => {
                let instructions = InstructionStore::new(state_missing_transactions_file).read()?;
                let summary = KvApplier::new(data_path).apply(&instructions)?;
                info!(written = summary.written, "Missing state-sync records written");
            }
            Subcommand::DebugDeleteKey { data_path, key } => {
                let raw_key = decode_prefixed_hex(&key)?;
                match KvApplier::new(data_path).delete(&raw_key)? {
                    DeleteOutcome::Deleted => println!("Deleted key {key}"),
                    DeleteOutcome::NotFound => println!("Key {key} not found in database"),
                }
            }
            Subcommand::DebugReadKey {
                data_path,
                key,
                keys,
            } => {
                let raw_key = decode_prefixed_hex(&key)?;
                match KvApplier::new(data_path).get(&raw_key)? {
                    Some(value) => {
                        describe_record(&keys.codec()?, &raw_key, &value);
                        println!("{}", encode_prefixed_hex(&value));
                    }
                    None => println!("Key {key} not found in database"),
                }
            }
            Subcommand::DebugWriteKey {
                data_path,
                key,
                value,
            } => {
                let raw_key = decode_prefixed_hex(&key)?;
                let raw_value = decode_prefixed_hex(&value)?;
                KvApplier::new(data_path).put(&raw_key, &raw_value)?;
                println!("Wrote key {key}");
            }
            Subcommand::DebugEncodeBorReceiptKey { number, hash, keys } => {
                println!("{}", keys.codec()?.encode_receipt_key(number, &hash)?);
            }
            Subcommand::DebugEncodeBorTxLookupEntry { hash, keys } => {
                println!("{}", keys.codec()?.encode_tx_lookup_key(&hash)?);
            }
            Subcommand::DebugEncodeBorReceiptValue {
                hash,
                remote_rpc,
                rpc,
            } => {
                let tx_hash = parse_hash(&hash)?;
                let client = EthClient::new_with_timeout(&remote_rpc, rpc.timeout())?;
                let receipt = ReceiptFetcher::new(Arc::new(client)).fetch(tx_hash).await?;
                info!(logs = receipt.logs.len(), "Fetched receipt");
                println!("{}", encode_prefixed_hex(receipt.encode_to_vec()));
            }
        }
        Ok(())
    }
}

/// Logs what a stored record is, when its key tells.
fn describe_record(codec: &KeyCodec, key: &[u8], value: &[u8]) {
    if let Some((block_number, block_hash)) = codec.decode_receipt_key(key) {
        match StoredReceipt::decode_from_slice(value) {
            Ok(receipt) => info!(
                block_number,
                ?block_hash,
                status = ?receipt.status,
                logs = receipt.logs.len(),
                "Receipt record"
            ),
            Err(error) => warn!(block_number, %error, "Receipt key holds an undecodable value"),
        }
    } else if let Some(tx_hash) = codec.decode_tx_lookup_key(key) {
        info!(
            ?tx_hash,
            block_number = ?decode_tx_lookup_value(value),
            "Transaction lookup record"
        );
    }
}
