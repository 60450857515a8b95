//! Client for an Etherscan-style block explorer (Polygonscan).
//!
//! State-sync transactions show up in the explorer as transactions sent from
//! and to the zero address, so they can be listed per block range with the
//! `account/txlist` endpoint.

use std::time::Duration;

use bor_backfill_common::{
    constants::ZERO_ADDRESS,
    types::{BlockRange, ChainTransaction},
};
use reqwest::Client;
use tracing::{trace, warn};
use url::Url;

use errors::ExplorerError;
use types::{ExplorerResponse, ExplorerResult, ExplorerTransaction};

pub mod errors;
pub mod types;

/// The explorer never returns more than this many entries for one query.
pub const EXPLORER_RESULT_CAP: usize = 10_000;

const NO_TRANSACTIONS_FOUND: &str = "No transactions found";

#[derive(Debug, Clone)]
pub struct ExplorerClient {
    client: Client,
    /// API base including credentials, e.g.
    /// `https://api.polygonscan.com/api?apikey=...`.
    pub base_url: Url,
}

impl ExplorerClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ExplorerError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ExplorerError::ParseUrlError(format!("{base_url}: {e}")))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn txlist_url(&self, range: &BlockRange) -> Option<Url> {
        let last = range.last()?;
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("module", "account")
            .append_pair("action", "txlist")
            .append_pair("address", &format!("{ZERO_ADDRESS:#x}"))
            .append_pair("startblock", &range.start.to_string())
            .append_pair("endblock", &last.to_string())
            .append_pair("sort", "asc");
        Some(url)
    }

    /// State-sync transactions inside `range`, in explorer order.
    pub async fn get_state_sync_transactions(
        &self,
        range: &BlockRange,
    ) -> Result<Vec<ChainTransaction>, ExplorerError> {
        let Some(url) = self.txlist_url(range) else {
            return Ok(Vec::new());
        };
        trace!(%url, "Querying explorer");

        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let response: ExplorerResponse = serde_json::from_str(&body)?;
        let transactions = into_transactions(response)?;

        if transactions.len() >= EXPLORER_RESULT_CAP {
            warn!(
                block_range = %range,
                count = transactions.len(),
                "Explorer result hit its page cap, use a smaller interval to avoid missing transactions"
            );
        }

        Ok(transactions
            .iter()
            .filter(|tx| is_state_sync(tx))
            .map(|tx| ChainTransaction {
                block_number: tx.block_number,
                block_hash: tx.block_hash,
                tx_hash: tx.hash,
            })
            .collect())
    }
}

fn into_transactions(response: ExplorerResponse) -> Result<Vec<ExplorerTransaction>, ExplorerError> {
    match response.result {
        ExplorerResult::Transactions(transactions) => Ok(transactions),
        // status "0" also covers an empty result
        ExplorerResult::Message(_) if response.message.starts_with(NO_TRANSACTIONS_FOUND) => {
            Ok(Vec::new())
        }
        ExplorerResult::Message(result) => Err(ExplorerError::ApiError {
            status: response.status,
            message: response.message,
            result,
        }),
    }
}

fn is_state_sync(tx: &ExplorerTransaction) -> bool {
    tx.from == Some(ZERO_ADDRESS) && tx.to == Some(ZERO_ADDRESS)
}
