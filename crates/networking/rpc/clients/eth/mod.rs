use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bor_backfill_common::{Address, H256, types::BlockNumber};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::trace;
use url::Url;

use crate::{
    rpc_types::{RpcRequest, RpcRequestId, RpcResponse},
    types::{
        receipt::{RpcLog, RpcReceipt},
        transaction::RpcTransaction,
    },
};
use errors::{EthClientError, RpcRequestError};

pub mod errors;

static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Minimal JSON-RPC client for the calls the backfill needs. Every request is
/// bounded by the client timeout; nothing is retried.
#[derive(Debug, Clone)]
pub struct EthClient {
    client: Client,
    pub url: Url,
}

impl EthClient {
    pub fn new(url: &str) -> Result<EthClient, EthClientError> {
        Self::new_with_timeout(url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn new_with_timeout(url: &str, timeout: Duration) -> Result<EthClient, EthClientError> {
        let url = Url::parse(url)
            .map_err(|e| EthClientError::ParseUrlError(format!("{url}: {e}")))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }

    pub async fn send_request(&self, request: RpcRequest) -> Result<RpcResponse, EthClientError> {
        trace!(endpoint = %self.url, ?request, "Sending RPC request");

        self.client
            .post(self.url.as_str())
            .header("content-type", "application/json")
            .body(serde_json::ser::to_string(&request).map_err(|error| {
                EthClientError::FailedToSerializeRequestBody(format!("{error}: {request:?}"))
            })?)
            .send()
            .await?
            .error_for_status()?
            .json::<RpcResponse>()
            .await
            .inspect(|body| trace!(endpoint = %self.url, ?body, "Response deserialized successfully"))
            .inspect_err(|err| trace!(endpoint = %self.url, %err, "Failed to deserialize response"))
            .map_err(EthClientError::from)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, EthClientError> {
        let request = RpcRequest::new(
            RpcRequestId::Number(REQUEST_ID_COUNTER.fetch_add(1, Ordering::Relaxed)),
            method,
            Some(params),
        );

        match self.send_request(request).await? {
            RpcResponse::Success(result) => serde_json::from_value(result.result)
                .map_err(|source| RpcRequestError::SerdeJSONError {
                    method: method.to_string(),
                    source,
                })
                .map_err(EthClientError::from),
            RpcResponse::Error(error_response) => {
                Err(RpcRequestError::from_metadata(method, error_response.error).into())
            }
        }
    }

    /// Logs emitted by `address` matching `topics` in blocks
    /// `from_block..=to_block`.
    pub async fn get_logs(
        &self,
        from_block: BlockNumber,
        to_block: BlockNumber,
        address: Address,
        topics: Vec<H256>,
    ) -> Result<Vec<RpcLog>, EthClientError> {
        let params = vec![json!(
            {
                "fromBlock": format!("{from_block:#x}"),
                "toBlock": format!("{to_block:#x}"),
                "address": format!("{address:#x}"),
                "topics": topics.iter().map(|topic| format!("{topic:#x}")).collect::<Vec<_>>()
            }
        )];
        // Some nodes answer `null` instead of an empty list.
        let logs: Option<Vec<RpcLog>> = self.call("eth_getLogs", params).await?;
        Ok(logs.unwrap_or_default())
    }

    pub async fn get_transaction_receipt(
        &self,
        tx_hash: H256,
    ) -> Result<Option<RpcReceipt>, EthClientError> {
        self.call("eth_getTransactionReceipt", vec![json!(format!("{tx_hash:#x}"))])
            .await
    }

    pub async fn get_transaction_by_hash(
        &self,
        tx_hash: H256,
    ) -> Result<Option<RpcTransaction>, EthClientError> {
        self.call("eth_getTransactionByHash", vec![json!(format!("{tx_hash:#x}"))])
            .await
    }
}
