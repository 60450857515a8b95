use crate::rpc_types::RpcErrorMetadata;

/// A single error type for all RPC request failures.
#[derive(Debug, thiserror::Error)]
pub enum RpcRequestError {
    #[error("{method}: {source}")]
    SerdeJSONError {
        method: String,
        source: serde_json::Error,
    },
    #[error("{method}: {message} (code: {code}, data: {data:?})")]
    RPCError {
        method: String,
        code: i32,
        message: String,
        data: Option<String>,
    },
}

impl RpcRequestError {
    pub(crate) fn from_metadata(method: &str, error: RpcErrorMetadata) -> Self {
        RpcRequestError::RPCError {
            method: method.to_string(),
            code: error.code,
            message: error.message,
            data: error.data.map(|data| data.to_string()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EthClientError {
    #[error("reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),
    #[error("RPC request error: {0}")]
    RpcRequestError(#[from] RpcRequestError),
    #[error("Failed to serialize request body: {0}")]
    FailedToSerializeRequestBody(String),
    #[error("Parse Url Error. {0}")]
    ParseUrlError(String),
}
