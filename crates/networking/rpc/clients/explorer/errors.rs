#[derive(Debug, thiserror::Error)]
pub enum ExplorerError {
    #[error("reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),
    #[error("Failed to parse explorer response: {0}")]
    SerdeJSONError(#[from] serde_json::Error),
    #[error("Parse Url Error. {0}")]
    ParseUrlError(String),
    #[error("Explorer API error (status {status}): {message}: {result}")]
    ApiError {
        status: String,
        message: String,
        result: String,
    },
}
