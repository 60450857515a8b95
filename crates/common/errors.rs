use hex::FromHexError;

/// Failures turning operator or file input into the node's binary layout.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("hex string `{0}` must start with 0x")]
    MissingHexPrefix(String),
    #[error("invalid hex `{input}`: {source}")]
    InvalidHex {
        input: String,
        source: FromHexError,
    },
    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("RLP error: {0}")]
    Rlp(#[from] alloy_rlp::Error),
    #[error("unsupported receipt status bytes 0x{0}")]
    UnsupportedStatus(String),
}
