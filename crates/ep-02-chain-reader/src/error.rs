//! Chain reader errors.

use thiserror::Error;

/// Failures talking to the chain. All of them are retried by the caller.
#[derive(Debug, Error)]
pub enum ChainError {
    /// HTTP transport failure.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The node answered with a JSON-RPC error or a non-success status.
    #[error("RPC error ({code}): {message}")]
    Rpc { code: i64, message: String },

    /// The requested height has not been produced yet.
    #[error("Height {0} is not available yet")]
    HeightNotAvailable(u64),

    /// The response could not be interpreted.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ChainError {
    /// Waiting at the chain head, not a fault.
    pub fn is_head_reached(&self) -> bool {
        matches!(self, ChainError::HeightNotAvailable(_))
    }
}

/// Result type for chain reads.
pub type ChainResult<T> = Result<T, ChainError>;

/// A task-lifecycle event whose attributes do not fit the schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Event {kind} in tx {tx_hash} is missing attribute '{key}'")]
    MissingAttribute {
        kind: String,
        tx_hash: String,
        key: &'static str,
    },

    #[error("Event {kind} in tx {tx_hash} has invalid '{key}': {reason}")]
    InvalidAttribute {
        kind: String,
        tx_hash: String,
        key: &'static str,
        reason: String,
    },
}
