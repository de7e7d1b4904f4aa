//! Error types for the ingestor.

use ep_01_task_store::StoreError;
use ep_02_chain_reader::ChainError;
use thiserror::Error;

/// Ingestor errors. Every one of them is contained within a single loop tick.
#[derive(Debug, Error)]
pub enum IngestorError {
    /// Task store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Chain read failure
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    /// Alert could not be delivered
    #[error("Alert delivery failed: {0}")]
    Alert(#[from] AlertError),

    /// The blocking store task panicked or was cancelled
    #[error("Store worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    /// Rejected configuration
    #[error("Invalid ingestor configuration: {0}")]
    InvalidConfig(String),
}

impl IngestorError {
    /// Transient I/O: worth a warning and a retry, nothing more.
    pub fn is_transient(&self) -> bool {
        match self {
            IngestorError::Chain(_) | IngestorError::Alert(_) => true,
            IngestorError::Store(err) => err.is_transient(),
            IngestorError::Worker(_) | IngestorError::InvalidConfig(_) => false,
        }
    }
}

/// Alert transport failure.
#[derive(Debug, Clone, Error)]
pub enum AlertError {
    #[error("{0}")]
    Delivery(String),
}

/// Result type for ingestor operations.
pub type IngestorResult<T> = Result<T, IngestorError>;
