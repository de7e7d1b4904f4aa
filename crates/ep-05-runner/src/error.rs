//! Error types for the runner.

use ep_01_task_store::StoreError;
use ep_04_sandbox::SandboxError;
use thiserror::Error;

/// Object storage failures.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid object id: {0}")]
    InvalidObjectId(String),

    #[error("Object storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Runner errors. Each one aborts a single tick and leaves the task Created.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Sandbox error: {0}")]
    Sandbox(#[from] SandboxError),

    #[error("Staging I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking staging task panicked or was cancelled.
    #[error("Staging worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("Invalid runner configuration: {0}")]
    InvalidConfig(String),
}

impl RunnerError {
    pub fn is_transient(&self) -> bool {
        match self {
            RunnerError::Store(err) => err.is_transient(),
            RunnerError::Storage(StorageError::Io(_)) | RunnerError::Io(_) => true,
            RunnerError::Storage(_) => false,
            RunnerError::Sandbox(err) => err.is_transient(),
            RunnerError::Worker(_) | RunnerError::InvalidConfig(_) => false,
        }
    }
}

/// Result type for object storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;
