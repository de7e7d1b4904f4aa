//! Error types for the reporter.

use ep_01_task_store::StoreError;
use shared_types::TaskId;
use thiserror::Error;

/// Chain writer failures. The task stays Executed and is retried.
#[derive(Debug, Error)]
pub enum WriterError {
    #[error("Relay transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The relay or the chain refused the transaction.
    #[error("Result transaction rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Malformed relay response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Error)]
pub enum ReporterError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Chain writer error: {0}")]
    Writer(#[from] WriterError),

    /// An Executed task without a receipt; the row is inconsistent.
    #[error("Task {0} is Executed but has no receipt")]
    MissingReceipt(TaskId),

    #[error("Invalid reporter configuration: {0}")]
    InvalidConfig(String),
}

impl ReporterError {
    pub fn is_transient(&self) -> bool {
        match self {
            ReporterError::Store(err) => err.is_transient(),
            ReporterError::Writer(WriterError::Transport(_)) => true,
            ReporterError::Writer(WriterError::Rejected { status, .. }) => *status >= 500,
            ReporterError::Writer(WriterError::MalformedResponse(_)) => false,
            ReporterError::MissingReceipt(_) | ReporterError::InvalidConfig(_) => false,
        }
    }
}

pub type WriterResult<T> = Result<T, WriterError>;

pub type ReporterResult<T> = Result<T, ReporterError>;
