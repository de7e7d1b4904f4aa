//! Sandbox errors.
//!
//! A workload that runs and fails is not an error here: it produces a
//! [`LaunchOutcome`](crate::LaunchOutcome) with a failing status code. These
//! variants cover everything that prevents the workload from being run.

use thiserror::Error;

/// Errors raised while staging or launching a workload.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// The runtime could not be started.
    #[error("Failed to launch sandbox runtime: {0}")]
    Launch(String),

    /// Staging directory or file I/O failed.
    #[error("Sandbox I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or invalid `manifest.json`, or a declared file is absent.
    #[error("Invalid workload manifest: {0}")]
    Manifest(String),

    /// A workload or input archive could not be read.
    #[error("Invalid archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// A path would land outside the workload root.
    #[error("Path escapes workload root: {0}")]
    PathEscape(String),
}

impl SandboxError {
    /// Failures caused by the host rather than the workload package.
    pub fn is_transient(&self) -> bool {
        matches!(self, SandboxError::Launch(_) | SandboxError::Io(_))
    }
}

/// Result type for sandbox operations.
pub type SandboxResult<T> = Result<T, SandboxError>;
