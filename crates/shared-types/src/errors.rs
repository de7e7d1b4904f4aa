//! # Error Types
//!
//! Errors raised while converting persisted or wire representations back
//! into domain types.

use thiserror::Error;

/// A persisted or wire value does not map to a known domain variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Unknown event lifecycle status code.
    #[error("Unknown event status code: {0}")]
    UnknownEventStatus(i64),

    /// Unknown execution task status code.
    #[error("Unknown task status code: {0}")]
    UnknownTaskStatus(i64),

    /// Unknown chain event kind.
    #[error("Unknown event kind: {0}")]
    UnknownEventKind(String),
}
