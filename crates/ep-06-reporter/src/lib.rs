//! # Result Reporter (ep-06)
//!
//! Submits the result of every Executed task on-chain, oldest task id
//! first, and records the submission hash.
//!
//! ```text
//! store ──next_executed_task──→ task + receipt
//! ChainWriter::submit_result(task_id, status_code, result_ref) ──→ tx hash
//! store ←─record_submission (Executed → Reported only)
//! ```
//!
//! Submission failures leave the task Executed; the next tick retries it.
//! A second submission for a task that is already Reported never replaces
//! the stored hash.

pub mod adapters;
pub mod config;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::{HttpRelayWriter, RecordingChainWriter, Submission};
pub use config::ReporterConfig;
pub use error::{ReporterError, ReporterResult, WriterError, WriterResult};
pub use ports::outbound::ChainWriter;
pub use service::{ReportOutcome, ResultReporter};
