//! # Domain Layer
//!
//! Workload manifest and execution report formats. No I/O beyond parsing.

pub mod manifest;
pub mod report;

pub use manifest::{safe_relative_path, WorkloadManifest, DEFAULT_OUTPUT, MANIFEST_FILE};
pub use report::{ExecutionReport, REPORT_FILE};
