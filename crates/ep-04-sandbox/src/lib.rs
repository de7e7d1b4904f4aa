//! # Sandbox (ep-04)
//!
//! Turns downloaded objects into a runnable workload directory and runs it
//! through a [`SandboxLauncher`].
//!
//! ## Flow
//!
//! ```text
//! executable (zip | bare) ──┐
//! inputs     (zip | files) ─┴─ stage_workload ──→ PreparedWorkload
//!                                                   │ launch_request(limit)
//!                                                   ↓
//!                               SandboxLauncher::run ──→ LaunchOutcome
//!                                                     {resource_used, status_code,
//!                                                      result_message, combined_log}
//! ```
//!
//! A workload that traps or exits non-zero is a normal outcome with
//! `status_code = 1`. Only a launcher that cannot start at all returns an
//! error.

pub mod adapters;
pub mod archive;
pub mod domain;
pub mod error;
pub mod ports;
pub mod staging;

pub use adapters::{ProcessLauncher, ScriptedLauncher, ScriptedRun};
pub use archive::{is_archive, pack_zip, unpack_zip};
pub use domain::{ExecutionReport, WorkloadManifest, DEFAULT_OUTPUT, MANIFEST_FILE, REPORT_FILE};
pub use error::{SandboxError, SandboxResult};
pub use ports::{LaunchOutcome, LaunchRequest, SandboxLauncher};
pub use staging::{locate_manifest, stage_workload, PreparedWorkload, StagedObject};
