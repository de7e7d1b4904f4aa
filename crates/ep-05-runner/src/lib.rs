//! # Task Runner (ep-05)
//!
//! Executes Created tasks in task id order and records a receipt for each.
//!
//! ## Tick
//!
//! ```text
//! store ──next_created_task(> watermark)──→ task
//!   storage ──resolve/download──→ executable + inputs
//!   sandbox ──stage_workload + launch──→ {resource_used, status_code, message, log}
//!   storage ←─upload outputs + log─── (executable's bucket, task-<id>/...)
//! store ←─record_receipt (Created → Executed only)
//! ```
//!
//! A failing workload still produces a receipt. A failing download, manifest
//! or launch aborts the tick and leaves the task Created.
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Upload naming, tick outcomes
//! - `ports/` - `ObjectStorage` plus re-exported store and sandbox ports
//! - `adapters/` - Filesystem and in-memory object storage
//! - `service/` - `TaskRunner`

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::{FsObjectStorage, InMemoryObjectStorage};
pub use config::RunnerConfig;
pub use domain::{upload_name, TickOutcome, LOG_FILE_NAME};
pub use error::{RunnerError, RunnerResult, StorageError, StorageResult};
pub use ports::outbound::{ObjectLocation, ObjectStorage};
pub use service::TaskRunner;
