//! # Ingestor (ep-03)
//!
//! Tails the chain one block at a time, survives reorgs, tracks finality and
//! turns finalized task-creation events into execution tasks.
//!
//! ## Pipeline
//!
//! ```text
//!            ┌──────────────── fetch loop ─────────────────┐
//! chain ───→ │ parent == tip.hash ? append + confirm        │
//!            │                   : rewind tip (Pending out) │
//!            └──────────────────────┬───────────────────────┘
//!                                   ↓ events: Pending → Confirmed
//!            ┌──────────── promotion loop ──────────────────┐
//!            │ oldest Confirmed task event → execution task │
//!            └──────────────────────────────────────────────┘
//!   pruning loop : delete blocks below tip - retention_window
//!   watchdog     : alert when the tip stops moving
//! ```
//!
//! ## Finality
//!
//! An event anchored at height `H` has `tip - H` confirmations and becomes
//! Confirmed once that count reaches the threshold (15 by default). Reorgs
//! are detected by parent-hash mismatch and handled by deleting the tip and
//! its Pending events; the walk then resumes one height lower. Confirmed and
//! Promoted events are never touched by a rewind.
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Height selection, fork detection, prune floor, stale-tip check
//! - `ports/` - Outbound ports: store, chain, alert channel
//! - `adapters/` - Log and in-memory alerters
//! - `service/` - `IngestorService` steps and loops

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::{LogAlerter, RecordingAlerter};
pub use config::{IngestorConfig, DEFAULT_CONFIRMATION_THRESHOLD};
pub use domain::{is_fork, next_height, prune_floor, stale_tip_alert};
pub use error::{AlertError, IngestorError, IngestorResult};
pub use ports::outbound::Alerter;
pub use service::{FetchOutcome, IngestorService};
