//! # Task Store (ep-01)
//!
//! The durable state shared by the ingestor, the runner and the reporter.
//! The three processes never talk to each other directly; every hand-off is a
//! row transition in one of three tables.
//!
//! ## Ledgers
//!
//! ```text
//! Ingestor ──append_block──→ blocks + events (Pending)
//!          ──refresh_confirmations──→ events (Pending → Confirmed)
//!          ──promote_event──→ events (Confirmed → Promoted) + execution_tasks (Created)
//! Runner   ──record_receipt──→ execution_tasks (Created → Executed)
//! Reporter ──record_submission──→ execution_tasks (Executed → Reported)
//! ```
//!
//! ## Guarantees
//!
//! | Operation | Guarantee |
//! |-----------|-----------|
//! | `append_block` | Block and its events land together or not at all |
//! | `rewind_to` | Removes the forked blocks and their Pending events atomically |
//! | `promote_event` | Event status and task insert commit together |
//! | `record_*` | Conditioned on the predecessor status, a miss is a no-op |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Outcome values returned by store transitions
//! - `ports/` - `TaskStore` (inbound) and `TimeSource` (outbound)
//! - `adapters/` - SQLite and MySQL stores, the dialect switch, time sources

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;

pub use adapters::backend::{open_store, StoreBackend};
pub use adapters::mysql::{MySqlTaskStore, MYSQL_DIALECT};
pub use adapters::sqlite::{SqliteTaskStore, SQLITE_DIALECT};
pub use adapters::time::{ManualTimeSource, SystemTimeSource};
pub use domain::{ConfirmationUpdate, PromotionOutcome, RewindOutcome};
pub use error::{StoreError, StoreResult};
pub use ports::inbound::TaskStore;
pub use ports::outbound::TimeSource;
