//! # Shared Types Crate
//!
//! Domain entities shared by every subsystem of the execution provider.
//!
//! ## Ledgers
//!
//! ```text
//!   blocks            events                 execution_tasks
//!   ┌─────────┐       ┌──────────────────┐   ┌─────────────────────────┐
//!   │ height  │◄──────│ height           │   │ task_id                 │
//!   │ hash    │       │ kind / task_id   │──►│ Created → Executed →    │
//!   │ parent  │       │ Pending →        │   │           Reported      │
//!   └─────────┘       │ Confirmed →      │   └─────────────────────────┘
//!                     │ Promoted         │
//!                     └──────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: all cross-subsystem types are defined here.
//! - **Closed event schema**: chain events are decoded once, at the ingestion
//!   boundary, into [`EventBody`]. Nothing downstream looks at attribute keys.
//! - **Status codes are stable**: the integer encodings of [`EventStatus`] and
//!   [`TaskStatus`] are persisted and must never be renumbered.

pub mod entities;
pub mod errors;
pub mod events;

pub use entities::*;
pub use errors::*;
pub use events::*;
