//! # Ports Layer
//!
//! - `inbound.rs` - Driving port: the ledger API the three processes call
//! - `outbound.rs` - Driven port: the clock the store stamps rows with

pub mod inbound;
pub mod outbound;
