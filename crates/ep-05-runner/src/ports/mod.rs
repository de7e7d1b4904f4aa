//! # Ports Layer
//!
//! - `outbound.rs` - Driven ports: object storage, task store, sandbox

pub mod outbound;
