//! # Ports Layer
//!
//! - `outbound.rs` - Driven ports: chain writer, task store

pub mod outbound;
