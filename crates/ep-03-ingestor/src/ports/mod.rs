//! # Ports Layer
//!
//! - `outbound.rs` - Driven ports: task store, chain reader, alert transport

pub mod outbound;
