//! # Adapters Layer
//!
//! - `comet_rpc` - Production reader over CometBFT JSON-RPC
//! - `memory` - Scripted in-memory chain for tests

pub mod comet_rpc;
pub mod memory;
