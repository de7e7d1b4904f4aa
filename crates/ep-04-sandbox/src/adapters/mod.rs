//! # Adapters Layer
//!
//! - `process` - Runtime subprocess launcher
//! - `scripted` - Deterministic launcher for tests

pub mod process;
pub mod scripted;

pub use process::ProcessLauncher;
pub use scripted::{ScriptedLauncher, ScriptedRun};
