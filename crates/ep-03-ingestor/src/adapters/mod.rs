//! # Adapters Layer

pub mod alerter;

pub use alerter::{LogAlerter, RecordingAlerter};
