//! # Adapters Layer

pub mod http_relay;
pub mod recording;

pub use http_relay::HttpRelayWriter;
pub use recording::{RecordingChainWriter, Submission};
