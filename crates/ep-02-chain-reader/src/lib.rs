//! # Chain Reader (ep-02)
//!
//! Fetches a block and the task-lifecycle events it emitted, and decodes the
//! chain's string-keyed attribute bags into the closed [`EventBody`] schema.
//!
//! ## Data Flow
//!
//! ```text
//! CometBFT RPC ──/block──────────┐
//!              ──/block_results──┴──→ RawBlock ──decode_block──→ DecodedBlock
//!                                     (attribute bags)            (EventBody variants)
//! ```
//!
//! Decoding happens exactly once, at the ingestion boundary. An event that
//! fails to decode is reported back to the caller and does not poison the
//! rest of the block.
//!
//! [`EventBody`]: shared_types::EventBody

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;

pub use adapters::comet_rpc::CometRpcReader;
pub use adapters::memory::{result_submitted_event, task_created_event, InMemoryChain};
pub use domain::decoder::{decode_block, decode_event, DecodeReport};
pub use domain::raw::{RawBlock, RawEvent};
pub use error::{ChainError, ChainResult, DecodeError};
pub use ports::ChainReader;
