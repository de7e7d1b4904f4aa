//! # Outbound Ports (Driven Ports)
//!
//! Everything the ingestor depends on. The store and chain ports are owned by
//! their crates and re-exported here.

use async_trait::async_trait;

pub use ep_01_task_store::{TaskStore, TimeSource};
pub use ep_02_chain_reader::ChainReader;

use crate::error::AlertError;

/// External alert channel used by the liveness watchdog.
///
/// Production: webhook alerter (provider-runtime) or `LogAlerter`
/// Testing: `RecordingAlerter`
#[async_trait]
pub trait Alerter: Send + Sync {
    async fn send_alert(&self, message: &str) -> Result<(), AlertError>;
}
