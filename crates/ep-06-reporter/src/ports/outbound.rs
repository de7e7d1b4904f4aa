//! # Outbound Ports (Driven Ports)

use async_trait::async_trait;
use shared_types::TaskId;

pub use ep_01_task_store::TaskStore;

use crate::error::WriterResult;

/// Submits execution results to the chain.
///
/// The chain is expected to reject or ignore a second result for the same
/// task id, which makes a retried submission harmless.
///
/// Production: `HttpRelayWriter`
/// Testing: `RecordingChainWriter`
#[async_trait]
pub trait ChainWriter: Send + Sync {
    /// Returns the submission transaction hash.
    async fn submit_result(
        &self,
        task_id: TaskId,
        status_code: u32,
        result_ref: &str,
    ) -> WriterResult<String>;
}
