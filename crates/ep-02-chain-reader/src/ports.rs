//! # Ports
//!
//! The chain read path consumed by the ingestor.
//!
//! Production: `CometRpcReader`
//! Testing: `InMemoryChain`

use async_trait::async_trait;
use shared_types::Height;

use crate::domain::raw::RawBlock;
use crate::error::ChainResult;

/// Read access to finalized-or-not chain history, one height at a time.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Header and task-lifecycle events of the block at `height`.
    async fn fetch_block_and_events(&self, height: Height) -> ChainResult<RawBlock>;
}
