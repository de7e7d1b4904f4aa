//! In-memory scripted chain for tests.
//!
//! Blocks are linked by hash. `fork_at` drops a suffix of the chain and bumps
//! a fork counter so rebuilt blocks get different hashes, which is exactly
//! what the ingestor's parent-hash check must catch.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use shared_types::{
    BlockHeader, Height, TaskId, RESULT_SUBMITTED_EVENT_TYPE, TASK_CREATED_EVENT_TYPE,
};

use crate::domain::decoder::{
    ATTR_EXECUTABLE, ATTR_INPUTS, ATTR_MAX_GAS, ATTR_METHOD, ATTR_OPERATOR, ATTR_PARAMS,
    ATTR_TASK_ID,
};
use crate::domain::raw::{RawBlock, RawEvent};
use crate::error::{ChainError, ChainResult};
use crate::ports::ChainReader;

#[derive(Default)]
struct ChainState {
    blocks: BTreeMap<Height, RawBlock>,
    fork: u64,
}

/// A chain that only exists in memory.
#[derive(Default)]
pub struct InMemoryChain {
    state: RwLock<ChainState>,
    offline: AtomicBool,
    fetches: AtomicU64,
}

impl InMemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Height of the newest block, 0 when empty.
    pub fn head(&self) -> Height {
        self.state
            .read()
            .blocks
            .keys()
            .next_back()
            .copied()
            .unwrap_or(0)
    }

    /// Append a block at `head + 1` carrying `events`.
    pub fn push_block(&self, events: Vec<RawEvent>) -> Height {
        let mut state = self.state.write();
        let height = state.blocks.keys().next_back().copied().unwrap_or(0) + 1;
        let parent_hash = state
            .blocks
            .get(&(height - 1))
            .map(|b| b.header.block_hash.clone())
            .unwrap_or_else(|| block_hash(height - 1, "", state.fork));
        let hash = block_hash(height, &parent_hash, state.fork);

        state.blocks.insert(
            height,
            RawBlock {
                header: BlockHeader {
                    height,
                    block_hash: hash,
                    parent_hash,
                    timestamp: 1_700_000_000 + height as i64,
                },
                events,
            },
        );
        height
    }

    /// Append empty blocks until the head reaches `height`.
    pub fn extend_to(&self, height: Height) {
        while self.head() < height {
            self.push_block(Vec::new());
        }
    }

    /// Drop every block at or above `height`; later pushes build a new branch.
    pub fn fork_at(&self, height: Height) {
        let mut state = self.state.write();
        state.blocks.retain(|h, _| *h < height);
        state.fork += 1;
    }

    pub fn block(&self, height: Height) -> Option<RawBlock> {
        self.state.read().blocks.get(&height).cloned()
    }

    /// Make every fetch fail with a transport-style error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of fetch calls served so far.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainReader for InMemoryChain {
    async fn fetch_block_and_events(&self, height: Height) -> ChainResult<RawBlock> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(ChainError::Rpc {
                code: -1,
                message: "node unreachable".into(),
            });
        }
        self.block(height)
            .ok_or(ChainError::HeightNotAvailable(height))
    }
}

fn block_hash(height: Height, parent: &str, fork: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(height.to_be_bytes());
    hasher.update(parent.as_bytes());
    hasher.update(fork.to_be_bytes());
    hex::encode_upper(hasher.finalize())
}

fn quoted(value: impl ToString) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// A task-creation event encoded the way the chain emits it.
pub fn task_created_event(
    tx_hash: &str,
    task_id: TaskId,
    executable_ref: &str,
    input_refs: &[&str],
    resource_limit: u64,
) -> RawEvent {
    let inputs = serde_json::Value::from(input_refs.to_vec()).to_string();
    RawEvent {
        tx_hash: tx_hash.to_string(),
        kind: TASK_CREATED_EVENT_TYPE.to_string(),
        attributes: vec![
            (ATTR_TASK_ID.into(), quoted(task_id)),
            (ATTR_OPERATOR.into(), quoted("0x5eed")),
            (ATTR_EXECUTABLE.into(), quoted(executable_ref)),
            (ATTR_INPUTS.into(), inputs),
            (ATTR_MAX_GAS.into(), quoted(resource_limit)),
            (ATTR_METHOD.into(), quoted("main")),
            (ATTR_PARAMS.into(), quoted("")),
        ],
    }
}

/// A result-submitted event encoded the way the chain emits it.
pub fn result_submitted_event(tx_hash: &str, task_id: TaskId) -> RawEvent {
    RawEvent {
        tx_hash: tx_hash.to_string(),
        kind: RESULT_SUBMITTED_EVENT_TYPE.to_string(),
        attributes: vec![(ATTR_TASK_ID.into(), quoted(task_id))],
    }
}
