//! # Core Domain Entities
//!
//! The three persisted ledgers and the values that flow between them.
//!
//! ## Clusters
//!
//! - **Blocks**: [`BlockRecord`]
//! - **Events**: [`TaskEvent`], [`EventStatus`]
//! - **Tasks**: [`ExecutionTask`], [`TaskPayload`], [`Receipt`], [`TaskStatus`]

use serde::{Deserialize, Serialize};

use crate::errors::CodecError;
use crate::events::{BlockHeader, EventKind};

/// Chain-assigned task identifier. Monotonic in emission order.
pub type TaskId = u64;

/// Block height.
pub type Height = u64;

/// Seconds since the unix epoch.
pub type UnixTimestamp = i64;

/// Largest integer a ledger column can hold. SQL INTEGER columns are signed
/// 64-bit, so ids and gas amounts above this are rejected at the boundary.
pub const MAX_STORED_INTEGER: u64 = i64::MAX as u64;

// =============================================================================
// CLUSTER A: BLOCKS
// =============================================================================

/// One retained chain height.
///
/// The highest-height record is the tip as known locally. When the ledger is
/// empty the tip is [`BlockRecord::genesis`], a sentinel at height 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub height: Height,
    pub block_hash: String,
    pub parent_hash: String,
    /// Block time reported by the chain.
    pub block_time: UnixTimestamp,
    /// When this process persisted the block.
    pub observed_at: UnixTimestamp,
}

impl BlockRecord {
    /// Sentinel tip used before the first block is stored.
    pub fn genesis() -> Self {
        Self {
            height: 0,
            block_hash: String::new(),
            parent_hash: String::new(),
            block_time: 0,
            observed_at: 0,
        }
    }

    pub fn is_genesis(&self) -> bool {
        self.height == 0
    }

    /// Build the record for a freshly fetched header.
    pub fn from_header(header: &BlockHeader, observed_at: UnixTimestamp) -> Self {
        Self {
            height: header.height,
            block_hash: header.block_hash.clone(),
            parent_hash: header.parent_hash.clone(),
            block_time: header.timestamp,
            observed_at,
        }
    }
}

// =============================================================================
// CLUSTER B: EVENTS
// =============================================================================

/// Lifecycle of a stored chain event.
///
/// `Pending → Confirmed → Promoted`. Only `Pending` rows are ever deleted
/// (by reorg handling).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventStatus {
    Pending,
    Confirmed,
    Promoted,
}

impl EventStatus {
    pub fn code(self) -> i64 {
        match self {
            EventStatus::Pending => 0,
            EventStatus::Confirmed => 1,
            EventStatus::Promoted => 2,
        }
    }
}

impl TryFrom<i64> for EventStatus {
    type Error = CodecError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(EventStatus::Pending),
            1 => Ok(EventStatus::Confirmed),
            2 => Ok(EventStatus::Promoted),
            other => Err(CodecError::UnknownEventStatus(other)),
        }
    }
}

/// The work description carried from a task-creation event into its task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPayload {
    /// Object id of the executable package.
    pub executable_ref: String,
    /// Ordered object ids of the inputs.
    pub input_refs: Vec<String>,
    /// Resource (gas) budget handed to the sandbox.
    pub resource_limit: u64,
    pub method: String,
    /// Invocation parameters, lower-case hex.
    pub params_hex: String,
}

/// A decoded chain event as persisted in the event ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEvent {
    /// Store-assigned row id.
    pub id: i64,
    pub kind: EventKind,
    pub block_hash: String,
    pub tx_hash: String,
    pub height: Height,
    pub task_id: TaskId,
    pub operator: String,
    pub payload: TaskPayload,
    pub status: EventStatus,
    /// `tip height - height` as of the last recomputation.
    pub confirmations: u64,
    pub created_at: UnixTimestamp,
    pub updated_at: UnixTimestamp,
}

// =============================================================================
// CLUSTER C: EXECUTION TASKS
// =============================================================================

/// Lifecycle of an execution task. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Created,
    Executed,
    Reported,
}

impl TaskStatus {
    pub fn code(self) -> i64 {
        match self {
            TaskStatus::Created => 0,
            TaskStatus::Executed => 1,
            TaskStatus::Reported => 2,
        }
    }
}

impl TryFrom<i64> for TaskStatus {
    type Error = CodecError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(TaskStatus::Created),
            1 => Ok(TaskStatus::Executed),
            2 => Ok(TaskStatus::Reported),
            other => Err(CodecError::UnknownTaskStatus(other)),
        }
    }
}

/// Outcome of one sandbox execution, written once at Created → Executed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub resource_used: u64,
    /// Submitted on-chain as the result status code.
    pub status_code: u32,
    pub result_message: String,
    /// Object id of the primary output, empty when the workload produced none.
    pub result_ref: String,
    /// Object id of the captured combined log.
    pub log_ref: String,
}

impl Receipt {
    pub const STATUS_SUCCESS: u32 = 0;
    pub const STATUS_FAILED: u32 = 1;

    pub fn is_success(&self) -> bool {
        self.status_code == Self::STATUS_SUCCESS
    }
}

/// The unit of work handed to the runner and the reporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionTask {
    pub task_id: TaskId,
    /// Hash of the transaction that created the task.
    pub origin_tx_hash: String,
    pub operator: String,
    pub payload: TaskPayload,
    /// Populated at Created → Executed.
    pub receipt: Option<Receipt>,
    /// Populated at Executed → Reported.
    pub submit_tx_hash: Option<String>,
    pub status: TaskStatus,
    /// Number of execution attempts started against this row.
    pub attempts: u32,
    pub last_attempt_at: Option<UnixTimestamp>,
    pub created_at: UnixTimestamp,
    pub updated_at: UnixTimestamp,
}
