//! # Chain Events
//!
//! The closed set of chain events the pipeline cares about. The chain emits a
//! string-keyed attribute bag per event; the chain reader decodes that bag
//! exactly once into one of these variants.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::entities::{Height, TaskId, TaskPayload, UnixTimestamp};
use crate::errors::CodecError;

/// Chain event type emitted when a compute task is created.
pub const TASK_CREATED_EVENT_TYPE: &str = "execution.EventExecutionTask";

/// Chain event type emitted when a result transaction lands.
pub const RESULT_SUBMITTED_EVENT_TYPE: &str = "execution.EventExecutionResult";

/// Kind tag persisted alongside every stored event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// A new task was registered on-chain.
    TaskCreated,
    /// A result was submitted for a task.
    ResultSubmitted,
}

impl EventKind {
    /// Chain-side event type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::TaskCreated => TASK_CREATED_EVENT_TYPE,
            EventKind::ResultSubmitted => RESULT_SUBMITTED_EVENT_TYPE,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            TASK_CREATED_EVENT_TYPE => Ok(EventKind::TaskCreated),
            RESULT_SUBMITTED_EVENT_TYPE => Ok(EventKind::ResultSubmitted),
            other => Err(CodecError::UnknownEventKind(other.to_string())),
        }
    }
}

/// Payload of a task-creation event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCreated {
    pub task_id: TaskId,
    /// Account that created the task.
    pub operator: String,
    pub payload: TaskPayload,
}

/// Payload of a result-submitted event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSubmitted {
    /// Present when the chain attaches the task id to the event.
    pub task_id: Option<TaskId>,
}

/// Decoded event body, one variant per event kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventBody {
    TaskCreated(TaskCreated),
    ResultSubmitted(ResultSubmitted),
}

impl EventBody {
    pub fn kind(&self) -> EventKind {
        match self {
            EventBody::TaskCreated(_) => EventKind::TaskCreated,
            EventBody::ResultSubmitted(_) => EventKind::ResultSubmitted,
        }
    }

    /// Task id carried by the event, zero when the chain omitted it.
    pub fn task_id(&self) -> TaskId {
        match self {
            EventBody::TaskCreated(created) => created.task_id,
            EventBody::ResultSubmitted(submitted) => submitted.task_id.unwrap_or_default(),
        }
    }
}

/// A decoded event together with the transaction that emitted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEvent {
    /// Upper-case hex transaction hash.
    pub tx_hash: String,
    pub body: EventBody,
}

/// Header fields of a fetched block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub height: Height,
    pub block_hash: String,
    pub parent_hash: String,
    /// Block time, unix seconds.
    pub timestamp: UnixTimestamp,
}

/// A block and the task-lifecycle events it emitted, already decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedBlock {
    pub header: BlockHeader,
    pub events: Vec<ChainEvent>,
}
