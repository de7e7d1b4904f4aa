//! # Inbound Ports (Driving Ports)
//!
//! The ledger API shared by the ingestor, runner and reporter.
//!
//! Every method is a single short transaction. "Take next" queries always
//! return the lowest task id (or height) that qualifies; conditional updates
//! return `false` when the row was already advanced by someone else.

use shared_types::{
    BlockRecord, ChainEvent, EventKind, ExecutionTask, Height, Receipt, TaskEvent, TaskId,
};

use crate::domain::{ConfirmationUpdate, PromotionOutcome, RewindOutcome};
use crate::error::StoreResult;

/// Transactional access to the block, event and execution-task ledgers.
pub trait TaskStore: Send + Sync {
    // =========================================================================
    // Blocks
    // =========================================================================

    /// Highest stored block, or [`BlockRecord::genesis`] when none exists.
    fn tip(&self) -> StoreResult<BlockRecord>;

    fn block_at(&self, height: Height) -> StoreResult<Option<BlockRecord>>;

    /// Persist a block and its decoded events (as Pending) in one transaction.
    fn append_block(&self, block: &BlockRecord, events: &[ChainEvent]) -> StoreResult<()>;

    /// Delete every block at or above `height` together with the Pending
    /// events anchored there. Confirmed and Promoted events are kept.
    fn rewind_to(&self, height: Height) -> StoreResult<RewindOutcome>;

    /// Delete every block strictly below `height`. Returns the number removed.
    fn prune_below(&self, height: Height) -> StoreResult<u64>;

    // =========================================================================
    // Events
    // =========================================================================

    /// Rewrite confirmation counts of Pending events as `tip - height`, then
    /// mark those with at least `threshold` confirmations Confirmed.
    fn refresh_confirmations(&self, tip: Height, threshold: u64)
        -> StoreResult<ConfirmationUpdate>;

    /// Oldest Confirmed event of `kind`, by task id.
    fn next_confirmed_event(&self, kind: EventKind) -> StoreResult<Option<TaskEvent>>;

    /// Mark `event` Promoted and insert its execution task, atomically.
    /// Conditioned on the event still being Confirmed.
    fn promote_event(&self, event: &TaskEvent) -> StoreResult<PromotionOutcome>;

    /// Events anchored at `height`, in insertion order.
    fn events_at(&self, height: Height) -> StoreResult<Vec<TaskEvent>>;

    // =========================================================================
    // Execution tasks
    // =========================================================================

    fn task(&self, task_id: TaskId) -> StoreResult<Option<ExecutionTask>>;

    /// Oldest Created task with an id strictly greater than `after`.
    fn next_created_task(&self, after: TaskId) -> StoreResult<Option<ExecutionTask>>;

    /// Oldest Executed task.
    fn next_executed_task(&self) -> StoreResult<Option<ExecutionTask>>;

    /// Bump the attempt counter of a Created task.
    fn record_attempt(&self, task_id: TaskId) -> StoreResult<bool>;

    /// Created → Executed with the receipt. `false` if the task was not Created.
    fn record_receipt(&self, task_id: TaskId, receipt: &Receipt) -> StoreResult<bool>;

    /// Executed → Reported with the submission hash. `false` if the task was
    /// not Executed.
    fn record_submission(&self, task_id: TaskId, tx_hash: &str) -> StoreResult<bool>;
}
