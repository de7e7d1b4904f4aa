//! Store selection by configured dialect.

use std::sync::Arc;

use shared_types::{
    BlockRecord, ChainEvent, EventKind, ExecutionTask, Height, Receipt, TaskEvent, TaskId,
};

use crate::adapters::mysql::{MySqlTaskStore, MYSQL_DIALECT};
use crate::adapters::sqlite::{SqliteTaskStore, SQLITE_DIALECT};
use crate::domain::{ConfirmationUpdate, PromotionOutcome, RewindOutcome};
use crate::error::{StoreError, StoreResult};
use crate::ports::inbound::TaskStore;
use crate::ports::outbound::TimeSource;

/// The store a process was configured with.
pub enum StoreBackend {
    Sqlite(SqliteTaskStore),
    MySql(MySqlTaskStore),
}

/// Open the store for `dialect`. `location` is a file path for `sqlite3` and
/// a `mysql://` URL for `mysql`.
pub fn open_store(dialect: &str, location: &str) -> StoreResult<StoreBackend> {
    match dialect {
        SQLITE_DIALECT => SqliteTaskStore::open(location).map(StoreBackend::Sqlite),
        MYSQL_DIALECT => MySqlTaskStore::connect(location).map(StoreBackend::MySql),
        other => Err(StoreError::UnsupportedDialect(other.to_string())),
    }
}

macro_rules! dispatch {
    ($self:ident, $store:ident => $call:expr) => {
        match $self {
            StoreBackend::Sqlite($store) => $call,
            StoreBackend::MySql($store) => $call,
        }
    };
}

impl StoreBackend {
    pub fn dialect(&self) -> &'static str {
        match self {
            StoreBackend::Sqlite(_) => SQLITE_DIALECT,
            StoreBackend::MySql(_) => MYSQL_DIALECT,
        }
    }

    /// Replace the clock used to stamp rows.
    pub fn with_time_source(self, clock: Arc<dyn TimeSource>) -> Self {
        match self {
            StoreBackend::Sqlite(store) => StoreBackend::Sqlite(store.with_time_source(clock)),
            StoreBackend::MySql(store) => StoreBackend::MySql(store.with_time_source(clock)),
        }
    }

    /// Applied schema version.
    pub fn schema_version(&self) -> StoreResult<i64> {
        dispatch!(self, store => store.schema_version())
    }
}

impl TaskStore for StoreBackend {
    fn tip(&self) -> StoreResult<BlockRecord> {
        dispatch!(self, store => store.tip())
    }

    fn block_at(&self, height: Height) -> StoreResult<Option<BlockRecord>> {
        dispatch!(self, store => store.block_at(height))
    }

    fn append_block(&self, block: &BlockRecord, events: &[ChainEvent]) -> StoreResult<()> {
        dispatch!(self, store => store.append_block(block, events))
    }

    fn rewind_to(&self, height: Height) -> StoreResult<RewindOutcome> {
        dispatch!(self, store => store.rewind_to(height))
    }

    fn prune_below(&self, height: Height) -> StoreResult<u64> {
        dispatch!(self, store => store.prune_below(height))
    }

    fn refresh_confirmations(
        &self,
        tip: Height,
        threshold: u64,
    ) -> StoreResult<ConfirmationUpdate> {
        dispatch!(self, store => store.refresh_confirmations(tip, threshold))
    }

    fn next_confirmed_event(&self, kind: EventKind) -> StoreResult<Option<TaskEvent>> {
        dispatch!(self, store => store.next_confirmed_event(kind))
    }

    fn promote_event(&self, event: &TaskEvent) -> StoreResult<PromotionOutcome> {
        dispatch!(self, store => store.promote_event(event))
    }

    fn events_at(&self, height: Height) -> StoreResult<Vec<TaskEvent>> {
        dispatch!(self, store => store.events_at(height))
    }

    fn task(&self, task_id: TaskId) -> StoreResult<Option<ExecutionTask>> {
        dispatch!(self, store => store.task(task_id))
    }

    fn next_created_task(&self, after: TaskId) -> StoreResult<Option<ExecutionTask>> {
        dispatch!(self, store => store.next_created_task(after))
    }

    fn next_executed_task(&self) -> StoreResult<Option<ExecutionTask>> {
        dispatch!(self, store => store.next_executed_task())
    }

    fn record_attempt(&self, task_id: TaskId) -> StoreResult<bool> {
        dispatch!(self, store => store.record_attempt(task_id))
    }

    fn record_receipt(&self, task_id: TaskId, receipt: &Receipt) -> StoreResult<bool> {
        dispatch!(self, store => store.record_receipt(task_id, receipt))
    }

    fn record_submission(&self, task_id: TaskId, tx_hash: &str) -> StoreResult<bool> {
        dispatch!(self, store => store.record_submission(task_id, tx_hash))
    }
}
