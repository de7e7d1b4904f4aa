//! SQLite-backed [`TaskStore`].
//!
//! One connection guarded by a mutex per process. The three processes share
//! the database file; WAL journaling plus a busy timeout let them interleave
//! short write transactions. Multi-row mutations run inside `IMMEDIATE`
//! transactions so the write lock is taken up front.

mod rows;
mod schema;


use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use shared_types::{
    BlockRecord, ChainEvent, EventBody, EventKind, EventStatus, ExecutionTask, Height, Receipt,
    TaskEvent, TaskId, TaskPayload, TaskStatus,
};
use tracing::{debug, info};

use crate::adapters::time::SystemTimeSource;
use crate::domain::{ConfirmationUpdate, PromotionOutcome, RewindOutcome};
use crate::error::StoreResult;
use crate::ports::inbound::TaskStore;
use crate::ports::outbound::TimeSource;

use rows::{
    block_from_row, event_from_row, task_from_row, BLOCK_COLUMNS, EVENT_COLUMNS, TASK_COLUMNS,
};

pub use schema::SCHEMA_VERSION;

/// Dialect name selecting this store.
pub const SQLITE_DIALECT: &str = "sqlite3";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Task store over a single SQLite database.
pub struct SqliteTaskStore {
    conn: Mutex<Connection>,
    clock: Arc<dyn TimeSource>,
}

impl SqliteTaskStore {
    /// Open (creating if needed) the database at `path` and apply migrations.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        debug!("[ep-01] journal_mode={}", mode);

        let store = Self::from_connection(conn, Arc::new(SystemTimeSource))?;
        info!("[ep-01] Task store opened at {}", path.display());
        Ok(store)
    }

    /// Private in-memory database, used by tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?, Arc::new(SystemTimeSource))
    }

    /// Replace the clock used to stamp rows.
    pub fn with_time_source(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    fn from_connection(conn: Connection, clock: Arc<dyn TimeSource>) -> StoreResult<Self> {
        schema::migrate(&conn, clock.now())?;
        Ok(Self {
            conn: Mutex::new(conn),
            clock,
        })
    }

    /// Applied schema version.
    pub fn schema_version(&self) -> StoreResult<i64> {
        schema::current_version(&self.conn.lock())
    }

    fn query_task(&self, sql: &str, param: Option<u64>) -> StoreResult<Option<ExecutionTask>> {
        let conn = self.conn.lock();
        let task = match param {
            Some(value) => conn.query_row(sql, params![value], task_from_row),
            None => conn.query_row(sql, [], task_from_row),
        }
        .optional()?;
        Ok(task)
    }
}

impl TaskStore for SqliteTaskStore {
    fn tip(&self) -> StoreResult<BlockRecord> {
        let conn = self.conn.lock();
        let tip = conn
            .query_row(
                &format!("SELECT {BLOCK_COLUMNS} FROM blocks ORDER BY height DESC LIMIT 1"),
                [],
                block_from_row,
            )
            .optional()?;
        Ok(tip.unwrap_or_else(BlockRecord::genesis))
    }

    fn block_at(&self, height: Height) -> StoreResult<Option<BlockRecord>> {
        let conn = self.conn.lock();
        let block = conn
            .query_row(
                &format!("SELECT {BLOCK_COLUMNS} FROM blocks WHERE height = ?1"),
                params![height],
                block_from_row,
            )
            .optional()?;
        Ok(block)
    }

    fn append_block(&self, block: &BlockRecord, events: &[ChainEvent]) -> StoreResult<()> {
        let now = self.clock.now();
        let empty = TaskPayload::default();

        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO blocks (height, block_hash, parent_hash, block_time, observed_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                block.height,
                block.block_hash,
                block.parent_hash,
                block.block_time,
                block.observed_at
            ],
        )?;

        {
            let mut insert = tx.prepare_cached(
                "INSERT INTO events (kind, block_hash, tx_hash, height, task_id, operator,
                     executable_ref, input_refs, resource_limit, method, params_hex, status,
                     confirmations, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, 0, ?13, ?13)",
            )?;
            for event in events {
                let (operator, payload) = match &event.body {
                    EventBody::TaskCreated(created) => (created.operator.as_str(), &created.payload),
                    EventBody::ResultSubmitted(_) => ("", &empty),
                };
                let input_refs = serde_json::to_string(&payload.input_refs)?;
                insert.execute(params![
                    event.body.kind().as_str(),
                    block.block_hash,
                    event.tx_hash,
                    block.height,
                    event.body.task_id(),
                    operator,
                    payload.executable_ref,
                    input_refs,
                    payload.resource_limit,
                    payload.method,
                    payload.params_hex,
                    EventStatus::Pending.code(),
                    now,
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn rewind_to(&self, height: Height) -> StoreResult<RewindOutcome> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let blocks_deleted = tx.execute("DELETE FROM blocks WHERE height >= ?1", params![height])?;
        let events_deleted = tx.execute(
            "DELETE FROM events WHERE height >= ?1 AND status = ?2",
            params![height, EventStatus::Pending.code()],
        )?;
        tx.commit()?;

        Ok(RewindOutcome {
            blocks_deleted: blocks_deleted as u64,
            events_deleted: events_deleted as u64,
        })
    }

    fn prune_below(&self, height: Height) -> StoreResult<u64> {
        let conn = self.conn.lock();
        let deleted = conn.execute("DELETE FROM blocks WHERE height < ?1", params![height])?;
        Ok(deleted as u64)
    }

    // Confirmations are `tip - height`: an event in the tip block has zero, so
    // with threshold 15 an event at H confirms once the tip reaches H + 15.
    fn refresh_confirmations(
        &self,
        tip: Height,
        threshold: u64,
    ) -> StoreResult<ConfirmationUpdate> {
        let now = self.clock.now();
        let pending = EventStatus::Pending.code();

        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let refreshed = tx.execute(
            "UPDATE events SET confirmations = MAX(?1 - height, 0), updated_at = ?2
             WHERE status = ?3",
            params![tip, now, pending],
        )?;
        let newly_confirmed = tx.execute(
            "UPDATE events SET status = ?1, updated_at = ?2
             WHERE status = ?3 AND confirmations >= ?4",
            params![EventStatus::Confirmed.code(), now, pending, threshold],
        )?;
        tx.commit()?;

        Ok(ConfirmationUpdate {
            refreshed: refreshed as u64,
            newly_confirmed: newly_confirmed as u64,
        })
    }

    fn next_confirmed_event(&self, kind: EventKind) -> StoreResult<Option<TaskEvent>> {
        let conn = self.conn.lock();
        let event = conn
            .query_row(
                &format!(
                    "SELECT {EVENT_COLUMNS} FROM events
                     WHERE kind = ?1 AND status = ?2
                     ORDER BY task_id ASC, id ASC LIMIT 1"
                ),
                params![kind.as_str(), EventStatus::Confirmed.code()],
                event_from_row,
            )
            .optional()?;
        Ok(event)
    }

    fn promote_event(&self, event: &TaskEvent) -> StoreResult<PromotionOutcome> {
        let now = self.clock.now();

        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let marked = tx.execute(
            "UPDATE events SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
            params![
                EventStatus::Promoted.code(),
                now,
                event.id,
                EventStatus::Confirmed.code()
            ],
        )?;
        if marked == 0 {
            return Ok(PromotionOutcome::NotConfirmed);
        }

        // Payload is copied from the event row inside the transaction.
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO execution_tasks (task_id, origin_tx_hash, operator,
                 executable_ref, input_refs, resource_limit, method, params_hex, status,
                 attempts, created_at, updated_at)
             SELECT task_id, tx_hash, operator, executable_ref, input_refs, resource_limit,
                 method, params_hex, ?1, 0, ?2, ?2
             FROM events WHERE id = ?3",
            params![TaskStatus::Created.code(), now, event.id],
        )?;
        tx.commit()?;

        Ok(if inserted == 1 {
            PromotionOutcome::Promoted {
                task_id: event.task_id,
            }
        } else {
            PromotionOutcome::DuplicateTask {
                task_id: event.task_id,
            }
        })
    }

    fn events_at(&self, height: Height) -> StoreResult<Vec<TaskEvent>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE height = ?1 ORDER BY id ASC"
        ))?;
        let events = stmt
            .query_map(params![height], event_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(events)
    }

    fn task(&self, task_id: TaskId) -> StoreResult<Option<ExecutionTask>> {
        self.query_task(
            &format!("SELECT {TASK_COLUMNS} FROM execution_tasks WHERE task_id = ?1"),
            Some(task_id),
        )
    }

    fn next_created_task(&self, after: TaskId) -> StoreResult<Option<ExecutionTask>> {
        self.query_task(
            &format!(
                "SELECT {TASK_COLUMNS} FROM execution_tasks
                 WHERE status = {} AND task_id > ?1
                 ORDER BY task_id ASC LIMIT 1",
                TaskStatus::Created.code()
            ),
            Some(after),
        )
    }

    fn next_executed_task(&self) -> StoreResult<Option<ExecutionTask>> {
        self.query_task(
            &format!(
                "SELECT {TASK_COLUMNS} FROM execution_tasks
                 WHERE status = {}
                 ORDER BY task_id ASC LIMIT 1",
                TaskStatus::Executed.code()
            ),
            None,
        )
    }

    fn record_attempt(&self, task_id: TaskId) -> StoreResult<bool> {
        let now = self.clock.now();
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE execution_tasks
             SET attempts = attempts + 1, last_attempt_at = ?1, updated_at = ?1
             WHERE task_id = ?2 AND status = ?3",
            params![now, task_id, TaskStatus::Created.code()],
        )?;
        Ok(changed == 1)
    }

    fn record_receipt(&self, task_id: TaskId, receipt: &Receipt) -> StoreResult<bool> {
        let now = self.clock.now();
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE execution_tasks
             SET status = ?1, resource_used = ?2, status_code = ?3, result_message = ?4,
                 result_ref = ?5, log_ref = ?6, updated_at = ?7
             WHERE task_id = ?8 AND status = ?9",
            params![
                TaskStatus::Executed.code(),
                receipt.resource_used,
                receipt.status_code,
                receipt.result_message,
                receipt.result_ref,
                receipt.log_ref,
                now,
                task_id,
                TaskStatus::Created.code()
            ],
        )?;
        Ok(changed == 1)
    }

    fn record_submission(&self, task_id: TaskId, tx_hash: &str) -> StoreResult<bool> {
        let now = self.clock.now();
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE execution_tasks SET status = ?1, submit_tx_hash = ?2, updated_at = ?3
             WHERE task_id = ?4 AND status = ?5",
            params![
                TaskStatus::Reported.code(),
                tx_hash,
                now,
                task_id,
                TaskStatus::Executed.code()
            ],
        )?;
        Ok(changed == 1)
    }
}
