//! Row mapping between SQLite and the shared entities.

use rusqlite::types::Type;
use rusqlite::Row;
use shared_types::{
    BlockRecord, EventKind, EventStatus, ExecutionTask, Receipt, TaskEvent, TaskPayload,
    TaskStatus,
};

pub use crate::adapters::columns::{BLOCK_COLUMNS, EVENT_COLUMNS, TASK_COLUMNS};

fn conversion_error<E>(idx: usize, ty: Type, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, ty, Box::new(err))
}

fn input_refs_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| conversion_error(idx, Type::Text, e))
}

pub fn block_from_row(row: &Row<'_>) -> rusqlite::Result<BlockRecord> {
    Ok(BlockRecord {
        height: row.get(0)?,
        block_hash: row.get(1)?,
        parent_hash: row.get(2)?,
        block_time: row.get(3)?,
        observed_at: row.get(4)?,
    })
}

pub fn event_from_row(row: &Row<'_>) -> rusqlite::Result<TaskEvent> {
    let kind = row
        .get::<_, String>(1)?
        .parse::<EventKind>()
        .map_err(|e| conversion_error(1, Type::Text, e))?;
    let status = EventStatus::try_from(row.get::<_, i64>(12)?)
        .map_err(|e| conversion_error(12, Type::Integer, e))?;

    Ok(TaskEvent {
        id: row.get(0)?,
        kind,
        block_hash: row.get(2)?,
        tx_hash: row.get(3)?,
        height: row.get(4)?,
        task_id: row.get(5)?,
        operator: row.get(6)?,
        payload: TaskPayload {
            executable_ref: row.get(7)?,
            input_refs: input_refs_at(row, 8)?,
            resource_limit: row.get(9)?,
            method: row.get(10)?,
            params_hex: row.get(11)?,
        },
        status,
        confirmations: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

pub fn task_from_row(row: &Row<'_>) -> rusqlite::Result<ExecutionTask> {
    let status = TaskStatus::try_from(row.get::<_, i64>(14)?)
        .map_err(|e| conversion_error(14, Type::Integer, e))?;

    // Receipt columns are written together, so resource_used alone marks presence.
    let receipt = match row.get::<_, Option<u64>>(8)? {
        Some(resource_used) => Some(Receipt {
            resource_used,
            status_code: row.get::<_, Option<u32>>(9)?.unwrap_or_default(),
            result_message: row.get::<_, Option<String>>(10)?.unwrap_or_default(),
            result_ref: row.get::<_, Option<String>>(11)?.unwrap_or_default(),
            log_ref: row.get::<_, Option<String>>(12)?.unwrap_or_default(),
        }),
        None => None,
    };

    Ok(ExecutionTask {
        task_id: row.get(0)?,
        origin_tx_hash: row.get(1)?,
        operator: row.get(2)?,
        payload: TaskPayload {
            executable_ref: row.get(3)?,
            input_refs: input_refs_at(row, 4)?,
            resource_limit: row.get(5)?,
            method: row.get(6)?,
            params_hex: row.get(7)?,
        },
        receipt,
        submit_tx_hash: row.get(13)?,
        status,
        attempts: row.get(15)?,
        last_attempt_at: row.get(16)?,
        created_at: row.get(17)?,
        updated_at: row.get(18)?,
    })
}
