//! Row mapping between MySQL and the shared entities.
//!
//! Integer columns are signed `BIGINT`; unsigned fields are read as `i64` and
//! converted, so a negative value surfaces as a decode error.

use sqlx::error::BoxDynError;
use sqlx::mysql::MySqlRow;
use sqlx::Row;
use shared_types::{
    BlockRecord, EventKind, EventStatus, ExecutionTask, Receipt, TaskEvent, TaskPayload,
    TaskStatus,
};

fn decode_error(index: usize, source: impl Into<BoxDynError>) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: index.to_string(),
        source: source.into(),
    }
}

fn unsigned<T: TryFrom<i64>>(row: &MySqlRow, index: usize) -> sqlx::Result<T>
where
    T::Error: std::error::Error + Send + Sync + 'static,
{
    let value: i64 = row.try_get(index)?;
    T::try_from(value).map_err(|e| decode_error(index, e))
}

fn input_refs_at(row: &MySqlRow, index: usize) -> sqlx::Result<Vec<String>> {
    let raw: String = row.try_get(index)?;
    serde_json::from_str(&raw).map_err(|e| decode_error(index, e))
}

pub fn block_from_row(row: &MySqlRow) -> sqlx::Result<BlockRecord> {
    Ok(BlockRecord {
        height: unsigned(row, 0)?,
        block_hash: row.try_get(1)?,
        parent_hash: row.try_get(2)?,
        block_time: row.try_get(3)?,
        observed_at: row.try_get(4)?,
    })
}

pub fn event_from_row(row: &MySqlRow) -> sqlx::Result<TaskEvent> {
    let kind = row
        .try_get::<String, _>(1)?
        .parse::<EventKind>()
        .map_err(|e| decode_error(1, e))?;
    let status = EventStatus::try_from(row.try_get::<i64, _>(12)?).map_err(|e| decode_error(12, e))?;

    Ok(TaskEvent {
        id: row.try_get(0)?,
        kind,
        block_hash: row.try_get(2)?,
        tx_hash: row.try_get(3)?,
        height: unsigned(row, 4)?,
        task_id: unsigned(row, 5)?,
        operator: row.try_get(6)?,
        payload: TaskPayload {
            executable_ref: row.try_get(7)?,
            input_refs: input_refs_at(row, 8)?,
            resource_limit: unsigned(row, 9)?,
            method: row.try_get(10)?,
            params_hex: row.try_get(11)?,
        },
        status,
        confirmations: unsigned(row, 13)?,
        created_at: row.try_get(14)?,
        updated_at: row.try_get(15)?,
    })
}

pub fn task_from_row(row: &MySqlRow) -> sqlx::Result<ExecutionTask> {
    let status = TaskStatus::try_from(row.try_get::<i64, _>(14)?).map_err(|e| decode_error(14, e))?;

    // Receipt columns are written together, so resource_used alone marks presence.
    let receipt = match row.try_get::<Option<i64>, _>(8)? {
        Some(resource_used) => Some(Receipt {
            resource_used: u64::try_from(resource_used).map_err(|e| decode_error(8, e))?,
            status_code: match row.try_get::<Option<i64>, _>(9)? {
                Some(code) => u32::try_from(code).map_err(|e| decode_error(9, e))?,
                None => 0,
            },
            result_message: row.try_get::<Option<String>, _>(10)?.unwrap_or_default(),
            result_ref: row.try_get::<Option<String>, _>(11)?.unwrap_or_default(),
            log_ref: row.try_get::<Option<String>, _>(12)?.unwrap_or_default(),
        }),
        None => None,
    };

    Ok(ExecutionTask {
        task_id: unsigned(row, 0)?,
        origin_tx_hash: row.try_get(1)?,
        operator: row.try_get(2)?,
        payload: TaskPayload {
            executable_ref: row.try_get(3)?,
            input_refs: input_refs_at(row, 4)?,
            resource_limit: unsigned(row, 5)?,
            method: row.try_get(6)?,
            params_hex: row.try_get(7)?,
        },
        receipt,
        submit_tx_hash: row.try_get(13)?,
        status,
        attempts: unsigned(row, 15)?,
        last_attempt_at: row.try_get(16)?,
        created_at: row.try_get(17)?,
        updated_at: row.try_get(18)?,
    })
}
