//! Schema migrations for the SQLite task store.
//!
//! Applied migrations are recorded in `schema_migrations`; opening a database
//! written by a newer build is refused.

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{StoreError, StoreResult};

/// Highest migration this build knows how to apply.
pub const SCHEMA_VERSION: i64 = 1;

const MIGRATION_V1: &str = "
CREATE TABLE IF NOT EXISTS blocks (
    height      INTEGER PRIMARY KEY,
    block_hash  TEXT    NOT NULL,
    parent_hash TEXT    NOT NULL,
    block_time  INTEGER NOT NULL,
    observed_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS events (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    kind           TEXT    NOT NULL,
    block_hash     TEXT    NOT NULL,
    tx_hash        TEXT    NOT NULL,
    height         INTEGER NOT NULL,
    task_id        INTEGER NOT NULL,
    operator       TEXT    NOT NULL,
    executable_ref TEXT    NOT NULL,
    input_refs     TEXT    NOT NULL,
    resource_limit INTEGER NOT NULL,
    method         TEXT    NOT NULL,
    params_hex     TEXT    NOT NULL,
    status         INTEGER NOT NULL,
    confirmations  INTEGER NOT NULL DEFAULT 0,
    created_at     INTEGER NOT NULL,
    updated_at     INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_events_status_height ON events (status, height);
CREATE INDEX IF NOT EXISTS idx_events_kind_status_task ON events (kind, status, task_id);

CREATE TABLE IF NOT EXISTS execution_tasks (
    task_id         INTEGER PRIMARY KEY,
    origin_tx_hash  TEXT    NOT NULL,
    operator        TEXT    NOT NULL,
    executable_ref  TEXT    NOT NULL,
    input_refs      TEXT    NOT NULL,
    resource_limit  INTEGER NOT NULL,
    method          TEXT    NOT NULL,
    params_hex      TEXT    NOT NULL,
    resource_used   INTEGER,
    status_code     INTEGER,
    result_message  TEXT,
    result_ref      TEXT,
    log_ref         TEXT,
    submit_tx_hash  TEXT,
    status          INTEGER NOT NULL,
    attempts        INTEGER NOT NULL DEFAULT 0,
    last_attempt_at INTEGER,
    created_at      INTEGER NOT NULL,
    updated_at      INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_tasks_status_task ON execution_tasks (status, task_id);
";

/// Bring the schema up to [`SCHEMA_VERSION`].
pub fn migrate(conn: &Connection, now: i64) -> StoreResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            name       TEXT    NOT NULL,
            applied_at INTEGER NOT NULL
        );",
    )?;

    let current = current_version(conn)?;
    if current > SCHEMA_VERSION {
        return Err(StoreError::SchemaTooNew {
            found: current,
            supported: SCHEMA_VERSION,
        });
    }

    if current < 1 {
        conn.execute_batch(MIGRATION_V1)?;
        record_migration(conn, 1, "baseline_ledgers", now)?;
    }
    Ok(())
}

pub fn current_version(conn: &Connection) -> StoreResult<i64> {
    let version = conn
        .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get::<_, Option<i64>>(0)
        })
        .optional()?
        .flatten();
    Ok(version.unwrap_or(0))
}

fn record_migration(conn: &Connection, version: i64, name: &str, now: i64) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
        params![version, name, now],
    )?;
    Ok(())
}
