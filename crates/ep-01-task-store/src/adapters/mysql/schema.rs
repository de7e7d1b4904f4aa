//! Schema migrations for the MySQL task store.
//!
//! Same ledgers and version numbering as the SQLite schema. MySQL commits DDL
//! implicitly, so each statement runs on its own and every one is idempotent;
//! processes racing through a first start converge on the same tables.

use sqlx::{MySql, Pool};

use crate::adapters::sqlite::SCHEMA_VERSION;
use crate::error::{StoreError, StoreResult};

const CREATE_MIGRATIONS: &str = "
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    BIGINT       NOT NULL PRIMARY KEY,
    name       VARCHAR(128) NOT NULL,
    applied_at BIGINT       NOT NULL
) ENGINE=InnoDB";

const MIGRATION_V1: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS blocks (
        height      BIGINT       NOT NULL PRIMARY KEY,
        block_hash  VARCHAR(128) NOT NULL,
        parent_hash VARCHAR(128) NOT NULL,
        block_time  BIGINT       NOT NULL,
        observed_at BIGINT       NOT NULL
    ) ENGINE=InnoDB",
    "CREATE TABLE IF NOT EXISTS events (
        id             BIGINT       NOT NULL AUTO_INCREMENT PRIMARY KEY,
        kind           VARCHAR(64)  NOT NULL,
        block_hash     VARCHAR(128) NOT NULL,
        tx_hash        VARCHAR(128) NOT NULL,
        height         BIGINT       NOT NULL,
        task_id        BIGINT       NOT NULL,
        operator       VARCHAR(255) NOT NULL,
        executable_ref TEXT         NOT NULL,
        input_refs     TEXT         NOT NULL,
        resource_limit BIGINT       NOT NULL,
        method         VARCHAR(255) NOT NULL,
        params_hex     TEXT         NOT NULL,
        status         BIGINT       NOT NULL,
        confirmations  BIGINT       NOT NULL DEFAULT 0,
        created_at     BIGINT       NOT NULL,
        updated_at     BIGINT       NOT NULL,
        INDEX idx_events_status_height (status, height),
        INDEX idx_events_kind_status_task (kind, status, task_id)
    ) ENGINE=InnoDB",
    "CREATE TABLE IF NOT EXISTS execution_tasks (
        task_id         BIGINT       NOT NULL PRIMARY KEY,
        origin_tx_hash  VARCHAR(128) NOT NULL,
        operator        VARCHAR(255) NOT NULL,
        executable_ref  TEXT         NOT NULL,
        input_refs      TEXT         NOT NULL,
        resource_limit  BIGINT       NOT NULL,
        method          VARCHAR(255) NOT NULL,
        params_hex      TEXT         NOT NULL,
        resource_used   BIGINT       NULL,
        status_code     BIGINT       NULL,
        result_message  TEXT         NULL,
        result_ref      TEXT         NULL,
        log_ref         TEXT         NULL,
        submit_tx_hash  VARCHAR(128) NULL,
        status          BIGINT       NOT NULL,
        attempts        BIGINT       NOT NULL DEFAULT 0,
        last_attempt_at BIGINT       NULL,
        created_at      BIGINT       NOT NULL,
        updated_at      BIGINT       NOT NULL,
        INDEX idx_tasks_status_task (status, task_id)
    ) ENGINE=InnoDB",
];

/// Bring the schema up to [`SCHEMA_VERSION`].
pub async fn migrate(pool: &Pool<MySql>, now: i64) -> StoreResult<()> {
    sqlx::query(CREATE_MIGRATIONS).execute(pool).await?;

    let current = current_version(pool).await?;
    if current > SCHEMA_VERSION {
        return Err(StoreError::SchemaTooNew {
            found: current,
            supported: SCHEMA_VERSION,
        });
    }

    if current < 1 {
        for statement in MIGRATION_V1 {
            sqlx::query(statement).execute(pool).await?;
        }
        record_migration(pool, 1, "baseline_ledgers", now).await?;
    }
    Ok(())
}

pub async fn current_version(pool: &Pool<MySql>) -> StoreResult<i64> {
    let version: Option<i64> = sqlx::query_scalar("SELECT MAX(version) FROM schema_migrations")
        .fetch_one(pool)
        .await?;
    Ok(version.unwrap_or(0))
}

async fn record_migration(pool: &Pool<MySql>, version: i64, name: &str, now: i64) -> StoreResult<()> {
    sqlx::query("INSERT IGNORE INTO schema_migrations (version, name, applied_at) VALUES (?, ?, ?)")
        .bind(version)
        .bind(name)
        .bind(now)
        .execute(pool)
        .await?;
    Ok(())
}
