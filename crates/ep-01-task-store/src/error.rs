//! Task store errors.

use sqlx::mysql::MySqlDatabaseError;
use thiserror::Error;

/// MySQL server error numbers worth retrying on the next tick.
const MYSQL_LOCK_WAIT_TIMEOUT: u16 = 1205;
const MYSQL_DEADLOCK: u16 = 1213;

/// Errors raised by task store adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying database rejected the operation.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The SQL server or its connection pool failed.
    #[error("SQL server error: {0}")]
    Sql(#[from] sqlx::Error),

    /// The runtime driving SQL server I/O could not be started.
    #[error("Store runtime error: {0}")]
    Runtime(String),

    /// A value does not fit a signed 64-bit column.
    #[error("{column} value {value} does not fit a database integer")]
    OutOfRange { column: &'static str, value: u64 },

    /// A column could not be encoded for storage.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The database file or its directory could not be prepared.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Neither `sqlite3` nor `mysql`.
    #[error("Unsupported database dialect: {0}")]
    UnsupportedDialect(String),

    /// The on-disk schema was written by a newer build.
    #[error("Schema version {found} is newer than supported {supported}")]
    SchemaTooNew { found: i64, supported: i64 },
}

impl StoreError {
    /// Lock contention or a dropped connection; the next tick will retry.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Database(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            StoreError::Sql(err) => is_transient_sql(err),
            _ => false,
        }
    }
}

fn is_transient_sql(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db_err) => db_err
            .try_downcast_ref::<MySqlDatabaseError>()
            .is_some_and(|e| matches!(e.number(), MYSQL_LOCK_WAIT_TIMEOUT | MYSQL_DEADLOCK)),
        _ => false,
    }
}

/// Result type for task store operations.
pub type StoreResult<T> = Result<T, StoreError>;
