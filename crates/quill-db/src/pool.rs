//! Connection pool creation and connection leasing.

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use std::time::Duration;
use thiserror::Error;

use crate::config::{ConfigError, DatabaseConfig};
use crate::error::DbError;

/// A type alias for the SQLite connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// An exclusively owned connection checked out of the pool.
///
/// Dropping the lease hands the connection back.
pub type Lease = PooledConnection<SqliteConnectionManager>;

/// r2d2 always applies a deadline; this one stands in for "no timeout".
const UNBOUNDED_WAIT: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// Errors that can occur when creating the database pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The configuration failed validation.
    #[error("invalid database configuration: {0}")]
    Config(#[from] ConfigError),

    /// Failed to build the connection pool.
    #[error("failed to create database connection pool: {0}")]
    PoolInit(#[from] r2d2::Error),
}

/// Creates a new SQLite connection pool from validated settings.
///
/// Every connection the pool opens runs in WAL mode with foreign keys on,
/// the configured busy timeout, and the encoding derived from `charset`.
/// The pool keeps `min_size` idle connections and opens at most `max_size`.
///
/// # Errors
///
/// Returns `PoolError::Config` if the settings are incomplete and
/// `PoolError::PoolInit` if the initial connections cannot be opened.
pub fn create_pool(config: &DatabaseConfig) -> Result<DbPool, PoolError> {
    config.validate()?;
    let encoding = config.sqlite_encoding()?;
    let busy_timeout_ms = config.busy_timeout_ms;

    tracing::info!(
        host = %config.host,
        port = config.port,
        user = config.user.as_deref().unwrap_or_default(),
        database = config.database_path(),
        min_size = config.min_size,
        max_size = config.max_size,
        "create database connection pool"
    );

    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;

    let manager = SqliteConnectionManager::file(config.database_path())
        .with_flags(flags)
        .with_init(move |conn| {
            // Encoding only takes effect before the first table is created.
            conn.execute_batch(&format!("PRAGMA encoding = '{encoding}';"))?;

            // In-memory databases report "memory" instead of "wal".
            let journal_mode: String =
                conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
            if journal_mode != "wal" && journal_mode != "memory" {
                return Err(rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
                    Some(format!(
                        "failed to set WAL journal mode, got: {journal_mode}"
                    )),
                ));
            }
            conn.execute_batch(&format!(
                "PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = {busy_timeout_ms};"
            ))
        });

    let pool = Pool::builder()
        .max_size(config.max_size)
        .min_idle(Some(config.min_size))
        .connection_timeout(
            config
                .acquire_timeout_ms
                .map_or(UNBOUNDED_WAIT, Duration::from_millis),
        )
        .build(manager)?;

    Ok(pool)
}

/// Checks a connection out of the pool without blocking the async worker.
///
/// Waits until a connection is free. r2d2 opens a new one when the pool is
/// below `max_size` and otherwise queues the caller until a lease is
/// dropped. Only a configured `acquire_timeout_ms` ends the wait early.
///
/// # Errors
///
/// Returns `DbError::Pool` when a configured acquire timeout passes or a
/// connection cannot be opened.
pub async fn acquire(pool: &DbPool) -> Result<Lease, DbError> {
    let pool = pool.clone();
    let lease = tokio::task::spawn_blocking(move || pool.get()).await??;
    Ok(lease)
}
