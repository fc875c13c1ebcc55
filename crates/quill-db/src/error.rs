//! Error types for statement execution.

/// Errors that can occur while running a statement.
///
/// Driver failures (bad SQL, constraint violations, placeholder/argument
/// count mismatches) are passed through untouched in `Driver`.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// The SQLite driver rejected the statement.
    #[error("database driver error: {0}")]
    Driver(#[from] rusqlite::Error),

    /// No connection could be checked out of the pool.
    #[error("failed to acquire pooled connection: {0}")]
    Pool(#[from] r2d2::Error),

    /// The blocking task running the statement panicked or was cancelled.
    #[error("database task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
