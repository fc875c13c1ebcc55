//! Database layer for quill.
//!
//! Provides the pooled SQLite connection handle, the statement executor used
//! by the ORM, and the scalar value types that cross the row boundary.
//!
//! # Design decisions
//!
//! - **Explicit handle, no global pool**: a [`Database`] is built once from a
//!   validated [`DatabaseConfig`] and passed by reference to every data-access
//!   call. Nothing can reach the database before the pool exists.
//! - **`r2d2` connection pool**: bounded connection reuse; a checked-out
//!   connection is owned by exactly one caller and goes back to the pool when
//!   the lease is dropped, whether the statement succeeded or not.
//! - **Blocking driver, async surface**: `rusqlite` is synchronous, so both
//!   the lease checkout and the statement round trip run under
//!   `tokio::task::spawn_blocking`. Other tasks keep running while a caller
//!   waits on either.
//! - **`?` templates**: callers write positional `?` placeholders; the
//!   executor numbers them (`?1`, `?2`, ...) before handing SQL to SQLite.

mod config;
mod error;
mod executor;
mod pool;
mod value;

pub use config::{ConfigError, DatabaseConfig};
pub use error::DbError;
pub use executor::{translate_placeholders, Database};
pub use pool::{acquire, create_pool, DbPool, Lease, PoolError};
pub use value::{Row, Value};
