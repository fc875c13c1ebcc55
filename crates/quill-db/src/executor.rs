//! Parameterised statement execution against pooled connections.

use rusqlite::{params_from_iter, Connection};
use std::fmt;

use crate::config::DatabaseConfig;
use crate::error::DbError;
use crate::pool::{acquire, create_pool, DbPool, PoolError};
use crate::value::{Row, Value};

/// Handle to the connection pool; the entry point for all statements.
///
/// Cheap to clone: clones share the same pool.
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.pool.state();
        f.debug_struct("Database")
            .field("connections", &state.connections)
            .field("idle_connections", &state.idle_connections)
            .field("max_size", &self.pool.max_size())
            .finish()
    }
}

impl Database {
    /// Validates `config` and opens the pool.
    ///
    /// # Errors
    ///
    /// Returns `PoolError` if the settings are invalid or the initial
    /// connections cannot be opened.
    pub fn connect(config: &DatabaseConfig) -> Result<Self, PoolError> {
        Ok(Self::from_pool(create_pool(config)?))
    }

    /// Wraps an existing pool.
    pub fn from_pool(pool: DbPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Runs a read query and returns its rows in result order.
    ///
    /// `sql` uses `?` placeholders; `args` binds them in order. With
    /// `row_limit` set at most that many rows are fetched.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Pool` if no connection is available and
    /// `DbError::Driver` for anything SQLite rejects, including an argument
    /// count that does not match the placeholders.
    pub async fn query(
        &self,
        sql: &str,
        args: Vec<Value>,
        row_limit: Option<usize>,
    ) -> Result<Vec<Row>, DbError> {
        tracing::info!(sql, "SQL");
        let sql = translate_placeholders(sql);
        let lease = acquire(&self.pool).await?;

        let rows =
            tokio::task::spawn_blocking(move || fetch_rows(&lease, &sql, &args, row_limit))
                .await??;

        tracing::info!(rows = rows.len(), "rows returned");
        Ok(rows)
    }

    /// Runs an INSERT, UPDATE or DELETE and returns the affected-row count.
    ///
    /// # Errors
    ///
    /// Same as [`Database::query`]. Driver errors are returned unchanged
    /// once the connection is back in the pool.
    pub async fn execute(&self, sql: &str, args: Vec<Value>) -> Result<usize, DbError> {
        tracing::info!(sql, "SQL");
        let sql = translate_placeholders(sql);
        let lease = acquire(&self.pool).await?;

        let affected = tokio::task::spawn_blocking(move || {
            let mut stmt = lease.prepare(&sql)?;
            let affected = stmt.execute(params_from_iter(args.iter()))?;
            Ok::<_, rusqlite::Error>(affected)
        })
        .await??;

        Ok(affected)
    }

    /// Runs a script of statements that take no arguments.
    ///
    /// # Errors
    ///
    /// Same as [`Database::execute`].
    pub async fn execute_batch(&self, sql: &str) -> Result<(), DbError> {
        tracing::info!(sql, "SQL batch");
        let sql = sql.to_string();
        let lease = acquire(&self.pool).await?;
        tokio::task::spawn_blocking(move || lease.execute_batch(&sql)).await??;
        Ok(())
    }
}

fn fetch_rows(
    conn: &Connection,
    sql: &str,
    args: &[Value],
    row_limit: Option<usize>,
) -> Result<Vec<Row>, rusqlite::Error> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let mut rows = stmt.query(params_from_iter(args.iter()))?;

    let mut out = Vec::new();
    while row_limit.map_or(true, |limit| out.len() < limit) {
        let Some(row) = rows.next()? else {
            break;
        };
        let mut mapped = Row::new();
        for (idx, name) in columns.iter().enumerate() {
            mapped.insert(name.clone(), Value::from_sql_ref(row.get_ref(idx)?));
        }
        out.push(mapped);
    }
    Ok(out)
}

/// Rewrites bare `?` placeholders into SQLite's numbered `?1`, `?2`, ...
///
/// A `?` inside a quoted string or identifier is left alone. An explicit
/// `?N` is kept as written and, as in SQLite itself, the next bare `?`
/// continues from the largest index seen so far.
pub fn translate_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut quote: Option<char> = None;
    let mut next = 1usize;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
                out.push(c);
            }
            None => match c {
                '\'' | '"' | '`' => {
                    quote = Some(c);
                    out.push(c);
                }
                '?' => {
                    let mut digits = String::new();
                    while let Some(d) = chars.next_if(char::is_ascii_digit) {
                        digits.push(d);
                    }
                    out.push('?');
                    match digits.parse::<usize>() {
                        Ok(explicit) => {
                            out.push_str(&digits);
                            next = next.max(explicit.saturating_add(1));
                        }
                        Err(_) if !digits.is_empty() => out.push_str(&digits),
                        Err(_) => {
                            out.push_str(&next.to_string());
                            next += 1;
                        }
                    }
                }
                _ => out.push(c),
            },
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_bare_placeholders() {
        assert_eq!(
            translate_placeholders("select * from `t` where a=? and b = ? limit ?, ?"),
            "select * from `t` where a=?1 and b = ?2 limit ?3, ?4"
        );
    }

    #[test]
    fn leaves_quoted_question_marks() {
        assert_eq!(
            translate_placeholders("select '?', `we?rd` from t where c = ? and d = \"?\""),
            "select '?', `we?rd` from t where c = ?1 and d = \"?\""
        );
    }

    #[test]
    fn bare_placeholders_continue_after_explicit_ones() {
        assert_eq!(translate_placeholders("a=?1 and b=?"), "a=?1 and b=?2");
        assert_eq!(
            translate_placeholders("a=? and b=?3 and c=?"),
            "a=?1 and b=?3 and c=?4"
        );
    }

    #[test]
    fn escaped_quotes_stay_inside_the_literal() {
        // '' closes and reopens the literal, so the ? stays quoted.
        assert_eq!(
            translate_placeholders("select 'it''s ?' where x = ?"),
            "select 'it''s ?' where x = ?1"
        );
    }
}
