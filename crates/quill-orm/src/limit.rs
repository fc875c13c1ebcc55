//! Query options for [`Model::find_all`](crate::Model::find_all).

use quill_db::Value;

use crate::error::OrmError;

/// A `limit` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// `limit ?`: at most this many rows.
    Count(i64),
    /// `limit ?, ?`: skip `offset` rows, then take `count`.
    Range {
        /// Rows to skip.
        offset: i64,
        /// Rows to return.
        count: i64,
    },
}

impl Limit {
    /// The clause text and the values it binds.
    pub(crate) fn clause(self) -> (&'static str, Vec<Value>) {
        match self {
            Self::Count(n) => ("?", vec![Value::Integer(n)]),
            Self::Range { offset, count } => {
                ("?, ?", vec![Value::Integer(offset), Value::Integer(count)])
            }
        }
    }
}

impl From<i64> for Limit {
    fn from(count: i64) -> Self {
        Self::Count(count)
    }
}

impl From<(i64, i64)> for Limit {
    fn from((offset, count): (i64, i64)) -> Self {
        Self::Range { offset, count }
    }
}

/// Parses an untyped limit, as it arrives from request parameters: an
/// integer, or a two-element array of integers `[offset, count]`.
impl TryFrom<&serde_json::Value> for Limit {
    type Error = OrmError;

    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        let invalid = || OrmError::InvalidLimit(value.to_string());
        match value {
            serde_json::Value::Number(n) => n.as_i64().map(Self::Count).ok_or_else(invalid),
            serde_json::Value::Array(items) if items.len() == 2 => {
                match (items[0].as_i64(), items[1].as_i64()) {
                    (Some(offset), Some(count)) => Ok(Self::Range { offset, count }),
                    _ => Err(invalid()),
                }
            }
            _ => Err(invalid()),
        }
    }
}

/// Filter, ordering and limit for a multi-row lookup.
///
/// `filter` and `order_by` are raw SQL fragments appended after `where` and
/// `order by`. They are trusted text from application code; values always
/// go through `args`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindAll {
    /// `where` fragment with `?` placeholders.
    pub filter: Option<String>,
    /// Values for the placeholders in `filter`.
    pub args: Vec<Value>,
    /// `order by` fragment.
    pub order_by: Option<String>,
    /// Row limit.
    pub limit: Option<Limit>,
}

impl FindAll {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `where` fragment and its arguments.
    #[must_use]
    pub fn filter<I, V>(mut self, clause: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.filter = Some(clause.into());
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn order_by(mut self, clause: impl Into<String>) -> Self {
        self.order_by = Some(clause.into());
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: impl Into<Limit>) -> Self {
        self.limit = Some(limit.into());
        self
    }

    /// Sets the limit from an untyped value.
    ///
    /// # Errors
    ///
    /// Returns `OrmError::InvalidLimit` naming the value when it is neither
    /// an integer nor an `[offset, count]` pair.
    pub fn limit_value(mut self, value: &serde_json::Value) -> Result<Self, OrmError> {
        self.limit = Some(Limit::try_from(value)?);
        Ok(self)
    }

    /// Appends the optional clauses to `select` and returns the statement
    /// with its arguments.
    pub(crate) fn compose(self, select: &str) -> (String, Vec<Value>) {
        let mut sql = vec![select.to_string()];
        let mut args = self.args;

        if let Some(filter) = self.filter {
            sql.push("where".to_string());
            sql.push(filter);
        }
        if let Some(order_by) = self.order_by {
            sql.push("order by".to_string());
            sql.push(order_by);
        }
        if let Some(limit) = self.limit {
            let (clause, values) = limit.clause();
            sql.push("limit".to_string());
            sql.push(clause.to_string());
            args.extend(values);
        }
        (sql.join(" "), args)
    }
}
