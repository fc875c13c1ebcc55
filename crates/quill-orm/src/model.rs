//! Table-level operations.

use std::sync::Arc;

use quill_db::{Database, Value};

use crate::error::{OrmError, SchemaError};
use crate::limit::FindAll;
use crate::record::Record;
use crate::schema::{quote, ModelSchema, SchemaBuilder};

/// A registered model: the compiled schema plus the lookups that act on the
/// whole table. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Model {
    schema: Arc<ModelSchema>,
}

impl Model {
    /// Compiles a declaration. Call once per model at startup.
    ///
    /// # Errors
    ///
    /// Returns the [`SchemaError`] from [`SchemaBuilder::build`].
    pub fn register(builder: SchemaBuilder) -> Result<Self, SchemaError> {
        let schema = builder.build()?;
        tracing::info!(
            model = schema.name(),
            table = schema.table(),
            primary_key = schema.primary_key(),
            fields = schema.fields().len(),
            "registered model"
        );
        Ok(Self {
            schema: Arc::new(schema),
        })
    }

    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    /// A new, unsaved record.
    pub fn record(&self) -> Record {
        Record::new(Arc::clone(&self.schema))
    }

    /// A new, unsaved record holding `values`.
    pub fn record_from<I, K, V>(&self, values: I) -> Record
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut record = self.record();
        for (key, value) in values {
            record.set(key, value);
        }
        record
    }

    /// Looks a row up by primary key.
    ///
    /// # Errors
    ///
    /// Returns `OrmError::Database` if the query fails.
    pub async fn find(
        &self,
        db: &Database,
        primary_key: impl Into<Value>,
    ) -> Result<Option<Record>, OrmError> {
        let sql = format!(
            "{} where {}=?",
            self.schema.select_sql(),
            quote(self.schema.column(self.schema.primary_key()))
        );
        let mut rows = db.query(&sql, vec![primary_key.into()], Some(1)).await?;
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(Record::from_row(
            Arc::clone(&self.schema),
            rows.swap_remove(0),
        )))
    }

    /// Returns every row matching `options`, in result order.
    ///
    /// # Errors
    ///
    /// Returns `OrmError::Database` if the query fails.
    pub async fn find_all(&self, db: &Database, options: FindAll) -> Result<Vec<Record>, OrmError> {
        let (sql, args) = options.compose(self.schema.select_sql());
        let rows = db.query(&sql, args, None).await?;
        Ok(rows
            .into_iter()
            .map(|row| Record::from_row(Arc::clone(&self.schema), row))
            .collect())
    }

    /// Evaluates an aggregate such as `count(id)` over the table.
    ///
    /// Returns the single result value, or `None` if no row came back.
    ///
    /// # Errors
    ///
    /// Returns `OrmError::Database` if the query fails.
    pub async fn count_field(
        &self,
        db: &Database,
        expression: &str,
        filter: Option<&str>,
        args: Vec<Value>,
    ) -> Result<Option<Value>, OrmError> {
        let mut sql = format!(
            "select {expression} __num__ from {}",
            quote(self.schema.table())
        );
        if let Some(filter) = filter {
            sql.push_str(" where ");
            sql.push_str(filter);
        }
        let mut rows = db.query(&sql, args, Some(1)).await?;
        Ok(rows.pop().and_then(|mut row| row.remove("__num__")))
    }
}
