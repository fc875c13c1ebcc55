//! Model instances.
//!
//! A [`Record`] is one row: a map from attribute name to [`Value`] plus the
//! schema it belongs to. Any key may be set, declared or not; only declared
//! attributes are written by [`Record::save`] and [`Record::update`].

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::Arc;

use quill_db::{Database, Row, Value};

use crate::error::OrmError;
use crate::schema::ModelSchema;

/// One row of a model's table.
#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<ModelSchema>,
    values: BTreeMap<String, Value>,
}

impl Record {
    /// An empty, unsaved record.
    pub fn new(schema: Arc<ModelSchema>) -> Self {
        Self {
            schema,
            values: BTreeMap::new(),
        }
    }

    /// Builds a record from a result row, renaming columns back to
    /// attributes and normalising values to each field's kind.
    pub(crate) fn from_row(schema: Arc<ModelSchema>, row: Row) -> Self {
        let mut values = BTreeMap::new();
        for (column, value) in row {
            let attr = schema.attribute_for_column(&column).to_string();
            let value = match schema.field(&attr) {
                Some(field) => field.kind().coerce(value),
                None => value,
            };
            values.insert(attr, value);
        }
        Self { schema, values }
    }

    /// Sets `key` and returns the record, for construction chains.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    /// The value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `OrmError::NoSuchAttribute` if the key has never been set.
    pub fn get(&self, key: &str) -> Result<&Value, OrmError> {
        self.values.get(key).ok_or_else(|| OrmError::NoSuchAttribute {
            model: self.schema.name().to_string(),
            key: key.to_string(),
        })
    }

    /// The value stored under `key`, or `None`.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Inserts or overwrites `key`. Undeclared keys are kept but never
    /// written to the database.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// The current value of `key`, falling back to the field's default when
    /// it is unset or `NULL`. A default that is used is stored on the record.
    pub fn value_or_default(&mut self, key: &str) -> Value {
        if let Some(value) = self.values.get(key).filter(|v| !v.is_null()) {
            return value.clone();
        }
        let Some(default) = self
            .schema
            .field(key)
            .and_then(|field| field.default_value().resolve())
        else {
            return Value::Null;
        };
        tracing::debug!(key, value = %default, "using default value");
        self.values.insert(key.to_string(), default.clone());
        default
    }

    /// Value of the primary key, if set.
    pub fn primary_key(&self) -> Option<&Value> {
        self.values.get(self.schema.primary_key())
    }

    /// The backing key → value map.
    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    pub fn into_values(self) -> BTreeMap<String, Value> {
        self.values
    }

    /// Converts the record into a typed struct through its JSON form.
    ///
    /// # Errors
    ///
    /// Returns `OrmError::Json` if the values do not fit `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, OrmError> {
        let json = serde_json::to_value(&self.values)?;
        Ok(serde_json::from_value(json)?)
    }

    /// Inserts the record.
    ///
    /// Unset fields take their declared defaults, which are also written
    /// back onto the record. Values bind in declaration order with the
    /// primary key last. An affected-row count other than 1 is logged, not
    /// returned as an error.
    ///
    /// # Errors
    ///
    /// Returns `OrmError::Database` if the statement fails.
    pub async fn save(&mut self, db: &Database) -> Result<usize, OrmError> {
        let schema = Arc::clone(&self.schema);
        let mut args: Vec<Value> = schema
            .fields()
            .iter()
            .map(|attr| self.value_or_default(attr))
            .collect();
        args.push(self.value_or_default(schema.primary_key()));

        let rows = db.execute(schema.insert_sql(), args).await?;
        if rows != 1 {
            tracing::warn!(table = schema.table(), rows, "failed to insert record");
        }
        Ok(rows)
    }

    /// Writes the current values back to the row with this primary key.
    ///
    /// No defaults are applied: unset fields are written as `NULL`. A count
    /// other than 1 is logged, not returned as an error.
    ///
    /// # Errors
    ///
    /// Returns `OrmError::Database` if the statement fails.
    pub async fn update(&self, db: &Database) -> Result<usize, OrmError> {
        let mut args: Vec<Value> = self
            .schema
            .fields()
            .iter()
            .map(|attr| self.value(attr).cloned().unwrap_or_default())
            .collect();
        args.push(self.primary_key().cloned().unwrap_or_default());

        let rows = db.execute(self.schema.update_sql(), args).await?;
        if rows != 1 {
            tracing::warn!(
                table = self.schema.table(),
                rows,
                "failed to update by primary key"
            );
        }
        Ok(rows)
    }

    /// Deletes the row with this primary key. The record itself stays
    /// usable. A count other than 1 is logged, not returned as an error.
    ///
    /// # Errors
    ///
    /// Returns `OrmError::Database` if the statement fails.
    pub async fn remove(&self, db: &Database) -> Result<usize, OrmError> {
        let args = vec![self.primary_key().cloned().unwrap_or_default()];
        let rows = db.execute(self.schema.delete_sql(), args).await?;
        if rows != 1 {
            tracing::warn!(
                table = self.schema.table(),
                rows,
                "failed to remove by primary key"
            );
        }
        Ok(rows)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.schema.name() == other.schema.name() && self.values == other.values
    }
}
