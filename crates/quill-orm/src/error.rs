//! Error types for the ORM layer.

use quill_db::DbError;

/// Errors raised while compiling a model declaration.
///
/// All of these are startup failures: a model that does not compile never
/// reaches the database.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SchemaError {
    /// A second field was marked as the primary key.
    #[error("duplicate primary key for field: {field} (model {model})")]
    DuplicatePrimaryKey {
        /// Model being declared.
        model: String,
        /// The second key field.
        field: String,
    },

    /// No field was marked as the primary key.
    #[error("primary key is not found (model {0})")]
    MissingPrimaryKey(String),

    /// A boolean or text field was marked as the primary key.
    #[error("field {field} of model {model} cannot be a primary key")]
    IneligiblePrimaryKey {
        /// Model being declared.
        model: String,
        /// The offending field.
        field: String,
    },

    /// The same attribute name was declared twice.
    #[error("duplicate field {field} in model {model}")]
    DuplicateField {
        /// Model being declared.
        model: String,
        /// The repeated attribute.
        field: String,
    },

    /// Two attributes map to the same column.
    #[error("duplicate column {column} in model {model}")]
    DuplicateColumn {
        /// Model being declared.
        model: String,
        /// The shared column name.
        column: String,
    },

    /// A model, table or column name is empty.
    #[error("empty {0} name")]
    EmptyName(&'static str),

    /// Only the primary key was declared.
    #[error("model {0} has no columns besides its primary key")]
    NoColumns(String),
}

/// Errors raised by model and record operations.
#[derive(Debug, thiserror::Error)]
pub enum OrmError {
    /// The statement failed in the database layer.
    #[error(transparent)]
    Database(#[from] DbError),

    /// The record has no value under this key.
    #[error("'{model}' object has no attribute: {key}")]
    NoSuchAttribute {
        /// Model name.
        model: String,
        /// Requested key.
        key: String,
    },

    /// A `limit` that is neither a count nor an (offset, count) pair.
    #[error("invalid limit value: {0}")]
    InvalidLimit(String),

    /// Converting a record into a typed struct failed.
    #[error("record conversion failed: {0}")]
    Json(#[from] serde_json::Error),
}
