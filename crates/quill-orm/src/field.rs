//! Column descriptors.

use quill_db::Value;
use std::fmt;
use std::sync::Arc;

/// The semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// Short string, `varchar(100)` unless overridden.
    String,
    /// `boolean`, stored as 0/1.
    Boolean,
    /// `bigint`.
    Integer,
    /// `real`.
    Float,
    /// Unbounded `text`.
    Text,
}

impl ColumnKind {
    /// Default DDL type for the kind.
    pub fn default_column_type(self) -> &'static str {
        match self {
            Self::String => "varchar(100)",
            Self::Boolean => "boolean",
            Self::Integer => "bigint",
            Self::Float => "real",
            Self::Text => "text",
        }
    }

    /// Whether a field of this kind may be the primary key.
    pub fn can_be_primary_key(self) -> bool {
        matches!(self, Self::String | Self::Integer | Self::Float)
    }

    /// Descriptor name used in diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            Self::String => "StringField",
            Self::Boolean => "BooleanField",
            Self::Integer => "IntegerField",
            Self::Float => "FloatField",
            Self::Text => "TextField",
        }
    }

    /// Normalises a value read back from SQLite to this kind.
    ///
    /// SQLite has no boolean storage class and may hand back an integer for
    /// a `real` column, so those two are converted. Everything else is
    /// returned unchanged.
    #[allow(clippy::cast_precision_loss)]
    pub fn coerce(self, value: Value) -> Value {
        match (self, value) {
            (Self::Boolean, Value::Integer(i)) => Value::Bool(i != 0),
            (Self::Float, Value::Integer(i)) => Value::Float(i as f64),
            (_, other) => other,
        }
    }
}

/// A lazily evaluated default.
#[derive(Clone, Default)]
pub enum FieldDefault {
    /// No default: unset values are written as `NULL`.
    #[default]
    None,
    /// A fixed value.
    Value(Value),
    /// Called each time a default is needed.
    Generator(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl FieldDefault {
    /// Produces the default, calling the generator if there is one.
    pub fn resolve(&self) -> Option<Value> {
        match self {
            Self::None => None,
            Self::Value(v) => Some(v.clone()),
            Self::Generator(f) => Some(f()),
        }
    }
}

impl fmt::Debug for FieldDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Generator(_) => f.write_str("Generator(..)"),
        }
    }
}

/// Describes one column: kind, name, key status and default.
///
/// Built with one of the kind constructors and refined with the builder
/// methods. Once handed to a [`SchemaBuilder`](crate::SchemaBuilder) it is
/// never changed.
#[derive(Debug, Clone)]
pub struct Field {
    name: Option<String>,
    kind: ColumnKind,
    column_type: String,
    primary_key: bool,
    default: FieldDefault,
}

impl Field {
    fn of(kind: ColumnKind, default: FieldDefault) -> Self {
        Self {
            name: None,
            kind,
            column_type: kind.default_column_type().to_string(),
            primary_key: false,
            default,
        }
    }

    /// A `varchar(100)` column with no default.
    pub fn string() -> Self {
        Self::of(ColumnKind::String, FieldDefault::None)
    }

    /// A boolean column defaulting to `false`.
    pub fn boolean() -> Self {
        Self::of(ColumnKind::Boolean, FieldDefault::Value(Value::Bool(false)))
    }

    /// A `bigint` column defaulting to `0`.
    pub fn integer() -> Self {
        Self::of(ColumnKind::Integer, FieldDefault::Value(Value::Integer(0)))
    }

    /// A `real` column defaulting to `0.0`.
    pub fn float() -> Self {
        Self::of(ColumnKind::Float, FieldDefault::Value(Value::Float(0.0)))
    }

    /// A `text` column with no default.
    pub fn text() -> Self {
        Self::of(ColumnKind::Text, FieldDefault::None)
    }

    /// Marks the field as the primary key.
    ///
    /// Only string, integer and float fields qualify; schema compilation
    /// rejects the others.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Uses `column` instead of the attribute name in SQL.
    #[must_use]
    pub fn named(mut self, column: impl Into<String>) -> Self {
        self.name = Some(column.into());
        self
    }

    /// Overrides the DDL type, e.g. `varchar(50)`.
    #[must_use]
    pub fn column_type(mut self, ddl: impl Into<String>) -> Self {
        self.column_type = ddl.into();
        self
    }

    /// Sets a fixed default.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = FieldDefault::Value(value.into());
        self
    }

    /// Sets a default produced on demand.
    #[must_use]
    pub fn default_with<F>(mut self, generator: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = FieldDefault::Generator(Arc::new(generator));
        self
    }

    /// Removes any default.
    #[must_use]
    pub fn no_default(mut self) -> Self {
        self.default = FieldDefault::None;
        self
    }

    /// Explicit column name, if one was given.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn ddl_type(&self) -> &str {
        &self.column_type
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn default_value(&self) -> &FieldDefault {
        &self.default
    }

    pub(crate) fn set_name_if_missing(&mut self, attr: &str) {
        if self.name.is_none() {
            self.name = Some(attr.to_string());
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{}, {}: {}>",
            self.kind.label(),
            self.column_type,
            self.name.as_deref().unwrap_or("?")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_constructors_fix_type_and_default() {
        let f = Field::string();
        assert_eq!(f.ddl_type(), "varchar(100)");
        assert!(f.default_value().resolve().is_none());

        assert_eq!(Field::boolean().default_value().resolve(), Some(Value::Bool(false)));
        assert_eq!(Field::integer().ddl_type(), "bigint");
        assert_eq!(Field::integer().default_value().resolve(), Some(Value::Integer(0)));
        assert_eq!(Field::float().ddl_type(), "real");
        assert_eq!(Field::float().default_value().resolve(), Some(Value::Float(0.0)));
        assert_eq!(Field::text().ddl_type(), "text");
        assert!(!Field::text().is_primary_key());
    }

    #[test]
    fn generator_is_called_on_every_resolve() {
        use std::sync::atomic::{AtomicI64, Ordering};
        static COUNTER: AtomicI64 = AtomicI64::new(0);

        let f = Field::integer().default_with(|| Value::Integer(COUNTER.fetch_add(1, Ordering::SeqCst)));
        assert_eq!(f.default_value().resolve(), Some(Value::Integer(0)));
        assert_eq!(f.default_value().resolve(), Some(Value::Integer(1)));
    }

    #[test]
    fn display_names_kind_type_and_column() {
        let f = Field::string().column_type("varchar(50)").named("email");
        assert_eq!(f.to_string(), "<StringField, varchar(50): email>");
    }

    #[test]
    fn coerce_restores_booleans_and_floats() {
        assert_eq!(ColumnKind::Boolean.coerce(Value::Integer(1)), Value::Bool(true));
        assert_eq!(ColumnKind::Boolean.coerce(Value::Integer(0)), Value::Bool(false));
        assert_eq!(ColumnKind::Float.coerce(Value::Integer(3)), Value::Float(3.0));
        assert_eq!(ColumnKind::Integer.coerce(Value::Null), Value::Null);
    }
}
