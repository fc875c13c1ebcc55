//! Model declarations and statement templates.
//!
//! A [`SchemaBuilder`] collects the table name and field descriptors of one
//! model; [`SchemaBuilder::build`] validates them and produces an immutable
//! [`ModelSchema`] holding the four statement templates every CRUD call
//! reuses. Templates use `?` placeholders and backtick-quoted identifiers.

use std::collections::{HashMap, HashSet};

use crate::error::SchemaError;
use crate::field::Field;

/// Compiled metadata for one model type.
#[derive(Debug, Clone)]
pub struct ModelSchema {
    name: String,
    table: String,
    mappings: HashMap<String, Field>,
    primary_key: String,
    fields: Vec<String>,
    select: String,
    insert: String,
    update: String,
    delete: String,
}

/// Collects a model declaration before compilation.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    table: Option<String>,
    declared: Vec<(String, Field)>,
}

impl ModelSchema {
    /// Starts a declaration for the model called `name`.
    ///
    /// The table name defaults to `name`.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            table: None,
            declared: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Attribute name of the primary key.
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Non-key attribute names in declaration order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Descriptor for `attr`, if declared.
    pub fn field(&self, attr: &str) -> Option<&Field> {
        self.mappings.get(attr)
    }

    /// All declared attributes and their descriptors.
    pub fn mappings(&self) -> &HashMap<String, Field> {
        &self.mappings
    }

    /// Column name for a declared attribute; falls back to `attr` itself.
    pub fn column<'a>(&'a self, attr: &'a str) -> &'a str {
        self.mappings
            .get(attr)
            .and_then(Field::name)
            .unwrap_or(attr)
    }

    /// Attribute name for a result column; unknown columns map to
    /// themselves.
    pub fn attribute_for_column<'a>(&'a self, column: &'a str) -> &'a str {
        if self.mappings.contains_key(column) && self.column(column) == column {
            return column;
        }
        self.mappings
            .iter()
            .find(|(_, field)| field.name() == Some(column))
            .map_or(column, |(attr, _)| attr.as_str())
    }

    /// `select <pk>, <fields...> from <table>`; filters are appended.
    pub fn select_sql(&self) -> &str {
        &self.select
    }

    /// `insert into <table> (<fields...>, <pk>) values (?, ...)`.
    pub fn insert_sql(&self) -> &str {
        &self.insert
    }

    /// `update <table> set <field>=?, ... where <pk> = ?`.
    pub fn update_sql(&self) -> &str {
        &self.update
    }

    /// `delete from <table> where <pk>=?`.
    pub fn delete_sql(&self) -> &str {
        &self.delete
    }

    /// Renders `create table if not exists` DDL from the descriptors.
    pub fn create_table_sql(&self) -> String {
        let mut columns = vec![format!(
            "{} {} not null",
            quote(self.column(&self.primary_key)),
            self.mappings[&self.primary_key].ddl_type()
        )];
        for attr in &self.fields {
            columns.push(format!(
                "{} {}",
                quote(self.column(attr)),
                self.mappings[attr].ddl_type()
            ));
        }
        columns.push(format!(
            "primary key ({})",
            quote(self.column(&self.primary_key))
        ));
        format!(
            "create table if not exists {} ({})",
            quote(&self.table),
            columns.join(", ")
        )
    }
}

impl SchemaBuilder {
    /// Overrides the table name.
    #[must_use]
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Declares an attribute. Order matters: it is the binding order of the
    /// insert and update templates.
    #[must_use]
    pub fn field(mut self, attr: impl Into<String>, field: Field) -> Self {
        self.declared.push((attr.into(), field));
        self
    }

    /// Validates the declaration and precompiles the statement templates.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] for an empty name, a repeated attribute or
    /// column, zero or several primary keys, a boolean/text primary key, or a model
    /// with nothing but a key.
    pub fn build(self) -> Result<ModelSchema, SchemaError> {
        if self.name.trim().is_empty() {
            return Err(SchemaError::EmptyName("model"));
        }
        let table = self.table.unwrap_or_else(|| self.name.clone());
        if table.trim().is_empty() {
            return Err(SchemaError::EmptyName("table"));
        }
        tracing::debug!(model = %self.name, table = %table, "found model");

        let mut mappings = HashMap::new();
        let mut seen = HashSet::new();
        let mut columns = HashSet::new();
        let mut fields = Vec::new();
        let mut primary_key: Option<String> = None;

        for (attr, mut field) in self.declared {
            if attr.trim().is_empty() || field.name().is_some_and(|n| n.trim().is_empty()) {
                return Err(SchemaError::EmptyName("column"));
            }
            if !seen.insert(attr.clone()) {
                return Err(SchemaError::DuplicateField {
                    model: self.name,
                    field: attr,
                });
            }
            field.set_name_if_missing(&attr);
            let column = field.name().unwrap_or(attr.as_str()).to_string();
            if !columns.insert(column.clone()) {
                return Err(SchemaError::DuplicateColumn {
                    model: self.name,
                    column,
                });
            }
            tracing::debug!(model = %self.name, attr = %attr, field = %field, "found mapping");

            if field.is_primary_key() {
                if !field.kind().can_be_primary_key() {
                    return Err(SchemaError::IneligiblePrimaryKey {
                        model: self.name,
                        field: attr,
                    });
                }
                if primary_key.is_some() {
                    return Err(SchemaError::DuplicatePrimaryKey {
                        model: self.name,
                        field: attr,
                    });
                }
                primary_key = Some(attr.clone());
            } else {
                fields.push(attr.clone());
            }
            mappings.insert(attr, field);
        }

        let Some(primary_key) = primary_key else {
            return Err(SchemaError::MissingPrimaryKey(self.name));
        };
        if fields.is_empty() {
            return Err(SchemaError::NoColumns(self.name));
        }

        let column = |attr: &str| -> String {
            quote(
                mappings
                    .get(attr)
                    .and_then(Field::name)
                    .unwrap_or(attr),
            )
        };
        let pk = column(primary_key.as_str());
        let escaped: Vec<String> = fields.iter().map(|f| column(f.as_str())).collect();
        let quoted_table = quote(&table);

        let select = format!(
            "select {pk}, {} from {quoted_table}",
            escaped.join(", ")
        );
        let insert = format!(
            "insert into {quoted_table} ({}, {pk}) values ({})",
            escaped.join(", "),
            placeholders(escaped.len() + 1)
        );
        let update = format!(
            "update {quoted_table} set {} where {pk} = ?",
            escaped
                .iter()
                .map(|c| format!("{c}=?"))
                .collect::<Vec<_>>()
                .join(", ")
        );
        let delete = format!("delete from {quoted_table} where {pk}=?");

        Ok(ModelSchema {
            name: self.name,
            table,
            mappings,
            primary_key,
            fields,
            select,
            insert,
            update,
            delete,
        })
    }
}

/// Backtick-quotes an identifier, doubling embedded backticks.
pub(crate) fn quote(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
