//! Object-relational mapping over `quill-db`.
//!
//! A model is declared as an explicit schema value: a [`ModelSchema`]
//! builder listing [`Field`] descriptors. Registering it with
//! [`Model::register`] validates the declaration once, at startup, and
//! precompiles the select/insert/update/delete templates. Rows come back as
//! [`Record`]s, which carry their values in a plain key → value map.
//!
//! # Usage
//!
//! ```rust,ignore
//! use quill_orm::{Field, FindAll, Limit, Model, ModelSchema};
//!
//! let users = Model::register(
//!     ModelSchema::builder("User")
//!         .table("users")
//!         .field("id", Field::string().primary_key())
//!         .field("name", Field::string().default("anon"))
//!         .field("age", Field::integer()),
//! )?;
//!
//! let mut user = users.record().with("id", "u1");
//! user.save(&db).await?;
//!
//! let oldest = users
//!     .find_all(&db, FindAll::new().order_by("age desc").limit(Limit::Count(5)))
//!     .await?;
//! ```

mod error;
mod field;
mod limit;
mod model;
mod page;
mod record;
mod schema;

pub use error::{OrmError, SchemaError};
pub use field::{ColumnKind, Field, FieldDefault};
pub use limit::{FindAll, Limit};
pub use model::Model;
pub use page::{page_index, Page, DEFAULT_PAGE_SIZE};
pub use quill_db::{Database, Row, Value};
pub use record::Record;
pub use schema::{ModelSchema, SchemaBuilder};
