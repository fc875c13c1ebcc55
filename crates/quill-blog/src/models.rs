//! Table declarations for users, blog posts and comments.

use quill_db::DbError;
use quill_orm::{Database, Field, Model, ModelSchema, OrmError, SchemaError, Value};
use serde::{Deserialize, Serialize};

/// A unique, time-ordered id: 15 digits of epoch milliseconds, a uuid4 in
/// hex, and `000`. Sorting ids as text sorts them by creation time.
pub fn next_id() -> String {
    format!(
        "{:015}{}000",
        chrono::Utc::now().timestamp_millis(),
        uuid::Uuid::new_v4().simple()
    )
}

/// Current time as fractional epoch seconds.
#[allow(clippy::cast_precision_loss)]
pub fn now() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

fn id_field() -> Field {
    Field::string()
        .primary_key()
        .column_type("varchar(50)")
        .default_with(|| Value::from(next_id()))
}

fn short_string() -> Field {
    Field::string().column_type("varchar(50)")
}

fn created_at() -> Field {
    Field::float().default_with(|| Value::from(now()))
}

/// Declaration of the `users` table.
pub fn user_schema() -> quill_orm::SchemaBuilder {
    ModelSchema::builder("User")
        .table("users")
        .field("id", id_field())
        .field("email", short_string())
        .field("passwd", short_string())
        .field("admin", Field::boolean())
        .field("name", short_string())
        .field("image", Field::string().column_type("varchar(500)"))
        .field("created_at", created_at())
}

/// Declaration of the `blogs` table.
pub fn blog_schema() -> quill_orm::SchemaBuilder {
    ModelSchema::builder("Blog")
        .table("blogs")
        .field("id", id_field())
        .field("user_id", short_string())
        .field("user_name", short_string())
        .field("user_image", Field::string().column_type("varchar(500)"))
        .field("name", short_string())
        .field("summary", Field::string().column_type("varchar(200)"))
        .field("content", Field::text())
        .field("created_at", created_at())
}

/// Declaration of the `comments` table.
pub fn comment_schema() -> quill_orm::SchemaBuilder {
    ModelSchema::builder("Comment")
        .table("comments")
        .field("id", id_field())
        .field("blog_id", short_string())
        .field("user_id", short_string())
        .field("user_name", short_string())
        .field("user_image", Field::string().column_type("varchar(500)"))
        .field("content", Field::text())
        .field("created_at", created_at())
}

/// Typed view of a `users` row. The password hash is never serialised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub passwd: String,
    pub admin: bool,
    pub name: String,
    pub image: String,
    pub created_at: f64,
}

/// Typed view of a `blogs` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blog {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_image: String,
    pub name: String,
    pub summary: String,
    pub content: String,
    pub created_at: f64,
}

/// Typed view of a `comments` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub blog_id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_image: String,
    pub content: String,
    pub created_at: f64,
}

/// Row counts per table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub users: i64,
    pub blogs: i64,
    pub comments: i64,
}

/// The registered blog models.
#[derive(Debug, Clone)]
pub struct BlogModels {
    pub users: Model,
    pub blogs: Model,
    pub comments: Model,
}

impl BlogModels {
    /// Compiles all three declarations.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`].
    pub fn register() -> Result<Self, SchemaError> {
        Ok(Self {
            users: Model::register(user_schema())?,
            blogs: Model::register(blog_schema())?,
            comments: Model::register(comment_schema())?,
        })
    }

    fn all(&self) -> [&Model; 3] {
        [&self.users, &self.blogs, &self.comments]
    }

    /// Creates any missing tables.
    ///
    /// # Errors
    ///
    /// Returns `DbError` if a `create table` statement fails.
    pub async fn bootstrap(&self, db: &Database) -> Result<(), DbError> {
        for model in self.all() {
            db.execute_batch(&model.schema().create_table_sql()).await?;
        }
        Ok(())
    }

    /// Counts rows in each table.
    ///
    /// # Errors
    ///
    /// Returns `OrmError` if a count query fails.
    pub async fn counts(&self, db: &Database) -> Result<TableCounts, OrmError> {
        let mut counts = [0_i64; 3];
        for (slot, model) in counts.iter_mut().zip(self.all()) {
            *slot = model
                .count_field(db, "count(id)", None, Vec::new())
                .await?
                .and_then(|v| v.as_i64())
                .unwrap_or(0);
        }
        let [users, blogs, comments] = counts;
        Ok(TableCounts {
            users,
            blogs,
            comments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_id_is_fifty_chars_and_time_ordered() {
        let a = next_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = next_id();
        assert_eq!(a.len(), 50);
        assert!(a.ends_with("000"));
        assert!(a[..15].chars().all(|c| c.is_ascii_digit()));
        assert!(a < b);
    }

    #[test]
    fn all_models_register() {
        let models = BlogModels::register().expect("blog schemas should compile");
        assert_eq!(models.users.schema().table(), "users");
        assert_eq!(models.blogs.schema().primary_key(), "id");
        assert_eq!(
            models.comments.schema().insert_sql(),
            "insert into `comments` (`blog_id`, `user_id`, `user_name`, `user_image`, \
             `content`, `created_at`, `id`) values (?, ?, ?, ?, ?, ?, ?)"
        );
    }

    #[test]
    fn user_view_hides_password() {
        let user = User {
            id: "1".into(),
            email: "a@b.c".into(),
            passwd: "hash".into(),
            admin: false,
            name: "a".into(),
            image: "about:blank".into(),
            created_at: 1.0,
        };
        let json = serde_json::to_value(&user).expect("should serialise");
        assert!(json.get("passwd").is_none());
    }
}
