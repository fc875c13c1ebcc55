use quill_db::{Database, DatabaseConfig, DbError, Value};

fn setup() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("executor.db");
    let config = DatabaseConfig::new("www", "www", path.to_string_lossy());
    let db = Database::connect(&config).expect("failed to create pool");
    (dir, db)
}

async fn seed(db: &Database, count: i64) {
    db.execute_batch(
        "CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT NOT NULL, price REAL);",
    )
    .await
    .expect("failed to create table");

    for i in 1..=count {
        let affected = db
            .execute(
                "insert into items (id, name, price) values (?, ?, ?)",
                vec![Value::from(i), Value::from(format!("item-{i}")), Value::from(1.25)],
            )
            .await
            .expect("insert should succeed");
        assert_eq!(affected, 1);
    }
}

#[tokio::test]
async fn query_returns_rows_in_order_as_maps() {
    let (_dir, db) = setup();
    seed(&db, 3).await;

    let rows = db
        .query("select id, name, price from items order by id desc", vec![], None)
        .await
        .expect("query should succeed");

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["id"], Value::Integer(3));
    assert_eq!(rows[0]["name"], Value::Text("item-3".into()));
    assert_eq!(rows[0]["price"], Value::Float(1.25));
    assert_eq!(rows[2]["id"], Value::Integer(1));
}

#[tokio::test]
async fn row_limit_fetches_at_most_n_rows() {
    let (_dir, db) = setup();
    seed(&db, 5).await;

    let rows = db
        .query("select id from items where id > ?", vec![Value::from(1)], Some(2))
        .await
        .expect("query should succeed");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], Value::Integer(2));
}

#[tokio::test]
async fn execute_reports_affected_rows() {
    let (_dir, db) = setup();
    seed(&db, 4).await;

    let updated = db
        .execute("update items set price = ? where id <= ?", vec![Value::from(2.0), Value::from(2)])
        .await
        .expect("update should succeed");
    assert_eq!(updated, 2);

    let deleted = db
        .execute("delete from items where id = ?", vec![Value::from(99)])
        .await
        .expect("delete should succeed");
    assert_eq!(deleted, 0);
}

#[tokio::test]
async fn argument_count_mismatch_surfaces_as_driver_error() {
    let (_dir, db) = setup();
    seed(&db, 1).await;

    let err = db
        .query("select id from items where id = ? and name = ?", vec![Value::from(1)], None)
        .await
        .expect_err("missing argument should fail");
    assert!(matches!(err, DbError::Driver(_)), "unexpected error: {err:?}");

    // The failed statement must not leak its connection.
    let rows = db
        .query("select count(*) n from items", vec![], Some(1))
        .await
        .expect("pool should still hand out connections");
    assert_eq!(rows[0]["n"], Value::Integer(1));
}

#[tokio::test]
async fn constraint_violation_propagates() {
    let (_dir, db) = setup();
    seed(&db, 1).await;

    let err = db
        .execute(
            "insert into items (id, name) values (?, ?)",
            vec![Value::from(1), Value::from("dup")],
        )
        .await
        .expect_err("duplicate key should fail");
    assert!(matches!(err, DbError::Driver(_)));
}

#[tokio::test]
async fn concurrent_tasks_share_the_pool() {
    let (_dir, db) = setup();
    seed(&db, 0).await;

    let mut handles = Vec::new();
    for i in 0..20_i64 {
        let db = db.clone();
        handles.push(tokio::spawn(async move {
            db.execute(
                "insert into items (id, name) values (?, ?)",
                vec![Value::from(i + 1), Value::from("concurrent")],
            )
            .await
        }));
    }
    for handle in handles {
        let affected = handle
            .await
            .expect("task should not panic")
            .expect("insert should succeed");
        assert_eq!(affected, 1);
    }

    let rows = db
        .query("select count(*) n from items", vec![], Some(1))
        .await
        .expect("count should succeed");
    assert_eq!(rows[0]["n"], Value::Integer(20));
    assert!(db.pool().state().connections <= 10);
}
