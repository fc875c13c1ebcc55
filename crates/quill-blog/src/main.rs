//! quill binary: connects the pool, registers the blog models, makes sure
//! their tables exist, and prints a JSON summary of row counts.

use quill_blog::config;
use quill_blog::BlogModels;
use quill_orm::Database;
use tracing_subscriber::EnvFilter;

fn resolve_config_path() -> (Option<String>, &'static str) {
    if let Some(path) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("QUILL_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

#[tokio::main]
async fn main() {
    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path.as_deref().or(Some("config.toml"));

    let config = config::load_config(selected_config_path)
        .expect("failed to load configuration; quill cannot start without valid config");

    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        "resolved startup configuration path"
    );

    let db = Database::connect(&config.database)
        .expect("failed to create database pool; check the [database] section of the config");

    let models = BlogModels::register().expect("blog model declarations are invalid");

    models
        .bootstrap(&db)
        .await
        .expect("failed to create blog tables");

    let counts = models
        .counts(&db)
        .await
        .expect("failed to count blog rows");

    match serde_json::to_string_pretty(&counts) {
        Ok(summary) => println!("{summary}"),
        Err(e) => tracing::error!(error = %e, "failed to render summary"),
    }
}
