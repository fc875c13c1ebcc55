//! Application configuration loading from file and environment variables.

use quill_db::DatabaseConfig;
use serde::Deserialize;
use thiserror::Error;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Database pool settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "quill_orm=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `QUILL_DB_HOST` overrides `database.host`
/// - `QUILL_DB_PORT` overrides `database.port`
/// - `QUILL_DB_USER` overrides `database.user`
/// - `QUILL_DB_PASSWORD` overrides `database.password`
/// - `QUILL_DB_NAME` overrides `database.database`
/// - `QUILL_DB_MAX_SIZE` overrides `database.max_size`
/// - `QUILL_DB_MIN_SIZE` overrides `database.min_size`
/// - `QUILL_LOG_LEVEL` overrides `logging.level`
/// - `QUILL_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => parse_config(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Parses TOML configuration text.
///
/// # Errors
///
/// Returns `ConfigError::Parse` on malformed TOML or mistyped values.
pub fn parse_config(contents: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(contents)?)
}

fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    let db = &mut config.database;
    if let Some(host) = var("QUILL_DB_HOST") {
        db.host = host;
    }
    if let Some(port) = var("QUILL_DB_PORT").and_then(|p| p.parse().ok()) {
        db.port = port;
    }
    if let Some(user) = var("QUILL_DB_USER") {
        db.user = Some(user);
    }
    if let Some(password) = var("QUILL_DB_PASSWORD") {
        db.password = Some(password);
    }
    if let Some(name) = var("QUILL_DB_NAME") {
        db.database = Some(name);
    }
    if let Some(max) = var("QUILL_DB_MAX_SIZE").and_then(|v| v.parse().ok()) {
        db.max_size = max;
    }
    if let Some(min) = var("QUILL_DB_MIN_SIZE").and_then(|v| v.parse().ok()) {
        db.min_size = min;
    }
    if let Some(level) = var("QUILL_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("QUILL_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn parses_file_with_defaults_for_missing_keys() {
        let config = parse_config(
            r#"
            [database]
            user = "www-data"
            password = "www-data"
            database = "awesome.db"
            max_size = 4

            [logging]
            level = "debug"
            "#,
        )
        .expect("should parse");

        assert_eq!(config.database.user.as_deref(), Some("www-data"));
        assert_eq!(config.database.max_size, 4);
        assert_eq!(config.database.min_size, 1);
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.port, 3306);
        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.json);
        assert!(config.database.validate().is_ok());
    }

    #[test]
    fn shipped_example_config_is_valid() {
        let config = parse_config(include_str!("../config.example.toml")).expect("should parse");
        assert!(config.database.validate().is_ok());
        assert_eq!(config.database.database_path(), "awesome.db");
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let config = parse_config("").expect("should parse");
        assert!(config.database.user.is_none());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn mistyped_value_is_a_parse_error() {
        let err = parse_config("[database]\nport = \"high\"\n").expect_err("should fail");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn env_overrides_win_and_bad_numbers_are_ignored() {
        let env: HashMap<&str, &str> = [
            ("QUILL_DB_USER", "root"),
            ("QUILL_DB_PASSWORD", "pw"),
            ("QUILL_DB_NAME", "/tmp/quill.db"),
            ("QUILL_DB_PORT", "not-a-port"),
            ("QUILL_DB_MAX_SIZE", "3"),
            ("QUILL_LOG_JSON", "1"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| (*v).to_string()));

        assert_eq!(config.database.user.as_deref(), Some("root"));
        assert_eq!(config.database.database_path(), "/tmp/quill.db");
        assert_eq!(config.database.port, 3306);
        assert_eq!(config.database.max_size, 3);
        assert!(config.logging.json);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_config(Some("/nonexistent/quill.toml")).expect("should not fail");
        assert_eq!(config.logging.level, "info");
    }
}
