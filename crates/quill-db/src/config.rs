//! Connection settings consumed by the pool.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Settings for the database connection pool.
///
/// `user`, `password` and `database` are required; everything else has a
/// default. For SQLite, `database` is the path of the database file. The
/// credentials and network address are validated and logged but SQLite
/// itself has no use for them.
#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Database user.
    #[serde(default)]
    pub user: Option<String>,

    /// Database password. Never printed by `Debug`.
    #[serde(default)]
    pub password: Option<String>,

    /// Database name (SQLite: file path).
    #[serde(default)]
    pub database: Option<String>,

    /// Database port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Connection character set.
    #[serde(default = "default_charset")]
    pub charset: String,

    /// Whether each statement commits on its own.
    #[serde(default = "default_autocommit")]
    pub autocommit: bool,

    /// Maximum number of pooled connections.
    #[serde(default = "default_max_size")]
    pub max_size: u32,

    /// Number of idle connections the pool tries to keep open.
    #[serde(default = "default_min_size")]
    pub min_size: u32,

    /// Busy timeout for SQLite connections, in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Upper bound on how long `acquire` waits for a free connection, in
    /// milliseconds. Unset means callers queue until a lease is returned.
    #[serde(default)]
    pub acquire_timeout_ms: Option<u64>,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    3306
}

fn default_charset() -> String {
    "utf8".to_string()
}

fn default_autocommit() -> bool {
    true
}

fn default_max_size() -> u32 {
    10
}

fn default_min_size() -> u32 {
    1
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            user: None,
            password: None,
            database: None,
            port: default_port(),
            charset: default_charset(),
            autocommit: default_autocommit(),
            max_size: default_max_size(),
            min_size: default_min_size(),
            busy_timeout_ms: default_busy_timeout_ms(),
            acquire_timeout_ms: None,
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("database", &self.database)
            .field("port", &self.port)
            .field("charset", &self.charset)
            .field("autocommit", &self.autocommit)
            .field("max_size", &self.max_size)
            .field("min_size", &self.min_size)
            .field("busy_timeout_ms", &self.busy_timeout_ms)
            .field("acquire_timeout_ms", &self.acquire_timeout_ms)
            .finish()
    }
}

/// Errors raised when the pool configuration is unusable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting is absent or blank.
    #[error("missing required database setting: {0}")]
    MissingField(&'static str),

    /// `max_size` is zero or smaller than `min_size`.
    #[error("invalid pool bounds: min_size {min} / max_size {max}")]
    PoolBounds {
        /// Configured minimum.
        min: u32,
        /// Configured maximum.
        max: u32,
    },

    /// The character set has no SQLite encoding.
    #[error("unsupported charset: {0}")]
    UnsupportedCharset(String),

    /// `acquire_timeout_ms` is zero.
    #[error("acquire_timeout_ms must be greater than zero when set")]
    ZeroAcquireTimeout,

    /// `autocommit = false` was requested.
    #[error("manual-commit connections are not supported; set autocommit = true")]
    ManualCommit,
}

impl DatabaseConfig {
    /// Creates a config with the three required settings and defaults for
    /// the rest.
    pub fn new(
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            user: Some(user.into()),
            password: Some(password.into()),
            database: Some(database.into()),
            ..Self::default()
        }
    }

    /// Checks required settings and pool bounds.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require("user", self.user.as_deref())?;
        require("password", self.password.as_deref())?;
        require("database", self.database.as_deref())?;

        if self.max_size == 0 || self.min_size > self.max_size {
            return Err(ConfigError::PoolBounds {
                min: self.min_size,
                max: self.max_size,
            });
        }

        if self.acquire_timeout_ms == Some(0) {
            return Err(ConfigError::ZeroAcquireTimeout);
        }

        if !self.autocommit {
            return Err(ConfigError::ManualCommit);
        }

        self.sqlite_encoding()?;
        Ok(())
    }

    /// The database path. Empty until the config has been validated.
    pub fn database_path(&self) -> &str {
        self.database.as_deref().unwrap_or_default()
    }

    /// Maps `charset` onto the value of SQLite's `PRAGMA encoding`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnsupportedCharset` for anything other than the
    /// UTF-8 and UTF-16 spellings.
    pub fn sqlite_encoding(&self) -> Result<&'static str, ConfigError> {
        match self.charset.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" | "utf8mb4" => Ok("UTF-8"),
            "utf16" | "utf-16" => Ok("UTF-16"),
            _ => Err(ConfigError::UnsupportedCharset(self.charset.clone())),
        }
    }
}

fn require(name: &'static str, value: Option<&str>) -> Result<(), ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(ConfigError::MissingField(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = DatabaseConfig::new("www", "secret", "blog.db");
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 3306);
        assert_eq!(config.charset, "utf8");
        assert!(config.autocommit);
        assert_eq!(config.max_size, 10);
        assert_eq!(config.min_size, 1);
        assert_eq!(config.acquire_timeout_ms, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_credentials_are_rejected() {
        let mut config = DatabaseConfig::new("www", "secret", "blog.db");
        config.password = None;
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingField("password"))
        );

        let config = DatabaseConfig::default();
        assert_eq!(config.validate(), Err(ConfigError::MissingField("user")));

        let config = DatabaseConfig::new("www", "secret", "   ");
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingField("database"))
        );
    }

    #[test]
    fn pool_bounds_are_checked() {
        let mut config = DatabaseConfig::new("www", "secret", "blog.db");
        config.min_size = 5;
        config.max_size = 2;
        assert_eq!(
            config.validate(),
            Err(ConfigError::PoolBounds { min: 5, max: 2 })
        );

        config.min_size = 0;
        config.max_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PoolBounds { .. })
        ));
    }

    #[test]
    fn zero_acquire_timeout_is_rejected() {
        let mut config = DatabaseConfig::new("www", "secret", "blog.db");
        config.acquire_timeout_ms = Some(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroAcquireTimeout));

        config.acquire_timeout_ms = Some(250);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn charset_and_autocommit() {
        let mut config = DatabaseConfig::new("www", "secret", "blog.db");
        config.charset = "UTF8MB4".to_string();
        assert_eq!(config.sqlite_encoding(), Ok("UTF-8"));

        config.charset = "latin1".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnsupportedCharset("latin1".to_string()))
        );

        config.charset = "utf8".to_string();
        config.autocommit = false;
        assert_eq!(config.validate(), Err(ConfigError::ManualCommit));
    }

    #[test]
    fn debug_redacts_password() {
        let config = DatabaseConfig::new("www", "hunter2", "blog.db");
        let printed = format!("{config:?}");
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("[REDACTED]"));
    }
}
