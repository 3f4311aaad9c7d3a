//! Database configuration.
//!
//! Loaded from the environment (with `.env` support) or from a TOML file:
//!
//! ```toml
//! [database]
//! url = "postgres://localhost/jobly"
//! max_pool_size = 16
//! slow_query_threshold_ms = 250
//! ```

use crate::error::{DbResult, JoblyError};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const DEFAULT_MAX_POOL_SIZE: usize = 16;
const DEFAULT_LOG_SQL_MAX_LEN: usize = 200;

/// Connection and logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DbConfig {
    #[serde(rename = "url")]
    pub database_url: String,
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: usize,
    /// Queries slower than this are logged at `warn`.
    #[serde(default)]
    pub slow_query_threshold_ms: Option<u64>,
    /// Abort queries that run longer than this.
    #[serde(default)]
    pub query_timeout_ms: Option<u64>,
    /// Truncate logged SQL to this many bytes.
    #[serde(default = "default_log_sql_max_len")]
    pub log_sql_max_len: usize,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    database: DbConfig,
}

fn default_max_pool_size() -> usize {
    DEFAULT_MAX_POOL_SIZE
}

fn default_log_sql_max_len() -> usize {
    DEFAULT_LOG_SQL_MAX_LEN
}

fn env_number<T, F>(lookup: &F, name: &str) -> DbResult<Option<T>>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| JoblyError::Config(format!("{name} must be a number, got {raw:?}"))),
        None => Ok(None),
    }
}

impl DbConfig {
    /// Create a configuration with defaults for everything but the URL.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_pool_size: DEFAULT_MAX_POOL_SIZE,
            slow_query_threshold_ms: None,
            query_timeout_ms: None,
            log_sql_max_len: DEFAULT_LOG_SQL_MAX_LEN,
        }
    }

    /// Read `DATABASE_URL` and optional `JOBLY_*` overrides, loading `.env` first if present.
    ///
    /// Recognized overrides: `JOBLY_MAX_POOL_SIZE`, `JOBLY_SLOW_QUERY_MS`,
    /// `JOBLY_QUERY_TIMEOUT_MS`.
    pub fn from_env() -> DbResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from any variable source, e.g. a map in tests.
    pub(crate) fn from_lookup<F>(lookup: F) -> DbResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL")
            .ok_or_else(|| JoblyError::Config("DATABASE_URL is not set".to_string()))?;

        let mut config = Self::new(url);
        if let Some(size) = env_number(&lookup, "JOBLY_MAX_POOL_SIZE")? {
            config.max_pool_size = size;
        }
        config.slow_query_threshold_ms = env_number(&lookup, "JOBLY_SLOW_QUERY_MS")?;
        config.query_timeout_ms = env_number(&lookup, "JOBLY_QUERY_TIMEOUT_MS")?;
        config.validate()?;
        Ok(config)
    }

    /// Parse the `[database]` table of a TOML document.
    pub fn from_toml_str(raw: &str) -> DbResult<Self> {
        let file: ConfigFile = toml::from_str(raw)
            .map_err(|e| JoblyError::Config(format!("failed to parse config: {e}")))?;
        file.database.validate()?;
        Ok(file.database)
    }

    /// Read and parse a TOML config file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            JoblyError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn slow_query_threshold(&self) -> Option<Duration> {
        self.slow_query_threshold_ms.map(Duration::from_millis)
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_ms.map(Duration::from_millis)
    }

    fn validate(&self) -> DbResult<()> {
        if self.database_url.trim().is_empty() {
            return Err(JoblyError::Config("database url is empty".to_string()));
        }
        if self.max_pool_size == 0 {
            return Err(JoblyError::Config("max_pool_size must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_fills_defaults() {
        let config = DbConfig::from_toml_str(
            r#"
            [database]
            url = "postgres://localhost/jobly_test"
            slow_query_threshold_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(config.database_url, "postgres://localhost/jobly_test");
        assert_eq!(config.max_pool_size, DEFAULT_MAX_POOL_SIZE);
        assert_eq!(config.slow_query_threshold(), Some(Duration::from_millis(250)));
        assert_eq!(config.query_timeout(), None);
    }

    #[test]
    fn toml_without_database_table_is_rejected() {
        let err = DbConfig::from_toml_str("[server]\nport = 3000\n").unwrap_err();
        assert!(matches!(err, JoblyError::Config(_)));
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        let err = DbConfig::from_toml_str(
            "[database]\nurl = \"postgres://localhost/jobly\"\nmax_pool_size = 0\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("max_pool_size"));
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: std::collections::HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn env_overrides_are_applied() {
        let config = DbConfig::from_lookup(vars(&[
            ("DATABASE_URL", "postgres://localhost/jobly"),
            ("JOBLY_MAX_POOL_SIZE", "4"),
            ("JOBLY_SLOW_QUERY_MS", " 100 "),
            ("JOBLY_QUERY_TIMEOUT_MS", "2000"),
        ]))
        .unwrap();
        assert_eq!(config.max_pool_size, 4);
        assert_eq!(config.slow_query_threshold(), Some(Duration::from_millis(100)));
        assert_eq!(config.query_timeout(), Some(Duration::from_secs(2)));
        assert_eq!(config.log_sql_max_len, DEFAULT_LOG_SQL_MAX_LEN);
    }

    #[test]
    fn env_without_url_is_rejected() {
        let err = DbConfig::from_lookup(vars(&[("JOBLY_MAX_POOL_SIZE", "4")])).unwrap_err();
        assert!(matches!(err, JoblyError::Config(ref m) if m.contains("DATABASE_URL")));
    }

    #[test]
    fn env_non_numeric_override_is_rejected() {
        let err = DbConfig::from_lookup(vars(&[
            ("DATABASE_URL", "postgres://localhost/jobly"),
            ("JOBLY_SLOW_QUERY_MS", "fast"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("JOBLY_SLOW_QUERY_MS"));
    }

    #[test]
    fn toml_file_is_read_from_disk() {
        let path = std::env::temp_dir().join(format!("jobly-config-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "[database]\nurl = \"postgres://localhost/jobly\"\nquery_timeout_ms = 500\n",
        )
        .unwrap();
        let config = DbConfig::from_toml_file(&path);
        std::fs::remove_file(&path).unwrap();

        let config = config.unwrap();
        assert_eq!(config.query_timeout(), Some(Duration::from_millis(500)));
        assert_eq!(config.slow_query_threshold(), None);
    }

    #[test]
    fn missing_toml_file_is_config_error() {
        let err = DbConfig::from_toml_file("/nonexistent/jobly.toml").unwrap_err();
        assert!(matches!(err, JoblyError::Config(_)));
    }
}
