//! Store configuration read from the process environment.

use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_STATEMENT_TIMEOUT_MS: u64 = 15_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Connection settings for the stock store.
///
/// `database_url == None` selects the in-memory store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub statement_timeout: Duration,
    pub run_migrations: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
            statement_timeout: Duration::from_millis(DEFAULT_STATEMENT_TIMEOUT_MS),
            run_migrations: true,
        }
    }
}

impl StoreConfig {
    /// Reads:
    /// - `DATABASE_URL` (unset or blank: in-memory store)
    /// - `DB_MAX_CONNECTIONS`
    /// - `DB_ACQUIRE_TIMEOUT_SECS`
    /// - `DB_STATEMENT_TIMEOUT_MS`
    /// - `RUN_MIGRATIONS` (`true`/`false`, `1`/`0`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let database_url = lookup("DATABASE_URL")
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty());

        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(v) => parse_positive("DB_MAX_CONNECTIONS", &v)? as u32,
            None => defaults.max_connections,
        };
        let acquire_timeout = match lookup("DB_ACQUIRE_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_positive("DB_ACQUIRE_TIMEOUT_SECS", &v)?),
            None => defaults.acquire_timeout,
        };
        let statement_timeout = match lookup("DB_STATEMENT_TIMEOUT_MS") {
            Some(v) => Duration::from_millis(parse_positive("DB_STATEMENT_TIMEOUT_MS", &v)?),
            None => defaults.statement_timeout,
        };
        let run_migrations = match lookup("RUN_MIGRATIONS") {
            Some(v) => parse_bool("RUN_MIGRATIONS", &v)?,
            None => defaults.run_migrations,
        };

        Ok(Self {
            database_url,
            max_connections,
            acquire_timeout,
            statement_timeout,
            run_migrations,
        })
    }
}

fn parse_positive(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(u64::from(n)),
        _ => Err(ConfigError::Invalid {
            name,
            expected: "a positive integer",
            value: value.to_owned(),
        }),
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            expected: "true or false",
            value: value.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_select_in_memory_store() {
        let cfg = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, StoreConfig::default());
        assert!(cfg.database_url.is_none());
    }

    #[test]
    fn blank_database_url_is_ignored() {
        let cfg = StoreConfig::from_lookup(lookup(&[("DATABASE_URL", "  ")])).unwrap();
        assert!(cfg.database_url.is_none());
    }

    #[test]
    fn reads_overrides() {
        let cfg = StoreConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/stock"),
            ("DB_MAX_CONNECTIONS", "4"),
            ("DB_ACQUIRE_TIMEOUT_SECS", "2"),
            ("DB_STATEMENT_TIMEOUT_MS", "500"),
            ("RUN_MIGRATIONS", "false"),
        ]))
        .unwrap();

        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/stock"));
        assert_eq!(cfg.max_connections, 4);
        assert_eq!(cfg.acquire_timeout, Duration::from_secs(2));
        assert_eq!(cfg.statement_timeout, Duration::from_millis(500));
        assert!(!cfg.run_migrations);
    }

    #[test]
    fn rejects_zero_and_garbage() {
        let err = StoreConfig::from_lookup(lookup(&[("DB_MAX_CONNECTIONS", "0")])).unwrap_err();
        assert!(err.to_string().contains("DB_MAX_CONNECTIONS"));

        assert!(StoreConfig::from_lookup(lookup(&[("RUN_MIGRATIONS", "maybe")])).is_err());
    }
}
