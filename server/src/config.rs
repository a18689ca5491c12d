//! Environment-driven configuration.
//!
//! Every key has a default suitable for running locally with the in-memory
//! store, so `Config::from_env()` succeeds on an empty environment. A `.env`
//! file in the working directory is loaded first when present.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for environment variable '{key}'")]
    Invalid { key: &'static str, value: String },
}

/// Which `TodoStore` implementation the process runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" => Ok(Self::Pretty),
            _ => Err(()),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub idle_timeout: Duration,
    pub connect_timeout: Duration,
}

// Hand-written so the password never ends up in logs.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"***")
            .field("max_connections", &self.max_connections)
            .field("idle_timeout", &self.idle_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Default filter directive; `RUST_LOG` overrides it.
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub database: DatabaseConfig,
    pub log: LogConfig,
    /// OTLP collector the deployment points traces at. Reported at startup.
    pub trace_endpoint: String,
    pub version: String,
}

impl Config {
    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Missing keys fall back
    /// to their defaults; present but unparseable keys are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Lookup(lookup);
        Ok(Self {
            host: env.string("HOST", "0.0.0.0"),
            port: env.parsed("PORT", 3000)?,
            storage: env.parsed("STORAGE_BACKEND", StorageBackend::Memory)?,
            database: DatabaseConfig {
                host: env.string("DB_HOST", "localhost"),
                port: env.parsed("DB_PORT", 5432)?,
                name: env.string("DB_NAME", "appdb"),
                user: env.string("DB_USER", "appuser"),
                password: env.string("DB_PASSWORD", ""),
                max_connections: env.parsed("DB_POOL_MAX", 20)?,
                idle_timeout: Duration::from_millis(env.parsed("DB_IDLE_TIMEOUT_MS", 30_000)?),
                connect_timeout: Duration::from_millis(env.parsed("DB_CONNECT_TIMEOUT_MS", 2_000)?),
            },
            log: LogConfig {
                level: env.string("LOG_LEVEL", "info"),
                format: env.parsed("LOG_FORMAT", LogFormat::Json)?,
            },
            trace_endpoint: env.string(
                "TEMPO_ENDPOINT",
                "http://tempo-distributor.monitoring.svc.cluster.local:4318/v1/traces",
            ),
            version: env.string("APP_VERSION", "1.0.0"),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

struct Lookup<F>(F);

impl<F> Lookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, key: &str, default: &str) -> String {
        (self.0)(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T: FromStr>(&self, key: &'static str, default: T) -> Result<T, ConfigError> {
        match (self.0)(key) {
            None => Ok(default),
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { key, value }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.name, "appdb");
        assert_eq!(config.database.user, "appuser");
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.database.idle_timeout, Duration::from_secs(30));
        assert_eq!(config.database.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.log.level, "info");
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.version, "1.0.0");
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("STORAGE_BACKEND", "postgres"),
            ("DB_HOST", "db.internal"),
            ("DB_POOL_MAX", "5"),
            ("DB_CONNECT_TIMEOUT_MS", "500"),
            ("LOG_FORMAT", "pretty"),
            ("APP_VERSION", "2.3.1"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.storage, StorageBackend::Postgres);
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.database.connect_timeout, Duration::from_millis(500));
        assert_eq!(config.log.format, LogFormat::Pretty);
        assert_eq!(config.version, "2.3.1");
    }

    #[test]
    fn unparseable_port_is_an_error() {
        let err = config_from(&[("PORT", "abc")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "PORT",
                value: "abc".to_string()
            }
        );
        assert_eq!(
            err.to_string(),
            "invalid value 'abc' for environment variable 'PORT'"
        );
    }

    #[test]
    fn unknown_storage_backend_is_an_error() {
        assert!(config_from(&[("STORAGE_BACKEND", "redis")]).is_err());
    }

    #[test]
    fn debug_output_hides_password() {
        let config = config_from(&[("DB_PASSWORD", "hunter2")]).unwrap();
        let rendered = format!("{:?}", config.database);
        assert!(!rendered.contains("hunter2"));
    }
}
