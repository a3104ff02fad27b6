//! services/dashboard/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which document store backs profiles and accounts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres { database_url: String },
    Memory,
    /// No store at all: sign-in is unavailable and every session is local-only.
    Unconfigured,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub store_backend: StoreBackend,
    pub guidance_path: Option<PathBuf>,
    pub store_timeout: Option<Duration>,
    pub allowed_origin: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // --- Server Settings ---
        let bind_address_str = var("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = var("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let allowed_origin =
            var("ALLOWED_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());

        // --- Storage Settings ---
        let database_url = var("DATABASE_URL");
        let store_backend = match var("STORE_BACKEND").as_deref() {
            Some("postgres") => StoreBackend::Postgres {
                database_url: database_url
                    .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?,
            },
            Some("memory") => StoreBackend::Memory,
            Some("none") => StoreBackend::Unconfigured,
            Some(other) => {
                return Err(ConfigError::InvalidValue(
                    "STORE_BACKEND".to_string(),
                    format!("'{}' is not one of postgres, memory, none", other),
                ))
            }
            None => match database_url {
                Some(database_url) => StoreBackend::Postgres { database_url },
                None => StoreBackend::Unconfigured,
            },
        };

        let store_timeout = var("STORE_TIMEOUT_SECS")
            .map(|raw| {
                raw.parse::<u64>().map(Duration::from_secs).map_err(|e| {
                    ConfigError::InvalidValue("STORE_TIMEOUT_SECS".to_string(), e.to_string())
                })
            })
            .transpose()?;

        // --- Content ---
        let guidance_path = var("GUIDANCE_PATH").map(PathBuf::from);

        Ok(Self {
            bind_address,
            log_level,
            store_backend,
            guidance_path,
            store_timeout,
            allowed_origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_database_are_unconfigured() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.store_backend, StoreBackend::Unconfigured);
        assert_eq!(config.store_timeout, None);
        assert_eq!(config.guidance_path, None);
    }

    #[test]
    fn database_url_implies_postgres() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/tracker")]).unwrap();
        assert_eq!(
            config.store_backend,
            StoreBackend::Postgres {
                database_url: "postgres://localhost/tracker".to_string()
            }
        );
    }

    #[test]
    fn explicit_postgres_requires_database_url() {
        let result = load(&[("STORE_BACKEND", "postgres")]);
        assert!(matches!(result, Err(ConfigError::MissingVar(var)) if var == "DATABASE_URL"));
    }

    #[test]
    fn memory_backend_and_timeout() {
        let config = load(&[("STORE_BACKEND", "memory"), ("STORE_TIMEOUT_SECS", "7")]).unwrap();
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.store_timeout, Some(Duration::from_secs(7)));
    }

    #[test]
    fn rejects_unknown_backend_and_bad_values() {
        assert!(matches!(
            load(&[("STORE_BACKEND", "firestore")]),
            Err(ConfigError::InvalidValue(..))
        ));
        assert!(matches!(
            load(&[("RUST_LOG", "chatty")]),
            Err(ConfigError::InvalidValue(..))
        ));
        assert!(matches!(
            load(&[("STORE_TIMEOUT_SECS", "soon")]),
            Err(ConfigError::InvalidValue(..))
        ));
    }
}
