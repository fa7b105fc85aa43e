//! Process configuration.
//!
//! Read from environment variables (a `.env` file is loaded first by the
//! binary, if present):
//!
//! | variable              | default             |
//! |-----------------------|---------------------|
//! | `WEBHOOK_LISTEN_ADDR` | `0.0.0.0:5000`      |
//! | `EVENT_STORE`         | `file`              |
//! | `EVENT_STORE_PATH`    | `data/events.jsonl` |

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::store::{EventStore, JsonlEventStore, MemoryEventStore, StoreError};

pub const ENV_LISTEN_ADDR: &str = "WEBHOOK_LISTEN_ADDR";
pub const ENV_STORE: &str = "EVENT_STORE";
pub const ENV_STORE_PATH: &str = "EVENT_STORE_PATH";

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_STORE_PATH: &str = "data/events.jsonl";

/// Errors in the process configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid WEBHOOK_LISTEN_ADDR '{value}': {source}")]
    InvalidListenAddr {
        value: String,
        source: std::net::AddrParseError,
    },

    #[error("unknown EVENT_STORE '{0}' (expected 'file' or 'memory')")]
    UnknownStore(String),
}

/// Which store backend to run with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// Nothing survives a restart.
    Memory,
    /// JSON Lines file at `path`.
    File { path: PathBuf },
}

impl StoreConfig {
    /// Opens the configured backend.
    pub fn build(&self) -> Result<Arc<dyn EventStore>, StoreError> {
        match self {
            StoreConfig::Memory => Ok(Arc::new(MemoryEventStore::new())),
            StoreConfig::File { path } => Ok(Arc::new(JsonlEventStore::open(path)?)),
        }
    }
}

impl fmt::Display for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreConfig::Memory => write!(f, "memory"),
            StoreConfig::File { path } => write!(f, "file:{}", path.display()),
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub store: StoreConfig,
}

impl Config {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let addr = get(ENV_LISTEN_ADDR).unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = addr
            .trim()
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidListenAddr {
                value: addr.clone(),
                source,
            })?;

        let store = match get(ENV_STORE).as_deref().map(str::trim) {
            None | Some("file") => StoreConfig::File {
                path: get(ENV_STORE_PATH)
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH)),
            },
            Some("memory") => StoreConfig::Memory,
            Some(other) => return Err(ConfigError::UnknownStore(other.to_string())),
        };

        Ok(Config { listen_addr, store })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:5000".parse::<SocketAddr>().unwrap());
        assert_eq!(
            config.store,
            StoreConfig::File {
                path: PathBuf::from("data/events.jsonl")
            }
        );
    }

    #[test]
    fn explicit_values() {
        let config = config_from(&[
            (ENV_LISTEN_ADDR, "127.0.0.1:8080"),
            (ENV_STORE, "file"),
            (ENV_STORE_PATH, "/var/lib/webhooks/events.jsonl"),
        ])
        .unwrap();

        assert_eq!(config.listen_addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(
            config.store,
            StoreConfig::File {
                path: PathBuf::from("/var/lib/webhooks/events.jsonl")
            }
        );
    }

    #[test]
    fn memory_store() {
        let config = config_from(&[(ENV_STORE, "memory")]).unwrap();
        assert_eq!(config.store, StoreConfig::Memory);
    }

    #[test]
    fn empty_values_use_defaults() {
        let config = config_from(&[(ENV_LISTEN_ADDR, ""), (ENV_STORE, "  ")]).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:5000".parse::<SocketAddr>().unwrap());
        assert!(matches!(config.store, StoreConfig::File { .. }));
    }

    #[test]
    fn invalid_listen_addr() {
        let result = config_from(&[(ENV_LISTEN_ADDR, "not-an-address")]);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidListenAddr { ref value, .. }) if value == "not-an-address"
        ));
    }

    #[test]
    fn unknown_store() {
        let result = config_from(&[(ENV_STORE, "mongodb")]);
        assert!(matches!(result, Err(ConfigError::UnknownStore(ref s)) if s == "mongodb"));
    }

    #[test]
    fn store_display() {
        assert_eq!(StoreConfig::Memory.to_string(), "memory");
        assert_eq!(
            StoreConfig::File {
                path: PathBuf::from("data/events.jsonl")
            }
            .to_string(),
            "file:data/events.jsonl"
        );
    }

    #[tokio::test]
    async fn build_file_store() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::File {
            path: dir.path().join("events.jsonl"),
        };

        let store = config.build().unwrap();
        assert!(store.list_all().await.unwrap().is_empty());
        assert!(dir.path().join("events.jsonl").exists());
    }
}
