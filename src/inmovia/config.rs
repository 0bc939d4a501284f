//! # Configuration
//!
//! Store settings live in `config.json` inside the data directory. A missing
//! file means defaults; unknown keys are ignored so older binaries can read
//! newer files.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `id-strategy` | `uuid` | `uuid` or `timestamp` (legacy millisecond ids) |
//! | `lock-timeout-ms` | `5000` | Longest wait for a collection lock |
//! | `io-timeout-ms` | `5000` | Longest a single collection file read or write may take |
//! | `pretty` | `true` | Pretty-print collection files |

use crate::error::{Result, StoreError};
use crate::id::IdStrategy;
use crate::store::{StoreOptions, DEFAULT_IO_TIMEOUT, DEFAULT_LOCK_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

const CONFIG_FILENAME: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct StoreConfig {
    #[serde(default)]
    pub id_strategy: IdStrategy,

    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,

    #[serde(default = "default_io_timeout_ms")]
    pub io_timeout_ms: u64,

    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT.as_millis() as u64
}

fn default_io_timeout_ms() -> u64 {
    DEFAULT_IO_TIMEOUT.as_millis() as u64
}

fn default_pretty() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            id_strategy: IdStrategy::default(),
            lock_timeout_ms: default_lock_timeout_ms(),
            io_timeout_ms: default_io_timeout_ms(),
            pretty: default_pretty(),
        }
    }
}

impl StoreConfig {
    pub const KEYS: [&'static str; 4] = ["id-strategy", "lock-timeout-ms", "io-timeout-ms", "pretty"];

    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: StoreConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content)?;
        Ok(())
    }

    pub fn options(&self) -> StoreOptions {
        StoreOptions {
            id_strategy: self.id_strategy,
            lock_timeout: Duration::from_millis(self.lock_timeout_ms),
        }
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.io_timeout_ms)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "id-strategy" => Some(
                match self.id_strategy {
                    IdStrategy::Uuid => "uuid",
                    IdStrategy::Timestamp => "timestamp",
                }
                .to_string(),
            ),
            "lock-timeout-ms" => Some(self.lock_timeout_ms.to_string()),
            "io-timeout-ms" => Some(self.io_timeout_ms.to_string()),
            "pretty" => Some(self.pretty.to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "id-strategy" => {
                self.id_strategy = match value {
                    "uuid" => IdStrategy::Uuid,
                    "timestamp" => IdStrategy::Timestamp,
                    other => {
                        return Err(StoreError::Config(format!(
                            "id-strategy must be 'uuid' or 'timestamp', got '{}'",
                            other
                        )))
                    }
                }
            }
            "lock-timeout-ms" => {
                self.lock_timeout_ms = value.parse().map_err(|_| {
                    StoreError::Config(format!("lock-timeout-ms must be a number, got '{}'", value))
                })?
            }
            "io-timeout-ms" => {
                self.io_timeout_ms = value.parse().map_err(|_| {
                    StoreError::Config(format!("io-timeout-ms must be a number, got '{}'", value))
                })?
            }
            "pretty" => {
                self.pretty = value.parse().map_err(|_| {
                    StoreError::Config(format!("pretty must be true or false, got '{}'", value))
                })?
            }
            other => return Err(StoreError::Config(format!("Unknown config key: {}", other))),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.id_strategy, IdStrategy::Uuid);
        assert_eq!(config.lock_timeout_ms, 5000);
        assert_eq!(config.io_timeout(), Duration::from_secs(5));
        assert!(config.pretty);
    }

    #[test]
    fn test_load_missing_config() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig::load(dir.path()).unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let mut config = StoreConfig::default();
        config.set("id-strategy", "timestamp").unwrap();
        config.set("pretty", "false").unwrap();
        config.save(dir.path()).unwrap();

        let loaded = StoreConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.id_strategy, IdStrategy::Timestamp);
        assert!(!loaded.pretty);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), r#"{"lock-timeout-ms": 250}"#).unwrap();

        let loaded = StoreConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.lock_timeout_ms, 250);
        assert_eq!(loaded.options().lock_timeout, Duration::from_millis(250));
        assert!(loaded.pretty);
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = StoreConfig::default();
        assert!(config.set("id-strategy", "counter").is_err());
        assert!(config.set("lock-timeout-ms", "soon").is_err());
        assert!(config.set("io-timeout-ms", "-1").is_err());
        assert!(config.set("colour", "blue").is_err());
    }

    #[test]
    fn test_get_round_trips_set() {
        let mut config = StoreConfig::default();
        for (key, value) in [
            ("id-strategy", "timestamp"),
            ("lock-timeout-ms", "10"),
            ("io-timeout-ms", "20"),
            ("pretty", "false"),
        ] {
            config.set(key, value).unwrap();
            assert_eq!(config.get(key).as_deref(), Some(value));
        }
        assert_eq!(config.get("nope"), None);
    }
}
