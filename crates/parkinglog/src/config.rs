//! Configuration management for parkinglog.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::record::Vehicle;
use crate::store::DEFAULT_CAPACITY;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "parkinglog";

/// Default key-value database file name.
const KV_FILE_NAME: &str = "local.db";

/// Default relational database file name.
const DATABASE_FILE_NAME: &str = "records.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `PARKINGLOG_`, sections split on `__`)
/// 2. TOML config file at `~/.config/parkinglog/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Vehicle configuration.
    pub vehicles: VehicleConfig,
}

/// Which persistence strategy holds the records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Vehicle-partitioned lists in the local key-value store.
    #[default]
    Local,
    /// Owner-scoped rows in the `parking_records` table.
    Database,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Database => write!(f, "database"),
        }
    }
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Persistence strategy.
    pub backend: Backend,
    /// Path to the local key-value database, which also holds the user id.
    /// Defaults to `~/.local/share/parkinglog/local.db`
    pub kv_path: Option<PathBuf>,
    /// Path to the relational database.
    /// Defaults to `~/.local/share/parkinglog/records.db`
    pub database_path: Option<PathBuf>,
    /// Records retained per vehicle (local) or per owner (database).
    pub capacity: usize,
}

/// Vehicle-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    /// Vehicle used when a command doesn't name one.
    pub default_vehicle: Vehicle,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Local,
            kv_path: None,
            database_path: None,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("PARKINGLOG_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.storage.capacity == 0 {
            return Err(Error::ConfigValidation {
                message: "capacity must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    /// Get the key-value database path, resolving defaults if not set.
    #[must_use]
    pub fn kv_path(&self) -> PathBuf {
        self.storage
            .kv_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(KV_FILE_NAME))
    }

    /// Get the relational database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.storage.backend, Backend::Local);
        assert_eq!(config.storage.capacity, 10);
        assert_eq!(config.vehicles.default_vehicle, Vehicle::G80);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_capacity() {
        let mut config = Config::default();
        config.storage.capacity = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("capacity"));
    }

    #[test]
    fn test_kv_path_default() {
        let config = Config::default();
        assert!(config.kv_path().to_string_lossy().contains("local.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/records.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/records.sqlite")
        );
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("parkinglog"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[storage]\nbackend = \"database\"\ncapacity = 5\n\n[vehicles]\ndefault_vehicle = \"G90\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.storage.backend, Backend::Database);
        assert_eq!(config.storage.capacity, 5);
        assert_eq!(config.vehicles.default_vehicle, Vehicle::G90);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[storage]\ncapacity = 0\n").unwrap();

        assert!(matches!(
            Config::load_from(Some(path)),
            Err(Error::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_backend_serialize() {
        let json = serde_json::to_string(&Backend::Database).unwrap();
        assert_eq!(json, "\"database\"");
        assert_eq!(Backend::Local.to_string(), "local");
    }

    #[test]
    fn test_storage_config_deserialize() {
        let json = r#"{"capacity": 3}"#;
        let storage: StorageConfig = serde_json::from_str(json).unwrap();
        assert_eq!(storage.capacity, 3);
        assert_eq!(storage.backend, Backend::Local);
    }
}
