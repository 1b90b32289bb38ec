//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::storage::StorageConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Where the club's files live inside the data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSection {
    #[serde(default = "default_players_file")]
    pub players_file: String,

    #[serde(default = "default_tournaments_file")]
    pub tournaments_file: String,
}

fn default_players_file() -> String {
    "players.json".to_string()
}

fn default_tournaments_file() -> String {
    "tournaments.json".to_string()
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            players_file: default_players_file(),
            tournaments_file: default_tournaments_file(),
        }
    }
}

/// Pairing configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PairingSection {
    /// Fixed seed for reproducible draws; random when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub storage: StorageSection,

    #[serde(default)]
    pub pairing: PairingSection,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            storage: StorageSection::default(),
            pairing: PairingSection::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.players_file.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Players file name must not be empty".to_string(),
            ));
        }

        if self.storage.tournaments_file.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Tournaments file name must not be empty".to_string(),
            ));
        }

        if self.storage.players_file == self.storage.tournaments_file {
            return Err(ConfigError::ValidationError(
                "Players and tournaments must be stored in different files".to_string(),
            ));
        }

        Ok(())
    }

    pub fn storage_config(&self) -> StorageConfig {
        StorageConfig::new(self.data_dir.clone())
            .with_files(&self.storage.players_file, &self.storage.tournaments_file)
    }
}
