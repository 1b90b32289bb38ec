//! Filesystem persistence for the club.
//!
//! Everything lives in two JSON array files under the data directory:
//! - the player registry
//! - every tournament, with its roster, rounds and matches

pub mod club;
pub mod json;

pub use club::ClubStore;
pub use json::{JsonArrayReader, JsonArrayWriter};

use std::path::PathBuf;
use thiserror::Error;

use crate::models::TournamentRef;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected a JSON array in {0}")]
    NotAnArray(PathBuf),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Tournament {0} not found in storage")]
    TournamentNotFound(TournamentRef),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub players_file: String,
    pub tournaments_file: String,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            players_file: "players.json".to_string(),
            tournaments_file: "tournaments.json".to_string(),
        }
    }

    /// Builder method to override the file names.
    pub fn with_files(
        mut self,
        players_file: impl Into<String>,
        tournaments_file: impl Into<String>,
    ) -> Self {
        self.players_file = players_file.into();
        self.tournaments_file = tournaments_file.into();
        self
    }

    pub fn players_path(&self) -> PathBuf {
        self.data_dir.join(&self.players_file)
    }

    pub fn tournaments_path(&self) -> PathBuf {
        self.data_dir.join(&self.tournaments_file)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_paths() {
        let config = StorageConfig::new(PathBuf::from("/data"));

        assert_eq!(config.players_path(), PathBuf::from("/data/players.json"));
        assert_eq!(
            config.tournaments_path(),
            PathBuf::from("/data/tournaments.json")
        );
    }

    #[test]
    fn test_storage_config_custom_files() {
        let config =
            StorageConfig::new(PathBuf::from("/club")).with_files("members.json", "events.json");

        assert_eq!(config.players_path(), PathBuf::from("/club/members.json"));
        assert_eq!(config.tournaments_path(), PathBuf::from("/club/events.json"));
    }

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.players_file, "players.json");
    }
}
