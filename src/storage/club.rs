//! Club store: the player registry file and the tournaments file.

use tracing::{debug, info, warn};

use super::json::{JsonArrayReader, JsonArrayWriter};
use super::{StorageConfig, StorageError};
use crate::models::{Player, Tournament};

/// Handle on the club's persisted state.
///
/// Every save rewrites the whole file, so the files on disk are the only
/// state that survives a restart.
#[derive(Debug, Clone)]
pub struct ClubStore {
    config: StorageConfig,
}

impl ClubStore {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Load the registry. A missing file is created as an empty array.
    pub fn try_load_players(&self) -> Result<Vec<Player>, StorageError> {
        let path = self.config.players_path();
        let reader: JsonArrayReader<Player> = JsonArrayReader::new(path.clone());

        if !reader.exists() {
            info!("No player file at {:?}, creating an empty one", path);
            self.save_players(&[])?;
            return Ok(Vec::new());
        }

        reader.read_all()
    }

    /// Load the registry, falling back to an empty list on error.
    pub fn load_players(&self) -> Vec<Player> {
        self.try_load_players().unwrap_or_else(|e| {
            warn!("Could not load players, starting empty: {}", e);
            Vec::new()
        })
    }

    pub fn save_players(&self, players: &[Player]) -> Result<usize, StorageError> {
        JsonArrayWriter::new(self.config.players_path()).write_all(players)
    }

    /// Load every tournament and rebuild each roster's opponent history from
    /// its matches.
    pub fn try_load_tournaments(&self) -> Result<Vec<Tournament>, StorageError> {
        let reader: JsonArrayReader<Tournament> =
            JsonArrayReader::new(self.config.tournaments_path());
        let mut tournaments = reader.read_all()?;

        for tournament in tournaments.iter_mut() {
            tournament.rebuild_opponents();
            for player in tournament.points_mismatches() {
                warn!(
                    "Tournament {}: stored points for {} disagree with match results",
                    tournament.reference,
                    player.full_name()
                );
            }
        }

        Ok(tournaments)
    }

    /// Load every tournament, falling back to an empty list on error.
    pub fn load_tournaments(&self) -> Vec<Tournament> {
        self.try_load_tournaments().unwrap_or_else(|e| {
            warn!("Could not load tournaments, starting empty: {}", e);
            Vec::new()
        })
    }

    /// Find a tournament by its full reference or a unique prefix of it.
    pub fn find_tournament(&self, reference: &str) -> Result<Option<Tournament>, StorageError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Ok(None);
        }

        let mut candidates: Vec<Tournament> = self
            .try_load_tournaments()?
            .into_iter()
            .filter(|t| t.reference.as_str().starts_with(reference))
            .collect();

        if let Some(pos) = candidates
            .iter()
            .position(|t| t.reference.as_str() == reference)
        {
            return Ok(Some(candidates.swap_remove(pos)));
        }
        if candidates.len() == 1 {
            return Ok(candidates.pop());
        }
        if candidates.len() > 1 {
            debug!("Reference prefix {} is ambiguous", reference);
        }
        Ok(None)
    }

    pub fn save_tournament_list(&self, tournaments: &[Tournament]) -> Result<usize, StorageError> {
        JsonArrayWriter::new(self.config.tournaments_path()).write_all(tournaments)
    }

    /// Append a new tournament to the stored list.
    pub fn add_tournament(&self, tournament: &Tournament) -> Result<(), StorageError> {
        let mut tournaments = self.try_load_tournaments()?;
        tournaments.push(tournament.clone());
        self.save_tournament_list(&tournaments)?;
        info!("Added tournament {} ({})", tournament.name, tournament.reference);
        Ok(())
    }

    /// Replace the stored tournament that has the same reference.
    pub fn save_tournament_update(&self, tournament: &Tournament) -> Result<(), StorageError> {
        let mut tournaments = self.try_load_tournaments()?;
        let slot = tournaments
            .iter_mut()
            .find(|t| t.reference == tournament.reference)
            .ok_or_else(|| StorageError::TournamentNotFound(tournament.reference.clone()))?;
        *slot = tournament.clone();

        self.save_tournament_list(&tournaments)?;
        debug!("Saved tournament {}", tournament.reference);
        Ok(())
    }
}
