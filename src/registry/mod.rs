//! Player registry: the club's list of known players.
//!
//! Holds the loaded players and a handle on the store, and persists after
//! every change.

use std::collections::HashMap;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{Player, PlayerId, Points, Tournament};
use crate::storage::{ClubStore, StorageError};

/// Two letters followed by five digits.
pub const NATIONAL_ID_PATTERN: &str = r"^[A-Za-z]{2}\d{5}$";

/// Errors raised by registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Selection {0} is out of range (1..={1})")]
    OutOfRange(usize, usize),

    #[error("Selection {0} given more than once")]
    DuplicateSelection(usize),
}

/// Whether a national id has the expected shape.
pub fn validate_national_id(national_id: &str) -> bool {
    Regex::new(NATIONAL_ID_PATTERN)
        .map(|re| re.is_match(national_id.trim()))
        .unwrap_or(false)
}

/// Last names are stored upper-cased.
pub fn normalize_last_name(name: &str) -> String {
    name.trim().to_uppercase()
}

/// First names are stored with a capital initial and the rest lower-cased.
pub fn normalize_first_name(name: &str) -> String {
    let name = name.trim();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// The registered players plus the store they came from.
pub struct PlayerRegistry<'a> {
    store: &'a ClubStore,
    players: Vec<Player>,
}

impl<'a> PlayerRegistry<'a> {
    /// Load the registry, starting empty if the file is unreadable.
    pub fn load(store: &'a ClubStore) -> Self {
        let players = store.load_players();
        debug!("Loaded {} registered players", players.len());
        Self { store, players }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    /// Register a new player and persist the registry.
    pub fn create(
        &mut self,
        last_name: &str,
        first_name: &str,
        date_of_birth: &str,
        national_id: &str,
    ) -> Result<Player, StorageError> {
        let player = Player::new(
            normalize_last_name(last_name),
            normalize_first_name(first_name),
            date_of_birth.trim(),
            national_id.trim().to_uppercase(),
        );
        self.players.push(player.clone());
        self.store.save_players(&self.players)?;

        info!("Registered player {} ({})", player.full_name(), player.id);
        Ok(player)
    }

    /// Players ordered by last name, case-insensitive. Ties keep file order.
    pub fn sorted(&self) -> Vec<&Player> {
        let mut players: Vec<&Player> = self.players.iter().collect();
        players.sort_by_key(|p| p.last_name.to_lowercase());
        players
    }

    /// Resolve 1-based positions in the sorted listing to players.
    pub fn select(&self, positions: &[usize]) -> Result<Vec<Player>, RegistryError> {
        let sorted = self.sorted();
        let mut selected = Vec::with_capacity(positions.len());

        for (i, &position) in positions.iter().enumerate() {
            if position == 0 || position > sorted.len() {
                return Err(RegistryError::OutOfRange(position, sorted.len()));
            }
            if positions[..i].contains(&position) {
                return Err(RegistryError::DuplicateSelection(position));
            }
            selected.push(sorted[position - 1].clone());
        }

        Ok(selected)
    }

    /// Remove the given players and persist. Returns how many were removed.
    pub fn delete(&mut self, ids: &[PlayerId]) -> Result<usize, StorageError> {
        let before = self.players.len();
        self.players.retain(|p| !ids.contains(&p.id));
        let removed = before - self.players.len();

        if removed > 0 {
            self.store.save_players(&self.players)?;
            info!("Deleted {} players", removed);
        }
        Ok(removed)
    }

    /// Set every player's lifetime points to the sum of their scores in
    /// finished matches of all `tournaments`, then persist if anything
    /// changed. Returns the number of players updated.
    pub fn sync_lifetime_points(&mut self, tournaments: &[Tournament]) -> Result<usize, StorageError> {
        let mut earned: HashMap<&PlayerId, Points> = HashMap::new();
        for game in tournaments
            .iter()
            .flat_map(|t| t.rounds.iter())
            .flat_map(|r| r.matches.iter())
            .filter(|m| m.finished)
        {
            for (player, score) in game.results() {
                *earned.entry(&player.id).or_default() += score;
            }
        }

        let mut updated = 0;
        for player in self.players.iter_mut() {
            let total = earned.get(&player.id).copied().unwrap_or_default();
            if player.total_points != total {
                player.total_points = total;
                updated += 1;
            }
        }

        if updated > 0 {
            self.store.save_players(&self.players)?;
            debug!("Synced lifetime points for {} players", updated);
        }
        Ok(updated)
    }
}
