//! Player model.

use serde::{Deserialize, Serialize};

use super::{PlayerId, Points};

/// A registered club player.
///
/// `opponents` is an in-memory multiset: one entry per match played against
/// that opponent, repeats included. It is not persisted; tournaments rebuild
/// it from their match history when loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Unique identifier
    #[serde(default)]
    pub id: PlayerId,

    #[serde(default = "default_name")]
    pub last_name: String,

    #[serde(default = "default_name")]
    pub first_name: String,

    /// Date of birth, `DD/MM/YYYY`
    #[serde(default = "default_date_of_birth")]
    pub date_of_birth: String,

    /// National chess federation id (two letters, five digits)
    #[serde(default = "default_national_id")]
    pub national_id: String,

    #[serde(default)]
    pub total_points: Points,

    #[serde(skip)]
    pub opponents: Vec<PlayerId>,
}

fn default_name() -> String {
    "Unknown".to_string()
}

fn default_date_of_birth() -> String {
    "01/01/1900".to_string()
}

fn default_national_id() -> String {
    "000000".to_string()
}

impl Player {
    /// Create a new player with a fresh id, zero points and no history.
    pub fn new(
        last_name: impl Into<String>,
        first_name: impl Into<String>,
        date_of_birth: impl Into<String>,
        national_id: impl Into<String>,
    ) -> Self {
        Self {
            id: PlayerId::generate(),
            last_name: last_name.into(),
            first_name: first_name.into(),
            date_of_birth: date_of_birth.into(),
            national_id: national_id.into(),
            total_points: Points::ZERO,
            opponents: Vec::new(),
        }
    }

    /// Display name, `"{first} {last}"`. Never used as a key.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Lightweight reference embedded in persisted matches.
    pub fn to_ref(&self) -> PlayerRef {
        PlayerRef {
            id: self.id.clone(),
            last_name: self.last_name.clone(),
            first_name: self.first_name.clone(),
        }
    }

    /// Record one meeting with `opponent`.
    pub fn add_opponent(&mut self, opponent: &PlayerId) {
        self.opponents.push(opponent.clone());
    }

    /// How many times this player has met `opponent`.
    pub fn encounters(&self, opponent: &PlayerId) -> usize {
        self.opponents.iter().filter(|id| *id == opponent).count()
    }

    pub fn has_played(&self, opponent: &PlayerId) -> bool {
        self.opponents.contains(opponent)
    }

    /// Copy of this player with tournament state cleared.
    pub fn fresh_entry(&self) -> Self {
        Self {
            total_points: Points::ZERO,
            opponents: Vec::new(),
            ..self.clone()
        }
    }
}

/// The identity part of a player, as stored inside a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRef {
    #[serde(default)]
    pub id: PlayerId,

    #[serde(default = "default_name")]
    pub last_name: String,

    #[serde(default = "default_name")]
    pub first_name: String,
}

impl Default for PlayerRef {
    fn default() -> Self {
        Self {
            id: PlayerId::generate(),
            last_name: default_name(),
            first_name: default_name(),
        }
    }
}

impl PlayerRef {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Player {
        Player::new("CARLSEN", "Magnus", "30/11/1990", "NO12345")
    }

    #[test]
    fn test_player_creation() {
        let player = sample();
        assert_eq!(player.last_name, "CARLSEN");
        assert_eq!(player.total_points, Points::ZERO);
        assert!(player.opponents.is_empty());
        assert_eq!(player.full_name(), "Magnus CARLSEN");
    }

    #[test]
    fn test_opponents_keep_repeats() {
        let mut player = sample();
        let other = PlayerId::from("other");
        player.add_opponent(&other);
        player.add_opponent(&other);

        assert_eq!(player.encounters(&other), 2);
        assert!(player.has_played(&other));
        assert!(!player.has_played(&PlayerId::from("stranger")));
    }

    #[test]
    fn test_serialization_omits_opponents() {
        let mut player = sample();
        player.add_opponent(&PlayerId::from("other"));
        player.total_points = Points::from_halves(3);

        let json = serde_json::to_value(&player).unwrap();
        assert!(json.get("opponents").is_none());
        assert_eq!(json["total_points"], serde_json::json!(1.5));

        let parsed: Player = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.id, player.id);
        assert_eq!(parsed.total_points, player.total_points);
        assert!(parsed.opponents.is_empty());
    }

    #[test]
    fn test_missing_fields_use_fallbacks() {
        let parsed: Player = serde_json::from_str(r#"{"last_name": "TAL"}"#).unwrap();
        assert_eq!(parsed.last_name, "TAL");
        assert_eq!(parsed.first_name, "Unknown");
        assert_eq!(parsed.date_of_birth, "01/01/1900");
        assert_eq!(parsed.national_id, "000000");
        assert_eq!(parsed.total_points, Points::ZERO);
        assert!(!parsed.id.as_str().is_empty());
    }

    #[test]
    fn test_fresh_entry_clears_tournament_state() {
        let mut player = sample();
        player.total_points = Points::ONE;
        player.add_opponent(&PlayerId::from("x"));

        let entry = player.fresh_entry();
        assert_eq!(entry.id, player.id);
        assert_eq!(entry.total_points, Points::ZERO);
        assert!(entry.opponents.is_empty());
    }

    #[test]
    fn test_player_ref() {
        let player = sample();
        let r = player.to_ref();
        assert_eq!(r.id, player.id);
        assert_eq!(r.full_name(), "Magnus CARLSEN");
    }
}
