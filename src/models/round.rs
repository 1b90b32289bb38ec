//! Round model: one pairing cycle of a tournament.

use serde::{Deserialize, Serialize};

use super::{Match, Player};
use crate::pairing::{self, PairingError, RandomSource};

/// Where a round is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    /// Created, no matches yet
    Empty,
    /// Matches created, some still unresolved
    Paired,
    /// Every match finished
    Complete,
}

/// A round of play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    /// 1-based, matches the round's position in the tournament
    #[serde(default = "default_round_number")]
    pub round_number: u32,

    /// `DD/MM/YYYY HH:MM:SS`
    #[serde(default)]
    pub start_time: Option<String>,

    #[serde(default)]
    pub end_time: Option<String>,

    #[serde(default)]
    pub matches: Vec<Match>,
}

fn default_round_number() -> u32 {
    1
}

impl Round {
    pub fn new(round_number: u32, start_time: impl Into<String>) -> Self {
        Self {
            round_number,
            start_time: Some(start_time.into()),
            end_time: None,
            matches: Vec::new(),
        }
    }

    pub fn is_first_round(&self) -> bool {
        self.round_number == 1
    }

    pub fn state(&self) -> RoundState {
        if self.matches.is_empty() {
            RoundState::Empty
        } else if self.has_unfinished() {
            RoundState::Paired
        } else {
            RoundState::Complete
        }
    }

    pub fn has_unfinished(&self) -> bool {
        self.matches.iter().any(|m| !m.finished)
    }

    pub fn is_complete(&self) -> bool {
        self.state() == RoundState::Complete
    }

    /// Number of finished matches.
    pub fn finished_count(&self) -> usize {
        self.matches.iter().filter(|m| m.finished).count()
    }

    /// Generate this round's matches from `roster`.
    ///
    /// Only an empty round is paired; returns `Ok(false)` when matches already
    /// exist so a resumed round keeps its pairings.
    pub fn pair<R: RandomSource>(
        &mut self,
        roster: &mut [Player],
        rng: &mut R,
    ) -> Result<bool, PairingError> {
        if self.state() != RoundState::Empty {
            return Ok(false);
        }
        self.matches = pairing::create_pairs(roster, self.round_number, rng)?;
        Ok(true)
    }

    /// Stamp the end time once every match is finished. Keeps an existing stamp.
    pub fn finish(&mut self, end_time: impl Into<String>) -> bool {
        if !self.is_complete() || self.end_time.is_some() {
            return false;
        }
        self.end_time = Some(end_time.into());
        true
    }
}
