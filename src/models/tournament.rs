//! Tournament model: roster, rounds and overall progress.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Match, MatchError, Outcome, Player, PlayerId, Points, Round, TournamentRef};

/// Errors raised by tournament state transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TournamentError {
    #[error("Number of players must be even and greater than 0 (got {0})")]
    InvalidPlayerCount(u32),

    #[error("Number of rounds must be greater than 0")]
    NoRounds,

    #[error("Expected {expected} players, got {actual}")]
    RosterSize { expected: u32, actual: usize },

    #[error("Player {0} selected more than once")]
    DuplicatePlayer(String),

    #[error("Roster is already set")]
    RosterLocked,

    #[error("Round {0} not found")]
    RoundNotFound(u32),

    #[error("Match {index} not found in round {round_number}")]
    MatchNotFound { round_number: u32, index: usize },

    #[error("Player {0} is not part of this tournament")]
    UnknownPlayer(PlayerId),

    #[error("Tournament rounds are not all completed")]
    RoundsNotCompleted,

    #[error(transparent)]
    Match(#[from] MatchError),
}

/// Coarse progress of a tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TournamentStatus {
    NotStarted,
    InProgress,
    Finished,
}

/// Filters used when listing tournaments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    NotStarted,
    InProgress,
    /// Not started or in progress
    NotFinished,
    Finished,
}

impl StatusFilter {
    pub fn matches(&self, tournament: &Tournament) -> bool {
        let (running, done) = (tournament.in_progress, tournament.rounds_completed);
        match self {
            StatusFilter::NotStarted => !running && !done,
            StatusFilter::InProgress => running && !done,
            StatusFilter::NotFinished => running || !done,
            StatusFilter::Finished => done && !running,
        }
    }
}

/// A Swiss tournament.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    #[serde(default)]
    pub reference: TournamentRef,

    #[serde(default = "unknown")]
    pub name: String,

    #[serde(default = "unknown")]
    pub location: String,

    /// `DD/MM/YYYY`
    #[serde(default = "unknown")]
    pub start_date: String,

    #[serde(default = "unknown")]
    pub end_date: String,

    #[serde(default)]
    pub number_of_rounds: u32,

    #[serde(default)]
    pub number_of_players: u32,

    /// Free text; replaced by the closing feedback when the tournament ends
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub rounds_completed: bool,

    #[serde(default)]
    pub in_progress: bool,

    /// Fixed roster, set once before play
    #[serde(default)]
    pub selected_players: Vec<Player>,

    #[serde(default)]
    pub rounds: Vec<Round>,
}

fn unknown() -> String {
    "Unknown".to_string()
}

impl Tournament {
    /// Create a tournament with an empty roster and no rounds.
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
        number_of_rounds: u32,
        number_of_players: u32,
    ) -> Result<Self, TournamentError> {
        if number_of_rounds == 0 {
            return Err(TournamentError::NoRounds);
        }
        if number_of_players == 0 || number_of_players % 2 != 0 {
            return Err(TournamentError::InvalidPlayerCount(number_of_players));
        }

        Ok(Self {
            reference: TournamentRef::generate(),
            name: name.into(),
            location: location.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
            number_of_rounds,
            number_of_players,
            description: None,
            rounds_completed: false,
            in_progress: false,
            selected_players: Vec::new(),
            rounds: Vec::new(),
        })
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the roster. Entries are copies of the registry records with
    /// tournament points and history cleared.
    pub fn enroll(&mut self, players: &[Player]) -> Result<(), TournamentError> {
        if !self.selected_players.is_empty() {
            return Err(TournamentError::RosterLocked);
        }
        if players.len() != self.number_of_players as usize {
            return Err(TournamentError::RosterSize {
                expected: self.number_of_players,
                actual: players.len(),
            });
        }
        for (i, player) in players.iter().enumerate() {
            if players[..i].iter().any(|p| p.id == player.id) {
                return Err(TournamentError::DuplicatePlayer(player.full_name()));
            }
        }

        self.selected_players = players.iter().map(Player::fresh_entry).collect();
        Ok(())
    }

    /// The roster is full, even and not empty.
    pub fn check_roster(&self) -> Result<(), TournamentError> {
        let actual = self.selected_players.len();
        if actual != self.number_of_players as usize || actual == 0 || actual % 2 != 0 {
            return Err(TournamentError::RosterSize {
                expected: self.number_of_players,
                actual,
            });
        }
        Ok(())
    }

    /// Mark the tournament as started. Requires a full, even roster.
    pub fn start(&mut self) -> Result<(), TournamentError> {
        self.check_roster()?;
        self.in_progress = true;
        Ok(())
    }

    pub fn status(&self) -> TournamentStatus {
        if self.rounds_completed && !self.in_progress {
            TournamentStatus::Finished
        } else if self.in_progress {
            TournamentStatus::InProgress
        } else {
            TournamentStatus::NotStarted
        }
    }

    pub fn round(&self, round_number: u32) -> Option<&Round> {
        self.rounds.iter().find(|r| r.round_number == round_number)
    }

    pub fn round_index(&self, round_number: u32) -> Option<usize> {
        self.rounds.iter().position(|r| r.round_number == round_number)
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.selected_players.iter().find(|p| &p.id == id)
    }

    /// Record the result of one match and credit both players exactly once.
    ///
    /// Rejects finished matches without changing anything.
    pub fn record_result(
        &mut self,
        round_number: u32,
        match_index: usize,
        outcome: Outcome,
    ) -> Result<(Points, Points), TournamentError> {
        let round = self
            .rounds
            .iter_mut()
            .find(|r| r.round_number == round_number)
            .ok_or(TournamentError::RoundNotFound(round_number))?;
        let game: &mut Match = round
            .matches
            .get_mut(match_index)
            .ok_or(TournamentError::MatchNotFound {
                round_number,
                index: match_index,
            })?;

        for side in &game.sides {
            if !self.selected_players.iter().any(|p| p.id == side.player.id) {
                return Err(TournamentError::UnknownPlayer(side.player.id.clone()));
            }
        }

        let credits = game.record_result(outcome)?;
        for (side, credit) in game.sides.iter().zip([credits.0, credits.1]) {
            if let Some(player) = self
                .selected_players
                .iter_mut()
                .find(|p| p.id == side.player.id)
            {
                player.total_points += credit;
            }
        }

        Ok(credits)
    }

    /// Recompute every roster player's opponent history from the matches of
    /// all rounds: one entry per match, keyed by id. Safe to call repeatedly.
    pub fn rebuild_opponents(&mut self) {
        for player in self.selected_players.iter_mut() {
            player.opponents.clear();
        }

        for game in self.rounds.iter().flat_map(|r| r.matches.iter()) {
            let (a, b) = (&game.first().id, &game.second().id);
            for player in self.selected_players.iter_mut() {
                if &player.id == a {
                    player.add_opponent(b);
                } else if &player.id == b {
                    player.add_opponent(a);
                }
            }
        }
    }

    /// Points a player earned in finished matches of this tournament.
    pub fn points_from_matches(&self, id: &PlayerId) -> Points {
        self.rounds
            .iter()
            .flat_map(|r| r.matches.iter())
            .filter(|m| m.finished)
            .filter_map(|m| m.score_of(id))
            .sum()
    }

    /// Roster players whose stored total disagrees with their match results.
    pub fn points_mismatches(&self) -> Vec<&Player> {
        self.selected_players
            .iter()
            .filter(|p| p.total_points != self.points_from_matches(&p.id))
            .collect()
    }

    /// Roster ordered by points (highest first), then by last name.
    pub fn standings(&self) -> Vec<&Player> {
        let mut players: Vec<&Player> = self.selected_players.iter().collect();
        players.sort_by(|a, b| {
            b.total_points
                .cmp(&a.total_points)
                .then_with(|| a.last_name.to_lowercase().cmp(&b.last_name.to_lowercase()))
        });
        players
    }

    /// Close the tournament with the organiser's feedback.
    pub fn complete(&mut self, feedback: impl Into<String>) -> Result<(), TournamentError> {
        if !self.rounds_completed {
            return Err(TournamentError::RoundsNotCompleted);
        }
        self.description = Some(feedback.into());
        self.in_progress = false;
        Ok(())
    }
}
