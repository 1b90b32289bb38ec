//! Match model: one game between two players within a round.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Player, PlayerId, PlayerRef, Points};

/// Errors raised by match state transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatchError {
    #[error("Match {first} vs {second} in round {round_number} is already finished")]
    AlreadyFinished {
        round_number: u32,
        first: String,
        second: String,
    },
}

/// Result of a game, from the point of view of the match's two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// First listed player wins
    AWins,
    /// Second listed player wins
    BWins,
    Draw,
}

impl Outcome {
    /// Scores awarded to (first, second).
    pub fn scores(&self) -> (Points, Points) {
        match self {
            Outcome::AWins => (Points::ONE, Points::ZERO),
            Outcome::BWins => (Points::ZERO, Points::ONE),
            Outcome::Draw => (Points::HALF, Points::HALF),
        }
    }
}

/// Lifecycle of a match. Derived from the persisted flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    NotStarted,
    InProgress,
    Finished,
}

/// One side of a match: who played and what they scored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSide {
    #[serde(default)]
    pub player: PlayerRef,

    #[serde(default)]
    pub score: Points,
}

fn default_sides() -> [MatchSide; 2] {
    [MatchSide::default(), MatchSide::default()]
}

fn default_round_number() -> u32 {
    1
}

/// A paired contest between two players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    #[serde(rename = "match", default = "default_sides")]
    pub sides: [MatchSide; 2],

    #[serde(default = "default_round_number")]
    pub round_number: u32,

    #[serde(default)]
    pub finished: bool,

    #[serde(default)]
    pub in_progress: bool,
}

impl Match {
    /// Pair two players. Both scores start at zero.
    pub fn new(first: &Player, second: &Player, round_number: u32) -> Self {
        Self {
            sides: [
                MatchSide {
                    player: first.to_ref(),
                    score: Points::ZERO,
                },
                MatchSide {
                    player: second.to_ref(),
                    score: Points::ZERO,
                },
            ],
            round_number,
            finished: false,
            in_progress: false,
        }
    }

    pub fn first(&self) -> &PlayerRef {
        &self.sides[0].player
    }

    pub fn second(&self) -> &PlayerRef {
        &self.sides[1].player
    }

    pub fn status(&self) -> MatchStatus {
        if self.finished {
            MatchStatus::Finished
        } else if self.in_progress {
            MatchStatus::InProgress
        } else {
            MatchStatus::NotStarted
        }
    }

    /// Mark the match as being played.
    ///
    /// Returns `Ok(true)` when the match was started now and `Ok(false)` when
    /// it was already in progress.
    pub fn start(&mut self) -> Result<bool, MatchError> {
        match self.status() {
            MatchStatus::Finished => Err(self.already_finished()),
            MatchStatus::InProgress => Ok(false),
            MatchStatus::NotStarted => {
                self.in_progress = true;
                Ok(true)
            }
        }
    }

    /// Store the result and close the match.
    ///
    /// Returns the points earned by (first, second). Player totals are not
    /// touched here; the tournament credits them so it happens exactly once.
    pub fn record_result(&mut self, outcome: Outcome) -> Result<(Points, Points), MatchError> {
        if self.finished {
            return Err(self.already_finished());
        }
        let (first, second) = outcome.scores();
        self.sides[0].score = first;
        self.sides[1].score = second;
        self.finished = true;
        self.in_progress = false;
        Ok((first, second))
    }

    /// Each player with their score, keyed by id.
    pub fn results(&self) -> [(&PlayerRef, Points); 2] {
        [
            (&self.sides[0].player, self.sides[0].score),
            (&self.sides[1].player, self.sides[1].score),
        ]
    }

    pub fn involves(&self, player: &PlayerId) -> bool {
        self.sides.iter().any(|side| &side.player.id == player)
    }

    pub fn score_of(&self, player: &PlayerId) -> Option<Points> {
        self.sides
            .iter()
            .find(|side| &side.player.id == player)
            .map(|side| side.score)
    }

    fn already_finished(&self) -> MatchError {
        MatchError::AlreadyFinished {
            round_number: self.round_number,
            first: self.first().full_name(),
            second: self.second().full_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn players() -> (Player, Player) {
        (
            Player::new("ANAND", "Viswanathan", "11/12/1969", "IN00001"),
            Player::new("KRAMNIK", "Vladimir", "25/06/1975", "RU00002"),
        )
    }

    #[test]
    fn test_new_match_is_not_started() {
        let (a, b) = players();
        let m = Match::new(&a, &b, 3);
        assert_eq!(m.status(), MatchStatus::NotStarted);
        assert_eq!(m.round_number, 3);
        assert_eq!(m.results()[0].1, Points::ZERO);
        assert_eq!(m.results()[1].1, Points::ZERO);
    }

    #[test]
    fn test_start_then_record() {
        let (a, b) = players();
        let mut m = Match::new(&a, &b, 1);

        assert_eq!(m.start(), Ok(true));
        assert_eq!(m.start(), Ok(false));
        assert_eq!(m.status(), MatchStatus::InProgress);

        let credits = m.record_result(Outcome::AWins).unwrap();
        assert_eq!(credits, (Points::ONE, Points::ZERO));
        assert_eq!(m.status(), MatchStatus::Finished);
        assert!(!m.in_progress);
    }

    #[test]
    fn test_draw_splits_point() {
        let (a, b) = players();
        let mut m = Match::new(&a, &b, 1);
        m.record_result(Outcome::Draw).unwrap();
        assert_eq!(m.score_of(&a.id), Some(Points::HALF));
        assert_eq!(m.score_of(&b.id), Some(Points::HALF));
    }

    #[test]
    fn test_finished_scores_sum_to_one() {
        for outcome in [Outcome::AWins, Outcome::BWins, Outcome::Draw] {
            let (a, b) = players();
            let mut m = Match::new(&a, &b, 1);
            m.record_result(outcome).unwrap();
            let [(_, s1), (_, s2)] = m.results();
            assert_eq!(s1 + s2, Points::ONE);
        }
    }

    #[test]
    fn test_record_on_finished_match_is_rejected() {
        let (a, b) = players();
        let mut m = Match::new(&a, &b, 2);
        m.record_result(Outcome::BWins).unwrap();
        let before = m.clone();

        let err = m.record_result(Outcome::AWins).unwrap_err();
        assert!(matches!(err, MatchError::AlreadyFinished { round_number: 2, .. }));
        assert_eq!(m, before);
        assert!(m.start().is_err());
    }

    #[test]
    fn test_involves() {
        let (a, b) = players();
        let m = Match::new(&a, &b, 1);
        assert!(m.involves(&a.id));
        assert!(m.involves(&b.id));
        assert!(!m.involves(&PlayerId::from("nobody")));
    }

    #[test]
    fn test_persisted_shape() {
        let (a, b) = players();
        let mut m = Match::new(&a, &b, 1);
        m.record_result(Outcome::Draw).unwrap();

        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["match"][0]["player"]["last_name"], "ANAND");
        assert_eq!(json["match"][1]["score"], serde_json::json!(0.5));
        assert_eq!(json["finished"], true);
        assert_eq!(json["in_progress"], false);
        assert_eq!(json["round_number"], 1);

        let parsed: Match = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, m);
    }

    #[test]
    fn test_lenient_defaults() {
        let parsed: Match = serde_json::from_str(r#"{"round_number": 2}"#).unwrap();
        assert_eq!(parsed.round_number, 2);
        assert_eq!(parsed.first().last_name, "Unknown");
        assert_eq!(parsed.status(), MatchStatus::NotStarted);
    }
}
