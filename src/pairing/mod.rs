//! Swiss pairing engine.
//!
//! - Round 1: random pairing of a shuffled roster, (0,1), (2,3), ...
//! - Later rounds: players sorted by points and grouped by exact score;
//!   each player is paired inside their own score group when possible,
//!   reaching into lower groups otherwise, avoiding rematches.

pub mod rng;

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use crate::models::{Match, Player, Points};
pub use rng::{RandomSource, SeededRng, SystemRng};

/// Errors that can occur while pairing a round.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PairingError {
    #[error("Cannot pair an empty roster")]
    EmptyRoster,

    #[error("Cannot pair an odd number of players ({0}); byes are not supported")]
    OddRoster(usize),

    #[error("No opponent available for {player} in round {round_number}")]
    NoOpponent { player: String, round_number: u32 },
}

/// Pair the whole roster for `round_number`.
///
/// The roster is reordered in place (shuffled for round 1, sorted by points
/// afterwards). On success every player appears in exactly one match and each
/// pair is recorded in both players' opponent history. On error the
/// opponent histories are left untouched; an empty or odd roster is rejected
/// before it is reordered.
pub fn create_pairs<R: RandomSource>(
    roster: &mut [Player],
    round_number: u32,
    rng: &mut R,
) -> Result<Vec<Match>, PairingError> {
    if roster.is_empty() {
        return Err(PairingError::EmptyRoster);
    }
    if roster.len() % 2 != 0 {
        return Err(PairingError::OddRoster(roster.len()));
    }

    let plan = if round_number <= 1 {
        random_plan(roster, rng)
    } else {
        score_plan(roster, round_number, rng)?
    };

    let mut matches = Vec::with_capacity(plan.len());
    for (i, j) in plan {
        let first_id = roster[i].id.clone();
        let second_id = roster[j].id.clone();
        roster[i].add_opponent(&second_id);
        roster[j].add_opponent(&first_id);

        debug!(
            round = round_number,
            "Paired {} vs {}",
            roster[i].full_name(),
            roster[j].full_name()
        );
        matches.push(Match::new(&roster[i], &roster[j], round_number));
    }

    Ok(matches)
}

/// Shuffle, then pair neighbours.
fn random_plan<R: RandomSource>(roster: &mut [Player], rng: &mut R) -> Vec<(usize, usize)> {
    rng.shuffle(roster);
    (0..roster.len()).step_by(2).map(|i| (i, i + 1)).collect()
}

/// Score-group pairing with rematch avoidance.
fn score_plan<R: RandomSource>(
    roster: &mut [Player],
    round_number: u32,
    rng: &mut R,
) -> Result<Vec<(usize, usize)>, PairingError> {
    // Stable: equal scores keep the order left by earlier rounds.
    roster.sort_by(|a, b| b.total_points.cmp(&a.total_points));

    let mut groups: BTreeMap<Points, Vec<usize>> = BTreeMap::new();
    for (idx, player) in roster.iter().enumerate() {
        groups.entry(player.total_points).or_default().push(idx);
    }

    let mut taken = vec![false; roster.len()];
    let mut plan = Vec::with_capacity(roster.len() / 2);

    while let Some(first) = taken.iter().position(|t| !t) {
        taken[first] = true;

        let pool = candidate_pool(roster[first].total_points, &groups, &taken);
        let Some(second) = best_opponent(&roster[first], &pool, roster, rng) else {
            return Err(PairingError::NoOpponent {
                player: roster[first].full_name(),
                round_number,
            });
        };

        taken[second] = true;
        plan.push((first, second));
    }

    Ok(plan)
}

/// Available players from the score group `points`, topped up from the next
/// lower groups until there are at least two to choose from.
fn candidate_pool(
    points: Points,
    groups: &BTreeMap<Points, Vec<usize>>,
    taken: &[bool],
) -> Vec<usize> {
    let mut pool = Vec::new();
    for (group_points, members) in groups.range(..=points).rev() {
        if *group_points < points && pool.len() >= 2 {
            break;
        }
        pool.extend(members.iter().copied().filter(|&idx| !taken[idx]));
    }
    pool
}

/// First candidate never met; failing that, one of those met the fewest
/// times, chosen at random.
fn best_opponent<R: RandomSource>(
    player: &Player,
    pool: &[usize],
    roster: &[Player],
    rng: &mut R,
) -> Option<usize> {
    if let Some(&fresh) = pool.iter().find(|&&idx| !player.has_played(&roster[idx].id)) {
        return Some(fresh);
    }

    let fewest = pool
        .iter()
        .map(|&idx| player.encounters(&roster[idx].id))
        .min()?;
    let best: Vec<usize> = pool
        .iter()
        .copied()
        .filter(|&idx| player.encounters(&roster[idx].id) == fewest)
        .collect();

    Some(best[rng.choose_index(best.len())])
}
