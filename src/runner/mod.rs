//! Tournament runner.
//!
//! Drives a tournament round by round:
//! 1. Find where play stopped, from the persisted state only
//! 2. Create and pair the next round
//! 3. Ask for every unresolved result and record it
//! 4. Persist after every step so a crash can resume where it stopped

pub mod input;

pub use input::{ConsoleResults, InputError, MatchContext, ResultSource, ScriptedResults};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::dates;
use crate::models::{MatchError, Round, Tournament, TournamentError, TournamentStatus};
use crate::pairing::{PairingError, RandomSource};
use crate::registry::PlayerRegistry;
use crate::storage::{ClubStore, StorageError};

/// Errors that can occur while running a tournament.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Pairing error: {0}")]
    Pairing(#[from] PairingError),

    #[error("Tournament error: {0}")]
    Tournament(#[from] TournamentError),

    #[error("Match error: {0}")]
    Match(#[from] MatchError),

    #[error("Input error: {0}")]
    Input(#[from] InputError),
}

/// What a call to [`TournamentRunner::run_tournament`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub rounds_played: u32,
    pub matches_recorded: usize,
    /// Play picked up from previously persisted rounds
    pub resumed: bool,
}

/// Number of rounds already fully played, counted from round 1.
///
/// The first round number that is missing or still has an unfinished match
/// is the current one; the returned value is that number minus one, or
/// `number_of_rounds` once every round is complete.
pub fn determine_current_round_index(tournament: &Tournament) -> u32 {
    (1..=tournament.number_of_rounds)
        .find(|&n| !tournament.round(n).map(Round::is_complete).unwrap_or(false))
        .map(|n| n - 1)
        .unwrap_or(tournament.number_of_rounds)
}

/// Runs tournaments against a store, a random source for pairings and a
/// source of match results.
pub struct TournamentRunner<'a, G, S> {
    store: &'a ClubStore,
    rng: G,
    results: S,
}

impl<'a, G: RandomSource, S: ResultSource> TournamentRunner<'a, G, S> {
    pub fn new(store: &'a ClubStore, rng: G, results: S) -> Self {
        Self {
            store,
            rng,
            results,
        }
    }

    pub fn results(&self) -> &S {
        &self.results
    }

    pub fn results_mut(&mut self) -> &mut S {
        &mut self.results
    }

    fn persist(&self, tournament: &Tournament) -> Result<(), RunError> {
        self.store.save_tournament_update(tournament)?;
        Ok(())
    }

    fn sync_registry(&self) -> Result<(), RunError> {
        let tournaments = self.store.try_load_tournaments()?;
        PlayerRegistry::load(self.store).sync_lifetime_points(&tournaments)?;
        Ok(())
    }

    /// Index of round `round_number` in `tournament.rounds`, creating and
    /// persisting it when it does not exist yet. Never duplicates a round.
    pub fn get_or_create_round(
        &self,
        tournament: &mut Tournament,
        round_number: u32,
    ) -> Result<usize, RunError> {
        if let Some(index) = tournament.round_index(round_number) {
            debug!("Round {} already exists", round_number);
            return Ok(index);
        }

        tournament.rounds.push(Round::new(round_number, dates::now()));
        self.persist(tournament)?;
        info!("Created round {} of {}", round_number, tournament.name);

        Ok(tournament.rounds.len() - 1)
    }

    /// Play every unresolved match of a round. Returns how many results were
    /// recorded.
    pub fn play_round(
        &mut self,
        tournament: &mut Tournament,
        round_number: u32,
    ) -> Result<usize, RunError> {
        let index = self.get_or_create_round(tournament, round_number)?;

        if tournament.rounds[index].pair(&mut tournament.selected_players, &mut self.rng)? {
            self.persist(tournament)?;
            info!(
                "Paired round {}: {} matches",
                round_number,
                tournament.rounds[index].matches.len()
            );
        }

        let mut recorded = 0;
        for i in 0..tournament.rounds[index].matches.len() {
            let game = &mut tournament.rounds[index].matches[i];
            if game.finished {
                continue;
            }

            let resumed = !game.start()?;
            if resumed {
                info!(
                    "Resuming match {} of round {}: {} vs {}",
                    i + 1,
                    round_number,
                    game.first().full_name(),
                    game.second().full_name()
                );
            } else {
                self.persist(tournament)?;
            }

            let game = &tournament.rounds[index].matches[i];
            let ctx = MatchContext {
                round_number,
                match_number: i + 1,
                first: game.first(),
                second: game.second(),
                resumed,
            };
            let outcome = self.results.outcome(&ctx)?;

            tournament.record_result(round_number, i, outcome)?;
            self.persist(tournament)?;
            self.sync_registry()?;
            recorded += 1;
            debug!("Recorded {:?} for match {} of round {}", outcome, i + 1, round_number);
        }

        if tournament.rounds[index].finish(dates::now()) {
            self.persist(tournament)?;
            info!("Round {} complete", round_number);
        }

        Ok(recorded)
    }

    /// Fold a played round into the roster's opponent history.
    pub fn process_round_results(&self, tournament: &mut Tournament, round_number: u32) {
        tournament.rebuild_opponents();
        debug!("Processed results of round {}", round_number);
    }

    /// Play the tournament to the end of its last round, resuming from
    /// whatever the persisted state says.
    pub fn run_tournament(&mut self, tournament: &mut Tournament) -> Result<RunSummary, RunError> {
        let mut summary = RunSummary::default();

        // A previous run may have stopped between saving a result and
        // updating the registry.
        self.sync_registry()?;

        if tournament.status() == TournamentStatus::Finished {
            warn!("Tournament {} is already finished", tournament.reference);
            return Ok(summary);
        }

        if tournament.in_progress {
            tournament.check_roster()?;
        } else {
            tournament.start()?;
            self.persist(tournament)?;
            info!("Started tournament {} ({})", tournament.name, tournament.reference);
        }

        let current = determine_current_round_index(tournament);
        summary.resumed = !tournament.rounds.is_empty();
        if summary.resumed {
            info!(
                "Resuming {} after {} completed rounds",
                tournament.name, current
            );
        }

        for round_number in current + 1..=tournament.number_of_rounds {
            summary.matches_recorded += self.play_round(tournament, round_number)?;
            self.process_round_results(tournament, round_number);
            self.persist(tournament)?;
            summary.rounds_played += 1;

            for player in tournament.standings() {
                debug!("{}: {}", player.full_name(), player.total_points);
            }
        }

        tournament.rounds_completed = true;
        self.persist(tournament)?;
        info!(
            "Tournament {} played: {} rounds, {} results recorded",
            tournament.name, summary.rounds_played, summary.matches_recorded
        );

        Ok(summary)
    }

    /// Close a fully played tournament with the organiser's feedback.
    pub fn finalize(&self, tournament: &mut Tournament, feedback: &str) -> Result<(), RunError> {
        tournament.complete(feedback.trim())?;
        self.persist(tournament)?;
        info!("Tournament {} finished", tournament.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchStatus, Outcome, PlayerId, Points};
    use crate::pairing::SeededRng;
    use crate::storage::StorageConfig;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn store(temp_dir: &TempDir) -> ClubStore {
        ClubStore::new(StorageConfig::new(temp_dir.path().to_path_buf()))
    }

    fn setup(store: &ClubStore, players: u32, rounds: u32) -> Tournament {
        let mut registry = PlayerRegistry::load(store);
        for i in 0..players {
            let last = format!("PLAYER{}", (b'A' + i as u8) as char);
            registry
                .create(&last, "Test", "01/01/1990", &format!("FR{:05}", i))
                .unwrap();
        }

        let mut t =
            Tournament::new("Club Open", "Lyon", "01/06/2025", "02/06/2025", rounds, players).unwrap();
        t.enroll(registry.players()).unwrap();
        store.add_tournament(&t).unwrap();
        t
    }

    fn reload(store: &ClubStore, t: &Tournament) -> Tournament {
        store
            .find_tournament(t.reference.as_str())
            .unwrap()
            .unwrap()
    }

    fn points(t: &Tournament, id: &PlayerId) -> Points {
        t.player(id).unwrap().total_points
    }

    #[test]
    fn test_determine_current_round_index() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let mut t = setup(&store, 4, 3);
        assert_eq!(determine_current_round_index(&t), 0);

        let mut round = Round::new(1, "01/06/2025 10:00:00");
        round
            .pair(&mut t.selected_players, &mut SeededRng::from_seed(1))
            .unwrap();
        t.rounds.push(round);
        assert_eq!(determine_current_round_index(&t), 0);

        t.record_result(1, 0, Outcome::AWins).unwrap();
        t.record_result(1, 1, Outcome::AWins).unwrap();
        assert_eq!(determine_current_round_index(&t), 1);

        for n in 2..=3 {
            let mut round = Round::new(n, "01/06/2025 10:00:00");
            round
                .pair(&mut t.selected_players, &mut SeededRng::from_seed(n as u64))
                .unwrap();
            t.rounds.push(round);
            t.record_result(n, 0, Outcome::Draw).unwrap();
            t.record_result(n, 1, Outcome::Draw).unwrap();
        }
        assert_eq!(determine_current_round_index(&t), 3);
    }

    #[test]
    fn test_get_or_create_round_never_duplicates() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let mut t = setup(&store, 4, 2);
        let runner = TournamentRunner::new(&store, SeededRng::from_seed(1), ScriptedResults::default());

        let first = runner.get_or_create_round(&mut t, 1).unwrap();
        let again = runner.get_or_create_round(&mut t, 1).unwrap();
        assert_eq!(first, again);
        assert_eq!(t.rounds.len(), 1);
        assert_eq!(reload(&store, &t).rounds.len(), 1);
    }

    #[test]
    fn test_single_round_tournament() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let mut t = setup(&store, 4, 1);
        let mut runner = TournamentRunner::new(
            &store,
            SeededRng::from_seed(3),
            ScriptedResults::new([Outcome::AWins, Outcome::Draw]),
        );

        let summary = runner.run_tournament(&mut t).unwrap();
        assert_eq!(
            summary,
            RunSummary {
                rounds_played: 1,
                matches_recorded: 2,
                resumed: false
            }
        );

        let round = &t.rounds[0];
        assert_eq!(round.matches.len(), 2);
        assert!(round.end_time.is_some());

        let (winner, loser) = (&round.matches[0].first().id, &round.matches[0].second().id);
        let (c, d) = (&round.matches[1].first().id, &round.matches[1].second().id);
        assert_eq!(points(&t, winner), Points::ONE);
        assert_eq!(points(&t, loser), Points::ZERO);
        assert_eq!(points(&t, c), Points::HALF);
        assert_eq!(points(&t, d), Points::HALF);
        assert!(t.rounds_completed);

        let stored = reload(&store, &t);
        assert!(stored.rounds_completed);
        assert_eq!(points(&stored, winner), Points::ONE);

        let registry = PlayerRegistry::load(&store);
        assert_eq!(registry.get(winner).unwrap().total_points, Points::ONE);
        assert_eq!(registry.get(c).unwrap().total_points, Points::HALF);
    }

    #[test]
    fn test_second_round_pairs_by_score() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let mut t = setup(&store, 4, 2);
        let mut runner = TournamentRunner::new(
            &store,
            SeededRng::from_seed(8),
            ScriptedResults::new([Outcome::AWins, Outcome::AWins, Outcome::Draw, Outcome::Draw]),
        );

        runner.run_tournament(&mut t).unwrap();

        let first_round = &t.rounds[0];
        let winners = [first_round.matches[0].first().id.clone(), first_round.matches[1].first().id.clone()];
        let losers = [first_round.matches[0].second().id.clone(), first_round.matches[1].second().id.clone()];

        let second_round = t.round(2).unwrap();
        assert_eq!(second_round.matches.len(), 2);
        for game in &second_round.matches {
            let both_winners = winners.contains(&game.first().id) && winners.contains(&game.second().id);
            let both_losers = losers.contains(&game.first().id) && losers.contains(&game.second().id);
            assert!(both_winners || both_losers);
        }
    }

    #[test]
    fn test_resume_mid_round() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let mut t = setup(&store, 4, 2);

        let mut crashing = TournamentRunner::new(
            &store,
            SeededRng::from_seed(21),
            ScriptedResults::new([Outcome::AWins, Outcome::BWins, Outcome::Draw]),
        );
        let err = crashing.run_tournament(&mut t).unwrap_err();
        assert!(matches!(err, RunError::Input(InputError::Closed)));

        let mut restored = reload(&store, &t);
        assert_eq!(determine_current_round_index(&restored), 1);
        let round_two = restored.round(2).unwrap().clone();
        assert_eq!(round_two.matches[0].status(), MatchStatus::Finished);
        assert_eq!(round_two.matches[1].status(), MatchStatus::InProgress);

        let mut runner = TournamentRunner::new(
            &store,
            SeededRng::from_seed(99),
            ScriptedResults::new([Outcome::AWins]),
        );
        let summary = runner.run_tournament(&mut restored).unwrap();
        assert_eq!(summary.rounds_played, 1);
        assert_eq!(summary.matches_recorded, 1);
        assert!(summary.resumed);

        let asked = runner.results().asked();
        assert_eq!(asked.len(), 1);
        assert_eq!((asked[0].round_number, asked[0].match_number), (2, 2));
        assert!(asked[0].resumed);

        assert_eq!(restored.rounds.len(), 2);
        let replayed = restored.round(2).unwrap();
        for (before, after) in round_two.matches.iter().zip(&replayed.matches) {
            assert_eq!(before.first(), after.first());
            assert_eq!(before.second(), after.second());
        }
        assert!(restored.rounds_completed);
        assert!(restored.points_mismatches().is_empty());
        for player in &restored.selected_players {
            assert_eq!(player.opponents.len(), 2);
        }
    }

    #[test]
    fn test_resume_between_rounds() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let mut t = setup(&store, 4, 2);

        let mut first = TournamentRunner::new(
            &store,
            SeededRng::from_seed(4),
            ScriptedResults::new([Outcome::Draw, Outcome::AWins]),
        );
        t.start().unwrap();
        first.play_round(&mut t, 1).unwrap();
        first.process_round_results(&mut t, 1);

        let mut restored = reload(&store, &t);
        assert_eq!(restored.rounds.len(), 1);
        assert_eq!(determine_current_round_index(&restored), 1);

        let mut runner = TournamentRunner::new(
            &store,
            SeededRng::from_seed(5),
            ScriptedResults::new([Outcome::Draw, Outcome::Draw]),
        );
        let summary = runner.run_tournament(&mut restored).unwrap();
        assert_eq!(summary.rounds_played, 1);
        assert_eq!(restored.rounds.len(), 2);
        assert!(runner.results().asked().iter().all(|a| a.round_number == 2));
    }

    #[test]
    fn test_every_player_plays_every_round() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let mut t = setup(&store, 6, 4);
        let mut runner = TournamentRunner::new(
            &store,
            SeededRng::from_seed(13),
            ScriptedResults::new([
                Outcome::AWins, Outcome::BWins, Outcome::Draw,
                Outcome::Draw, Outcome::AWins, Outcome::AWins,
                Outcome::BWins, Outcome::Draw, Outcome::AWins,
                Outcome::Draw, Outcome::Draw, Outcome::BWins,
            ]),
        );

        runner.run_tournament(&mut t).unwrap();

        for player in &t.selected_players {
            let played = t
                .rounds
                .iter()
                .flat_map(|r| r.matches.iter())
                .filter(|m| m.involves(&player.id))
                .count();
            assert_eq!(played, 4);
            assert_eq!(player.opponents.len(), 4);
            assert_eq!(player.total_points, t.points_from_matches(&player.id));
        }

        let total: Points = t.selected_players.iter().map(|p| p.total_points).sum();
        assert_eq!(total, Points::from_halves(2 * 12));
    }

    #[test]
    fn test_finalize_requires_completed_rounds() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let mut t = setup(&store, 4, 1);
        let mut runner = TournamentRunner::new(
            &store,
            SeededRng::from_seed(2),
            ScriptedResults::new([Outcome::Draw, Outcome::Draw]),
        );

        assert!(matches!(
            runner.finalize(&mut t, "too early"),
            Err(RunError::Tournament(TournamentError::RoundsNotCompleted))
        ));

        runner.run_tournament(&mut t).unwrap();
        runner.finalize(&mut t, "  Well organised  ").unwrap();

        let stored = reload(&store, &t);
        assert_eq!(stored.status(), TournamentStatus::Finished);
        assert_eq!(stored.description.as_deref(), Some("Well organised"));

        let again = runner.run_tournament(&mut t).unwrap();
        assert_eq!(again, RunSummary::default());
    }

    #[test]
    fn test_run_started_tournament_without_roster_fails() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        std::fs::write(
            store.config().tournaments_path(),
            r#"[{"reference":"abc","number_of_rounds":2,"number_of_players":4,"in_progress":true}]"#,
        )
        .unwrap();
        let mut t = store.find_tournament("abc").unwrap().unwrap();

        let mut runner = TournamentRunner::new(
            &store,
            SeededRng::from_seed(1),
            ScriptedResults::new([Outcome::Draw, Outcome::Draw]),
        );
        assert!(matches!(
            runner.run_tournament(&mut t),
            Err(RunError::Tournament(TournamentError::RosterSize { expected: 4, actual: 0 }))
        ));
        assert!(runner.results().asked().is_empty());

        let stored = reload(&store, &t);
        assert!(stored.rounds.is_empty());
        assert!(!stored.rounds_completed);
    }

    #[test]
    fn test_run_resyncs_stale_registry() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let mut t = setup(&store, 4, 1);

        // Result saved, registry never updated.
        t.start().unwrap();
        let mut round = Round::new(1, "01/06/2025 10:00:00");
        round
            .pair(&mut t.selected_players, &mut SeededRng::from_seed(6))
            .unwrap();
        t.rounds.push(round);
        t.record_result(1, 0, Outcome::AWins).unwrap();
        store.save_tournament_update(&t).unwrap();

        let winner = t.rounds[0].matches[0].first().id.clone();
        assert_eq!(
            PlayerRegistry::load(&store).get(&winner).unwrap().total_points,
            Points::ZERO
        );

        let mut runner = TournamentRunner::new(
            &store,
            SeededRng::from_seed(6),
            ScriptedResults::default(),
        );
        assert!(matches!(
            runner.run_tournament(&mut t),
            Err(RunError::Input(InputError::Closed))
        ));
        assert_eq!(
            PlayerRegistry::load(&store).get(&winner).unwrap().total_points,
            Points::ONE
        );
    }

    #[test]
    fn test_run_unknown_tournament_fails() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let mut t = setup(&store, 4, 1);
        t.reference = "not-stored".into();

        let mut runner = TournamentRunner::new(
            &store,
            SeededRng::from_seed(2),
            ScriptedResults::new([Outcome::Draw, Outcome::Draw]),
        );
        assert!(matches!(
            runner.run_tournament(&mut t),
            Err(RunError::Storage(StorageError::TournamentNotFound(_)))
        ));
    }
}
