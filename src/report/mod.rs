//! Plain-text reports: player listings, tournament listings, standings and
//! the full tournament report.

use crate::models::{MatchStatus, Player, Tournament, TournamentStatus};

fn status_label(status: TournamentStatus) -> &'static str {
    match status {
        TournamentStatus::NotStarted => "not started",
        TournamentStatus::InProgress => "in progress",
        TournamentStatus::Finished => "finished",
    }
}

/// Numbered player listing, in the order given.
pub fn players_table(players: &[&Player]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>3}  {:<20} {:<20} {:<12} {:<9} {:>6}\n",
        "#", "Last name", "First name", "Born", "Nat. id", "Points"
    ));
    out.push_str(&"-".repeat(76));
    out.push('\n');

    for (i, p) in players.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}  {:<20} {:<20} {:<12} {:<9} {:>6}\n",
            i + 1,
            p.last_name,
            p.first_name,
            p.date_of_birth,
            p.national_id,
            p.total_points.to_string()
        ));
    }
    out
}

/// Numbered tournament listing with status.
pub fn tournaments_table(tournaments: &[&Tournament]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>3}  {:<8} {:<24} {:<16} {:<10} {:<10} {:<11}\n",
        "#", "Ref", "Name", "Location", "Start", "End", "Status"
    ));
    out.push_str(&"-".repeat(88));
    out.push('\n');

    for (i, t) in tournaments.iter().enumerate() {
        let short_ref: String = t.reference.as_str().chars().take(8).collect();
        out.push_str(&format!(
            "{:>3}  {:<8} {:<24} {:<16} {:<10} {:<10} {:<11}\n",
            i + 1,
            short_ref,
            t.name,
            t.location,
            t.start_date,
            t.end_date,
            status_label(t.status())
        ));
    }
    out
}

/// Ranked roster with points.
pub fn standings_table(tournament: &Tournament) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:>4}  {:<36} {:>6}\n", "Rank", "Player", "Points"));
    out.push_str(&"-".repeat(48));
    out.push('\n');

    for (i, p) in tournament.standings().iter().enumerate() {
        out.push_str(&format!(
            "{:>4}  {:<36} {:>6}\n",
            i + 1,
            p.full_name(),
            p.total_points.to_string()
        ));
    }
    out
}

/// Tournament header: dates, progress and remarks.
pub fn summary(tournament: &Tournament) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== Tournament: {} ===\n\n", tournament.name));
    out.push_str(&format!("Reference: {}\n", tournament.reference));
    out.push_str(&format!("Location:  {}\n", tournament.location));
    out.push_str(&format!(
        "Dates:     {} - {}\n",
        tournament.start_date, tournament.end_date
    ));
    out.push_str(&format!(
        "Rounds:    {} ({} played)\n",
        tournament.number_of_rounds,
        tournament.rounds.iter().filter(|r| r.is_complete()).count()
    ));
    out.push_str(&format!("Players:   {}\n", tournament.number_of_players));
    out.push_str(&format!("Status:    {}\n", status_label(tournament.status())));
    if let Some(description) = tournament.description.as_deref().filter(|d| !d.is_empty()) {
        out.push_str(&format!("Remarks:   {}\n", description));
    }
    out
}

/// Everything known about a tournament: header, standings and every round
/// with its matches.
pub fn render(tournament: &Tournament) -> String {
    let mut out = summary(tournament);
    out.push('\n');

    if tournament.selected_players.is_empty() {
        out.push_str("No players registered for this tournament.\n");
        return out;
    }

    out.push_str("Standings:\n");
    out.push_str(&standings_table(tournament));

    for round in &tournament.rounds {
        out.push_str(&format!("\nRound {}", round.round_number));
        match (&round.start_time, &round.end_time) {
            (Some(start), Some(end)) => out.push_str(&format!(" ({} - {})", start, end)),
            (Some(start), None) => out.push_str(&format!(" (started {})", start)),
            _ => {}
        }
        out.push_str(&format!(
            ": {}/{} matches played\n",
            round.finished_count(),
            round.matches.len()
        ));

        for game in &round.matches {
            let [(a, score_a), (b, score_b)] = game.results();
            let result = match game.status() {
                MatchStatus::Finished => format!("{} - {}", score_a, score_b),
                MatchStatus::InProgress => "in progress".to_string(),
                MatchStatus::NotStarted => "not played".to_string(),
            };
            out.push_str(&format!(
                "  {:<30} vs {:<30} {}\n",
                a.full_name(),
                b.full_name(),
                result
            ));
        }
    }

    out
}
