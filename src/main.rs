use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swiss_club::config::AppConfig;
use swiss_club::dates;
use swiss_club::models::{StatusFilter, Tournament};
use swiss_club::pairing::{RandomSource, SeededRng, SystemRng};
use swiss_club::registry::{self, PlayerRegistry};
use swiss_club::report;
use swiss_club::runner::{ConsoleResults, TournamentRunner};
use swiss_club::storage::ClubStore;

const DEFAULT_ROUNDS: u32 = 4;
const MAX_ROUNDS: u32 = 30;

#[derive(Parser)]
#[command(name = "swiss-club")]
#[command(about = "Swiss-system chess tournament manager for a club")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the player registry
    Player {
        #[command(subcommand)]
        action: PlayerAction,
    },

    /// Create, list and run tournaments
    Tournament {
        #[command(subcommand)]
        action: TournamentAction,
    },

    /// Print the full report of a tournament
    Report {
        /// Tournament reference (or a unique prefix of it)
        reference: String,
    },
}

#[derive(Subcommand)]
enum PlayerAction {
    /// Register a new player
    Add {
        #[arg(long)]
        last_name: String,

        #[arg(long)]
        first_name: String,

        /// Date of birth (DD/MM/YYYY)
        #[arg(long)]
        birth_date: String,

        /// National id: two letters then five digits (e.g. AB12345)
        #[arg(long)]
        national_id: String,
    },

    /// List registered players in alphabetical order
    List,

    /// Delete players by their position in `player list`
    Delete {
        #[arg(required = true, num_args = 1..)]
        indices: Vec<usize>,
    },
}

#[derive(Subcommand)]
enum TournamentAction {
    /// Create a tournament and select its players
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        location: String,

        /// Start date (DD/MM/YYYY)
        #[arg(long)]
        start: String,

        /// End date (DD/MM/YYYY)
        #[arg(long)]
        end: String,

        /// Number of rounds (1 to 30)
        #[arg(long, default_value_t = DEFAULT_ROUNDS)]
        rounds: u32,

        /// Players by their position in `player list`
        #[arg(long, required = true, num_args = 1..)]
        players: Vec<usize>,

        #[arg(long)]
        description: Option<String>,
    },

    /// List tournaments, most recent first
    List {
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },

    /// Play (or resume) a tournament, entering results interactively
    Run {
        /// Tournament reference (or a unique prefix of it)
        reference: String,

        /// Closing remarks; asked for interactively when omitted
        #[arg(long)]
        feedback: Option<String>,
    },

    /// Show a tournament's details and standings
    Show {
        /// Tournament reference (or a unique prefix of it)
        reference: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    NotStarted,
    InProgress,
    NotFinished,
    Finished,
}

impl From<StatusArg> for StatusFilter {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::NotStarted => StatusFilter::NotStarted,
            StatusArg::InProgress => StatusFilter::InProgress,
            StatusArg::NotFinished => StatusFilter::NotFinished,
            StatusArg::Finished => StatusFilter::Finished,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    let subscriber = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }

    tracing::debug!("Starting swiss-club v{}", env!("CARGO_PKG_VERSION"));

    let store = ClubStore::new(config.storage_config());

    match cli.command {
        Commands::Player { action } => match action {
            PlayerAction::Add {
                last_name,
                first_name,
                birth_date,
                national_id,
            } => {
                if last_name.trim().is_empty() || first_name.trim().is_empty() {
                    bail!("Last and first name must not be empty");
                }
                if !dates::validate(&birth_date) {
                    bail!("Invalid birth date {:?} (expected DD/MM/YYYY)", birth_date);
                }
                if !registry::validate_national_id(&national_id) {
                    bail!(
                        "Invalid national id {:?} (expected two letters then five digits)",
                        national_id
                    );
                }

                let mut players = PlayerRegistry::load(&store);
                let player = players.create(&last_name, &first_name, &birth_date, &national_id)?;
                println!("Registered {} ({})", player.full_name(), player.id);
            }
            PlayerAction::List => {
                let players = PlayerRegistry::load(&store);
                if players.is_empty() {
                    println!("No players registered.");
                } else {
                    print!("{}", report::players_table(&players.sorted()));
                }
            }
            PlayerAction::Delete { indices } => {
                let mut players = PlayerRegistry::load(&store);
                let selected = players.select(&indices)?;
                let ids: Vec<_> = selected.iter().map(|p| p.id.clone()).collect();
                let removed = players.delete(&ids)?;
                for player in &selected {
                    println!("Deleted {}", player.full_name());
                }
                println!("{} player(s) removed.", removed);
            }
        },

        Commands::Tournament { action } => match action {
            TournamentAction::Create {
                name,
                location,
                start,
                end,
                rounds,
                players,
                description,
            } => {
                if name.trim().is_empty() || location.trim().is_empty() {
                    bail!("Name and location must not be empty");
                }
                for date in [&start, &end] {
                    if !dates::validate(date) {
                        bail!("Invalid date {:?} (expected DD/MM/YYYY)", date);
                    }
                }
                if !dates::is_ordered(&start, &end) {
                    bail!("End date {} is before start date {}", end, start);
                }
                if !(1..=MAX_ROUNDS).contains(&rounds) {
                    bail!("Number of rounds must be between 1 and {}", MAX_ROUNDS);
                }

                let registry = PlayerRegistry::load(&store);
                if players.len() % 2 != 0 {
                    bail!("An even number of players is required (got {})", players.len());
                }
                if players.len() > registry.len() {
                    bail!(
                        "Only {} players are registered, {} selected",
                        registry.len(),
                        players.len()
                    );
                }
                let selected = registry.select(&players)?;

                let mut tournament = Tournament::new(
                    name.trim(),
                    location.trim(),
                    start.trim(),
                    end.trim(),
                    rounds,
                    selected.len() as u32,
                )?;
                if let Some(description) = description {
                    tournament = tournament.with_description(description);
                }
                tournament.enroll(&selected)?;
                store.add_tournament(&tournament)?;

                println!(
                    "Created tournament {} ({}) with {} players and {} rounds",
                    tournament.name,
                    tournament.reference,
                    tournament.number_of_players,
                    tournament.number_of_rounds
                );
            }
            TournamentAction::List { status } => {
                let filter = status.map(StatusFilter::from);
                let mut tournaments: Vec<Tournament> = store
                    .try_load_tournaments()?
                    .into_iter()
                    .filter(|t| filter.map(|f| f.matches(t)).unwrap_or(true))
                    .collect();
                if tournaments.is_empty() {
                    println!("No tournaments to show.");
                } else {
                    tournaments.sort_by_key(|t| std::cmp::Reverse(dates::parse(&t.start_date)));
                    let refs: Vec<&Tournament> = tournaments.iter().collect();
                    print!("{}", report::tournaments_table(&refs));
                }
            }
            TournamentAction::Run {
                reference,
                feedback,
            } => {
                let mut tournament = find(&store, &reference)?;
                match config.pairing.seed {
                    Some(seed) => run(&store, &mut tournament, SeededRng::from_seed(seed), feedback)?,
                    None => run(&store, &mut tournament, SystemRng, feedback)?,
                }
            }
            TournamentAction::Show { reference } => {
                let tournament = find(&store, &reference)?;
                print!("{}", report::summary(&tournament));
                if !tournament.selected_players.is_empty() {
                    print!("\n{}", report::standings_table(&tournament));
                }
            }
        },

        Commands::Report { reference } => {
            let tournament = find(&store, &reference)?;
            print!("{}", report::render(&tournament));
        }
    }

    Ok(())
}

fn find(store: &ClubStore, reference: &str) -> Result<Tournament> {
    match store.find_tournament(reference)? {
        Some(tournament) => Ok(tournament),
        None => bail!("No tournament matches reference {:?}", reference),
    }
}

fn run<G: RandomSource>(
    store: &ClubStore,
    tournament: &mut Tournament,
    rng: G,
    feedback: Option<String>,
) -> Result<()> {
    println!(
        "=== {} ({}) - {} rounds, {} players ===",
        tournament.name, tournament.location, tournament.number_of_rounds, tournament.number_of_players
    );

    let mut runner = TournamentRunner::new(store, rng, ConsoleResults::stdio());
    let summary = runner.run_tournament(tournament)?;

    println!(
        "\n{} round(s) played, {} result(s) recorded.\n",
        summary.rounds_played, summary.matches_recorded
    );
    print!("{}", report::standings_table(tournament));

    if tournament.in_progress && tournament.rounds_completed {
        let feedback = match feedback {
            Some(text) if !text.trim().is_empty() => text,
            _ => runner.results_mut().remarks()?,
        };
        runner.finalize(tournament, &feedback)?;
        println!("\nTournament {} is finished.", tournament.name);
    }
    Ok(())
}
