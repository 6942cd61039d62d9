// ═══════════════════════════════════════════════════════════════════════
// Runner — CLI entry point for playing games and running tournaments
// ═══════════════════════════════════════════════════════════════════════

mod console;

use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::Level;

use warwick_agents::{Agent, Strategy};
use warwick_engine::types::{GameConfig, Seat};
use warwick_tournament::{
    make_agent, run_game, run_tournament, AgentKind, GameError, GameResult, TournamentConfig,
};

use console::ConsoleAgent;

const MAX_DECISIONS: usize = 50_000;

#[derive(Parser)]
#[command(name = "warwick", about = "Warwick village-building card game simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single game
    Play {
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        /// Narration level
        #[arg(short, long, value_enum, default_value_t = Verbosity::Summary)]
        verbosity: Verbosity,
        /// Take a seat yourself; the other seat is automated
        #[arg(long, value_enum)]
        human: Option<SeatArg>,
        /// Automated player type
        #[arg(short, long, value_enum, default_value_t = AgentArg::Heuristic)]
        agent: AgentArg,
        /// Table rules as JSON (missing fields take defaults)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Strategy table as JSON for the automated players
        #[arg(long)]
        strategy: Option<PathBuf>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a tournament of N games in parallel
    Tournament {
        #[arg(short, long, default_value_t = 100)]
        games: u32,
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        #[arg(long, value_enum, default_value_t = AgentArg::Heuristic)]
        first: AgentArg,
        #[arg(long, value_enum, default_value_t = AgentArg::Heuristic)]
        second: AgentArg,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Strategy table for the first seat
        #[arg(long)]
        strategy_first: Option<PathBuf>,
        /// Strategy table for the second seat
        #[arg(long)]
        strategy_second: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value_t = Verbosity::Off)]
        verbosity: Verbosity,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Verbosity {
    Off,
    Summary,
    Detailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SeatArg {
    First,
    Second,
}

impl From<SeatArg> for Seat {
    fn from(seat: SeatArg) -> Seat {
        match seat {
            SeatArg::First => Seat::First,
            SeatArg::Second => Seat::Second,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AgentArg {
    Heuristic,
    Random,
}

impl From<AgentArg> for AgentKind {
    fn from(agent: AgentArg) -> AgentKind {
        match agent {
            AgentArg::Heuristic => AgentKind::Heuristic,
            AgentArg::Random => AgentKind::Random,
        }
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error("cannot read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid JSON in {path}: {source}")]
    Json { path: PathBuf, source: serde_json::Error },
    #[error("game error: {0}")]
    Game(#[from] GameError),
    #[error("cannot encode result: {0}")]
    Encode(serde_json::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Play { seed, verbosity, human, agent, config, strategy, json } => {
            init_logging(verbosity);
            cmd_play(seed, human.map(Seat::from), agent.into(), config.as_deref(), strategy.as_deref(), json)
        }
        Commands::Tournament {
            games, seed, first, second, config, strategy_first, strategy_second, verbosity, json,
        } => {
            init_logging(verbosity);
            let strategies = [strategy_first, strategy_second];
            cmd_tournament(games, seed, [first.into(), second.into()], config.as_deref(), &strategies, json)
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Narration goes through `tracing`; `off` installs no subscriber.
fn init_logging(verbosity: Verbosity) {
    let level = match verbosity {
        Verbosity::Off => return,
        Verbosity::Summary => Level::INFO,
        Verbosity::Detailed => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .init();
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| CliError::Io { path: path.to_path_buf(), source })?;
    serde_json::from_str(&text).map_err(|source| CliError::Json { path: path.to_path_buf(), source })
}

fn load_config(path: Option<&Path>) -> Result<GameConfig, CliError> {
    path.map_or_else(|| Ok(GameConfig::default()), load_json)
}

fn load_strategy(path: Option<&Path>) -> Result<Strategy, CliError> {
    path.map_or_else(|| Ok(Strategy::default()), load_json)
}

fn cmd_play(
    seed: u64,
    human: Option<Seat>,
    agent: AgentKind,
    config: Option<&Path>,
    strategy: Option<&Path>,
    json: bool,
) -> Result<(), CliError> {
    let config = GameConfig { seed, ..load_config(config)? };
    let strategy = load_strategy(strategy)?;

    let mut agents: [Box<dyn Agent>; 2] = Seat::BOTH.map(|seat| -> Box<dyn Agent> {
        if human == Some(seat) {
            Box::new(ConsoleAgent::new(BufReader::new(io::stdin()), io::stdout()))
        } else {
            make_agent(agent, &strategy, seed.wrapping_add(seat.index() as u64))
        }
    });

    if !json {
        println!("=== Warwick ===\n");
        println!("Running single game: seed={}, {} vs {}\n", seed, agents[0].name(), agents[1].name());
    }
    let result = run_game(&mut agents, config, MAX_DECISIONS)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result).map_err(CliError::Encode)?);
    } else {
        print_result(&result);
    }
    Ok(())
}

fn print_result(result: &GameResult) {
    println!("Game over after {} rounds: {}", result.rounds_played, result.reason);
    for pr in &result.player_results {
        println!("{} ({}) Tableau:", pr.seat, pr.agent_name);
        for card in &pr.tableau {
            println!("    {}", card);
        }
    }
    let vp: Vec<i32> = result.player_results.iter().map(|p| p.victory_points).collect();
    println!("Player 0 {} - {} Player 1", vp[0], vp[1]);
    match result.winner {
        Some(seat) => println!("{} wins!", seat),
        None => println!("Tie game"),
    }
}

fn cmd_tournament(
    games: u32,
    seed: u64,
    seats: [AgentKind; 2],
    config: Option<&Path>,
    strategies: &[Option<PathBuf>; 2],
    json: bool,
) -> Result<(), CliError> {
    let tournament = TournamentConfig {
        games,
        base_seed: seed,
        seats,
        strategies: [
            load_strategy(strategies[0].as_deref())?,
            load_strategy(strategies[1].as_deref())?,
        ],
        game: load_config(config)?,
        max_decisions: MAX_DECISIONS,
    };

    if !json {
        println!("=== Tournament: {} games, {:?} vs {:?} ===\n", games, seats[0], seats[1]);
    }
    let summary = run_tournament(&tournament);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary).map_err(CliError::Encode)?);
        return Ok(());
    }

    println!("--- Summary ({} games, {} errors) ---", summary.games, summary.errors);
    for seat in Seat::BOTH {
        let w = summary.wins[seat.index()];
        let pct = if games > 0 { w as f64 / games as f64 * 100.0 } else { 0.0 };
        println!(
            "  {}: {:>4} wins ({:.1}%), avg {:.2} VP",
            seat,
            w,
            pct,
            summary.average_victory_points[seat.index()]
        );
    }
    println!("  Ties: {}", summary.ties);
    println!(
        "  Endings: {} stock exhausted, {} tableau filled, {} safety cap",
        summary.stock_exhausted, summary.tableau_filled, summary.safety_cap
    );
    println!("  Average rounds: {:.1}", summary.average_rounds);
    Ok(())
}
