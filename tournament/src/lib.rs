pub mod runner;

pub use runner::{
    make_agent, run_game, run_tournament, AgentKind, GameError, GameResult, PlayerResult,
    TournamentConfig, TournamentSummary,
};
