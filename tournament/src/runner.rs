// ═══════════════════════════════════════════════════════════════════════
// Game Runner — runs complete headless games with agents
//
// One game = one independently allocated GameState. Tournaments run
// games in parallel with rayon; nothing is shared between games except
// the static card catalog.
// ═══════════════════════════════════════════════════════════════════════

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use warwick_agents::{Agent, HeuristicAgent, RandomAgent, Strategy};
use warwick_engine::engine;
use warwick_engine::setup::create_initial_state;
use warwick_engine::types::*;
use warwick_engine::visibility::player_view;
use warwick_engine::EngineError;

/// Why a game could not be played to the end.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("engine rejected an action: {0}")]
    Engine(#[from] EngineError),
    #[error("game exceeded {limit} decisions without finishing (round {round})")]
    DecisionLimit { limit: usize, round: u32 },
    #[error("{seat} gave no answer to a {decision} decision")]
    NoAnswer { seat: Seat, decision: &'static str },
    #[error("game stuck in round {round}: no decision pending and no outcome")]
    Stuck { round: u32 },
}

/// Result of a completed game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameResult {
    pub seed: u64,
    pub reason: EndReason,
    pub rounds_played: u32,
    pub winner: Option<Seat>,
    pub decisions: usize,
    pub player_results: Vec<PlayerResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerResult {
    pub seat: Seat,
    pub agent_name: String,
    pub victory_points: i32,
    pub fill: u8,
    /// Active top of every stack, in kind order.
    pub tableau: Vec<String>,
}

/// Run a complete game with the given agents, seat order First, Second.
/// `max_decisions` is a safety limit against agents that never finish.
pub fn run_game(
    agents: &mut [Box<dyn Agent>; 2],
    config: GameConfig,
    max_decisions: usize,
) -> Result<GameResult, GameError> {
    let seed = config.seed;
    let mut state = create_initial_state(config);
    let mut decision_count = 0;

    // Main game loop
    loop {
        // Advance engine until it needs a decision or game ends
        engine::advance(&mut state);

        if let Some(outcome) = state.outcome {
            return Ok(build_result(&state, outcome, seed, agents, decision_count));
        }

        let Some(pending) = state.pending.as_ref() else {
            return Err(GameError::Stuck { round: state.round });
        };
        let seat = pending.seat();
        let decision = pending.name();
        let view = player_view(&state, seat);
        let action = agents[seat.index()]
            .decide(&view)
            .ok_or(GameError::NoAnswer { seat, decision })?;
        debug!("{} answers {}: {:?}", seat, decision, action);
        engine::apply_action(&mut state, action)?;

        decision_count += 1;
        if decision_count > max_decisions {
            return Err(GameError::DecisionLimit { limit: max_decisions, round: state.round });
        }
    }
}

fn build_result(
    state: &GameState,
    outcome: Outcome,
    seed: u64,
    agents: &[Box<dyn Agent>; 2],
    decisions: usize,
) -> GameResult {
    let player_results = Seat::BOTH.iter()
        .map(|&seat| {
            let tableau = &state.player(seat).tableau;
            PlayerResult {
                seat,
                agent_name: agents[seat.index()].name().to_string(),
                victory_points: outcome.victory_points[seat.index()],
                fill: tableau.fill(),
                tableau: tableau.tops().map(|(_, card)| card.to_string()).collect(),
            }
        })
        .collect();

    GameResult {
        seed,
        reason: outcome.reason,
        rounds_played: state.round,
        winner: outcome.winner,
        decisions,
        player_results,
    }
}

// ── Tournaments ────────────────────────────────────────────────────────

/// Automated player types a tournament can seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentKind {
    Heuristic,
    Random,
}

pub fn make_agent(kind: AgentKind, strategy: &Strategy, seed: u64) -> Box<dyn Agent> {
    match kind {
        AgentKind::Heuristic => Box::new(HeuristicAgent::new(strategy.clone())),
        AgentKind::Random => Box::new(RandomAgent::new(seed)),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentConfig {
    pub games: u32,
    pub base_seed: u64,
    pub seats: [AgentKind; 2],
    pub strategies: [Strategy; 2],
    pub game: GameConfig,
    pub max_decisions: usize,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        TournamentConfig {
            games: 100,
            base_seed: 42,
            seats: [AgentKind::Heuristic; 2],
            strategies: [Strategy::default(), Strategy::default()],
            game: GameConfig::default(),
            max_decisions: 50_000,
        }
    }
}

impl TournamentConfig {
    /// Seed of game `index`; games are reproducible one by one.
    pub fn seed_for(&self, index: u32) -> u64 {
        self.base_seed.wrapping_add(index as u64 * 1000)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TournamentSummary {
    pub games: u32,
    pub wins: [u32; 2],
    pub ties: u32,
    pub errors: u32,
    pub stock_exhausted: u32,
    pub tableau_filled: u32,
    pub safety_cap: u32,
    pub average_victory_points: [f64; 2],
    pub average_rounds: f64,
}

impl TournamentSummary {
    fn record(&mut self, result: &GameResult) {
        match result.winner {
            Some(seat) => self.wins[seat.index()] += 1,
            None => self.ties += 1,
        }
        match result.reason {
            EndReason::StockExhausted => self.stock_exhausted += 1,
            EndReason::TableauFilled(_) => self.tableau_filled += 1,
            EndReason::SafetyCap => self.safety_cap += 1,
        }
        for pr in &result.player_results {
            self.average_victory_points[pr.seat.index()] += pr.victory_points as f64;
        }
        self.average_rounds += result.rounds_played as f64;
    }

    fn finish(&mut self) {
        let played = self.games.saturating_sub(self.errors);
        if played > 0 {
            for vp in &mut self.average_victory_points {
                *vp /= played as f64;
            }
            self.average_rounds /= played as f64;
        }
    }
}

/// Play `config.games` independent games in parallel and tally them.
pub fn run_tournament(config: &TournamentConfig) -> TournamentSummary {
    info!("Tournament: {} games, {:?} vs {:?}", config.games, config.seats[0], config.seats[1]);

    let results: Vec<(u32, Result<GameResult, GameError>)> = (0..config.games)
        .into_par_iter()
        .map(|index| {
            let seed = config.seed_for(index);
            let mut agents = [
                make_agent(config.seats[0], &config.strategies[0], seed),
                make_agent(config.seats[1], &config.strategies[1], seed ^ 0x5eed),
            ];
            let game = GameConfig { seed, ..config.game.clone() };
            (index, run_game(&mut agents, game, config.max_decisions))
        })
        .collect();

    let mut summary = TournamentSummary { games: config.games, ..TournamentSummary::default() };
    for (index, result) in &results {
        match result {
            Ok(result) => summary.record(result),
            Err(e) => {
                summary.errors += 1;
                warn!("Game {} (seed {}): {}", index + 1, config.seed_for(*index), e);
            }
        }
    }
    summary.finish();
    summary
}
