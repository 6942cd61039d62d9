// ═══════════════════════════════════════════════════════════════════════
// Game setup — shuffle the doubled deck and deal the opening hands
// ═══════════════════════════════════════════════════════════════════════

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::cards::all_card_ids;
use crate::hand::{DrawPool, Hand, Pile};
use crate::tableau::Tableau;
use crate::types::*;

/// Create the initial game state. `config.seed` controls the shuffle.
pub fn create_initial_state(config: GameConfig) -> GameState {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut deck = all_card_ids();
    deck.shuffle(&mut rng);
    let stock = DrawPool::new(deck);
    create_state_with_stock(config, stock)
}

/// Create the initial game state over a stock in a fixed order.
/// Opening hands are dealt from the front of `stock`.
pub fn create_state_with_stock(config: GameConfig, mut stock: DrawPool) -> GameState {
    let players = [Seat::First, Seat::Second].map(|seat| {
        let mut hand = Hand::new(config.hand_limit, config.hand_capacity);
        let dealt = stock.draw_into(config.initial_hand, &mut hand);
        debug!(%seat, dealt, hand = %hand, "opening hand");
        PlayerState { hand, tableau: Tableau::new() }
    });

    GameState {
        config,
        round: 0,
        current: Seat::First,
        turn: TurnState::new(),
        players,
        stock,
        discard: Pile::new(),
        trash: Pile::new(),
        pending: None,
        outcome: None,
    }
}
