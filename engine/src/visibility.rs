// ═══════════════════════════════════════════════════════════════════════
// Visibility / Information Model
//
//   PUBLIC  — both tableaux (built cards are face up), the trash, the
//             discard pile size and its top card, stock size, round.
//   PRIVATE — your own hand and your own storage slots.
//   HIDDEN  — stock order, the opponent's hand and storage contents,
//             discard cards below the top (the pile may not be searched).
//
// Agents MUST only receive PlayerView, never the raw GameState.
// ═══════════════════════════════════════════════════════════════════════

use serde::{Deserialize, Serialize};

use crate::hand::Hand;
use crate::tableau::{Tableau, STORAGE_SLOTS};
use crate::types::*;

/// What a specific seat is allowed to see.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub viewer: Seat,
    pub round: u32,
    pub phase: Phase,

    // ── Private ──────────────────────────────────────────
    pub hand: Hand,
    /// Own tableau, storage included.
    pub tableau: Tableau,

    // ── Public ───────────────────────────────────────────
    /// Opponent tableau with storage contents blanked out.
    pub opponent_tableau: Tableau,
    pub opponent_hand_count: usize,
    pub opponent_stored: usize,
    pub discard_top: Option<CardId>,
    pub discard_count: usize,
    pub trash: Vec<CardId>,
    pub stock_remaining: usize,

    /// Current pending decision, if it belongs to this seat.
    pub pending: Option<PendingDecision>,
}

impl PlayerView {
    pub fn hand_limit(&self) -> usize {
        self.hand.limit()
    }
}

/// Build the view of `state` for `viewer`.
pub fn player_view(state: &GameState, viewer: Seat) -> PlayerView {
    let me = state.player(viewer);
    let opponent = state.player(viewer.other());

    let mut opponent_tableau = opponent.tableau.clone();
    let opponent_stored = opponent_tableau.storage.iter().flatten().count();
    opponent_tableau.storage = [None; STORAGE_SLOTS];

    PlayerView {
        viewer,
        round: state.round,
        phase: state.phase(),
        hand: me.hand.clone(),
        tableau: me.tableau.clone(),
        opponent_tableau,
        opponent_hand_count: opponent.hand.count(),
        opponent_stored,
        discard_top: state.discard.top(),
        discard_count: state.discard.len(),
        trash: state.trash.cards().to_vec(),
        stock_remaining: state.stock.remaining(),
        pending: state.pending.clone().filter(|p| p.seat() == viewer),
    }
}
