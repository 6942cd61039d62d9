//! Game invariants - sanity checks that detect bugs.
//!
//! These should NEVER trigger in a correctly implemented game. If they
//! do, bookkeeping in the engine has drifted.

use thiserror::Error;

use crate::cards::DECK_SIZE;
use crate::types::{GameState, Seat};

/// Invariant violation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invariant violation: {message}")]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

fn violation(message: String) -> InvariantViolation {
    InvariantViolation { message }
}

/// Check all game invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(state: &GameState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    // Card conservation: each instance in exactly one container
    let mut seen = [0u8; DECK_SIZE];
    let mut tally = |card: crate::types::CardId| {
        if let Some(n) = seen.get_mut(card.0 as usize) {
            *n += 1;
        } else {
            violations.push(violation(format!("unknown card id {}", card.0)));
        }
    };
    state.stock.undrawn().iter().copied().for_each(&mut tally);
    state.discard.cards().iter().copied().for_each(&mut tally);
    state.trash.cards().iter().copied().for_each(&mut tally);
    for player in &state.players {
        player.hand.cards().into_iter().for_each(&mut tally);
        player.tableau.all_cards().into_iter().for_each(&mut tally);
    }
    for (id, &n) in seen.iter().enumerate() {
        if n != 1 {
            violations.push(violation(format!("card {} is held {} times", id, n)));
        }
    }

    for seat in Seat::BOTH {
        let player = state.player(seat);

        let occupied = player.hand.slots().iter().flatten().count();
        if occupied != player.hand.count() {
            violations.push(violation(format!(
                "{} hand count {} but {} occupied slots",
                seat,
                player.hand.count(),
                occupied
            )));
        }

        let tableau = &player.tableau;
        let (discounts, bonuses, fill) = tableau.recompute();
        if discounts != tableau.discounts() {
            violations.push(violation(format!(
                "{} discounts {:?} but tops give {:?}",
                seat,
                tableau.discounts(),
                discounts
            )));
        }
        if bonuses != tableau.bonuses() {
            violations.push(violation(format!(
                "{} bonuses {:?} but tops give {:?}",
                seat,
                tableau.bonuses(),
                bonuses
            )));
        }
        if fill != tableau.fill() {
            violations.push(violation(format!("{} fill {} but {} non-soldier stacks", seat, tableau.fill(), fill)));
        }
        for kind in crate::types::Kind::ALL {
            if let Some(stack) = tableau.stack(kind) {
                match stack.top_card() {
                    Some(card) if card.def().kind == kind && card.def().cost == stack.top_cost() => {}
                    _ => violations.push(violation(format!("{} {} stack has a bad top", seat, kind))),
                }
            }
        }
    }

    violations
}
