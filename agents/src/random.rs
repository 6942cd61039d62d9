// ═══════════════════════════════════════════════════════════════════════
// Random Agent — makes every decision uniformly among legal options.
// Serves as baseline and for testing game engine stability.
// ═══════════════════════════════════════════════════════════════════════

use rand::seq::{IteratorRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use warwick_engine::engine::BuildOrder;
use warwick_engine::types::*;
use warwick_engine::visibility::PlayerView;

use crate::agent::Agent;

pub struct RandomAgent {
    rng: ChaCha8Rng,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        RandomAgent {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn any_hand_slot(&mut self, view: &PlayerView) -> Option<usize> {
        view.hand.iter().map(|(pos, _)| pos).choose(&mut self.rng)
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        "Random"
    }

    fn choose_build(&mut self, view: &PlayerView, candidates: &[BuildCandidate]) -> Option<BuildOrder> {
        // stopping is always an option
        if self.rng.gen_bool(0.1) {
            return None;
        }
        let pick = candidates.iter().filter(|c| c.verdict.is_legal()).choose(&mut self.rng)?;
        let hand = view.hand.iter().map(|(pos, _)| CardRef::Hand(pos));
        let storage = view.tableau.usable_storage()
            .filter(|(_, c)| c.is_some())
            .map(|(pos, _)| CardRef::Storage(pos));
        let pool: Vec<CardRef> = hand.chain(storage).filter(|&s| s != pick.slot).collect();
        let discards = pool
            .choose_multiple(&mut self.rng, pick.verdict.discard_count())
            .copied()
            .collect();
        Some(BuildOrder { slot: pick.slot, discards })
    }

    fn choose_redraw(&mut self, _view: &PlayerView) -> bool {
        self.rng.gen_bool(0.5)
    }

    fn choose_storage_fill(&mut self, _view: &PlayerView, _slot: usize, options: &[StorageSource]) -> Option<StorageSource> {
        if self.rng.gen_bool(0.2) {
            None
        } else {
            options.choose(&mut self.rng).copied()
        }
    }

    fn choose_attack(&mut self, _view: &PlayerView, targets: &[Kind]) -> Option<Kind> {
        if self.rng.gen_bool(0.2) {
            None
        } else {
            targets.choose(&mut self.rng).copied()
        }
    }

    fn choose_trash(&mut self, view: &PlayerView, _remaining: u32) -> Option<usize> {
        if self.rng.gen_bool(0.5) {
            None
        } else {
            self.any_hand_slot(view)
        }
    }

    fn choose_discard_draw(&mut self, _view: &PlayerView, _top: CardId) -> bool {
        self.rng.gen_bool(0.5)
    }

    fn choose_discard(&mut self, view: &PlayerView, _excess: usize) -> usize {
        self.any_hand_slot(view).unwrap_or(0)
    }
}
