// ═══════════════════════════════════════════════════════════════════════
// Heuristic Agent — every decision ranks cards with `card_value`.
//
// The decision procedures are plain functions over a `PlayerView` so
// they can be tested (and reused by other agents) without an agent.
// Ties always go to the first card found: hand before storage, each in
// ascending slot order.
// ═══════════════════════════════════════════════════════════════════════

use tracing::trace;

use warwick_engine::engine::BuildOrder;
use warwick_engine::types::*;
use warwick_engine::visibility::PlayerView;

use crate::agent::Agent;
use crate::valuation::{card_value, Strategy, KEEP_THRESHOLD};

pub struct HeuristicAgent {
    name: String,
    strategy: Strategy,
}

impl HeuristicAgent {
    pub fn new(strategy: Strategy) -> Self {
        HeuristicAgent {
            name: format!("Heuristic({})", strategy.name),
            strategy,
        }
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }
}

impl Default for HeuristicAgent {
    fn default() -> Self {
        HeuristicAgent::new(Strategy::default())
    }
}

// ── Valuation helpers ──────────────────────────────────────────────────

fn value_of(view: &PlayerView, strategy: &Strategy, card: CardId) -> i32 {
    card_value(card.def(), &view.tableau, strategy, view.phase)
}

/// Cards that may pay for a build, in scan order.
fn spendable(view: &PlayerView) -> impl Iterator<Item = (CardRef, CardId)> + '_ {
    let hand = view.hand.iter().map(|(pos, c)| (CardRef::Hand(pos), c));
    let storage = view.tableau.usable_storage()
        .filter_map(|(pos, c)| c.map(|c| (CardRef::Storage(pos), c)));
    hand.chain(storage)
}

/// First card with the strictly lowest value among `cards`.
fn lowest<I>(view: &PlayerView, strategy: &Strategy, cards: I) -> Option<(CardRef, i32)>
where
    I: IntoIterator<Item = (CardRef, CardId)>,
{
    let mut best: Option<(CardRef, i32)> = None;
    for (slot, card) in cards {
        let value = value_of(view, strategy, card);
        if best.map_or(true, |(_, low)| value < low) {
            best = Some((slot, value));
        }
    }
    best
}

/// Lowest-value card in hand only.
pub fn lowest_in_hand(view: &PlayerView, strategy: &Strategy) -> Option<(usize, i32)> {
    let hand = view.hand.iter().map(|(pos, c)| (CardRef::Hand(pos), c));
    lowest(view, strategy, hand).and_then(|(slot, value)| match slot {
        CardRef::Hand(pos) => Some((pos, value)),
        CardRef::Storage(_) => None,
    })
}

// ── Decision procedures ────────────────────────────────────────────────

/// Highest-valued legal candidate, paid for with the cheapest cards.
pub fn choose_build(view: &PlayerView, strategy: &Strategy, candidates: &[BuildCandidate]) -> Option<BuildOrder> {
    let mut best: Option<(&BuildCandidate, i32)> = None;
    for candidate in candidates.iter().filter(|c| c.verdict.is_legal()) {
        let value = value_of(view, strategy, candidate.card);
        if best.map_or(true, |(_, high)| value > high) {
            best = Some((candidate, value));
        }
    }
    let (pick, value) = best?;
    trace!("best build {} worth {} ({})", pick.card, value, pick.verdict);
    let discards = choose_discards(view, strategy, pick.slot, pick.verdict.discard_count());
    Some(BuildOrder { slot: pick.slot, discards })
}

/// `count` lowest-valued spendable cards, never the card being built.
pub fn choose_discards(view: &PlayerView, strategy: &Strategy, protected: CardRef, count: usize) -> Vec<CardRef> {
    let mut chosen = Vec::with_capacity(count);
    while chosen.len() < count {
        let pool = spendable(view).filter(|(slot, _)| *slot != protected && !chosen.contains(slot));
        match lowest(view, strategy, pool) {
            Some((slot, _)) => chosen.push(slot),
            None => break,
        }
    }
    chosen
}

/// Trash the cheapest hand card, but only under hand-limit pressure or
/// when a draw bonus pays for a card worth little.
pub fn choose_trash(view: &PlayerView, strategy: &Strategy) -> Option<usize> {
    let (pos, value) = lowest_in_hand(view, strategy)?;
    if view.hand.count() <= view.hand_limit()
        && (view.tableau.bonuses().draw == 0 || value > KEEP_THRESHOLD)
    {
        return None;
    }
    Some(pos)
}

/// The reachable opponent building this player values most.
pub fn choose_attack(view: &PlayerView, strategy: &Strategy, targets: &[Kind]) -> Option<Kind> {
    let mut best: Option<(Kind, i32)> = None;
    for &kind in targets {
        let Some(card) = view.opponent_tableau.top(kind) else { continue };
        // valued by the attacker, not by its current owner
        let value = value_of(view, strategy, card);
        if best.map_or(true, |(_, high)| value > high) {
            best = Some((kind, value));
        }
    }
    best.map(|(kind, _)| kind)
}

/// Stock unless the discard top or the best hand card is worth keeping;
/// then whichever of those two is worth more.
pub fn choose_storage_fill(view: &PlayerView, strategy: &Strategy, options: &[StorageSource]) -> Option<StorageSource> {
    let discard = view.discard_top
        .filter(|_| options.contains(&StorageSource::DiscardTop))
        .map(|c| (StorageSource::DiscardTop, value_of(view, strategy, c)));

    let mut hand: Option<(StorageSource, i32)> = None;
    for &option in options {
        if let StorageSource::Hand(pos) = option {
            let Some(card) = view.hand.get(pos) else { continue };
            let value = value_of(view, strategy, card);
            if hand.map_or(true, |(_, high)| value > high) {
                hand = Some((option, value));
            }
        }
    }

    let worth = |pick: Option<(StorageSource, i32)>| pick.map_or(-1, |(_, v)| v);
    let stock_offered = options.contains(&StorageSource::Stock);
    if stock_offered && worth(discard) <= KEEP_THRESHOLD && worth(hand) <= KEEP_THRESHOLD {
        return Some(StorageSource::Stock);
    }
    match (discard, hand) {
        (Some((d, dv)), Some((h, hv))) => Some(if hv > dv { h } else { d }),
        (Some((d, _)), None) => Some(d),
        (None, Some((h, _))) => Some(h),
        (None, None) => options.first().copied(),
    }
}

/// Take the discard top only when it is worth keeping.
pub fn choose_discard_draw(view: &PlayerView, strategy: &Strategy, top: CardId) -> bool {
    value_of(view, strategy, top) > KEEP_THRESHOLD
}

impl Agent for HeuristicAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_build(&mut self, view: &PlayerView, candidates: &[BuildCandidate]) -> Option<BuildOrder> {
        choose_build(view, &self.strategy, candidates)
    }

    fn choose_redraw(&mut self, _view: &PlayerView) -> bool {
        true
    }

    fn choose_storage_fill(&mut self, view: &PlayerView, _slot: usize, options: &[StorageSource]) -> Option<StorageSource> {
        choose_storage_fill(view, &self.strategy, options)
    }

    fn choose_attack(&mut self, view: &PlayerView, targets: &[Kind]) -> Option<Kind> {
        choose_attack(view, &self.strategy, targets)
    }

    fn choose_trash(&mut self, view: &PlayerView, _remaining: u32) -> Option<usize> {
        choose_trash(view, &self.strategy)
    }

    fn choose_discard_draw(&mut self, view: &PlayerView, top: CardId) -> bool {
        choose_discard_draw(view, &self.strategy, top)
    }

    fn choose_discard(&mut self, view: &PlayerView, _excess: usize) -> usize {
        // the engine only asks while the hand is over its limit
        lowest_in_hand(view, &self.strategy).map_or(0, |(pos, _)| pos)
    }
}
