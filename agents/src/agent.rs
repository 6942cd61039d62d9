// ═══════════════════════════════════════════════════════════════════════
// Agent Trait — interface that every player implements
//
// KEY DESIGN PRINCIPLE:
//   Agents receive a `PlayerView` (not raw GameState), which only
//   contains information the player is legally allowed to see.
//
//   The agent never gets to see:
//     - The stock order
//     - The opponent's hand or storage contents
//     - Discard cards below the top
// ═══════════════════════════════════════════════════════════════════════

use warwick_engine::engine::{Action, BuildOrder};
use warwick_engine::types::*;
use warwick_engine::visibility::PlayerView;

/// One method per decision point of the turn. The engine only offers a
/// decision when at least one legal option exists.
pub trait Agent: Send {
    /// Human-readable name for this agent (e.g., "Heuristic", "Random").
    fn name(&self) -> &str;

    /// Universal entry point: answer the view's pending decision.
    /// `None` when the view carries no decision for this seat.
    fn decide(&mut self, view: &PlayerView) -> Option<Action> {
        let action = match view.pending.as_ref()? {
            PendingDecision::Build { candidates, .. } => {
                Action::Build(self.choose_build(view, candidates))
            }
            PendingDecision::Redraw { .. } => Action::Redraw(self.choose_redraw(view)),
            PendingDecision::StorageFill { slot, options, .. } => {
                Action::StorageFill(self.choose_storage_fill(view, *slot, options))
            }
            PendingDecision::Attack { targets, .. } => {
                Action::Attack(self.choose_attack(view, targets))
            }
            PendingDecision::Trash { remaining, .. } => {
                Action::Trash(self.choose_trash(view, *remaining))
            }
            PendingDecision::DiscardDraw { top, .. } => {
                Action::DiscardDraw(self.choose_discard_draw(view, *top))
            }
            PendingDecision::DiscardToLimit { excess, .. } => {
                Action::Discard(self.choose_discard(view, *excess))
            }
        };
        Some(action)
    }

    // ── Individual decision methods ────────────────────────────────────

    /// Pick a legal candidate and its payment. None = stop building.
    fn choose_build(&mut self, view: &PlayerView, candidates: &[BuildCandidate]) -> Option<BuildOrder>;

    /// Full hand and nothing built: dump the hand and redraw?
    fn choose_redraw(&mut self, view: &PlayerView) -> bool;

    /// Fill storage `slot` from one of `options`. None = leave it empty.
    fn choose_storage_fill(&mut self, view: &PlayerView, slot: usize, options: &[StorageSource]) -> Option<StorageSource>;

    /// Opponent kind to seize. None = hold the soldier.
    fn choose_attack(&mut self, view: &PlayerView, targets: &[Kind]) -> Option<Kind>;

    /// Hand position to trash. None = stop trashing.
    fn choose_trash(&mut self, view: &PlayerView, remaining: u32) -> Option<usize>;

    /// Take `top` from the discard pile as one of this turn's draws?
    fn choose_discard_draw(&mut self, view: &PlayerView, top: CardId) -> bool;

    /// Hand position to discard while over the limit.
    fn choose_discard(&mut self, view: &PlayerView, excess: usize) -> usize;
}
