// ═══════════════════════════════════════════════════════════════════════
// Game Engine — turn state machine and action resolution
//
// Architecture:
//   The engine is a pure state machine. It never does I/O or calls agents.
//   Instead it sets `state.pending` to describe what decision is needed,
//   and the runner reads that, asks the seated agent, and feeds the
//   answer back via `apply_action()`.
//
// Turn order (one seat at a time, strictly):
//   Build* → (StorageFill after a Storage build) → Attack → Trash
//   → BonusDraw → Draw → DiscardToLimit
//   or, with a full hand and no build, the hand-reset escape.
//
// Game end, checked at the start of a turn:
//   stock exhausted or round cap reached (start of a round only), or the
//   seat about to play has filled its tableau.
// ═══════════════════════════════════════════════════════════════════════

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::EngineError;
use crate::hand::Pile;
use crate::tableau::{storage_tier, Buildability};
use crate::types::*;

/// A build choice: the card to build and the cards spent to pay for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOrder {
    pub slot: CardRef,
    pub discards: Vec<CardRef>,
}

/// Actions that agents submit to resolve pending decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Build (or upgrade) a card, or `None` to stop building.
    Build(Option<BuildOrder>),
    /// Accept or refuse the hand-reset escape.
    Redraw(bool),
    /// Fill the offered storage slot, or leave it empty.
    StorageFill(Option<StorageSource>),
    /// Seize the top of an opponent stack, or hold.
    Attack(Option<Kind>),
    /// Trash the hand card at a position, or stop trashing.
    Trash(Option<usize>),
    /// Take the discard top as a draw?
    DiscardDraw(bool),
    /// Discard the hand card at a position down towards the limit.
    Discard(usize),
}

/// Who and what a soldier may attack this turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackOptions {
    pub power: i32,
    pub targets: Vec<Kind>,
    /// The opponent has a Defensive stack; it is the only allowed target.
    pub defended: bool,
}

/// Advance the game state. Processes automatic transitions until a
/// player decision is needed (sets `state.pending`) or the game ends.
pub fn advance(state: &mut GameState) {
    while state.pending.is_none() && state.outcome.is_none() {
        step(state);
    }
}

fn step(state: &mut GameState) {
    let seat = state.current;
    match state.turn.step {
        TurnStep::Start => start_turn(state),

        TurnStep::Build => {
            let player = state.player(seat);
            // bonuses from a card built this turn apply immediately
            let allowed = 1 + player.tableau.bonuses().build.max(0) as u32;
            if state.turn.builds >= allowed {
                state.turn.step = TurnStep::AfterBuild;
                return;
            }
            let candidates = build_candidates(player);
            if !candidates.iter().any(|c| c.verdict.is_legal()) {
                state.turn.step = TurnStep::AfterBuild;
                return;
            }
            state.pending = Some(PendingDecision::Build {
                seat,
                candidates,
                builds_done: state.turn.builds,
                builds_allowed: allowed,
            });
        }

        TurnStep::StorageFill => {
            if state.turn.storage_next >= state.turn.storage_slots {
                state.turn.step = TurnStep::Build;
                return;
            }
            let slot = state.turn.storage_next;
            let occupied = state.player(seat).tableau.storage[slot].is_some();
            let options = storage_fill_options(state, seat);
            if occupied || options.is_empty() {
                state.turn.storage_next += 1;
                return;
            }
            state.pending = Some(PendingDecision::StorageFill { seat, slot, options });
        }

        TurnStep::AfterBuild => {
            let hand = &state.player(seat).hand;
            if state.turn.builds == 0 && hand.count() == hand.limit() {
                state.pending = Some(PendingDecision::Redraw { seat });
            } else {
                state.turn.step = TurnStep::Attack;
            }
        }

        TurnStep::Attack => {
            state.turn.step = TurnStep::Trash;
            if let Some(options) = attack_options(state.player(seat), state.player(seat.other())) {
                if !options.targets.is_empty() {
                    state.pending = Some(PendingDecision::Attack {
                        seat,
                        power: options.power,
                        targets: options.targets,
                        defended: options.defended,
                    });
                }
            }
        }

        TurnStep::Trash => {
            let player = state.player(seat);
            let bonus = player.tableau.bonuses().trash.max(0) as u32;
            if state.turn.trashed >= bonus || player.hand.is_empty() {
                state.turn.step = TurnStep::BonusDraw;
                return;
            }
            state.pending = Some(PendingDecision::Trash { seat, remaining: bonus - state.turn.trashed });
        }

        TurnStep::BonusDraw => {
            state.turn.step = TurnStep::Draw;
            let bonus = state.player(seat).tableau.bonuses().draw.max(0) as usize;
            // the draw bonus is only paid for by trashing
            if bonus > 0 && state.turn.trashed > 0 {
                let GameState { stock, players, .. } = state;
                let drawn = stock.draw_into(bonus, &mut players[seat.index()].hand);
                if drawn > 0 {
                    info!("{} bonus draws {}", seat, drawn);
                }
            }
        }

        TurnStep::Draw => {
            let draws_left = state.config.draw_per_turn.saturating_sub(state.turn.draws as usize);
            let player = state.player(seat);
            let power = player.tableau.bonuses().draw_from_discard.max(0) as u32;
            let can_take_discard = !state.turn.discard_draw_declined
                && state.turn.discard_draws < power
                && draws_left > 0
                && player.hand.room() > 0;
            if let (true, Some(top)) = (can_take_discard, state.discard.top()) {
                state.pending = Some(PendingDecision::DiscardDraw {
                    seat,
                    top,
                    remaining: power - state.turn.discard_draws,
                });
                return;
            }
            let GameState { stock, players, turn, .. } = state;
            let hand = &mut players[seat.index()].hand;
            let drawn = stock.draw_into(draws_left, hand);
            turn.draws += drawn as u32;
            debug!("{} draws {} up to {}", seat, drawn, hand.count());
            turn.step = TurnStep::DiscardToLimit;
        }

        TurnStep::DiscardToLimit => {
            let hand = &state.player(seat).hand;
            if hand.is_over_limit() {
                state.pending = Some(PendingDecision::DiscardToLimit {
                    seat,
                    excess: hand.count() - hand.limit(),
                });
            } else {
                state.turn.step = TurnStep::End;
            }
        }

        TurnStep::End => {
            state.current = seat.other();
            state.turn = TurnState::new();
        }
    }
}

fn start_turn(state: &mut GameState) {
    let seat = state.current;
    if seat == Seat::First {
        if state.stock.is_exhausted() {
            finish(state, EndReason::StockExhausted);
            return;
        }
        if state.round >= state.config.round_cap {
            info!("The game went to {} rounds--ended as a safety", state.round);
            finish(state, EndReason::SafetyCap);
            return;
        }
        state.round += 1;
        debug!("----ROUND {}----", state.round);
    }

    // Only the seat about to play is checked: if the second seat fills
    // first, the first seat still plays once more before the check.
    let player = state.player(seat);
    if player.tableau.fill() >= state.config.fill_target {
        finish(state, EndReason::TableauFilled(seat));
        return;
    }

    debug!("{} hand: {}", seat, player.hand);
    debug!("{} tableau: {}", seat, player.tableau);
    state.turn = TurnState::new();
    state.turn.step = TurnStep::Build;
}

fn finish(state: &mut GameState, reason: EndReason) {
    let victory_points = [
        state.players[0].tableau.victory_points(),
        state.players[1].tableau.victory_points(),
    ];
    let winner = match victory_points[0].cmp(&victory_points[1]) {
        std::cmp::Ordering::Greater => Some(Seat::First),
        std::cmp::Ordering::Less => Some(Seat::Second),
        std::cmp::Ordering::Equal => None,
    };
    info!(
        "Game over after {} rounds ({}): Player 0 {} - {} Player 1",
        state.round, reason, victory_points[0], victory_points[1]
    );
    state.outcome = Some(Outcome { reason, victory_points, winner });
}

/// Apply a player's action to resolve the pending decision, then advance.
/// On error the pending decision is put back; errors mean the caller
/// submitted something the decision never offered.
pub fn apply_action(state: &mut GameState, action: Action) -> Result<(), EngineError> {
    let pending = state.pending.take().ok_or(EngineError::NoPendingDecision)?;
    if let Err(e) = resolve(state, &pending, action) {
        state.pending = Some(pending);
        return Err(e);
    }
    advance(state);
    Ok(())
}

fn resolve(state: &mut GameState, pending: &PendingDecision, action: Action) -> Result<(), EngineError> {
    match (pending, action) {
        (PendingDecision::Build { seat, .. }, Action::Build(Some(order))) => {
            let built = build(state, *seat, &order)?;
            state.turn.builds += 1;
            if built.def().kind == Kind::Storage {
                state.turn.storage_slots = storage_tier(built.def().cost);
                state.turn.storage_next = 0;
                state.turn.step = TurnStep::StorageFill;
            }
        }
        (PendingDecision::Build { .. }, Action::Build(None)) => {
            state.turn.step = TurnStep::AfterBuild;
        }

        (PendingDecision::Redraw { seat }, Action::Redraw(true)) => {
            let GameState { stock, players, discard, .. } = state;
            let hand = &mut players[seat.index()].hand;
            let dumped = hand.reset();
            for &card in &dumped {
                discard.push(card);
            }
            let drawn = stock.draw_into(dumped.len(), hand);
            info!("{} dumps their hand and redraws {}", seat, drawn);
            // a reset hand forfeits the rest of the turn
            state.turn.step = TurnStep::End;
        }
        (PendingDecision::Redraw { .. }, Action::Redraw(false)) => {
            state.turn.step = TurnStep::Attack;
        }

        (PendingDecision::StorageFill { seat, slot, options }, Action::StorageFill(choice)) => {
            if let Some(source) = choice {
                if !options.contains(&source) {
                    return Err(EngineError::IllegalChoice(format!("{:?} is not a storage option", source)));
                }
                fill_storage(state, *seat, *slot, source)?;
            }
            state.turn.storage_next += 1;
        }

        (PendingDecision::Attack { seat, targets, .. }, Action::Attack(choice)) => {
            if let Some(kind) = choice {
                if !targets.contains(&kind) {
                    return Err(EngineError::IllegalChoice(format!("{} is not a legal target", kind)));
                }
                seize(state, *seat, kind)?;
            }
        }

        (PendingDecision::Trash { seat, .. }, Action::Trash(Some(pos))) => {
            let GameState { players, trash, .. } = state;
            let card = players[seat.index()].hand.move_to(pos, trash)?;
            info!("{} trashes {}", seat, card);
            state.turn.trashed += 1;
        }
        (PendingDecision::Trash { .. }, Action::Trash(None)) => {
            state.turn.step = TurnStep::BonusDraw;
        }

        (PendingDecision::DiscardDraw { seat, top, .. }, Action::DiscardDraw(true)) => {
            let GameState { players, discard, turn, .. } = state;
            let drawn = discard.draw_into(1, &mut players[seat.index()].hand) as u32;
            if drawn > 0 {
                info!("{} draws {} from the discard", seat, top);
            }
            turn.discard_draws += drawn;
            turn.draws += drawn;
        }
        (PendingDecision::DiscardDraw { .. }, Action::DiscardDraw(false)) => {
            state.turn.discard_draw_declined = true;
        }

        (PendingDecision::DiscardToLimit { seat, .. }, Action::Discard(pos)) => {
            let GameState { players, discard, .. } = state;
            let card = players[seat.index()].hand.move_to(pos, discard)?;
            debug!("{} discards {} to the hand limit", seat, card);
        }

        (pending, _) => return Err(EngineError::UnexpectedAction(pending.name())),
    }
    Ok(())
}

// ── Action executors ───────────────────────────────────────────────────

/// Build or upgrade the card at `order.slot`, spending `order.discards`
/// to the discard pile. Returns the built card.
pub fn build(state: &mut GameState, seat: Seat, order: &BuildOrder) -> Result<CardId, EngineError> {
    let player = state.player(seat);
    let id = player.card_at(order.slot).ok_or(match order.slot {
        CardRef::Hand(pos) | CardRef::Storage(pos) => EngineError::InvalidSlot { pos },
    })?;
    let verdict = player.tableau.buildability(id.def(), player.spendable());
    if let Buildability::Blocked(reason) = verdict {
        return Err(EngineError::IllegalChoice(format!("{}: {}", id, reason)));
    }
    validate_discards(player, order, verdict.discard_count())?;

    let GameState { players, discard, .. } = state;
    let player = &mut players[seat.index()];
    take(player, order.slot)?;
    let superseded = player.tableau.place(id, verdict.is_upgrade())?;
    for &slot in &order.discards {
        let spent = spend(player, slot, discard)?;
        debug!("{} discards {}", seat, spent);
    }

    match superseded {
        Some(old) => info!("{} upgrades {} to {}", seat, old, id),
        None => info!("{} builds {} for {}", seat, id, verdict.discard_count()),
    }
    Ok(id)
}

fn validate_discards(player: &PlayerState, order: &BuildOrder, required: usize) -> Result<(), EngineError> {
    if order.discards.len() != required {
        return Err(EngineError::IllegalChoice(format!(
            "build needs {} discards, got {}",
            required,
            order.discards.len()
        )));
    }
    for (i, &slot) in order.discards.iter().enumerate() {
        if slot == order.slot || order.discards[..i].contains(&slot) {
            return Err(EngineError::IllegalChoice(format!("{} spent twice", slot)));
        }
        if !is_spendable(player, slot) {
            return Err(EngineError::DisallowedSource(slot));
        }
    }
    Ok(())
}

fn is_spendable(player: &PlayerState, slot: CardRef) -> bool {
    match slot {
        CardRef::Hand(pos) => player.hand.get(pos).is_some(),
        CardRef::Storage(pos) => {
            pos < player.tableau.usable_storage_slots() && player.tableau.storage[pos].is_some()
        }
    }
}

/// Detach a spendable card with no destination.
fn take(player: &mut PlayerState, slot: CardRef) -> Result<CardId, EngineError> {
    if !is_spendable(player, slot) {
        return Err(EngineError::DisallowedSource(slot));
    }
    match slot {
        CardRef::Hand(pos) => player.hand.remove_at(pos),
        CardRef::Storage(pos) => player.tableau.take_from_storage(pos),
    }
}

/// Move a card from hand or usable storage onto `pile`.
pub fn spend(player: &mut PlayerState, slot: CardRef, pile: &mut Pile) -> Result<CardId, EngineError> {
    let card = take(player, slot)?;
    pile.push(card);
    Ok(card)
}

/// Resolve an attack on `kind`: the opponent's top card moves to the
/// attacker's hand and the attacking soldier goes to the trash.
pub fn seize(state: &mut GameState, seat: Seat, kind: Kind) -> Result<CardId, EngineError> {
    let GameState { players, trash, .. } = state;
    let [first, second] = players;
    let (attacker, defender) = match seat {
        Seat::First => (first, second),
        Seat::Second => (second, first),
    };
    let soldier = attacker.tableau.top(Kind::Soldiers).ok_or(EngineError::MissingStack(Kind::Soldiers))?;
    if attacker.hand.is_full() {
        return Err(EngineError::HandFull { capacity: attacker.hand.capacity() });
    }
    let taken = defender.tableau.remove_top(kind)?;
    // may push the attacker over the hand limit; discard-to-limit fixes it
    attacker.hand.insert(taken)?;
    attacker.tableau.remove_top(Kind::Soldiers)?;
    trash.push(soldier);
    info!("{} uses {} and takes opponent's {}", seat, soldier, taken);
    Ok(taken)
}

fn fill_storage(state: &mut GameState, seat: Seat, slot: usize, source: StorageSource) -> Result<(), EngineError> {
    let GameState { players, stock, discard, .. } = state;
    let player = &mut players[seat.index()];
    let card = match source {
        StorageSource::Stock => stock.draw_one(),
        StorageSource::DiscardTop => discard.pop(),
        StorageSource::Hand(pos) => Some(player.hand.remove_at(pos)?),
    }
    .ok_or_else(|| EngineError::IllegalChoice(format!("{:?} is empty", source)))?;
    player.tableau.put_in_storage(slot, card)?;
    info!("{} stores {}", seat, card);
    Ok(())
}

// ── Option enumeration ─────────────────────────────────────────────────

/// Every spendable card with its build verdict, hand first then usable
/// storage, each in ascending slot order.
pub fn build_candidates(player: &PlayerState) -> Vec<BuildCandidate> {
    let spendable = player.spendable();
    let hand = player.hand.iter().map(|(pos, c)| (CardRef::Hand(pos), c));
    let storage = player.tableau.usable_storage()
        .filter_map(|(pos, c)| c.map(|c| (CardRef::Storage(pos), c)));
    hand.chain(storage)
        .map(|(slot, card)| BuildCandidate {
            slot,
            card,
            verdict: player.tableau.buildability(card.def(), spendable),
        })
        .collect()
}

/// Slots that may pay for building the card at `protected`.
pub fn discard_slots(player: &PlayerState, protected: CardRef) -> Vec<CardRef> {
    let hand = player.hand.iter().map(|(pos, _)| CardRef::Hand(pos));
    let storage = player.tableau.usable_storage()
        .filter(|(_, c)| c.is_some())
        .map(|(pos, _)| CardRef::Storage(pos));
    hand.chain(storage).filter(|&s| s != protected).collect()
}

/// Attack options for `attacker` against `defender`; `None` without a
/// soldier. An empty target list means the soldier cannot attack.
pub fn attack_options(attacker: &PlayerState, defender: &PlayerState) -> Option<AttackOptions> {
    let soldier = attacker.tableau.top_cost(Kind::Soldiers)?;
    let power = soldier as i32 + attacker.tableau.bonuses().attack;
    let reachable = |kind: Kind| defender.tableau.top_cost(kind).is_some_and(|c| c as i32 <= power);

    let defended = defender.tableau.has(Kind::Defensive);
    let targets = if attacker.hand.is_full() {
        // nowhere to put a seized card
        Vec::new()
    } else if defended {
        // a standing defensive building must be taken first
        if reachable(Kind::Defensive) { vec![Kind::Defensive] } else { Vec::new() }
    } else {
        Kind::ALL.into_iter().filter(|&k| reachable(k)).collect()
    };
    Some(AttackOptions { power, targets, defended })
}

/// Sources an empty storage slot may be filled from right now.
pub fn storage_fill_options(state: &GameState, seat: Seat) -> Vec<StorageSource> {
    let mut options = Vec::new();
    if !state.stock.is_exhausted() {
        options.push(StorageSource::Stock);
    }
    if !state.discard.is_empty() {
        options.push(StorageSource::DiscardTop);
    }
    options.extend(state.player(seat).hand.iter().map(|(pos, _)| StorageSource::Hand(pos)));
    options
}

impl PendingDecision {
    pub fn name(&self) -> &'static str {
        match self {
            PendingDecision::Build { .. } => "build",
            PendingDecision::Redraw { .. } => "redraw",
            PendingDecision::StorageFill { .. } => "storage fill",
            PendingDecision::Attack { .. } => "attack",
            PendingDecision::Trash { .. } => "trash",
            PendingDecision::DiscardDraw { .. } => "discard draw",
            PendingDecision::DiscardToLimit { .. } => "discard to limit",
        }
    }
}
