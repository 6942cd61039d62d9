// ═══════════════════════════════════════════════════════════════════════
// Tableau — a player's built cards
//
// One stack per kind; inside a stack, index == building cost (1..=4) and
// only the top level is active. Discounts and bonuses are a cache of
// the sum over ACTIVE tops, updated incrementally on every build,
// upgrade and top removal. `invariants::check_invariants` recomputes
// them from scratch to catch drift.
// ═══════════════════════════════════════════════════════════════════════

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::error::EngineError;
use crate::types::{CardId, Kind, Material};

/// Slots per stack: index 0 is never used, 1..=4 hold levels by cost.
pub const STACK_LEVELS: usize = 5;

/// Storage slots printed on the board.
pub const STORAGE_SLOTS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack {
    levels: [Option<CardId>; STACK_LEVELS],
    top: usize,
}

impl Stack {
    fn new() -> Self {
        Stack { levels: [None; STACK_LEVELS], top: 0 }
    }

    /// Active card. Every live stack has one.
    pub fn top_card(&self) -> Option<CardId> {
        self.levels[self.top]
    }

    pub fn top_cost(&self) -> u8 {
        self.top as u8
    }

    /// Built levels from lowest to highest.
    pub fn cards(&self) -> impl Iterator<Item = CardId> + '_ {
        self.levels.iter().flatten().copied()
    }
}

/// Sum of per-card bonuses over the active tops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bonuses {
    pub victory_points: i32,
    pub build: i32,
    pub draw: i32,
    pub trash: i32,
    pub draw_from_discard: i32,
    pub attack: i32,
}

impl Bonuses {
    fn add(&mut self, card: &Card) {
        self.victory_points += card.victory_points;
        self.build += card.build_bonus;
        self.draw += card.draw_bonus;
        self.trash += card.trash_bonus;
        self.draw_from_discard += card.draw_from_discard_power;
        self.attack += card.attack_bonus;
    }

    fn sub(&mut self, card: &Card) {
        self.victory_points -= card.victory_points;
        self.build -= card.build_bonus;
        self.draw -= card.draw_bonus;
        self.trash -= card.trash_bonus;
        self.draw_from_discard -= card.draw_from_discard_power;
        self.attack -= card.attack_bonus;
    }
}

/// Why a card cannot be built right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockReason {
    NoMilitary,
    InsufficientMilitary { military: u8 },
    Superseded { top: u8 },
    SkipsLevel { top: u8 },
    CannotAfford { cost: i32, available: usize },
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockReason::NoMilitary => write!(f, "no military power"),
            BlockReason::InsufficientMilitary { military } => {
                write!(f, "insufficient military power (level {})", military)
            }
            BlockReason::Superseded { top } => write!(f, "already superseded by level {}", top),
            BlockReason::SkipsLevel { top } => {
                write!(f, "must upgrade one level at a time (currently level {})", top)
            }
            BlockReason::CannotAfford { cost, available } => {
                write!(f, "can't afford: costs {} with {} other cards", cost, available)
            }
        }
    }
}

/// Verdict of `Tableau::buildability`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Buildability {
    /// Lays on top of the existing stack, one level up, for free.
    Upgrade,
    /// Opens a new stack. `cost` is after discounts and may be <= 0.
    Fresh { cost: i32 },
    Blocked(BlockReason),
}

impl Buildability {
    pub fn is_legal(self) -> bool {
        !matches!(self, Buildability::Blocked(_))
    }

    pub fn is_upgrade(self) -> bool {
        matches!(self, Buildability::Upgrade)
    }

    /// Cards that must be discarded to pay for the build.
    pub fn discard_count(self) -> usize {
        match self {
            Buildability::Fresh { cost } => cost.max(0) as usize,
            Buildability::Upgrade | Buildability::Blocked(_) => 0,
        }
    }
}

impl std::fmt::Display for Buildability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Buildability::Upgrade => write!(f, "upgrade for 0"),
            Buildability::Fresh { cost } => write!(f, "build for {}", cost.max(&0)),
            Buildability::Blocked(reason) => write!(f, "{}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tableau {
    stacks: [Option<Stack>; Kind::COUNT],
    pub storage: [Option<CardId>; STORAGE_SLOTS],
    discounts: [i32; Material::COUNT],
    bonuses: Bonuses,
    fill: u8,
}

impl Default for Tableau {
    fn default() -> Self {
        Tableau::new()
    }
}

impl Tableau {
    pub fn new() -> Self {
        Tableau {
            stacks: Default::default(),
            storage: [None; STORAGE_SLOTS],
            discounts: [0; Material::COUNT],
            bonuses: Bonuses::default(),
            fill: 0,
        }
    }

    // ── Queries ────────────────────────────────────────────────────────

    pub fn stack(&self, kind: Kind) -> Option<&Stack> {
        self.stacks[kind.index()].as_ref()
    }

    pub fn has(&self, kind: Kind) -> bool {
        self.stacks[kind.index()].is_some()
    }

    pub fn top(&self, kind: Kind) -> Option<CardId> {
        self.stack(kind).and_then(Stack::top_card)
    }

    pub fn top_cost(&self, kind: Kind) -> Option<u8> {
        self.stack(kind).map(Stack::top_cost)
    }

    /// Active tops, in kind order.
    pub fn tops(&self) -> impl Iterator<Item = (Kind, CardId)> + '_ {
        Kind::ALL.into_iter().filter_map(|k| self.top(k).map(|c| (k, c)))
    }

    pub fn discounts(&self) -> [i32; Material::COUNT] {
        self.discounts
    }

    pub fn discount(&self, material: Material) -> i32 {
        self.discounts[material.index()]
    }

    pub fn bonuses(&self) -> Bonuses {
        self.bonuses
    }

    pub fn victory_points(&self) -> i32 {
        self.bonuses.victory_points
    }

    pub fn fill(&self) -> u8 {
        self.fill
    }

    /// Storage slots unlocked by the current Storage top: none without a
    /// Storage building, one at levels 1–2, two at levels 3–4.
    pub fn usable_storage_slots(&self) -> usize {
        self.top_cost(Kind::Storage).map_or(0, storage_tier)
    }

    pub fn usable_storage(&self) -> impl Iterator<Item = (usize, Option<CardId>)> + '_ {
        self.storage.iter().copied().enumerate().take(self.usable_storage_slots())
    }

    /// Every card held by this tableau, stacks and storage.
    pub fn all_cards(&self) -> Vec<CardId> {
        let mut cards: Vec<CardId> = self.stacks.iter().flatten().flat_map(Stack::cards).collect();
        cards.extend(self.storage.iter().flatten());
        cards
    }

    /// Whether `card` may be built given `spendable` cards in hand and
    /// usable storage (the card itself included in that count).
    pub fn buildability(&self, card: &Card, spendable: usize) -> Buildability {
        if card.kind == Kind::Soldiers {
            match self.top_cost(Kind::Military) {
                None => return Buildability::Blocked(BlockReason::NoMilitary),
                Some(military) if military < card.cost => {
                    return Buildability::Blocked(BlockReason::InsufficientMilitary { military });
                }
                Some(_) => {}
            }
        }

        if let Some(top) = self.top_cost(card.kind) {
            return if card.cost == top + 1 {
                Buildability::Upgrade
            } else if card.cost <= top {
                Buildability::Blocked(BlockReason::Superseded { top })
            } else {
                Buildability::Blocked(BlockReason::SkipsLevel { top })
            };
        }

        let cost = card.cost as i32 + self.discount(card.material);
        // the card being built is not available to pay for itself
        let available = spendable.saturating_sub(1);
        if cost > available as i32 {
            Buildability::Blocked(BlockReason::CannotAfford { cost, available })
        } else {
            Buildability::Fresh { cost }
        }
    }

    // ── Mutations ──────────────────────────────────────────────────────

    /// Lay `id` at its cost level and make it the active top.
    /// Returns the card it supersedes when upgrading.
    pub fn place(&mut self, id: CardId, upgrade: bool) -> Result<Option<CardId>, EngineError> {
        let card = id.def();
        let slot = &mut self.stacks[card.kind.index()];
        let previous = match (slot.as_ref(), upgrade) {
            (Some(stack), true) => stack.top_card(),
            (None, false) => None,
            (None, true) => return Err(EngineError::MissingStack(card.kind)),
            (Some(_), false) => {
                return Err(EngineError::IllegalChoice(format!("{} stack already exists", card.kind)));
            }
        };
        let level = card.cost as usize;
        let taken = slot.as_ref().is_some_and(|stack| stack.levels.get(level).is_some_and(Option::is_some));
        if level == 0 || level >= STACK_LEVELS || taken {
            return Err(EngineError::Invariant(format!("level {} of {} is not free", level, card.kind)));
        }
        let stack = slot.get_or_insert_with(Stack::new);
        stack.levels[level] = Some(id);
        stack.top = level;

        if let Some(old) = previous {
            self.deactivate(old.def());
        }
        self.activate(card);

        if card.kind.counts_towards_fill() && !upgrade {
            self.fill += 1;
        }
        Ok(previous)
    }

    /// Take the active top of `kind` off the tableau. The level below,
    /// if any, becomes active; otherwise the stack disappears.
    pub fn remove_top(&mut self, kind: Kind) -> Result<CardId, EngineError> {
        let stack = self.stacks[kind.index()].as_mut().ok_or(EngineError::MissingStack(kind))?;
        let removed = stack.levels[stack.top].take()
            .ok_or_else(|| EngineError::Invariant(format!("{} stack has no top", kind)))?;
        let below = stack.top.checked_sub(1).and_then(|lvl| stack.levels[lvl].map(|c| (lvl, c)));
        if let Some((level, _)) = below {
            stack.top = level;
        } else {
            self.stacks[kind.index()] = None;
            if kind.counts_towards_fill() {
                self.fill -= 1;
            }
        }

        self.deactivate(removed.def());
        if let Some((_, card)) = below {
            self.activate(card.def());
        }
        Ok(removed)
    }

    pub fn take_from_storage(&mut self, pos: usize) -> Result<CardId, EngineError> {
        self.storage.get_mut(pos)
            .and_then(Option::take)
            .ok_or(EngineError::InvalidSlot { pos })
    }

    pub fn put_in_storage(&mut self, pos: usize, card: CardId) -> Result<(), EngineError> {
        match self.storage.get_mut(pos) {
            Some(slot @ None) => {
                *slot = Some(card);
                Ok(())
            }
            _ => Err(EngineError::InvalidSlot { pos }),
        }
    }

    fn activate(&mut self, card: &Card) {
        for (d, m) in self.discounts.iter_mut().zip(card.cost_modifier) {
            *d += m;
        }
        self.bonuses.add(card);
    }

    fn deactivate(&mut self, card: &Card) {
        for (d, m) in self.discounts.iter_mut().zip(card.cost_modifier) {
            *d -= m;
        }
        self.bonuses.sub(card);
    }

    /// Discounts, bonuses and fill recomputed from the active tops.
    pub fn recompute(&self) -> ([i32; Material::COUNT], Bonuses, u8) {
        let mut discounts = [0; Material::COUNT];
        let mut bonuses = Bonuses::default();
        let mut fill = 0;
        for (kind, id) in self.tops() {
            let card = id.def();
            for (d, m) in discounts.iter_mut().zip(card.cost_modifier) {
                *d += m;
            }
            bonuses.add(card);
            if kind.counts_towards_fill() {
                fill += 1;
            }
        }
        (discounts, bonuses, fill)
    }
}

/// Storage slots unlocked by a Storage card of the given level.
pub fn storage_tier(cost: u8) -> usize {
    if cost >= 3 { 2 } else { 1 }
}

impl std::fmt::Display for Tableau {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (kind, card) in self.tops() {
            write!(f, "\n  {}:\t{}", kind, card)?;
        }
        if self.storage.iter().any(Option::is_some) {
            let stored: Vec<String> = self.storage.iter().flatten().map(|c| c.to_string()).collect();
            write!(f, "\n  (stored):\t{}", stored.join(" "))?;
        }
        Ok(())
    }
}
