// ═══════════════════════════════════════════════════════════════════════
// Core types — kinds, materials, seats, card references, configuration,
// pending decisions and the top-level GameState
// ═══════════════════════════════════════════════════════════════════════

use serde::{Deserialize, Serialize};

use crate::cards::{Card, CATALOG};
use crate::hand::{DrawPool, Hand, Pile};
use crate::tableau::{Buildability, Tableau};

// ── Enums ──────────────────────────────────────────────────────────────

/// Building category of a card. The discriminant doubles as the index
/// into per-kind tables (tableau stacks, strategy tables).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Kind {
    Farm,
    Market,
    Storage,
    Supply,
    Manufacturing,
    Military,
    Defensive,
    Civic,
    School,
    Soldiers,
}

impl Kind {
    pub const COUNT: usize = 10;

    pub const ALL: [Kind; Kind::COUNT] = [
        Kind::Farm,
        Kind::Market,
        Kind::Storage,
        Kind::Supply,
        Kind::Manufacturing,
        Kind::Military,
        Kind::Defensive,
        Kind::Civic,
        Kind::School,
        Kind::Soldiers,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Soldiers never count towards tableau fill.
    pub fn counts_towards_fill(self) -> bool {
        self != Kind::Soldiers
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Kind::Farm => "Farm",
            Kind::Market => "Market",
            Kind::Storage => "Storage",
            Kind::Supply => "Supply",
            Kind::Manufacturing => "Manufacturing",
            Kind::Military => "Military",
            Kind::Defensive => "Defensive",
            Kind::Civic => "Civic",
            Kind::School => "School",
            Kind::Soldiers => "Soldiers",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Material {
    Wood,
    Metal,
    Stone,
    Soldier,
}

impl Material {
    pub const COUNT: usize = 4;

    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Material::Wood => write!(f, "wood"),
            Material::Metal => write!(f, "metal"),
            Material::Stone => write!(f, "stone"),
            Material::Soldier => write!(f, "soldier"),
        }
    }
}

/// One of the two seats at the table. `First` opens every round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    First,
    Second,
}

impl Seat {
    pub const BOTH: [Seat; 2] = [Seat::First, Seat::Second];

    pub fn index(self) -> usize {
        match self {
            Seat::First => 0,
            Seat::Second => 1,
        }
    }

    pub fn other(self) -> Seat {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }
}

impl std::fmt::Display for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.index())
    }
}

/// Coarse game phase indexing the valuation strategy tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Early,
    Mid,
    Late,
}

impl Phase {
    pub const COUNT: usize = 3;

    pub fn index(self) -> usize {
        self as usize
    }

    /// Rounds 1–3 are early, 4–6 mid, 7 onwards late.
    pub fn from_round(round: u32) -> Phase {
        if round > 6 {
            Phase::Late
        } else if round > 3 {
            Phase::Mid
        } else {
            Phase::Early
        }
    }
}

// ── Card identity ──────────────────────────────────────────────────────

/// A physical card instance. The play deck holds two copies of every
/// catalog entry: instance `i` is copy `i / CATALOG.len()` of entry
/// `i % CATALOG.len()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u8);

impl CardId {
    pub fn def(self) -> &'static Card {
        &CATALOG[self.0 as usize % CATALOG.len()]
    }

    pub fn copy_index(self) -> usize {
        self.0 as usize / CATALOG.len()
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.def())
    }
}

/// Where a spendable card sits: a hand slot or a storage slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardRef {
    Hand(usize),
    Storage(usize),
}

impl std::fmt::Display for CardRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardRef::Hand(pos) => write!(f, "hand[{}]", pos),
            CardRef::Storage(pos) => write!(f, "storage[{}]", pos),
        }
    }
}

// ── Configuration ──────────────────────────────────────────────────────

/// Per-run table rules. Loadable from JSON; every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for the stock shuffle.
    pub seed: u64,
    /// Hand size above which the player must discard.
    pub hand_limit: usize,
    /// Physical hand size, absorbing transient overfill (seized buildings).
    pub hand_capacity: usize,
    /// Cards dealt to each player at setup.
    pub initial_hand: usize,
    /// Cards drawn in the draw step, never past the hand limit.
    pub draw_per_turn: usize,
    /// Rounds played at most before the game is stopped.
    pub round_cap: u32,
    /// Distinct non-Soldier kinds that end the game.
    pub fill_target: u8,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            seed: 0,
            hand_limit: 5,
            hand_capacity: 7,
            initial_hand: 5,
            draw_per_turn: 2,
            round_cap: 30,
            fill_target: 9,
        }
    }
}

impl GameConfig {
    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ── Pending Decision Types ─────────────────────────────────────────────

/// A card the player could try to build, with the engine's verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildCandidate {
    pub slot: CardRef,
    pub card: CardId,
    pub verdict: Buildability,
}

/// Where a storage slot may be filled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageSource {
    Stock,
    DiscardTop,
    Hand(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingDecision {
    /// Build or upgrade one card, or pass. Candidates are listed hand
    /// first, then storage, each in ascending slot order.
    Build {
        seat: Seat,
        candidates: Vec<BuildCandidate>,
        builds_done: u32,
        builds_allowed: u32,
    },
    /// No build happened and the hand is full: dump it and redraw?
    Redraw {
        seat: Seat,
    },
    /// Fill an empty storage slot right after building a Storage card.
    StorageFill {
        seat: Seat,
        slot: usize,
        options: Vec<StorageSource>,
    },
    /// Seize the top card of one of the listed opponent kinds, or hold.
    /// `defended` means the only target allowed is the Defensive stack.
    Attack {
        seat: Seat,
        power: i32,
        targets: Vec<Kind>,
        defended: bool,
    },
    /// Trash one more hand card, or stop.
    Trash {
        seat: Seat,
        remaining: u32,
    },
    /// Take the top of the discard pile as one of this turn's draws?
    DiscardDraw {
        seat: Seat,
        top: CardId,
        remaining: u32,
    },
    /// Hand is over the limit; discard one card.
    DiscardToLimit {
        seat: Seat,
        excess: usize,
    },
}

impl PendingDecision {
    pub fn seat(&self) -> Seat {
        match self {
            PendingDecision::Build { seat, .. }
            | PendingDecision::Redraw { seat }
            | PendingDecision::StorageFill { seat, .. }
            | PendingDecision::Attack { seat, .. }
            | PendingDecision::Trash { seat, .. }
            | PendingDecision::DiscardDraw { seat, .. }
            | PendingDecision::DiscardToLimit { seat, .. } => *seat,
        }
    }
}

// ── Turn tracking ──────────────────────────────────────────────────────

/// Steps of one player's turn, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnStep {
    Start,
    Build,
    StorageFill,
    AfterBuild,
    Attack,
    Trash,
    BonusDraw,
    Draw,
    DiscardToLimit,
    End,
}

/// Per-turn counters, reset when the seat changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    pub step: TurnStep,
    pub builds: u32,
    pub trashed: u32,
    pub draws: u32,
    pub discard_draws: u32,
    pub discard_draw_declined: bool,
    /// Storage slots unlocked by the Storage card just built, and the
    /// next slot to consider.
    pub storage_slots: usize,
    pub storage_next: usize,
}

impl TurnState {
    pub fn new() -> Self {
        TurnState {
            step: TurnStep::Start,
            builds: 0,
            trashed: 0,
            draws: 0,
            discard_draws: 0,
            discard_draw_declined: false,
            storage_slots: 0,
            storage_next: 0,
        }
    }
}

impl Default for TurnState {
    fn default() -> Self {
        TurnState::new()
    }
}

/// Why the game stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    StockExhausted,
    TableauFilled(Seat),
    SafetyCap,
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndReason::StockExhausted => write!(f, "the stock ran out"),
            EndReason::TableauFilled(seat) => write!(f, "{} filled their tableau", seat),
            EndReason::SafetyCap => write!(f, "ended as a safety"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub reason: EndReason,
    pub victory_points: [i32; 2],
    /// `None` on equal victory points.
    pub winner: Option<Seat>,
}

// ── Game State ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub hand: Hand,
    pub tableau: Tableau,
}

impl PlayerState {
    /// Spendable cards: the hand plus occupied, unlocked storage slots.
    pub fn spendable(&self) -> usize {
        self.hand.count() + self.tableau.usable_storage().filter(|(_, c)| c.is_some()).count()
    }

    pub fn card_at(&self, slot: CardRef) -> Option<CardId> {
        match slot {
            CardRef::Hand(pos) => self.hand.get(pos),
            CardRef::Storage(pos) => self.tableau.storage.get(pos).copied().flatten(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub config: GameConfig,
    /// Completed-or-current round count, starting at 1 once play begins.
    pub round: u32,
    pub current: Seat,
    pub turn: TurnState,

    pub players: [PlayerState; 2],
    pub stock: DrawPool,
    pub discard: Pile,
    pub trash: Pile,

    /// Current pending decision the game is waiting on.
    pub pending: Option<PendingDecision>,
    /// Set once the game is over.
    pub outcome: Option<Outcome>,
}

impl GameState {
    pub fn player(&self, seat: Seat) -> &PlayerState {
        &self.players[seat.index()]
    }

    pub fn player_mut(&mut self, seat: Seat) -> &mut PlayerState {
        &mut self.players[seat.index()]
    }

    pub fn phase(&self) -> Phase {
        Phase::from_round(self.round)
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Mutable access to both players at once: (current, opponent).
    pub fn split_players(&mut self, seat: Seat) -> (&mut PlayerState, &mut PlayerState) {
        let [first, second] = &mut self.players;
        match seat {
            Seat::First => (first, second),
            Seat::Second => (second, first),
        }
    }
}
