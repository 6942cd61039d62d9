// ═══════════════════════════════════════════════════════════════════════
// Card catalog — static data
//
// Forty definitions: ten kinds, four levels each. The play deck holds
// two physical copies of every entry (see `CardId`).
// ═══════════════════════════════════════════════════════════════════════

use serde::Serialize;

use crate::types::{CardId, Kind, Material};

/// Immutable card definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Card {
    pub name: &'static str,
    pub cost: u8,
    pub kind: Kind,
    pub material: Material,
    pub victory_points: i32,
    /// Signed cost delta per material, in effect while this card is the
    /// top of its stack.
    pub cost_modifier: [i32; Material::COUNT],
    pub build_bonus: i32,
    pub draw_from_discard_power: i32,
    pub trash_bonus: i32,
    pub draw_bonus: i32,
    pub attack_bonus: i32,
    pub rule: &'static str,
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({} {} : {})", self.name, self.kind, self.cost, self.material)
    }
}

#[allow(clippy::too_many_arguments)]
const fn card(
    name: &'static str,
    cost: u8,
    kind: Kind,
    material: Material,
    victory_points: i32,
    cost_modifier: [i32; 4],
    build_bonus: i32,
    draw_from_discard_power: i32,
    trash_bonus: i32,
    draw_bonus: i32,
    attack_bonus: i32,
    rule: &'static str,
) -> Card {
    Card {
        name,
        cost,
        kind,
        material,
        victory_points,
        cost_modifier,
        build_bonus,
        draw_from_discard_power,
        trash_bonus,
        draw_bonus,
        attack_bonus,
        rule,
    }
}

use Kind::*;
use Material::{Metal, Soldier, Stone, Wood};

// Columns: name, cost, kind, material, VP, cost modifier [wood, metal,
// stone, soldier], build, draw-from-discard, trash, draw, attack, rule.
pub static CATALOG: [Card; 40] = [
    card("Fowlery",      1, Farm, Wood, 0, [0, 0, 0, -1], 0, 0, 0, 0, 0, "-1 to recruit soldier"),
    card("Pig Farm",     2, Farm, Wood, 0, [0, 0, 0, -2], 0, 0, 0, 0, 0, "-2 to recruit soldier"),
    card("Cow fields",   3, Farm, Wood, 0, [0, 0, 0, -3], 0, 0, 0, 0, 0, "-3 to recruit soldier"),
    card("Manor",        4, Farm, Wood, 1, [0, 0, 0, -4], 0, 0, 0, 0, 0, "-4 to recruit soldier; +1 VP"),

    card("Trading Post", 1, Market, Wood, 0, [0, 0, 0, 0], 0, 1, 0, 0, 0, "may draw from discard pile"),
    card("Bazaar",       2, Market, Wood, 0, [0, 0, 0, 0], 0, 1, 1, 0, 0, "may draw from discard pile; may trash 1"),
    card("Exchange",     3, Market, Wood, 0, [0, 0, 0, 0], 0, 1, 1, 1, 0, "may draw from discard pile; trash 1 to draw 1"),
    card("Faire",        4, Market, Wood, 1, [0, 0, 0, 0], 0, 1, 1, 2, 0, "may draw from discard pile; trash 1 to draw 2; +1 VP"),

    card("Shed",         1, Storage, Wood, 0, [0, 0, 0, 0], 0, 0, 0, 0, 0, "fill storage space 1 from hand, stock or discard"),
    card("Warehouse",    2, Storage, Wood, 0, [0, 0, 0, 0], 0, 0, 0, 0, 0, "refill storage space 1 if it is open"),
    card("Storehouse",   3, Storage, Wood, 0, [0, 0, 0, 0], 0, 0, 0, 0, 0, "fill storage spaces 1 and 2 from hand, stock or discard"),
    card("Vaults",       4, Storage, Wood, 1, [0, 0, 0, 0], 0, 0, 0, 0, 0, "refill any open storage; +1 VP"),

    card("Sawmill",      1, Supply, Metal, 0, [-1, 0, 0, 0], 0, 0, 0, 0, 0, "-1 to build wood card"),
    card("Mine",         2, Supply, Metal, 0, [0, -1, 0, 0], 0, 0, 0, 0, 0, "-1 to build metal card"),
    card("Quarry",       3, Supply, Metal, 0, [0, 0, -1, 0], 0, 0, 0, 0, 0, "-1 to build stone card"),
    card("Gold stream",  4, Supply, Metal, 1, [-1, -1, -1, 0], 0, 0, 0, 0, 0, "-1 to build any card with a resource type; +1 VP"),

    card("Carpentery",   1, Manufacturing, Metal, 0, [-1, 0, 0, 0], 0, 0, 0, 0, 0, "-1 cost to build wood card"),
    card("Blacksmith",   2, Manufacturing, Metal, 0, [0, -1, 0, 0], 0, 0, 0, 0, 0, "-1 cost to build metal card"),
    card("Mason",        3, Manufacturing, Metal, 0, [0, 0, -1, 0], 0, 0, 0, 0, 0, "-1 cost to build stone card"),
    card("Bank",         4, Manufacturing, Metal, 1, [-1, -1, -1, 0], 0, 0, 0, 0, 0, "-1 cost to build any card with a resource type; +1 VP"),

    card("Armory",       1, Military, Metal, 0, [0, 0, 0, 0], 0, 0, 0, 0, 0, "allows recruiting soldier up to level 1"),
    card("Garrison",     2, Military, Metal, 0, [0, 0, 0, 0], 0, 0, 0, 0, 0, "allows recruiting soldier up to level 2"),
    card("Barrack",      3, Military, Metal, 0, [0, 0, 0, 0], 0, 0, 0, 0, 0, "allows recruiting soldier up to level 3"),
    card("Fort",         4, Military, Metal, 1, [0, 0, 0, 0], 0, 0, 0, 0, 0, "allows recruiting soldier up to level 4; +1 VP"),

    card("Walls",        1, Defensive, Stone, 0, [0, 0, 0, 0], 0, 0, 0, 0, 0, "protects all other buildings, may be taken by level 1 soldier"),
    card("Tower",        2, Defensive, Stone, 0, [0, 0, 0, 0], 0, 0, 0, 0, 0, "protects all other buildings, may be taken by level 2 soldier"),
    card("Keep",         3, Defensive, Stone, 0, [0, 0, 0, 0], 0, 0, 0, 0, 0, "protects all other buildings, may be taken by level 3 soldier"),
    card("Castle",       4, Defensive, Stone, 1, [0, 0, 0, 0], 0, 0, 0, 0, 0, "protects all other buildings, may be taken by level 4 soldier; +1 VP"),

    card("Chapel",       1, Civic, Stone, 1, [0, 0, 0, 0], 0, 0, 0, 0, 0, "+1 VP"),
    card("Church",       2, Civic, Stone, 2, [0, 0, 0, 0], 0, 0, 0, 0, 0, "+2 VP"),
    card("Town Hall",    3, Civic, Stone, 3, [0, 0, 0, 0], 0, 0, 0, 0, 0, "+3 VP"),
    card("Cathedral",    4, Civic, Stone, 4, [0, 0, 0, 0], 0, 0, 0, 0, 0, "+4 VP"),

    card("Novice",       1, School, Stone, 0, [0, 0, 0, 0], 1, 0, 0, 0, 0, "+1 build"),
    card("Adept",        2, School, Stone, 0, [0, 0, 0, 0], 1, 0, 0, 0, 1, "+1 build; +1 to attack"),
    card("Mage",         3, School, Stone, 0, [0, 0, 0, 0], 2, 0, 0, 0, 1, "+2 builds; +1 to attack"),
    card("Wizard",       4, School, Stone, 1, [0, 0, 0, 0], 2, 0, 0, 0, 2, "+2 builds; +2 to attack; +1 VP"),

    card("Town Watch",   1, Soldiers, Soldier, 0, [0, 0, 0, 0], 0, 0, 0, 0, 0, "needs level 1 military; may take an opponent card up to 1; trash after use"),
    card("Archers",      2, Soldiers, Soldier, 0, [0, 0, 0, 0], 0, 0, 0, 0, 0, "needs level 2 military; may take an opponent card up to 2; trash after use"),
    card("Militia",      3, Soldiers, Soldier, 0, [0, 0, 0, 0], 0, 0, 0, 0, 0, "needs level 3 military; may take an opponent card up to 3; trash after use"),
    card("Knights",      4, Soldiers, Soldier, 1, [0, 0, 0, 0], 0, 0, 0, 0, 0, "needs level 4 military; may take an opponent card up to 4; trash after use; +1 VP"),
];

/// Total physical cards in play: two copies of the catalog.
pub const DECK_SIZE: usize = CATALOG.len() * 2;

/// Every card instance in deck order (before shuffling).
pub fn all_card_ids() -> Vec<CardId> {
    (0..DECK_SIZE as u8).map(CardId).collect()
}

/// First instance of the catalog entry with this name, if any.
pub fn find_card(name: &str) -> Option<CardId> {
    CATALOG.iter()
        .position(|c| c.name == name)
        .map(|i| CardId(i as u8))
}

/// Second physical copy of the same catalog entry.
pub fn twin(id: CardId) -> CardId {
    CardId(((id.0 as usize + CATALOG.len()) % DECK_SIZE) as u8)
}
