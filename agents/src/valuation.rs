// ═══════════════════════════════════════════════════════════════════════
// Card valuation — how much a player wants a card right now
//
// Values run 0..=63. A strategy table gives the base value per phase,
// kind and cost; the player's own tableau then adjusts it.
// ═══════════════════════════════════════════════════════════════════════

use serde::{Deserialize, Serialize};

use warwick_engine::cards::Card;
use warwick_engine::tableau::Tableau;
use warwick_engine::types::{Kind, Phase};

pub const MAX_VALUE: i32 = 63;
/// Half the value range; below it a card is considered cheap to give up.
pub const KEEP_THRESHOLD: i32 = 31;
/// Penalty for a card whose stack is more than one level behind.
pub const NOT_YET_PLAYABLE: i32 = -10;

/// Cost levels 0..=4; level 0 is unused by the catalog.
pub const COST_LEVELS: usize = 5;

type Table = [[[i32; COST_LEVELS]; Kind::COUNT]; Phase::COUNT];

/// Base values indexed `[phase][kind][cost]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    pub name: String,
    pub table: Table,
}

impl Default for Strategy {
    /// Value grows with cost, independent of kind and phase.
    fn default() -> Self {
        let mut table = [[[0; COST_LEVELS]; Kind::COUNT]; Phase::COUNT];
        for phase in table.iter_mut() {
            for kind in phase.iter_mut() {
                for (cost, value) in kind.iter_mut().enumerate().skip(1) {
                    *value = cost as i32 * 16 - 1;
                }
            }
        }
        Strategy { name: "cost".to_string(), table }
    }
}

impl Strategy {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn base(&self, phase: Phase, kind: Kind, cost: u8) -> i32 {
        self.table[phase.index()][kind.index()]
            .get(cost as usize)
            .copied()
            .unwrap_or(0)
    }
}

/// Desirability of `card` for the owner of `tableau`.
pub fn card_value(card: &Card, tableau: &Tableau, strategy: &Strategy, phase: Phase) -> i32 {
    let mut modifier = 0;
    if let Some(top) = tableau.top_cost(card.kind) {
        if top == card.cost {
            // a duplicate still matters if a soldier takes the built one
            return 1;
        }
        if top > card.cost {
            return 0;
        }
        if top + 1 < card.cost {
            modifier = NOT_YET_PLAYABLE;
        }
    }
    (strategy.base(phase, card.kind, card.cost) + modifier).clamp(0, MAX_VALUE)
}
