// ═══════════════════════════════════════════════════════════════════════
// Card containers
//
//   Hand     — fixed-capacity slots with a soft limit. Removing a card
//              leaves a hole; insertion always fills the lowest open slot.
//   DrawPool — the shuffled stock. Its cursor grows UPWARD from 0; cards
//              below the cursor have been drawn.
//   Pile     — discard and trash. A LIFO stack: push on top, draw from
//              the top. The trash is write-only in play.
// ═══════════════════════════════════════════════════════════════════════

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::types::CardId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    slots: Vec<Option<CardId>>,
    count: usize,
    limit: usize,
}

impl Hand {
    /// Empty hand. `capacity` is clamped up to `limit`.
    pub fn new(limit: usize, capacity: usize) -> Self {
        Hand {
            slots: vec![None; capacity.max(limit)],
            count: 0,
            limit,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_over_limit(&self) -> bool {
        self.count > self.limit
    }

    /// Card at `pos`, `None` for an empty or out-of-range slot.
    pub fn get(&self, pos: usize) -> Option<CardId> {
        self.slots.get(pos).copied().flatten()
    }

    /// Raw slots, holes included.
    pub fn slots(&self) -> &[Option<CardId>] {
        &self.slots
    }

    /// Occupied slots in ascending position order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, CardId)> + '_ {
        self.slots.iter().enumerate().filter_map(|(pos, c)| c.map(|c| (pos, c)))
    }

    pub fn cards(&self) -> Vec<CardId> {
        self.iter().map(|(_, c)| c).collect()
    }

    pub fn contains(&self, card: CardId) -> bool {
        self.slots.contains(&Some(card))
    }

    fn first_open(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// Detach the card at `pos`.
    pub fn remove_at(&mut self, pos: usize) -> Result<CardId, EngineError> {
        let card = self.slots.get_mut(pos)
            .and_then(Option::take)
            .ok_or(EngineError::InvalidSlot { pos })?;
        self.count -= 1;
        Ok(card)
    }

    /// Detach the card at `pos` and push it onto `pile`.
    pub fn move_to(&mut self, pos: usize, pile: &mut Pile) -> Result<CardId, EngineError> {
        let card = self.remove_at(pos)?;
        pile.push(card);
        Ok(card)
    }

    /// Put `card` in the lowest open slot, ignoring the soft limit.
    pub fn insert(&mut self, card: CardId) -> Result<usize, EngineError> {
        let pos = self.first_open().ok_or(EngineError::HandFull { capacity: self.capacity() })?;
        self.slots[pos] = Some(card);
        self.count += 1;
        Ok(pos)
    }

    /// Insert only while below the soft limit. Returns false when the
    /// hand is already at its limit.
    fn fill_one(&mut self, card: CardId) -> bool {
        if self.count >= self.limit {
            return false;
        }
        match self.first_open() {
            Some(pos) => {
                self.slots[pos] = Some(card);
                self.count += 1;
                true
            }
            None => false,
        }
    }

    /// Every physical slot is taken.
    pub fn is_full(&self) -> bool {
        self.count >= self.capacity()
    }

    /// Room left below the soft limit.
    pub fn room(&self) -> usize {
        self.limit.saturating_sub(self.count)
    }

    /// Empty every slot, returning the cards in slot order.
    pub fn reset(&mut self) -> Vec<CardId> {
        let dumped: Vec<CardId> = self.slots.iter_mut().filter_map(Option::take).collect();
        self.count = 0;
        dumped
    }
}

impl std::fmt::Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.iter().map(|(_, c)| c.to_string()).collect();
        write!(f, "{}", names.join(" "))
    }
}

// ── Stock ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawPool {
    cards: Vec<CardId>,
    cursor: usize,
}

impl DrawPool {
    /// Stock in the given (already shuffled) order; index 0 is drawn first.
    pub fn new(cards: Vec<CardId>) -> Self {
        DrawPool { cards, cursor: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.cards.len() - self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.cards.len()
    }

    /// Cards not yet drawn, next draw first.
    pub fn undrawn(&self) -> &[CardId] {
        &self.cards[self.cursor..]
    }

    /// Take the next card regardless of any hand.
    pub fn draw_one(&mut self) -> Option<CardId> {
        let card = self.cards.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(card)
    }

    /// Draw up to `n` cards into `hand`, stopping at the hand's limit or
    /// when the stock runs out. Returns how many were drawn.
    pub fn draw_into(&mut self, n: usize, hand: &mut Hand) -> usize {
        let mut drawn = 0;
        while drawn < n && hand.count() < hand.limit() {
            let Some(&card) = self.cards.get(self.cursor) else { break };
            if !hand.fill_one(card) {
                break;
            }
            self.cursor += 1;
            drawn += 1;
        }
        drawn
    }
}

// ── Discard / Trash ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pile {
    cards: Vec<CardId>,
}

impl Pile {
    pub fn new() -> Self {
        Pile::default()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn top(&self) -> Option<CardId> {
        self.cards.last().copied()
    }

    pub fn push(&mut self, card: CardId) {
        self.cards.push(card);
    }

    pub fn pop(&mut self) -> Option<CardId> {
        self.cards.pop()
    }

    /// Bottom to top.
    pub fn cards(&self) -> &[CardId] {
        &self.cards
    }

    /// Draw up to `n` cards from the top into `hand`, stopping at the
    /// hand's limit or when the pile is empty. Returns how many were drawn.
    pub fn draw_into(&mut self, n: usize, hand: &mut Hand) -> usize {
        let mut drawn = 0;
        while drawn < n && hand.count() < hand.limit() {
            let Some(card) = self.top() else { break };
            if !hand.fill_one(card) {
                break;
            }
            self.cards.pop();
            drawn += 1;
        }
        drawn
    }
}
