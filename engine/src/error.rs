// ═══════════════════════════════════════════════════════════════════════
// Engine errors
//
// Every variant is a broken precondition or invariant, never a normal
// game situation: "nothing to build" or "stock is empty" are expressed
// with Option / empty Vec / draw counts instead.
// ═══════════════════════════════════════════════════════════════════════

use thiserror::Error;

use crate::types::{CardRef, Kind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("no card in slot {pos}")]
    InvalidSlot { pos: usize },

    #[error("cannot spend from {0}")]
    DisallowedSource(CardRef),

    #[error("hand is full ({capacity} slots)")]
    HandFull { capacity: usize },

    #[error("no {0} stack in tableau")]
    MissingStack(Kind),

    #[error("no pending decision")]
    NoPendingDecision,

    #[error("action does not answer the pending {0} decision")]
    UnexpectedAction(&'static str),

    #[error("illegal choice: {0}")]
    IllegalChoice(String),

    #[error("invariant violated: {0}")]
    Invariant(String),
}
