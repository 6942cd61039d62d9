pub mod types;
pub mod cards;
pub mod hand;
pub mod tableau;
pub mod error;
pub mod setup;
pub mod engine;
pub mod visibility;
pub mod invariants;

#[cfg(test)]
mod tests;

pub use types::*;
pub use cards::*;
pub use error::EngineError;
