pub mod agent;
pub mod valuation;
pub mod heuristic;
pub mod random;


pub use agent::Agent;
pub use valuation::{card_value, Strategy};
pub use heuristic::HeuristicAgent;
pub use random::RandomAgent;
