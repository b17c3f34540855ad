//! Abuse policy engine: one verdict from rate limits, intelligence and heuristics.

mod engine;
mod weights;

pub use engine::{decide, PolicyDecision, PolicyInput};
pub use weights::{PolicyWeights, DEFAULT_FLAG_WEIGHTS};
