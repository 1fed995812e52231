//! The matching engine: constraints, candidate generation, and the run loop

pub mod candidates;
pub mod constraints;
pub mod engine;

pub use candidates::candidate_indices;
pub use constraints::{DateWindow, MatchConstraints};
pub use engine::MatchEngine;
