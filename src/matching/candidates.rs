//! Candidate generation for a single document

use crate::matching::constraints::MatchConstraints;
use crate::types::{Document, Payment};

/// Indices of pool payments satisfying the full constraint set for the
/// given document, in ledger (pool) order.
///
/// Ledger order is preserved so that ambiguity resolution is deterministic
/// and reproducible across runs. Pure function of its inputs.
pub fn candidate_indices(
    document: &Document,
    pool: &[Payment],
    constraints: &MatchConstraints,
) -> Vec<usize> {
    pool.iter()
        .enumerate()
        .filter(|(_, payment)| constraints.eligible(document, payment))
        .map(|(index, _)| index)
        .collect()
}
