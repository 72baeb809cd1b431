//! Pluggable scoring for the tree aligner.

/// Direction of optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Objective {
    /// Higher scores are better (similarity).
    Max,
    /// Lower scores are better (distance).
    Min,
}

impl Objective {
    /// True if `a` is strictly better than `b`.
    pub fn better(self, a: f64, b: f64) -> bool {
        match self {
            Objective::Max => a > b,
            Objective::Min => a < b,
        }
    }
}

/// Compare, merge and delete functions for values of type `V`.
///
/// Deleting a subtree must cost the sum of the per-node `delete` costs
/// of all its nodes; the aligner precomputes subtree costs under that
/// assumption. All methods must be deterministic.
pub trait AlignmentRules<V> {
    /// Per-node annotation carried into the aligned tree.
    type Detail: Clone;

    fn objective(&self) -> Objective;

    /// Score of aligning `source` with `target`, `None` if the two values
    /// must never be matched.
    fn compare(&self, source: &V, target: &V) -> Option<(f64, Self::Detail)>;

    /// The value of a matched node in the aligned tree.
    fn merge(&self, source: &V, target: &V) -> V;

    /// Cost of leaving a single node unmatched.
    fn delete(&self, value: &V, is_target: bool) -> (f64, Self::Detail);
}
