//! Alignment rules for motif trees.
//!
//! Scores are distances: a perfect alignment scores 0, so the alignment of
//! a target tree with itself is the optimum a design can reach.

use sf_structure::iupac_distance;
use sf_structure::is_constrained;
use sf_structure::Motif;
use sf_structure::MotifKind;
use sf_treealign::AlignmentRules;
use sf_treealign::Objective;

/// Per-node split of an alignment cost.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CostBreakdown {
    pub structure: f64,
    pub sequence: f64,
}

impl CostBreakdown {
    pub fn total(&self) -> f64 {
        self.structure + self.sequence
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MotifRules {
    /// Aligning two different loop kinds.
    pub kind_mismatch: f64,
    /// Per unit of size difference.
    pub size_weight: f64,
    /// Deleting any motif.
    pub delete_base: f64,
    /// Scaled by the fraction of sequence constrained positions.
    pub delete_constrained: f64,
    /// Deleting a preserved target motif.
    pub delete_preserved: f64,
}

impl Default for MotifRules {
    fn default() -> Self {
        Self {
            kind_mismatch: 1.0,
            size_weight: 1.0,
            delete_base: 5.0,
            delete_constrained: 5.0,
            delete_preserved: 100.0,
        }
    }
}

impl MotifRules {
    fn compatible(source: &Motif, target: &Motif) -> bool {
        if target.preserved {
            return source.kind == target.kind && source.size == target.size;
        }
        kinds_compatible(source.kind, target.kind)
    }

    fn constrained_fraction(motif: &Motif) -> f64 {
        if motif.positions.is_empty() {
            return 0.0;
        }
        let constrained = motif.substring.chars().filter(|&c| is_constrained(c)).count();
        constrained as f64 / motif.positions.len() as f64
    }
}

impl AlignmentRules<Motif> for MotifRules {
    type Detail = CostBreakdown;

    fn objective(&self) -> Objective {
        Objective::Min
    }

    fn compare(&self, source: &Motif, target: &Motif) -> Option<(f64, CostBreakdown)> {
        if !Self::compatible(source, target) {
            return None;
        }
        let kind = if source.kind == target.kind { 0.0 } else { self.kind_mismatch };
        let size = source.size.abs_diff(target.size) as f64 * self.size_weight;
        let cost = CostBreakdown {
            structure: kind + size,
            sequence: iupac_distance(&source.substring, &target.substring),
        };
        Some((cost.total(), cost))
    }

    fn merge(&self, source: &Motif, target: &Motif) -> Motif {
        Motif {
            preserved: target.preserved,
            ..source.clone()
        }
    }

    fn delete(&self, value: &Motif, _is_target: bool) -> (f64, CostBreakdown) {
        let mut structure = self.delete_base;
        if value.preserved {
            structure += self.delete_preserved;
        }
        let cost = CostBreakdown {
            structure,
            sequence: self.delete_constrained * Self::constrained_fraction(value),
        };
        (cost.total(), cost)
    }
}

/// Whether two motif kinds may ever be aligned.
pub fn kinds_compatible(a: MotifKind, b: MotifKind) -> bool {
    a == b || (a.is_loop() && b.is_loop())
}
