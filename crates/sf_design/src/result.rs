use std::fmt;
use sf_structure::bp_distance;
use sf_structure::Motif;
use sf_structure::MotifTree;
use sf_treealign::align;
use sf_treealign::AlignedTree;

use crate::Annealer;
use crate::CostBreakdown;
use crate::DesignError;
use crate::Folder;

/// Summary of a designed sequence with respect to the target.
#[derive(Debug, Clone)]
pub struct DesignResult {
    pub sequence: String,
    pub structure: String,
    pub energy: f64,
    /// `None` if the robustness sweep was cancelled or failed.
    pub robustness: Option<f64>,
    /// Base-pair distance to the target structure, `None` for designs of a
    /// different length.
    pub bp_distance: Option<usize>,
    /// Number of unaligned motifs.
    pub tree_edit_distance: usize,
    /// Structural alignment score.
    pub score: f64,
    pub shapiro: String,
    pub aligned: AlignedTree<Motif, CostBreakdown>,
}

impl DesignResult {
    pub fn evaluate<F: Folder>(
        annealer: &mut Annealer<F>,
        sequence: &str,
    ) -> Result<Self, DesignError> {
        let method = annealer.config().fold_method;
        let prediction = annealer.folder_mut().fold(sequence, None)?.get(method).clone();
        let tree = MotifTree::build(&prediction.structure, sequence)?;
        let (aligned, score) = align(tree.tree(), annealer.target().tree(), annealer.rules());
        let target_structure = &annealer.config().target_structure;
        let bp_distance = bp_distance(&prediction.structure, target_structure).ok();
        let robustness = annealer.robustness(sequence, &prediction.structure);

        Ok(DesignResult {
            sequence: sequence.to_string(),
            energy: prediction.energy,
            robustness,
            bp_distance,
            tree_edit_distance: aligned.count_unmatched(),
            score,
            shapiro: tree.shapiro(),
            aligned,
            structure: prediction.structure,
        })
    }
}

impl fmt::Display for DesignResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.sequence)?;
        writeln!(f, "{}", self.structure)?;
        writeln!(f, "Fold energy: {:.2}", self.energy)?;
        match self.robustness {
            Some(r) => writeln!(f, "Mutational robustness: {:.4}", r)?,
            None => writeln!(f, "Mutational robustness: n/a")?,
        }
        match self.bp_distance {
            Some(d) => writeln!(f, "BP distance: {}", d)?,
            None => writeln!(f, "BP distance: n/a")?,
        }
        writeln!(f, "Tree edit distance: {}", self.tree_edit_distance)?;
        writeln!(f, "Shapiro: {}", self.shapiro)?;
        write!(f, "Aligned tree ({}): {}", self.score, self.aligned)
    }
}
