//! Simulated annealing over sequences.
//!
//! Every candidate sequence is folded, its structure decomposed into a
//! motif tree and aligned against the target tree. The alignment distance,
//! plus optional energy and robustness terms, is the fitness to minimize.
//! Candidates are accepted with the Metropolis rule under a logarithmically
//! decreasing temperature.

use rand::Rng;
use sf_structure::bp_distance;
use sf_structure::Motif;
use sf_structure::MotifTree;
use sf_structure::RNA_BASES;
use sf_treealign::align;
use sf_treealign::AlignedTree;

use crate::inverse_seed;
use crate::mutate;
use crate::random_sequence;
use crate::CancelToken;
use crate::CostBreakdown;
use crate::DesignConfig;
use crate::DesignError;
use crate::Folder;
use crate::MotifRules;

/// Weight of the robustness deviation in the fitness.
pub const ROBUSTNESS_WEIGHT: f64 = 100.0;

/// `T(i) = T0 / (1 + α ln(1 + i))`
pub fn temperature(iteration: usize, initial: f64, alpha: f64) -> f64 {
    initial / (1.0 + alpha * (1.0 + iteration as f64).ln())
}

/// Metropolis acceptance probability of moving from `old` to `new` at
/// temperature `t`, for a sequence of length `k`.
pub fn acceptance(old: f64, new: f64, t: f64, k: f64) -> f64 {
    if new < old {
        1.0
    } else if t == 0.0 {
        0.0
    } else {
        (-(new - old) / (k * t)).exp()
    }
}

/// A scored candidate.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub structure: String,
    pub energy: f64,
    pub score: f64,
    pub aligned: AlignedTree<Motif, CostBreakdown>,
}

pub struct Annealer<F: Folder> {
    config: DesignConfig,
    rules: MotifRules,
    folder: F,
    cancel: CancelToken,
    target: MotifTree,
    optimum: f64,
}

impl<F: Folder> Annealer<F> {
    /// Prepare a run: validate the configuration, build the target tree,
    /// mark preserved motifs and compute the self-alignment optimum.
    pub fn new(
        config: DesignConfig,
        rules: MotifRules,
        folder: F,
        cancel: CancelToken,
    ) -> Result<Self, DesignError> {
        config.validate()?;
        let mut target = MotifTree::build(&config.target_structure, &config.target_sequence())?;
        for spec in config.preserved_motifs()? {
            target.preserve(&spec).map_err(|_| DesignError::MotifMismatch {
                spec: spec.to_string(),
                shapiro: target.shapiro(),
            })?;
        }
        let (_, optimum) = align(target.tree(), target.tree(), &rules);
        log::debug!("Target {} with optimum {}.", target.shapiro(), optimum);
        Ok(Self {
            config,
            rules,
            folder,
            cancel,
            target,
            optimum,
        })
    }

    pub fn config(&self) -> &DesignConfig {
        &self.config
    }

    pub fn target(&self) -> &MotifTree {
        &self.target
    }

    /// Score of the target aligned with itself, the best reachable score
    /// of the structural term.
    pub fn optimum(&self) -> f64 {
        self.optimum
    }

    pub fn folder(&self) -> &F {
        &self.folder
    }

    pub fn folder_mut(&mut self) -> &mut F {
        &mut self.folder
    }

    pub fn rules(&self) -> &MotifRules {
        &self.rules
    }

    /// Configured starting sequence, a random one, or the inverse fold of
    /// the target (random if inverse folding fails).
    pub fn starting_sequence<R: Rng + ?Sized>(&mut self, rng: &mut R) -> String {
        if let Some(start) = &self.config.starting_sequence {
            return start.to_ascii_uppercase();
        }
        let length = self.config.target_length();
        if self.config.random_start {
            return random_sequence(rng, length);
        }
        let seed = inverse_seed(&self.config.target_sequence());
        match self.folder.inverse_fold(&self.config.target_structure, &seed) {
            Ok(sequence) => sequence,
            Err(e) => {
                log::warn!("Inverse folding failed ({}), starting from a random sequence.", e);
                random_sequence(rng, length)
            }
        }
    }

    /// Fitness of a sequence, `None` if it could not be evaluated.
    pub fn fitness(&mut self, sequence: &str) -> Option<Evaluation> {
        let folded = match self.folder.fold(sequence, None) {
            Ok(result) => result,
            Err(e) => {
                log::warn!("Folding {} failed: {}", sequence, e);
                return None;
            }
        };
        let prediction = folded.get(self.config.fold_method).clone();
        let tree = match MotifTree::build(&prediction.structure, sequence) {
            Ok(tree) => tree,
            Err(e) => {
                log::warn!("Unusable structure {} for {}: {}", prediction.structure, sequence, e);
                return None;
            }
        };
        let (aligned, mut score) = align(tree.tree(), self.target.tree(), &self.rules);
        if let Some(energy) = self.config.target_energy {
            score += (prediction.energy - energy).abs();
        }
        if let Some(robustness) = self.config.target_robustness {
            let actual = self.robustness(sequence, &prediction.structure)?;
            score += ROBUSTNESS_WEIGHT * (actual - robustness).abs();
        }
        Some(Evaluation {
            structure: prediction.structure,
            energy: prediction.energy,
            score,
            aligned,
        })
    }

    /// Mutational robustness: one minus the mean base-pair distance between
    /// `structure` and the structures of all single-point mutants,
    /// normalized by `3 n²`. `None` if cancelled or folding failed.
    pub fn robustness(&mut self, sequence: &str, structure: &str) -> Option<f64> {
        let bases: Vec<char> = sequence.chars().collect();
        if bases.is_empty() {
            return Some(1.0);
        }
        let mut total = 0usize;
        for i in 0..bases.len() {
            for &base in RNA_BASES.iter().filter(|&&b| b != bases[i]) {
                if self.cancel.is_cancelled() {
                    return None;
                }
                let mut mutant = bases.clone();
                mutant[i] = base;
                let mutant: String = mutant.into_iter().collect();
                let folded = match self.folder.fold(&mutant, None) {
                    Ok(result) => result,
                    Err(e) => {
                        log::warn!("Folding mutant {} failed: {}", mutant, e);
                        return None;
                    }
                };
                let mutant_structure = &folded.get(self.config.fold_method).structure;
                total += bp_distance(mutant_structure, structure).ok()?;
            }
        }
        let n = bases.len() as f64;
        Some(1.0 - total as f64 / (n * n * 3.0))
    }

    /// Search from `initial`. Returns the best sequence found, `None` only
    /// if cancelled before the first evaluation.
    pub fn run<R: Rng + ?Sized>(&mut self, initial: String, rng: &mut R) -> Option<String> {
        if self.cancel.is_cancelled() {
            return None;
        }
        let (min_length, max_length) = (self.config.min_length(), self.config.max_length());
        let exact_target = !self.config.has_secondary_targets();

        let mut current = initial;
        let mut current_score = match self.fitness(&current) {
            Some(eval) => {
                log::info!("Initial sequence ({}): {}\n{}", eval.score, current, eval.aligned);
                eval.score
            }
            None => f64::INFINITY,
        };
        let mut best = (current.clone(), current_score);

        for i in 0..self.config.iterations {
            if self.cancel.is_cancelled() {
                return Some(best.0);
            }
            if exact_target && best.1 <= self.optimum {
                log::debug!("Reached the optimum after {} iterations.", i);
                break;
            }
            let t = temperature(i, self.config.initial_temperature, self.config.alpha);
            let mut accepted = None;
            for _ in 0..self.config.lookahead {
                if self.cancel.is_cancelled() {
                    return Some(best.0);
                }
                let candidate = mutate(rng, &current, min_length, max_length);
                let Some(eval) = self.fitness(&candidate) else {
                    continue;
                };
                let p = acceptance(current_score, eval.score, t, current.len() as f64);
                log::trace!("Iteration {}: T = {:.3}, p = {:.3}.", i + 1, t, p);
                if rng.random::<f64>() < p {
                    accepted = Some((candidate, eval.score));
                    break;
                }
            }
            if let Some((sequence, score)) = accepted {
                current = sequence;
                current_score = score;
            }
            if current_score <= best.1 {
                best = (current.clone(), current_score);
            }
            log::debug!("Iteration {} ({}): {}", i + 1, current_score, current);
        }
        Some(best.0)
    }

    /// Pick a starting sequence and run.
    pub fn design<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<String> {
        if self.cancel.is_cancelled() {
            return None;
        }
        let initial = self.starting_sequence(rng);
        self.run(initial, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acceptance() {
        assert_eq!(acceptance(5.0, 3.0, 10.0, 20.0), 1.0);
        assert_eq!(acceptance(5.0, 3.0, 0.0, 20.0), 1.0);
        assert_eq!(acceptance(3.0, 5.0, 0.0, 20.0), 0.0);
        assert_eq!(acceptance(3.0, 3.0, 2.0, 10.0), 1.0);
        let p = acceptance(3.0, 5.0, 2.0, 10.0);
        assert!((p - (-0.1f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_temperature_schedule() {
        assert_eq!(temperature(0, 37.0, 2.0), 37.0);
        let t1 = temperature(1, 37.0, 2.0);
        assert!((t1 - 37.0 / (1.0 + 2.0 * 2f64.ln())).abs() < 1e-12);
        let mut last = f64::INFINITY;
        for i in 0..100 {
            let t = temperature(i, 37.0, 2.0);
            assert!(t < last && t > 0.0);
            last = t;
        }
    }
}
