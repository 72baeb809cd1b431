//! Single-neighbor sequence mutations.
//!
//! A mutation replaces, inserts or deletes a short window of bases. The
//! three actions are drawn uniformly among those that keep the sequence
//! length within the configured bounds.

use rand::Rng;
use sf_structure::RNA_BASES;

/// Relative weights of window sizes 1, 2, 3 and 4.
const WINDOW_WEIGHTS: [usize; 4] = [5, 4, 3, 2];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Replace,
    Insert,
    Delete,
}

pub fn random_base<R: Rng + ?Sized>(rng: &mut R) -> char {
    RNA_BASES[rng.random_range(0..RNA_BASES.len())]
}

pub fn random_sequence<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length).map(|_| random_base(rng)).collect()
}

fn window_size<R: Rng + ?Sized>(rng: &mut R) -> usize {
    let total: usize = WINDOW_WEIGHTS.iter().sum();
    let mut draw = rng.random_range(0..total);
    for (k, &weight) in WINDOW_WEIGHTS.iter().enumerate() {
        if draw < weight {
            return k + 1;
        }
        draw -= weight;
    }
    WINDOW_WEIGHTS.len()
}

/// Return a neighbor of `sequence` whose length lies within
/// `[min_length, max_length]`.
///
/// If no action is legal (an empty sequence that may not grow), the
/// sequence is returned unchanged.
pub fn mutate<R: Rng + ?Sized>(
    rng: &mut R,
    sequence: &str,
    min_length: usize,
    max_length: usize,
) -> String {
    let mut bases: Vec<char> = sequence.chars().collect();
    let len = bases.len();

    let mut actions = Vec::with_capacity(3);
    if len > 0 {
        actions.push(Action::Replace);
    }
    if len < max_length {
        actions.push(Action::Insert);
    }
    if len > min_length {
        actions.push(Action::Delete);
    }
    if actions.is_empty() {
        return sequence.to_string();
    }

    let size = window_size(rng);
    match actions[rng.random_range(0..actions.len())] {
        Action::Replace => {
            let start = rng.random_range(0..len);
            let end = (start + size).min(len);
            let original: Vec<char> = bases[start..end].to_vec();
            for base in &mut bases[start..end] {
                *base = random_base(rng);
            }
            if bases[start..end] == original[..] {
                let others: Vec<char> =
                    RNA_BASES.iter().copied().filter(|&b| b != original[0]).collect();
                bases[start] = others[rng.random_range(0..others.len())];
            }
        }
        Action::Insert => {
            let start = rng.random_range(0..=len);
            let size = size.min(max_length - len);
            let fresh: Vec<char> = (0..size).map(|_| random_base(rng)).collect();
            bases.splice(start..start, fresh);
        }
        Action::Delete => {
            let start = rng.random_range(0..len);
            let size = size.min(len - start).min(len - min_length);
            bases.drain(start..start + size);
        }
    }
    bases.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_lengths_stay_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seq = random_sequence(&mut rng, 20);
        for _ in 0..10_000 {
            seq = mutate(&mut rng, &seq, 16, 24);
            assert!((16..=24).contains(&seq.len()), "{}", seq.len());
            assert!(seq.chars().all(|c| RNA_BASES.contains(&c)));
        }
    }

    #[test]
    fn test_fixed_length_always_changes() {
        let mut rng = StdRng::seed_from_u64(11);
        let seq = "GGGGAAAACCCC";
        for _ in 0..1_000 {
            let next = mutate(&mut rng, seq, seq.len(), seq.len());
            assert_eq!(next.len(), seq.len());
            assert_ne!(next, seq);
        }
    }

    #[test]
    fn test_single_base() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let next = mutate(&mut rng, "A", 1, 1);
            assert_eq!(next.len(), 1);
            assert_ne!(next, "A");
        }
    }

    #[test]
    fn test_empty_sequence() {
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(mutate(&mut rng, "", 0, 0), "");
        let grown = mutate(&mut rng, "", 0, 3);
        assert!((1..=3).contains(&grown.len()));
    }

    #[test]
    fn test_window_sizes() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut counts = [0usize; 4];
        for _ in 0..14_000 {
            counts[window_size(&mut rng) - 1] += 1;
        }
        assert!(counts.iter().all(|&c| c > 0));
        assert!(counts[0] > counts[3]);
    }

    #[test]
    fn test_reproducible() {
        let a = mutate(&mut StdRng::seed_from_u64(42), "GCGCAAAGCGC", 9, 13);
        let b = mutate(&mut StdRng::seed_from_u64(42), "GCGCAAAGCGC", 9, 13);
        assert_eq!(a, b);
    }
}
