//! Base-pair sets for comparing structures of equal length.
//!
//! Every pair (i, j) is packed into one `P1KEY` with `i` in the high bits,
//! so a structure becomes an `IntSet` of keys and the base-pair distance of
//! two structures is the size of their symmetric difference.

use std::fmt;
use itertools::Itertools;
use nohash_hasher::IntSet;

use crate::PairTable;
use crate::StructureError;
use crate::NAIDX;
use crate::P1KEY;

/// A base pair (i, j) with i < j.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Pair(pub NAIDX, pub NAIDX);

impl Pair {
    fn key(self) -> P1KEY {
        ((self.0 as P1KEY) << NAIDX::BITS) | (self.1 as P1KEY)
    }

    fn from_key(key: P1KEY) -> Self {
        Pair((key >> NAIDX::BITS) as NAIDX, (key & NAIDX::MAX as P1KEY) as NAIDX)
    }
}

/// The base pairs of one structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairSet {
    keys: IntSet<P1KEY>,
}

impl PairSet {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Pairs sorted 5' to 3'.
    pub fn pairs(&self) -> Vec<Pair> {
        let mut pairs: Vec<Pair> = self.keys.iter().map(|&k| Pair::from_key(k)).collect();
        pairs.sort_unstable();
        pairs
    }

    /// Number of pairs present in exactly one of the two sets.
    pub fn distance(&self, other: &PairSet) -> usize {
        self.keys.symmetric_difference(&other.keys).count()
    }
}

impl From<&PairTable> for PairSet {
    fn from(pt: &PairTable) -> Self {
        let keys = pt
            .iter()
            .enumerate()
            .filter_map(|(i, &j)| {
                let i = i as NAIDX;
                j.filter(|&j| i < j).map(|j| Pair(i, j).key())
            })
            .collect();
        PairSet { keys }
    }
}

impl TryFrom<&str> for PairSet {
    type Error = StructureError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Ok(PairSet::from(&PairTable::try_from(s)?))
    }
}

impl fmt::Display for PairSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs = self.pairs();
        write!(f, "{}", pairs.iter().map(|p| format!("({},{})", p.0, p.1)).join(","))
    }
}

/// Base-pair distance of two dot-bracket structures of equal length.
pub fn bp_distance(a: &str, b: &str) -> Result<usize, StructureError> {
    if a.len() != b.len() {
        return Err(StructureError::LengthMismatch {
            structure: a.len(),
            sequence: b.len(),
        });
    }
    Ok(PairSet::try_from(a)?.distance(&PairSet::try_from(b)?))
}
