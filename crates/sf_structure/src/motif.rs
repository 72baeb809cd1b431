//! Structural motifs, the node values of a `MotifTree`.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use itertools::Itertools;

use crate::StructureError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotifKind {
    Hairpin,
    Stem,
    Bulge,
    Internal,
    Multiloop,
    External,
    Root,
}

impl MotifKind {
    /// Single letter code as used in Shapiro strings and motif listings.
    pub fn symbol(&self) -> char {
        match self {
            MotifKind::Hairpin => 'H',
            MotifKind::Stem => 'S',
            MotifKind::Bulge => 'B',
            MotifKind::Internal => 'I',
            MotifKind::Multiloop => 'M',
            MotifKind::External => 'E',
            MotifKind::Root => 'R',
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'H' => Some(MotifKind::Hairpin),
            'S' => Some(MotifKind::Stem),
            'B' => Some(MotifKind::Bulge),
            'I' => Some(MotifKind::Internal),
            'M' => Some(MotifKind::Multiloop),
            'E' => Some(MotifKind::External),
            'R' => Some(MotifKind::Root),
            _ => None,
        }
    }

    /// Loops closed by at least one helix.
    pub fn is_loop(&self) -> bool {
        matches!(
            self,
            MotifKind::Hairpin | MotifKind::Bulge | MotifKind::Internal | MotifKind::Multiloop
        )
    }
}

/// A classified region of a secondary structure.
///
/// Stems own the bases of both strands, all other motifs own their
/// unpaired bases. `size` counts base pairs for stems and unpaired bases
/// otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Motif {
    pub kind: MotifKind,
    pub size: usize,
    /// Owned sequence positions, sorted.
    pub positions: Vec<usize>,
    /// Owned sequence characters, contiguous runs joined by `.`.
    pub substring: String,
    /// Only ever set on target trees.
    pub preserved: bool,
}

impl Motif {
    pub fn new(kind: MotifKind, size: usize, positions: Vec<usize>, sequence: &[u8]) -> Self {
        debug_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        let substring = runs_of(&positions)
            .into_iter()
            .map(|r| String::from_utf8_lossy(&sequence[r]).into_owned())
            .join(".");
        Self {
            kind,
            size,
            positions,
            substring,
            preserved: false,
        }
    }

    /// The synthetic root, it owns nothing.
    pub fn root() -> Self {
        Self {
            kind: MotifKind::Root,
            size: 0,
            positions: Vec::new(),
            substring: String::new(),
            preserved: false,
        }
    }

    /// Maximal ranges of consecutive owned positions.
    pub fn runs(&self) -> Vec<Range<usize>> {
        runs_of(&self.positions)
    }

    /// Each run together with its characters, as taken from `substring`.
    pub fn run_strings(&self) -> Vec<(Range<usize>, &str)> {
        let mut offset = 0;
        self.runs()
            .into_iter()
            .map(|run| {
                let text = &self.substring[offset..offset + run.len()];
                offset += run.len() + 1;
                (run, text)
            })
            .collect()
    }
}

fn runs_of(positions: &[usize]) -> Vec<Range<usize>> {
    // Consecutive positions share the same offset to their rank.
    let chunks = positions.iter().enumerate().chunk_by(|&(k, &p)| p - k);
    chunks
        .into_iter()
        .filter_map(|(_, group)| {
            let group: Vec<usize> = group.map(|(_, &p)| p).collect();
            Some(*group.first()?..*group.last()? + 1)
        })
        .collect()
}

impl fmt::Display for Motif {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MotifKind::Root => write!(f, "R"),
            // Loops without unpaired bases carry no size.
            kind if kind != MotifKind::Stem && self.size == 0 => write!(f, "{}", kind.symbol()),
            kind => write!(f, "{}{}", kind.symbol(), self.size),
        }
    }
}

/// A reference to a motif of a tree: `<index><kind><size>`, where the index
/// is the motif's preorder position (the root has index 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MotifSpec {
    pub index: usize,
    pub kind: MotifKind,
    pub size: usize,
}

impl fmt::Display for MotifSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.index, self.kind.symbol(), self.size)
    }
}

impl FromStr for MotifSpec {
    type Err = StructureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StructureError::InvalidMotif(s.to_string());
        let s_trim = s.trim();
        let split = s_trim
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (index, rest) = s_trim.split_at(split);
        let mut chars = rest.chars();
        let kind = chars
            .next()
            .and_then(MotifKind::from_symbol)
            .ok_or_else(invalid)?;
        let size = chars.as_str();
        Ok(MotifSpec {
            index: index.parse().map_err(|_| invalid())?,
            kind,
            size: size.parse().map_err(|_| invalid())?,
        })
    }
}

/// Parse a comma or whitespace separated list of motif specs.
pub fn parse_motif_specs(list: &str) -> Result<Vec<MotifSpec>, StructureError> {
    list.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(MotifSpec::from_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols() {
        for kind in [
            MotifKind::Hairpin,
            MotifKind::Stem,
            MotifKind::Bulge,
            MotifKind::Internal,
            MotifKind::Multiloop,
            MotifKind::External,
            MotifKind::Root,
        ] {
            assert_eq!(MotifKind::from_symbol(kind.symbol()), Some(kind));
        }
        assert_eq!(MotifKind::from_symbol('x'), None);
        assert!(MotifKind::Bulge.is_loop());
        assert!(!MotifKind::Stem.is_loop());
        assert!(!MotifKind::External.is_loop());
    }

    #[test]
    fn test_runs_and_substring() {
        let seq = b"GGGAAACCC";
        let stem = Motif::new(MotifKind::Stem, 3, vec![0, 1, 2, 6, 7, 8], seq);
        assert_eq!(stem.runs(), vec![0..3, 6..9]);
        assert_eq!(stem.substring, "GGG.CCC");
        assert_eq!(stem.run_strings(), vec![(0..3, "GGG"), (6..9, "CCC")]);
        assert_eq!(format!("{}", stem), "S3");

        let empty = Motif::new(MotifKind::Multiloop, 0, vec![], seq);
        assert!(empty.runs().is_empty());
        assert_eq!(empty.substring, "");
        assert_eq!(format!("{}", empty), "M");
        assert_eq!(format!("{}", Motif::root()), "R");
    }

    #[test]
    fn test_motif_spec() {
        let spec: MotifSpec = "12H3".parse().unwrap();
        let expected = MotifSpec {
            index: 12,
            kind: MotifKind::Hairpin,
            size: 3,
        };
        assert_eq!(spec, expected);
        assert_eq!(spec.to_string(), "12H3");
        assert!("H3".parse::<MotifSpec>().is_err());
        assert!("3X3".parse::<MotifSpec>().is_err());
        assert!("3S".parse::<MotifSpec>().is_err());
        assert!("".parse::<MotifSpec>().is_err());

        let list = parse_motif_specs("1S3, 2H4 5B1").unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[2].kind, MotifKind::Bulge);
        assert!(parse_motif_specs("1S3,x").is_err());
    }
}
