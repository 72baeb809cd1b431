use std::fmt;
use std::ops::Deref;

use crate::DotBracket;
use crate::DotBracketVec;
use crate::StructureError;
use crate::NAIDX;

/// For every position the index of its pairing partner, if any.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairTable(Vec<Option<NAIDX>>);

impl PairTable {
    /// Partner of position `i` as a `usize` index.
    pub fn partner(&self, i: usize) -> Option<usize> {
        self.0[i].map(|j| j as usize)
    }

    /// Number of base pairs.
    pub fn pair_count(&self) -> usize {
        self.0
            .iter()
            .enumerate()
            .filter(|(i, j)| matches!(j, Some(j) if (*j as usize) > *i))
            .count()
    }
}

impl Deref for PairTable {
    type Target = [Option<NAIDX>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<&DotBracketVec> for PairTable {
    type Error = StructureError;

    fn try_from(db: &DotBracketVec) -> Result<Self, Self::Error> {
        if db.len() >= NAIDX::MAX as usize {
            return Err(StructureError::TooLong(db.len()));
        }
        let mut table = vec![None; db.len()];
        let mut stack: Vec<usize> = Vec::new();
        for (j, symbol) in db.iter().enumerate() {
            match symbol {
                DotBracket::Open => stack.push(j),
                DotBracket::Close => {
                    let i = stack.pop().ok_or(StructureError::UnmatchedClose(j))?;
                    table[i] = Some(j as NAIDX);
                    table[j] = Some(i as NAIDX);
                }
                DotBracket::Unpaired => {}
            }
        }
        if let Some(&i) = stack.last() {
            return Err(StructureError::UnmatchedOpen(i));
        }
        Ok(PairTable(table))
    }
}

impl TryFrom<&str> for PairTable {
    type Error = StructureError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        PairTable::try_from(&DotBracketVec::try_from(s)?)
    }
}

impl fmt::Display for PairTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, partner) in self.0.iter().enumerate() {
            let c = match partner {
                None => '.',
                Some(j) if (*j as usize) > i => '(',
                Some(_) => ')',
            };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_table() {
        let pt = PairTable::try_from("((.)).(.)").unwrap();
        assert_eq!(pt.len(), 9);
        assert_eq!(pt.partner(0), Some(4));
        assert_eq!(pt.partner(4), Some(0));
        assert_eq!(pt.partner(1), Some(3));
        assert_eq!(pt.partner(2), None);
        assert_eq!(pt.partner(6), Some(8));
        assert_eq!(pt.pair_count(), 3);
        assert_eq!(pt.partner(5), None);
        assert_eq!(format!("{}", pt), "((.)).(.)");
    }

    #[test]
    fn test_unbalanced() {
        assert_eq!(PairTable::try_from("(()"), Err(StructureError::UnmatchedOpen(0)));
        assert_eq!(PairTable::try_from("())"), Err(StructureError::UnmatchedClose(2)));
        assert_eq!(PairTable::try_from(")("), Err(StructureError::UnmatchedClose(0)));
    }

    #[test]
    fn test_empty() {
        let pt = PairTable::try_from("").unwrap();
        assert!(pt.is_empty());
        assert_eq!(pt.pair_count(), 0);
    }
}
