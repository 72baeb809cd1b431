//! Dot-bracket notation.
//!
//! Only the plain alphabet `.()` is a valid structure. Alternative bracket
//! types as written by some tools can be mapped onto it with
//! `normalize_brackets` before parsing.

use std::fmt;
use std::ops::Deref;

use crate::StructureError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DotBracket {
    Unpaired,
    Open,
    Close,
}

impl DotBracket {
    pub fn from_char(c: char, pos: usize) -> Result<Self, StructureError> {
        match c {
            '.' => Ok(DotBracket::Unpaired),
            '(' => Ok(DotBracket::Open),
            ')' => Ok(DotBracket::Close),
            _ => Err(StructureError::InvalidChar(c, pos)),
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            DotBracket::Unpaired => '.',
            DotBracket::Open => '(',
            DotBracket::Close => ')',
        }
    }
}

/// A parsed dot-bracket string. Brackets are not checked for balance here,
/// see `PairTable`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DotBracketVec(pub Vec<DotBracket>);

impl Deref for DotBracketVec {
    type Target = [DotBracket];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<&str> for DotBracketVec {
    type Error = StructureError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.chars()
            .enumerate()
            .map(|(i, c)| DotBracket::from_char(c, i))
            .collect::<Result<Vec<_>, _>>()
            .map(DotBracketVec)
    }
}

impl fmt::Display for DotBracketVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for db in self.iter() {
            write!(f, "{}", db.as_char())?;
        }
        Ok(())
    }
}

/// Map `[{<` onto `(` and `]}>` onto `)`, all other characters are kept.
pub fn normalize_brackets(structure: &str) -> String {
    structure
        .chars()
        .map(|c| match c {
            '[' | '{' | '<' => '(',
            ']' | '}' | '>' => ')',
            _ => c,
        })
        .collect()
}
