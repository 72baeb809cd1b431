use thiserror::Error;

/// Everything that can go wrong while reading a structure, a sequence or
/// a motif description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("invalid structure character '{0}' at position {1}")]
    InvalidChar(char, usize),

    #[error("unmatched ')' at position {0}")]
    UnmatchedClose(usize),

    #[error("unmatched '(' at position {0}")]
    UnmatchedOpen(usize),

    #[error("invalid sequence character '{0}' at position {1}")]
    InvalidNucleotide(char, usize),

    #[error("structure has length {structure}, sequence has length {sequence}")]
    LengthMismatch { structure: usize, sequence: usize },

    #[error("structure of length {0} exceeds the supported length")]
    TooLong(usize),

    #[error("invalid motif description '{0}'")]
    InvalidMotif(String),
}
