use std::io;
use thiserror::Error;
use sf_structure::StructureError;

/// Failures of the external folding tools.
#[derive(Debug, Error)]
pub enum FoldError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error while talking to the folder: {0}")]
    Io(#[from] io::Error),

    #[error("folder process closed its output")]
    Closed,

    #[error("could not parse folder output: {0}")]
    Parse(String),

    #[error("inverse folding failed for {0}")]
    Inverse(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not decode configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid target: {0}")]
    Structure(#[from] StructureError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum DesignError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fold(#[from] FoldError),

    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error("motif {spec} does not match the target {shapiro}")]
    MotifMismatch { spec: String, shapiro: String },
}
