//! Design run configuration.
//!
//! One immutable value describes a design run. It is usually read from a
//! JSON document where every field except the target structure is
//! optional:
//!
//! ```json
//! {
//!   "target_structure": "((((...))((...))))",
//!   "target_sequence": "NNNNNNNNNNNNNNNNNN",
//!   "iterations": 500,
//!   "motifs": ["4H3"],
//!   "seed": 7
//! }
//! ```

use std::path::PathBuf;
use serde::Deserialize;
use serde::Serialize;
use sf_structure::is_valid_iupac;
use sf_structure::parse_motif_specs;
use sf_structure::MotifSpec;
use sf_structure::PairTable;

use crate::ConfigError;
use crate::FoldMethod;

/// Where to find the ViennaRNA executables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolderConfig {
    /// Directory of `RNAfold` and `RNAinverse`, `PATH` lookup if unset.
    pub vienna_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignConfig {
    pub target_structure: String,
    /// IUPAC constraints, unconstrained (`N`) if unset.
    pub target_sequence: Option<String>,
    pub iterations: usize,
    /// Mutations tried per iteration before giving up on it.
    pub lookahead: usize,
    pub seed: Option<u64>,
    /// Designed sequences may be this much shorter or longer than the target.
    pub length_variation: usize,
    pub fold_method: FoldMethod,
    pub circular: bool,
    pub target_energy: Option<f64>,
    /// Mutational robustness in `[0, 1]`.
    pub target_robustness: Option<f64>,
    pub starting_sequence: Option<String>,
    /// Start from a random sequence instead of inverse folding the target.
    pub random_start: bool,
    /// Target motifs that must be kept, as `<index><kind><size>`.
    pub motifs: Vec<String>,
    pub initial_temperature: f64,
    pub alpha: f64,
    pub folder: FolderConfig,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            target_structure: String::new(),
            target_sequence: None,
            iterations: 100,
            lookahead: 4,
            seed: None,
            length_variation: 0,
            fold_method: FoldMethod::Mfe,
            circular: false,
            target_energy: None,
            target_robustness: None,
            starting_sequence: None,
            random_start: false,
            motifs: Vec::new(),
            initial_temperature: 37.0,
            alpha: 2.0,
            folder: FolderConfig::default(),
        }
    }
}

impl DesignConfig {
    pub fn new(target_structure: &str) -> Self {
        Self {
            target_structure: target_structure.to_string(),
            ..Self::default()
        }
    }

    /// Decode and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: DesignConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn target_length(&self) -> usize {
        self.target_structure.len()
    }

    /// The target sequence, all `N` if none is configured.
    pub fn target_sequence(&self) -> String {
        match &self.target_sequence {
            Some(s) => s.to_ascii_uppercase(),
            None => "N".repeat(self.target_length()),
        }
    }

    pub fn min_length(&self) -> usize {
        self.target_length().saturating_sub(self.length_variation).max(1)
    }

    pub fn max_length(&self) -> usize {
        self.target_length() + self.length_variation
    }

    pub fn preserved_motifs(&self) -> Result<Vec<MotifSpec>, ConfigError> {
        Ok(parse_motif_specs(&self.motifs.join(","))?)
    }

    /// True if the score has terms beyond the structural alignment.
    pub fn has_secondary_targets(&self) -> bool {
        self.target_energy.is_some() || self.target_robustness.is_some()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_structure.is_empty() {
            return Err(ConfigError::Invalid("empty target structure".to_string()));
        }
        PairTable::try_from(self.target_structure.as_str())?;

        let target_sequence = self.target_sequence();
        if target_sequence.len() != self.target_length() || !is_valid_iupac(&target_sequence) {
            return Err(ConfigError::Invalid(format!(
                "target sequence {} does not fit the target structure",
                target_sequence
            )));
        }
        if self.lookahead == 0 {
            return Err(ConfigError::Invalid("lookahead must be at least 1".to_string()));
        }
        if let Some(r) = self.target_robustness {
            if !(0.0..=1.0).contains(&r) {
                return Err(ConfigError::Invalid(format!("target robustness {} not in [0, 1]", r)));
            }
        }
        if self.initial_temperature < 0.0 || self.alpha < 0.0 {
            return Err(ConfigError::Invalid("negative annealing schedule".to_string()));
        }
        if let Some(start) = &self.starting_sequence {
            let fits = (self.min_length()..=self.max_length()).contains(&start.len());
            if !fits || !start.chars().all(|c| "ACGUacgu".contains(c)) {
                return Err(ConfigError::Invalid(format!("unusable starting sequence {}", start)));
            }
        }
        self.preserved_motifs()?;
        Ok(())
    }
}
