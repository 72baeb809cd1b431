//! The sf_design crate.
//!
//! Designs RNA sequences that fold into a target secondary structure:
//!  - motif alignment rules (structure and IUPAC sequence costs).
//!  - single-neighbor sequence mutations.
//!  - a simulated-annealing search driven by an external folder.
//!  - independent parallel design runs.
//!

mod error;
mod rules;
mod mutation;
mod folder;
mod config;
mod cancel;
mod anneal;
mod result;
mod parallel;

pub use error::*;
pub use rules::*;
pub use mutation::*;
pub use folder::*;
pub use config::*;
pub use cancel::*;
pub use anneal::*;
pub use result::*;
pub use parallel::*;
