mod error;
mod dotbracket;
mod pair_table;
mod pair_set;
mod iupac;
mod motif;
mod motif_tree;

pub use error::*;
pub use dotbracket::*;
pub use pair_table::*;
pub use pair_set::*;
pub use iupac::*;
pub use motif::*;
pub use motif_tree::*;


/// Nucleic Acid INdeX: we use `u16` (0 to 65k), which is plenty for
/// designed RNA molecules. `P1KEY` must be *twice as large* (in bits) as
/// `NAIDX`, since pairs `(NAIDX, NAIDX)` are compacted into one `P1KEY`.
pub type NAIDX = u16;

/// Pair key. Must be >= 2×`NAIDX` in bit width so we can safely pack two indices.
pub type P1KEY = u32;

/// Compile-time sanity check: 2×NAIDX bits must fit into P1KEY.
const _: () = {
    assert!(2 * NAIDX::BITS <= P1KEY::BITS);
};
