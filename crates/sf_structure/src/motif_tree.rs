//! Hierarchical decomposition of a secondary structure into motifs.
//!
//! Every helix (a maximal stack of consecutive base pairs) becomes a Stem.
//! The loop closed by the innermost pair of a helix is the single child of
//! that Stem, and helices branching off the loop are children of the loop
//! node in 5' to 3' order. Unpaired bases outside of all helices form the
//! External node. The tree is rooted in a synthetic Root node:
//!
//! ```text
//!   ..((((...))..((...)))).      R
//!                                └─ E3
//!                                   └─ S2
//!                                      └─ M2
//!                                         ├─ S2 ── H3
//!                                         └─ S2 ── H3
//! ```
//!

use std::fmt;
use std::ops::Range;
use sf_treealign::NodeId;
use sf_treealign::Tree;

use crate::iupac_bases;
use crate::DotBracketVec;
use crate::Motif;
use crate::MotifKind;
use crate::MotifSpec;
use crate::PairTable;
use crate::StructureError;

#[derive(Debug, Clone, PartialEq)]
pub struct MotifTree {
    tree: Tree<Motif>,
    length: usize,
}

impl MotifTree {
    /// Decompose `structure` into motifs, annotated with `sequence`.
    ///
    /// The sequence may use IUPAC codes (case-insensitive) and must have
    /// the same length as the structure.
    pub fn build(structure: &str, sequence: &str) -> Result<Self, StructureError> {
        let db = DotBracketVec::try_from(structure)?;
        if db.len() != sequence.chars().count() {
            return Err(StructureError::LengthMismatch {
                structure: db.len(),
                sequence: sequence.chars().count(),
            });
        }
        let invalid = sequence.chars().enumerate().find(|&(_, c)| iupac_bases(c).is_none());
        if let Some((i, c)) = invalid {
            return Err(StructureError::InvalidNucleotide(c, i));
        }
        let pt = PairTable::try_from(&db)?;

        let mut builder = Builder {
            pt: &pt,
            seq: sequence.as_bytes(),
            tree: Tree::new(Motif::root()),
        };
        builder.exterior();
        log::trace!("Built motif tree with {} nodes for {}.", builder.tree.len(), structure);

        Ok(MotifTree {
            tree: builder.tree,
            length: db.len(),
        })
    }

    pub fn tree(&self) -> &Tree<Motif> {
        &self.tree
    }

    /// Length of the underlying sequence.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Number of motifs, including the root.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Always false, the root exists even for an empty structure.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Count the motifs of a given kind.
    pub fn count(&self, kind: MotifKind) -> usize {
        self.motifs().filter(|m| m.kind == kind).count()
    }

    /// Motifs in preorder, starting with the root.
    pub fn motifs(&self) -> impl Iterator<Item = &Motif> + '_ {
        self.tree.preorder().into_iter().map(|id| self.tree.value(id))
    }

    /// All motifs except the root as `<index><kind><size>` references.
    pub fn motif_specs(&self) -> Vec<MotifSpec> {
        self.motifs()
            .enumerate()
            .skip(1)
            .map(|(index, m)| MotifSpec {
                index,
                kind: m.kind,
                size: m.size,
            })
            .collect()
    }

    /// Mark the motif referenced by `spec` as preserved.
    ///
    /// Fails if there is no motif with that preorder index, or if kind or
    /// size do not agree.
    pub fn preserve(&mut self, spec: &MotifSpec) -> Result<(), StructureError> {
        let id = self
            .tree
            .preorder()
            .get(spec.index)
            .copied()
            .filter(|&id| spec.index > 0 && {
                let m = self.tree.value(id);
                m.kind == spec.kind && m.size == spec.size
            })
            .ok_or_else(|| StructureError::InvalidMotif(spec.to_string()))?;
        self.tree.value_mut(id).preserved = true;
        Ok(())
    }

    /// Shapiro notation, e.g. `(((H3)S3)R)` for `(((...)))`.
    pub fn shapiro(&self) -> String {
        let mut out = String::new();
        self.shapiro_node(self.tree.root(), &mut out);
        out
    }

    fn shapiro_node(&self, id: NodeId, out: &mut String) {
        out.push('(');
        for &child in self.tree.children(id) {
            self.shapiro_node(child, out);
        }
        out.push_str(&self.tree.value(id).to_string());
        out.push(')');
    }

    /// Walk the tree in order, emitting the runs of each node interleaved
    /// with its children by sequence position. Reproduces the sequence.
    pub fn in_order(&self) -> String {
        let mut out = String::with_capacity(self.length);
        self.in_order_node(self.tree.root(), &mut out);
        out
    }

    fn in_order_node(&self, id: NodeId, out: &mut String) {
        enum Item<'t> {
            Run(&'t str),
            Child(NodeId),
        }
        let motif = self.tree.value(id);
        let mut items: Vec<(usize, Item)> = motif
            .run_strings()
            .into_iter()
            .map(|(run, text)| (run.start, Item::Run(text)))
            .collect();
        items.extend(
            self.tree
                .children(id)
                .iter()
                .map(|&child| (self.first_position(child), Item::Child(child))),
        );
        items.sort_by_key(|(start, _)| *start);
        for (_, item) in items {
            match item {
                Item::Run(text) => out.push_str(text),
                Item::Child(child) => self.in_order_node(child, out),
            }
        }
    }

    /// Smallest position owned within the subtree of `id`.
    fn first_position(&self, id: NodeId) -> usize {
        let own = self.tree.value(id).positions.first().copied();
        self.tree
            .children(id)
            .iter()
            .map(|&child| self.first_position(child))
            .chain(own)
            .min()
            .unwrap_or(usize::MAX)
    }
}

impl fmt::Display for MotifTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tree)
    }
}

struct Builder<'b> {
    pt: &'b PairTable,
    seq: &'b [u8],
    tree: Tree<Motif>,
}

impl Builder<'_> {
    fn exterior(&mut self) {
        let (helices, unpaired) = self.scan(0..self.pt.len());
        let parent = if unpaired.is_empty() {
            self.tree.root()
        } else {
            let size = unpaired.len();
            let motif = Motif::new(MotifKind::External, size, unpaired, self.seq);
            self.tree.add_child(self.tree.root(), motif)
        };
        for (i, j) in helices {
            self.helix(parent, i, j);
        }
    }

    /// Split a region into the helices starting in it and its unpaired
    /// positions.
    fn scan(&self, region: Range<usize>) -> (Vec<(usize, usize)>, Vec<usize>) {
        let mut helices = Vec::new();
        let mut unpaired = Vec::new();
        let mut r = region.start;
        while r < region.end {
            match self.pt.partner(r) {
                Some(s) => {
                    debug_assert!(s > r && s < region.end);
                    helices.push((r, s));
                    r = s + 1;
                }
                None => {
                    unpaired.push(r);
                    r += 1;
                }
            }
        }
        (helices, unpaired)
    }

    /// Add the helix starting with pair (i, j) and everything it encloses.
    fn helix(&mut self, parent: NodeId, i: usize, j: usize) {
        let mut stacked = 1;
        while i + stacked < j - stacked && self.pt.partner(i + stacked) == Some(j - stacked) {
            stacked += 1;
        }
        let (p, q) = (i + stacked - 1, j + 1 - stacked);
        let positions = (i..=p).chain(q..=j).collect();
        let motif = Motif::new(MotifKind::Stem, stacked, positions, self.seq);
        let stem = self.tree.add_child(parent, motif);

        let (branches, unpaired) = self.scan(p + 1..q);
        let kind = match branches.as_slice() {
            [] => MotifKind::Hairpin,
            [(k, l)] if (*k == p + 1) != (*l == q - 1) => MotifKind::Bulge,
            [_] => MotifKind::Internal,
            _ => MotifKind::Multiloop,
        };
        let size = unpaired.len();
        let node = self.tree.add_child(stem, Motif::new(kind, size, unpaired, self.seq));
        for (k, l) in branches {
            self.helix(node, k, l);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(mt: &MotifTree) -> String {
        mt.motifs().map(|m| m.kind.symbol()).collect()
    }

    #[test]
    fn test_hairpin() {
        let mt = MotifTree::build("(((...)))", "GGGAAACCC").unwrap();
        assert_eq!(mt.count(MotifKind::Hairpin), 1);
        assert_eq!(kinds(&mt), "RSH");
        assert_eq!(mt.shapiro(), "(((H3)S3)R)");
        let hairpin = mt.motifs().find(|m| m.kind == MotifKind::Hairpin).unwrap();
        assert_eq!(hairpin.size, 3);
        assert_eq!(hairpin.positions, vec![3, 4, 5]);
        assert_eq!(hairpin.substring, "AAA");
        let stem = mt.motifs().nth(1).unwrap();
        assert_eq!(stem.substring, "GGG.CCC");
    }

    #[test]
    fn test_length_mismatch() {
        assert_eq!(
            MotifTree::build("(((...)))", "AGCAAAUGCU"),
            Err(StructureError::LengthMismatch {
                structure: 9,
                sequence: 10
            })
        );
    }

    #[test]
    fn test_invalid_input() {
        assert_eq!(
            MotifTree::build("((.))", "GGXCC"),
            Err(StructureError::InvalidNucleotide('X', 2))
        );
        assert_eq!(MotifTree::build("((.)", "GGAC"), Err(StructureError::UnmatchedOpen(0)));
        assert_eq!(MotifTree::build("(.-)", "GGAC"), Err(StructureError::InvalidChar('-', 2)));
    }

    #[test]
    fn test_empty_and_unpaired() {
        let empty = MotifTree::build("", "").unwrap();
        assert_eq!(empty.len(), 1);
        assert_eq!(empty.shapiro(), "(R)");
        assert!(empty.motif_specs().is_empty());

        let open = MotifTree::build(".....", "ACGUN").unwrap();
        assert_eq!(kinds(&open), "RE");
        assert_eq!(open.shapiro(), "((E5)R)");
        assert_eq!(open.in_order(), "ACGUN");
    }

    #[test]
    fn test_loop_classification() {
        let bulge = MotifTree::build("((.((...))))", "NNNNNNNNNNNN").unwrap();
        assert_eq!(kinds(&bulge), "RSBSH");
        assert_eq!(bulge.shapiro(), "(((((H3)S2)B1)S2)R)");

        let internal = MotifTree::build("((.((...)).))", "NNNNNNNNNNNNN").unwrap();
        assert_eq!(kinds(&internal), "RSISH");
        let il = internal.motifs().nth(2).unwrap();
        assert_eq!(il.size, 2);
        assert_eq!(il.positions, vec![2, 10]);

        let multi = MotifTree::build("((((...))((...))))", "NNNNNNNNNNNNNNNNNN").unwrap();
        assert_eq!(kinds(&multi), "RSMSHSH");
        assert_eq!(multi.count(MotifKind::Stem), 3);
        assert_eq!(multi.motifs().nth(2).unwrap().size, 0);
        assert_eq!(multi.shapiro(), "(((((H3)S2)((H3)S2)M)S2)R)");
        let specs: Vec<String> = multi.motif_specs().iter().map(|s| s.to_string()).collect();
        assert_eq!(specs[1], "2M0");
    }

    #[test]
    fn test_external_with_helices() {
        let seq = "AACGGGUUAGCCCAUGAUCCGGA";
        let mt = MotifTree::build("..((((...))..((...)))).", seq).unwrap();
        assert_eq!(kinds(&mt), "RESMSHSH");
        assert_eq!(mt.shapiro(), "((((((H3)S2)((H3)S2)M2)S2)E3)R)");
        assert_eq!(mt.in_order(), seq);
        let specs: Vec<String> = mt.motif_specs().iter().map(|s| s.to_string()).collect();
        assert_eq!(specs, vec!["1E3", "2S2", "3M2", "4S2", "5H3", "6S2", "7H3"]);
    }

    #[test]
    fn test_top_level_stems_without_external() {
        let mt = MotifTree::build("(..)(..)", "GAACGAAC").unwrap();
        assert_eq!(kinds(&mt), "RSHSH");
        assert_eq!(mt.tree().children(mt.tree().root()).len(), 2);
        assert_eq!(mt.in_order(), "GAACGAAC");
    }

    #[test]
    fn test_in_order_reproduces_sequence() {
        let cases = [
            ("((.((...)).))..((...))", "GCAGCUUUGCAGCAAGGAAACC"),
            ("((((...))((...))))", "GGGCAAAGCGCAAAGCCC"),
            ("(())", "GGCC"),
        ];
        for (structure, sequence) in cases {
            let mt = MotifTree::build(structure, sequence).unwrap();
            assert_eq!(mt.in_order(), sequence, "{structure}");
        }
    }

    #[test]
    fn test_lowercase_sequence() {
        let mt = MotifTree::build("(.)", "gac").unwrap();
        assert_eq!(mt.in_order(), "gac");
        let mt = MotifTree::build("((..))", "ggaacc").unwrap();
        assert_eq!(mt.in_order(), "ggaacc");
        assert_eq!(mt.motifs().nth(1).unwrap().substring, "gg.cc");
    }

    #[test]
    fn test_preserve() {
        let mut mt = MotifTree::build("((((...))((...))))", "NNNNNNNNNNNNNNNNNN").unwrap();
        mt.preserve(&"4H3".parse().unwrap()).unwrap();
        assert!(mt.motifs().nth(4).unwrap().preserved);
        assert_eq!(mt.motifs().filter(|m| m.preserved).count(), 1);
        assert!(mt.preserve(&"4H4".parse().unwrap()).is_err());
        assert!(mt.preserve(&"4S3".parse().unwrap()).is_err());
        assert!(mt.preserve(&"40H3".parse().unwrap()).is_err());
        assert!(mt.preserve(&"0R0".parse().unwrap()).is_err());
    }
}
