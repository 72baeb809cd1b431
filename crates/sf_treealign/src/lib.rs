//! Generic alignment of ordered, rooted trees.
//!
//! Node values are arbitrary; how they are compared, merged and deleted is
//! supplied by an `AlignmentRules` implementation, which also decides
//! whether the alignment maximizes a similarity or minimizes a distance.
//!
//! ```
//! use sf_treealign::{align, AlignmentRules, Objective, Tree};
//!
//! struct Labels;
//!
//! impl AlignmentRules<char> for Labels {
//!     type Detail = ();
//!     fn objective(&self) -> Objective { Objective::Min }
//!     fn compare(&self, s: &char, t: &char) -> Option<(f64, ())> {
//!         (s == t).then_some((0.0, ()))
//!     }
//!     fn merge(&self, s: &char, _t: &char) -> char { *s }
//!     fn delete(&self, _v: &char, _is_target: bool) -> (f64, ()) { (1.0, ()) }
//! }
//!
//! let mut a = Tree::new('r');
//! a.add_child(0, 'x');
//! let b = Tree::new('r');
//! let (aligned, score) = align(&a, &b, &Labels);
//! assert_eq!(score, 1.0);
//! assert_eq!(aligned.count_unmatched(), 1);
//! ```

mod tree;
mod rules;
mod align;

pub use tree::*;
pub use rules::*;
pub use align::*;
