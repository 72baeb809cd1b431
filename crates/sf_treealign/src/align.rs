//! Ordered tree alignment.
//!
//! Dynamic programming over all pairs of source and target nodes, visited
//! in postorder so that every pair of descendants is resolved before its
//! ancestors. A node pair is either matched (their child lists are aligned
//! as forests), or one of the two nodes is dropped and the other one is
//! aligned against a single child of the dropped node.
//!
//! Child lists are aligned with an interval DP. Next to matching and
//! deleting whole subtrees, a forest alignment may drop a single node and
//! let its children absorb a contiguous run of siblings on the other side.
//! Forest tables are memoized per `ForestKey`, which fixes the parents and
//! the first child of both ranges. One table holds the scores of all
//! prefixes, so every range is computed exactly once per `align` call.
//!
//! The traceback recomputes the transitions of each cell and follows the
//! first one that reproduces the stored score.
//!

use std::fmt;
use ahash::AHashMap;
use ndarray::Array2;

use crate::AlignMode;
use crate::AlignmentRules;
use crate::NodeId;
use crate::Objective;
use crate::Tree;
use crate::tree::Node;

/// Node value of an aligned tree: the (merged) value plus the rule detail.
#[derive(Debug, Clone, PartialEq)]
pub struct Aligned<V, R> {
    pub value: V,
    pub detail: R,
}

impl<V: fmt::Display, R> fmt::Display for Aligned<V, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

pub type AlignedTree<V, R> = Tree<Aligned<V, R>>;

/// Align `source` against `target`.
///
/// Returns the aligned tree, where every node is tagged with its
/// `AlignMode`, and the optimal score under `rules`.
///
/// Panics if the traceback cannot reproduce a score, which only happens
/// with non-deterministic or non-additive rules.
pub fn align<V, Rl>(
    source: &Tree<V>,
    target: &Tree<V>,
    rules: &Rl,
) -> (AlignedTree<V, Rl::Detail>, f64)
where
    V: Clone,
    Rl: AlignmentRules<V>,
{
    let mut aligner = TreeAligner::new(source, target, rules);
    aligner.fill();
    let score = aligner.pair_scores[(source.root(), target.root())];
    let aligned = aligner.traceback();
    log::trace!(
        "Aligned {} x {} nodes using {} forest tables, score {}.",
        source.len(),
        target.len(),
        aligner.forests.len(),
        score
    );
    (aligned, score)
}

/// Cost of deleting each node's entire subtree, indexed by `NodeId`.
pub fn subtree_deletion_costs<V, Rl>(tree: &Tree<V>, rules: &Rl, is_target: bool) -> Vec<f64>
where
    Rl: AlignmentRules<V>,
{
    let node_costs = node_deletion_costs(tree, rules, is_target);
    accumulate_subtrees(tree, &node_costs)
}

fn node_deletion_costs<V, Rl>(tree: &Tree<V>, rules: &Rl, is_target: bool) -> Vec<f64>
where
    Rl: AlignmentRules<V>,
{
    (0..tree.len())
        .map(|id| rules.delete(tree.value(id), is_target).0)
        .collect()
}

fn accumulate_subtrees<V>(tree: &Tree<V>, node_costs: &[f64]) -> Vec<f64> {
    let mut costs = vec![0.0; tree.len()];
    for id in tree.postorder() {
        costs[id] = tree
            .children(id)
            .iter()
            .fold(node_costs[id], |acc, &child| acc + costs[child]);
    }
    costs
}

/// Identifies the forest table for the children of `source` starting at
/// `source_start`, against the children of `target` starting at
/// `target_start`. Entry `(p, q)` of that table aligns the first `p`
/// source children with the first `q` target children of the ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ForestKey {
    source: NodeId,
    source_start: usize,
    target: NodeId,
    target_start: usize,
}

impl ForestKey {
    fn children_of(source: NodeId, target: NodeId) -> Self {
        Self {
            source,
            source_start: 0,
            target,
            target_start: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PairStep {
    Match,
    /// Drop the source node; `Some(c)` aligns its child `c` with the
    /// target node, `None` deletes everything on both sides.
    DropSource(Option<NodeId>),
    DropTarget(Option<NodeId>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ForestStep {
    Pair,
    DeleteSource,
    DeleteTarget,
    /// The last source node is dropped, its children absorb the target
    /// run starting at the given (range relative) index.
    AbsorbSource(usize),
    AbsorbTarget(usize),
}

struct TreeAligner<'a, V, Rl: AlignmentRules<V>> {
    source: &'a Tree<V>,
    target: &'a Tree<V>,
    rules: &'a Rl,
    objective: Objective,
    source_node_cost: Vec<f64>,
    target_node_cost: Vec<f64>,
    source_subtree_cost: Vec<f64>,
    target_subtree_cost: Vec<f64>,
    pair_scores: Array2<f64>,
    forests: AHashMap<ForestKey, Array2<f64>>,
}

impl<'a, V: Clone, Rl: AlignmentRules<V>> TreeAligner<'a, V, Rl> {
    fn new(source: &'a Tree<V>, target: &'a Tree<V>, rules: &'a Rl) -> Self {
        let source_node_cost = node_deletion_costs(source, rules, false);
        let target_node_cost = node_deletion_costs(target, rules, true);
        let source_subtree_cost = accumulate_subtrees(source, &source_node_cost);
        let target_subtree_cost = accumulate_subtrees(target, &target_node_cost);
        Self {
            source,
            target,
            rules,
            objective: rules.objective(),
            source_node_cost,
            target_node_cost,
            source_subtree_cost,
            target_subtree_cost,
            pair_scores: Array2::from_elem((source.len(), target.len()), f64::NAN),
            forests: AHashMap::default(),
        }
    }

    fn fill(&mut self) {
        let target_order = self.target.postorder();
        for a in self.source.postorder() {
            for &b in &target_order {
                let candidates = self.pair_candidates(a, b);
                self.pair_scores[(a, b)] = select(self.objective, &candidates).0;
            }
        }
    }

    fn pair_candidates(&mut self, a: NodeId, b: NodeId) -> Vec<(f64, PairStep)> {
        let (source, target) = (self.source, self.target);
        let a_children = source.children(a);
        let b_children = target.children(b);
        let mut candidates = Vec::with_capacity(3 + a_children.len() + b_children.len());

        if let Some((score, _)) = self.rules.compare(source.value(a), target.value(b)) {
            let key = ForestKey::children_of(a, b);
            let children = self.forest_score(key, a_children.len(), b_children.len());
            candidates.push((score + children, PairStep::Match));
        }

        let a_rest: f64 = a_children.iter().map(|&c| self.source_subtree_cost[c]).sum();
        candidates.push((
            self.source_node_cost[a] + a_rest + self.target_subtree_cost[b],
            PairStep::DropSource(None),
        ));
        for &c in a_children {
            let siblings: f64 = a_children
                .iter()
                .filter(|&&o| o != c)
                .map(|&o| self.source_subtree_cost[o])
                .sum();
            candidates.push((
                self.source_node_cost[a] + siblings + self.pair_scores[(c, b)],
                PairStep::DropSource(Some(c)),
            ));
        }

        let b_rest: f64 = b_children.iter().map(|&d| self.target_subtree_cost[d]).sum();
        candidates.push((
            self.target_node_cost[b] + b_rest + self.source_subtree_cost[a],
            PairStep::DropTarget(None),
        ));
        for &d in b_children {
            let siblings: f64 = b_children
                .iter()
                .filter(|&&o| o != d)
                .map(|&o| self.target_subtree_cost[o])
                .sum();
            candidates.push((
                self.target_node_cost[b] + siblings + self.pair_scores[(a, d)],
                PairStep::DropTarget(Some(d)),
            ));
        }
        candidates
    }

    fn forest_children(&self, key: ForestKey) -> (&'a [NodeId], &'a [NodeId]) {
        let (source, target) = (self.source, self.target);
        (
            &source.children(key.source)[key.source_start..],
            &target.children(key.target)[key.target_start..],
        )
    }

    fn forest_score(&mut self, key: ForestKey, p: usize, q: usize) -> f64 {
        if !self.forests.contains_key(&key) {
            let table = self.forest_table(key);
            self.forests.insert(key, table);
        }
        self.forests[&key][(p, q)]
    }

    fn forest_table(&mut self, key: ForestKey) -> Array2<f64> {
        let (sources, targets) = self.forest_children(key);
        let (n, m) = (sources.len(), targets.len());
        let mut table = Array2::from_elem((n + 1, m + 1), 0.0);
        for p in 0..=n {
            for q in 0..=m {
                if p == 0 && q == 0 {
                    continue;
                }
                let candidates = self.forest_candidates(key, &table, p, q);
                table[(p, q)] = select(self.objective, &candidates).0;
            }
        }
        table
    }

    fn forest_candidates(
        &mut self,
        key: ForestKey,
        table: &Array2<f64>,
        p: usize,
        q: usize,
    ) -> Vec<(f64, ForestStep)> {
        let (source, target) = (self.source, self.target);
        let (sources, targets) = self.forest_children(key);
        let mut candidates = Vec::new();

        if p > 0 && q > 0 {
            let (x, y) = (sources[p - 1], targets[q - 1]);
            let score = table[(p - 1, q - 1)] + self.pair_scores[(x, y)];
            candidates.push((score, ForestStep::Pair));
        }
        if p > 0 {
            let x = sources[p - 1];
            let score = table[(p - 1, q)] + self.source_subtree_cost[x];
            candidates.push((score, ForestStep::DeleteSource));
        }
        if q > 0 {
            let y = targets[q - 1];
            let score = table[(p, q - 1)] + self.target_subtree_cost[y];
            candidates.push((score, ForestStep::DeleteTarget));
        }
        if p > 0 && q > 0 {
            let (x, y) = (sources[p - 1], targets[q - 1]);
            if !source.is_leaf(x) {
                let degree = source.children(x).len();
                for r in 0..q {
                    let run = ForestKey {
                        source: x,
                        source_start: 0,
                        target: key.target,
                        target_start: key.target_start + r,
                    };
                    let absorbed = self.forest_score(run, degree, q - r);
                    candidates.push((
                        table[(p - 1, r)] + self.source_node_cost[x] + absorbed,
                        ForestStep::AbsorbSource(r),
                    ));
                }
            }
            if !target.is_leaf(y) {
                let degree = target.children(y).len();
                for r in 0..p {
                    let run = ForestKey {
                        source: key.source,
                        source_start: key.source_start + r,
                        target: y,
                        target_start: 0,
                    };
                    let absorbed = self.forest_score(run, p - r, degree);
                    candidates.push((
                        table[(r, q - 1)] + self.target_node_cost[y] + absorbed,
                        ForestStep::AbsorbTarget(r),
                    ));
                }
            }
        }
        candidates
    }

    fn traceback(&mut self) -> AlignedTree<V, Rl::Detail> {
        let mut nodes = Vec::with_capacity(self.source.len() + self.target.len());
        self.emit_pair(self.source.root(), self.target.root(), &mut nodes);
        Tree::from_nodes(nodes)
    }

    fn emit_pair(
        &mut self,
        a: NodeId,
        b: NodeId,
        nodes: &mut Vec<Node<Aligned<V, Rl::Detail>>>,
    ) -> NodeId {
        let (source, target) = (self.source, self.target);
        let expected = self.pair_scores[(a, b)];
        let candidates = self.pair_candidates(a, b);
        let step = reproduce(&candidates, expected, || format!("node pair ({a}, {b})"));

        let (va, vb) = (source.value(a), target.value(b));
        match step {
            PairStep::Match => {
                let Some((_, detail)) = self.rules.compare(va, vb) else {
                    panic!("tree alignment inconsistency: compare of node pair ({a}, {b}) changed");
                };
                let value = self.rules.merge(va, vb);
                let id = push(nodes, Aligned { value, detail }, AlignMode::Matched);
                let key = ForestKey::children_of(a, b);
                let (m, n) = (source.children(a).len(), target.children(b).len());
                let children = self.emit_forest(key, m, n, nodes);
                nodes[id].children = children;
                id
            }
            PairStep::DropSource(via) => {
                let detail = self.rules.delete(va, false).1;
                let value = va.clone();
                let id = push(nodes, Aligned { value, detail }, AlignMode::SourceOnly);
                let mut children = Vec::with_capacity(source.children(a).len() + 1);
                for &c in source.children(a) {
                    if via == Some(c) {
                        children.push(self.emit_pair(c, b, nodes));
                    } else {
                        children.push(self.emit_deleted(source, c, false, nodes));
                    }
                }
                if via.is_none() {
                    children.push(self.emit_deleted(target, b, true, nodes));
                }
                nodes[id].children = children;
                id
            }
            PairStep::DropTarget(via) => {
                let detail = self.rules.delete(vb, true).1;
                let value = vb.clone();
                let id = push(nodes, Aligned { value, detail }, AlignMode::TargetOnly);
                let mut children = Vec::with_capacity(target.children(b).len() + 1);
                for &d in target.children(b) {
                    if via == Some(d) {
                        children.push(self.emit_pair(a, d, nodes));
                    } else {
                        children.push(self.emit_deleted(target, d, true, nodes));
                    }
                }
                if via.is_none() {
                    children.push(self.emit_deleted(source, a, false, nodes));
                }
                nodes[id].children = children;
                id
            }
        }
    }

    fn emit_forest(
        &mut self,
        key: ForestKey,
        p: usize,
        q: usize,
        nodes: &mut Vec<Node<Aligned<V, Rl::Detail>>>,
    ) -> Vec<NodeId> {
        let (source, target) = (self.source, self.target);
        let (sources, targets) = self.forest_children(key);
        self.forest_score(key, p, q);
        let table = self.forests[&key].clone();

        let mut emitted = Vec::with_capacity(p + q);
        let (mut p, mut q) = (p, q);
        while p > 0 || q > 0 {
            let candidates = self.forest_candidates(key, &table, p, q);
            let step = reproduce(&candidates, table[(p, q)], || {
                format!("forest {key:?} cell ({p}, {q})")
            });
            match step {
                ForestStep::Pair => {
                    emitted.push(self.emit_pair(sources[p - 1], targets[q - 1], nodes));
                    p -= 1;
                    q -= 1;
                }
                ForestStep::DeleteSource => {
                    emitted.push(self.emit_deleted(source, sources[p - 1], false, nodes));
                    p -= 1;
                }
                ForestStep::DeleteTarget => {
                    emitted.push(self.emit_deleted(target, targets[q - 1], true, nodes));
                    q -= 1;
                }
                ForestStep::AbsorbSource(r) => {
                    let x = sources[p - 1];
                    let flat = table[(p - 1, r)]
                        + self.source_subtree_cost[x]
                        + targets[r..q].iter().map(|&y| self.target_subtree_cost[y]).sum::<f64>();
                    self.check_absorption(flat, table[(p, q)], key);

                    let detail = self.rules.delete(source.value(x), false).1;
                    let value = source.value(x).clone();
                    let id = push(nodes, Aligned { value, detail }, AlignMode::SourceOnly);
                    let run = ForestKey {
                        source: x,
                        source_start: 0,
                        target: key.target,
                        target_start: key.target_start + r,
                    };
                    let children = self.emit_forest(run, source.children(x).len(), q - r, nodes);
                    nodes[id].children = children;
                    emitted.push(id);
                    p -= 1;
                    q = r;
                }
                ForestStep::AbsorbTarget(r) => {
                    let y = targets[q - 1];
                    let flat = table[(r, q - 1)]
                        + self.target_subtree_cost[y]
                        + sources[r..p].iter().map(|&x| self.source_subtree_cost[x]).sum::<f64>();
                    self.check_absorption(flat, table[(p, q)], key);

                    let detail = self.rules.delete(target.value(y), true).1;
                    let value = target.value(y).clone();
                    let id = push(nodes, Aligned { value, detail }, AlignMode::TargetOnly);
                    let run = ForestKey {
                        source: key.source,
                        source_start: key.source_start + r,
                        target: y,
                        target_start: 0,
                    };
                    let children = self.emit_forest(run, p - r, target.children(y).len(), nodes);
                    nodes[id].children = children;
                    emitted.push(id);
                    q -= 1;
                    p = r;
                }
            }
        }
        emitted.reverse();
        emitted
    }

    /// An absorption is only ever selected if it is at least as good as
    /// deleting the same ranges outright.
    fn check_absorption(&self, flat: f64, chosen: f64, key: ForestKey) {
        let tolerance = 1e-9 * flat.abs().max(chosen.abs()).max(1.0);
        let worse = match self.objective {
            Objective::Max => chosen < flat - tolerance,
            Objective::Min => chosen > flat + tolerance,
        };
        assert!(
            !worse,
            "tree alignment inconsistency: absorption in {key:?} scores {chosen}, \
             flat deletion {flat}"
        );
    }

    fn emit_deleted(
        &self,
        tree: &Tree<V>,
        id: NodeId,
        is_target: bool,
        nodes: &mut Vec<Node<Aligned<V, Rl::Detail>>>,
    ) -> NodeId {
        let mode = if is_target { AlignMode::TargetOnly } else { AlignMode::SourceOnly };
        let detail = self.rules.delete(tree.value(id), is_target).1;
        let value = tree.value(id).clone();
        let out = push(nodes, Aligned { value, detail }, mode);
        let children = tree
            .children(id)
            .iter()
            .map(|&child| self.emit_deleted(tree, child, is_target, nodes))
            .collect();
        nodes[out].children = children;
        out
    }
}

fn push<T>(nodes: &mut Vec<Node<T>>, value: T, mode: AlignMode) -> NodeId {
    nodes.push(Node::new(value, Some(mode)));
    nodes.len() - 1
}

/// The first candidate with the optimal score.
fn select<S: Copy>(objective: Objective, candidates: &[(f64, S)]) -> (f64, S) {
    let mut best = candidates[0];
    for &candidate in &candidates[1..] {
        if objective.better(candidate.0, best.0) {
            best = candidate;
        }
    }
    best
}

fn reproduce<S: Copy>(candidates: &[(f64, S)], expected: f64, cell: impl FnOnce() -> String) -> S {
    match candidates.iter().find(|(score, _)| *score == expected) {
        Some(&(_, step)) => step,
        None => panic!(
            "tree alignment inconsistency at {}: no transition reproduces score {}",
            cell(),
            expected
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Integer labels, equal labels match.
    struct LabelRules {
        objective: Objective,
        matched: f64,
        source_delete: f64,
        target_delete: f64,
    }

    impl LabelRules {
        fn similarity() -> Self {
            Self {
                objective: Objective::Max,
                matched: 10.0,
                source_delete: -1.0,
                target_delete: -2.0,
            }
        }

        fn distance() -> Self {
            Self {
                objective: Objective::Min,
                matched: 0.0,
                source_delete: 1.0,
                target_delete: 1.0,
            }
        }
    }

    impl AlignmentRules<u32> for LabelRules {
        type Detail = ();

        fn objective(&self) -> Objective {
            self.objective
        }

        fn compare(&self, source: &u32, target: &u32) -> Option<(f64, ())> {
            (source == target).then_some((self.matched, ()))
        }

        fn merge(&self, source: &u32, _target: &u32) -> u32 {
            *source
        }

        fn delete(&self, _value: &u32, is_target: bool) -> (f64, ()) {
            (if is_target { self.target_delete } else { self.source_delete }, ())
        }
    }

    /// Label 0 is a placeholder that never matches and costs nothing.
    struct PlaceholderRules;

    impl AlignmentRules<u32> for PlaceholderRules {
        type Detail = ();

        fn objective(&self) -> Objective {
            Objective::Min
        }

        fn compare(&self, source: &u32, target: &u32) -> Option<(f64, ())> {
            (*source != 0 && *target != 0 && source == target).then_some((0.0, ()))
        }

        fn merge(&self, source: &u32, _target: &u32) -> u32 {
            *source
        }

        fn delete(&self, value: &u32, _is_target: bool) -> (f64, ()) {
            (*value as f64, ())
        }
    }

    /// Returns a different match score every time it is asked.
    struct DriftingRules {
        calls: Cell<u32>,
    }

    impl AlignmentRules<u32> for DriftingRules {
        type Detail = ();

        fn objective(&self) -> Objective {
            Objective::Max
        }

        fn compare(&self, _source: &u32, _target: &u32) -> Option<(f64, ())> {
            self.calls.set(self.calls.get() + 1);
            Some((self.calls.get() as f64, ()))
        }

        fn merge(&self, source: &u32, _target: &u32) -> u32 {
            *source
        }

        fn delete(&self, _value: &u32, _is_target: bool) -> (f64, ()) {
            (-1.0, ())
        }
    }

    /// Build a tree from (parent_index, label) pairs, root label first.
    fn tree(root: u32, edges: &[(NodeId, u32)]) -> Tree<u32> {
        let mut t = Tree::new(root);
        for &(parent, label) in edges {
            t.add_child(parent, label);
        }
        t
    }

    #[test]
    fn test_self_alignment_matches_everything() {
        // 1 [2 [3, 4], 5]
        let t = tree(1, &[(0, 2), (1, 3), (1, 4), (0, 5)]);
        let (aligned, score) = align(&t, &t, &LabelRules::similarity());
        assert_eq!(score, 50.0);
        assert_eq!(aligned.len(), 5);
        assert_eq!(aligned.count_unmatched(), 0);
        assert!(aligned.preorder().iter().all(|&id| aligned.mode(id) == Some(AlignMode::Matched)));
        assert_eq!(format!("{}", aligned), "1:M [2:M [3:M, 4:M], 5:M]");
    }

    #[test]
    fn test_single_nodes_without_match() {
        let (aligned, score) = align(&Tree::new(1), &Tree::new(2), &LabelRules::similarity());
        assert_eq!(score, -3.0);
        assert_eq!(aligned.len(), 2);
        assert_eq!(aligned.count_unmatched(), 2);
    }

    #[test]
    fn test_symmetric_rules_give_symmetric_scores() {
        let a = tree(1, &[(0, 2), (1, 3), (0, 4), (0, 5), (3, 6)]);
        let b = tree(1, &[(0, 4), (1, 6), (0, 2), (0, 7)]);
        let rules = LabelRules::distance();
        let (_, ab) = align(&a, &b, &rules);
        let (_, ba) = align(&b, &a, &rules);
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_alignment_against_placeholder() {
        let t = tree(3, &[(0, 1), (0, 4), (2, 2), (2, 5)]);
        let costs = subtree_deletion_costs(&t, &PlaceholderRules, false);
        assert_eq!(costs[t.root()], 15.0);
        let (aligned, score) = align(&t, &Tree::new(0), &PlaceholderRules);
        assert_eq!(score, costs[t.root()]);
        assert_eq!(aligned.count_unmatched(), t.len() + 1);
    }

    #[test]
    fn test_absorption_of_sibling_run() {
        // source 1 [9 [2, 3]], target 1 [2, 3]
        let source = tree(1, &[(0, 9), (1, 2), (1, 3)]);
        let target = tree(1, &[(0, 2), (0, 3)]);
        let (aligned, score) = align(&source, &target, &LabelRules::distance());
        assert_eq!(score, 1.0);
        assert_eq!(aligned.count_unmatched(), 1);

        let root = aligned.root();
        assert_eq!(aligned.mode(root), Some(AlignMode::Matched));
        let inserted = aligned.children(root);
        assert_eq!(inserted.len(), 1);
        assert_eq!(aligned.value(inserted[0]).value, 9);
        assert_eq!(aligned.mode(inserted[0]), Some(AlignMode::SourceOnly));
        let absorbed: Vec<u32> = aligned
            .children(inserted[0])
            .iter()
            .map(|&id| aligned.value(id).value)
            .collect();
        assert_eq!(absorbed, vec![2, 3]);
    }

    #[test]
    fn test_absorption_on_target_side() {
        let source = tree(1, &[(0, 2), (0, 3)]);
        let target = tree(1, &[(0, 9), (1, 2), (1, 3)]);
        let (aligned, score) = align(&source, &target, &LabelRules::distance());
        assert_eq!(score, 1.0);
        let inserted = aligned.children(aligned.root())[0];
        assert_eq!(aligned.mode(inserted), Some(AlignMode::TargetOnly));
        assert_eq!(aligned.children(inserted).len(), 2);
    }

    #[test]
    fn test_no_crossing_matches() {
        let source = tree(1, &[(0, 2), (0, 3)]);
        let target = tree(1, &[(0, 3), (0, 2)]);
        let (aligned, score) = align(&source, &target, &LabelRules::distance());
        assert_eq!(score, 2.0);
        assert_eq!(aligned.count_unmatched(), 2);
        assert_eq!(aligned.len(), 4);
    }

    #[test]
    fn test_dropped_root_keeps_best_child() {
        // source 7 [1 [2]], target 1 [2]: the source root is dropped.
        let source = tree(7, &[(0, 1), (1, 2)]);
        let target = tree(1, &[(0, 2)]);
        let (aligned, score) = align(&source, &target, &LabelRules::distance());
        assert_eq!(score, 1.0);
        assert_eq!(aligned.mode(aligned.root()), Some(AlignMode::SourceOnly));
        assert_eq!(format!("{}", aligned), "7:S [1:M [2:M]]");
    }

    #[test]
    fn test_alignment_is_deterministic() {
        let a = tree(1, &[(0, 2), (0, 2), (0, 3), (1, 4), (2, 4)]);
        let b = tree(1, &[(0, 2), (0, 3), (1, 4), (0, 2)]);
        let rules = LabelRules::distance();
        let first = align(&a, &b, &rules);
        let second = align(&a, &b, &rules);
        assert_eq!(first, second);
    }

    #[test]
    #[should_panic(expected = "tree alignment inconsistency")]
    fn test_inconsistent_rules_panic() {
        let rules = DriftingRules { calls: Cell::new(0) };
        let _ = align(&Tree::new(1), &Tree::new(1), &rules);
    }
}
