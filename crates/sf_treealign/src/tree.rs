//! Arena-backed ordered trees.
//!
//! Nodes live in a flat vector and refer to their children by index, the
//! root is always node `0`. Child order is meaningful: alignments never
//! cross siblings.
//!

use std::fmt;

/// Index of a node within its `Tree`.
pub type NodeId = usize;

/// How a node of an aligned tree came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlignMode {
    /// Source and target node were matched and merged.
    Matched,
    /// The node exists only in the source tree.
    SourceOnly,
    /// The node exists only in the target tree.
    TargetOnly,
}

impl AlignMode {
    pub fn symbol(&self) -> char {
        match self {
            AlignMode::Matched => 'M',
            AlignMode::SourceOnly => 'S',
            AlignMode::TargetOnly => 'T',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Node<V> {
    pub(crate) value: V,
    pub(crate) children: Vec<NodeId>,
    pub(crate) mode: Option<AlignMode>,
}

impl<V> Node<V> {
    pub(crate) fn new(value: V, mode: Option<AlignMode>) -> Self {
        Self {
            value,
            children: Vec::new(),
            mode,
        }
    }
}

/// An ordered rooted tree. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree<V> {
    nodes: Vec<Node<V>>,
}

impl<V> Tree<V> {
    /// Create a tree consisting of a single root node.
    pub fn new(root: V) -> Self {
        Self {
            nodes: vec![Node::new(root, None)],
        }
    }

    /// Only the aligner builds trees node by node; node 0 must be the root.
    pub(crate) fn from_nodes(nodes: Vec<Node<V>>) -> Self {
        debug_assert!(!nodes.is_empty());
        Self { nodes }
    }

    /// Append `value` as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, value: V) -> NodeId {
        assert!(parent < self.nodes.len(), "unknown parent node {parent}");
        let id = self.nodes.len();
        self.nodes.push(Node::new(value, None));
        self.nodes[parent].children.push(id);
        id
    }

    pub fn root(&self) -> NodeId {
        0
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false, a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn value(&self, id: NodeId) -> &V {
        &self.nodes[id].value
    }

    pub fn value_mut(&mut self, id: NodeId) -> &mut V {
        &mut self.nodes[id].value
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id].children.is_empty()
    }

    /// The alignment tag of a node, `None` for trees that were not
    /// produced by the aligner.
    pub fn mode(&self, id: NodeId) -> Option<AlignMode> {
        self.nodes[id].mode
    }

    /// Node ids in preorder (parents before children, siblings 5' to 3').
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        order
    }

    /// Node ids in postorder (children before parents).
    pub fn postorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(self.root(), false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            stack.push((id, true));
            for &child in self.children(id).iter().rev() {
                stack.push((child, false));
            }
        }
        order
    }

    /// Number of nodes that are tagged as source-only or target-only,
    /// i.e. the edit distance of an aligned tree.
    pub fn count_unmatched(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n.mode, Some(AlignMode::SourceOnly | AlignMode::TargetOnly)))
            .count()
    }

    fn fmt_node(&self, id: NodeId, f: &mut fmt::Formatter<'_>) -> fmt::Result
    where
        V: fmt::Display,
    {
        write!(f, "{}", self.value(id))?;
        if let Some(mode) = self.mode(id) {
            write!(f, ":{}", mode.symbol())?;
        }
        let children = self.children(id);
        if !children.is_empty() {
            write!(f, " [")?;
            for (k, &child) in children.iter().enumerate() {
                if k > 0 {
                    write!(f, ", ")?;
                }
                self.fmt_node(child, f)?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

impl<V: fmt::Display> fmt::Display for Tree<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(self.root(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1 [2 [3, 4], 5]
    fn small() -> Tree<u32> {
        let mut t = Tree::new(1);
        let two = t.add_child(0, 2);
        t.add_child(two, 3);
        t.add_child(two, 4);
        t.add_child(0, 5);
        t
    }

    #[test]
    fn test_orders() {
        let t = small();
        let pre: Vec<u32> = t.preorder().into_iter().map(|i| *t.value(i)).collect();
        let post: Vec<u32> = t.postorder().into_iter().map(|i| *t.value(i)).collect();
        assert_eq!(pre, vec![1, 2, 3, 4, 5]);
        assert_eq!(post, vec![3, 4, 2, 5, 1]);
    }

    #[test]
    fn test_structure_access() {
        let t = small();
        assert_eq!(t.len(), 5);
        assert!(!t.is_empty());
        assert_eq!(t.children(t.root()).len(), 2);
        assert!(t.is_leaf(4));
        assert!(!t.is_leaf(1));
        assert_eq!(t.mode(0), None);
        assert_eq!(t.count_unmatched(), 0);
    }

    #[test]
    fn test_display() {
        let t = small();
        assert_eq!(format!("{}", t), "1 [2 [3, 4], 5]");
    }

    #[test]
    #[should_panic(expected = "unknown parent")]
    fn test_add_child_unknown_parent() {
        let mut t = Tree::new(1);
        t.add_child(3, 2);
    }
}
