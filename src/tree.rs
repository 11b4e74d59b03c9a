//! Binary tree model used by the medoid solver.
//!
//! # Overview
//! Parsed trees (from `phylotree`) may be multifurcating, may carry degree-1
//! nodes left over from unrooted input, and may have missing branch lengths.
//! The solver wants none of that. [`BinaryTree`] is an arena where:
//!
//! - every internal node has exactly two children,
//! - every leaf carries a unique, non-empty label,
//! - every edge length is finite and non-negative (missing lengths read as 0.0).
//!
//! # Binarization
//! A node with `k > 2` children is replaced by a left-leaning chain of `k - 1`
//! internal nodes joined by zero-length edges:
//! ```text
//!        v                      v
//!     / | | \                 /   \
//!    A  B C  D     ==>      x1     D
//!                          /  \
//!                        x2    C
//!                       /  \
//!                      A    B
//! ```
//! Each original child keeps its own edge length to its (possibly new) parent,
//! so every leaf-to-leaf path length is unchanged.
//!
//! A node with a single child is collapsed: the child is attached to the
//! grandparent with the two edge lengths summed.
//!
//! All traversals are iterative, deep caterpillar trees do not blow the stack.

use crate::error::{MedoidError, Result};
use phylotree::tree::Tree as PhyloTree;
use std::collections::HashMap;

/// Index of a node in the [`BinaryTree`] arena.
pub type NodeIndex = usize;

/// A node of the binarized tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub parent: Option<NodeIndex>,
    pub children: Vec<NodeIndex>,
    /// Length of the edge from `parent` to this node (0.0 for the root).
    pub edge: f64,
    pub label: Option<String>,
}

impl TreeNode {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Strictly binary, immutable tree with uniquely labeled leaves.
#[derive(Debug, Clone)]
pub struct BinaryTree {
    nodes: Vec<TreeNode>,
    root: NodeIndex,
    /// Leaf indices in input (pre-order) order
    leaves: Vec<NodeIndex>,
    leaf_index: HashMap<String, NodeIndex>,
}

/// Work item for the iterative conversion from a phylotree tree.
struct Pending {
    src: usize,
    parent: Option<NodeIndex>,
    edge: f64,
}

impl BinaryTree {
    /// Parse a newick string and binarize it.
    pub fn from_newick(newick: &str) -> Result<Self> {
        let tree = PhyloTree::from_newick(newick).map_err(|e| MedoidError::Newick(e.to_string()))?;
        Self::from_phylo(&tree)
    }

    /// Build the binary arena from an already parsed `phylotree` tree.
    ///
    /// # Errors
    /// - `InvalidTree` for unlabeled or duplicated leaves and negative/non-finite lengths
    /// - `DegenerateTree` when fewer than 2 leaves remain
    pub fn from_phylo(tree: &PhyloTree) -> Result<Self> {
        let mut nodes: Vec<TreeNode> = Vec::new();
        let mut stack = vec![Pending { src: tree.get_root()?, parent: None, edge: 0.0 }];

        while let Some(Pending { src, parent, edge }) = stack.pop() {
            let node = tree.get(&src)?;

            match node.children.len() {
                0 => {
                    let label = node
                        .name
                        .as_deref()
                        .map(unquote_label)
                        .filter(|n| !n.is_empty())
                        .ok_or_else(|| MedoidError::InvalidTree("found a leaf without a label".to_string()))?;
                    push_node(&mut nodes, parent, edge, Some(label));
                }
                1 => {
                    // Degree-1 artifact: splice the child onto our parent.
                    let child = node.children[0];
                    let child_edge = edge_length(tree, child)?;
                    stack.push(Pending { src: child, parent, edge: edge + child_edge });
                }
                k => {
                    let mut cur = push_node(&mut nodes, parent, edge, None);
                    // Peel children off the right end until two remain.
                    for i in (2..k).rev() {
                        let inner = push_node(&mut nodes, Some(cur), 0.0, None);
                        stack.push(Pending {
                            src: node.children[i],
                            parent: Some(cur),
                            edge: edge_length(tree, node.children[i])?,
                        });
                        cur = inner;
                    }
                    for &child in node.children[..2].iter().rev() {
                        stack.push(Pending { src: child, parent: Some(cur), edge: edge_length(tree, child)? });
                    }
                }
            }
        }

        Self::from_nodes(nodes)
    }

    /// Validate an arena whose root is at index 0.
    fn from_nodes(nodes: Vec<TreeNode>) -> Result<Self> {
        let mut tree = BinaryTree { nodes, root: 0, leaves: Vec::new(), leaf_index: HashMap::new() };

        for v in tree.preorder() {
            let node = &tree.nodes[v];
            if !node.is_leaf() {
                continue;
            }
            let label = node.label.clone().unwrap_or_default();
            if tree.leaf_index.insert(label.clone(), v).is_some() {
                return Err(MedoidError::InvalidTree(format!("duplicate leaf label '{label}'")));
            }
            tree.leaves.push(v);
        }

        if tree.leaves.len() < 2 {
            return Err(MedoidError::DegenerateTree { leaves: tree.leaves.len() });
        }
        Ok(tree)
    }

    #[inline]
    pub fn root(&self) -> NodeIndex {
        self.root
    }

    /// Total number of nodes, internal ones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn node(&self, v: NodeIndex) -> &TreeNode {
        &self.nodes[v]
    }

    #[inline]
    pub fn is_leaf(&self, v: NodeIndex) -> bool {
        self.nodes[v].is_leaf()
    }

    #[inline]
    pub fn parent(&self, v: NodeIndex) -> Option<NodeIndex> {
        self.nodes[v].parent
    }

    #[inline]
    pub fn edge(&self, v: NodeIndex) -> f64 {
        self.nodes[v].edge
    }

    /// The two children of an internal node.
    #[inline]
    pub fn children(&self, v: NodeIndex) -> Option<(NodeIndex, NodeIndex)> {
        match self.nodes[v].children.as_slice() {
            [a, b] => Some((*a, *b)),
            _ => None,
        }
    }

    #[inline]
    pub fn label(&self, v: NodeIndex) -> Option<&str> {
        self.nodes[v].label.as_deref()
    }

    pub fn leaves(&self) -> &[NodeIndex] {
        &self.leaves
    }

    pub fn n_leaves(&self) -> usize {
        self.leaves.len()
    }

    pub fn leaf_by_label(&self, label: &str) -> Option<NodeIndex> {
        self.leaf_index.get(label).copied()
    }

    pub fn leaf_labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.leaves.iter().filter_map(|&v| self.label(v))
    }

    /// Pre-order node sequence (parents before children, left child first).
    pub fn preorder(&self) -> Vec<NodeIndex> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(v) = stack.pop() {
            order.push(v);
            stack.extend(self.nodes[v].children.iter().rev());
        }
        order
    }

    /// Post-order node sequence (children before parents).
    pub fn postorder(&self) -> Vec<NodeIndex> {
        let mut order = self.preorder();
        // Reversing a pre-order puts every node after all of its descendants.
        order.reverse();
        order
    }
}

/// NEWICK quoting: `'it''s'` is the label `it's`. Unquoted names pass through.
fn unquote_label(name: &str) -> String {
    match name.strip_prefix('\'').and_then(|n| n.strip_suffix('\'')) {
        Some(inner) => inner.replace("''", "'"),
        None => name.to_string(),
    }
}

fn push_node(nodes: &mut Vec<TreeNode>, parent: Option<NodeIndex>, edge: f64, label: Option<String>) -> NodeIndex {
    let idx = nodes.len();
    nodes.push(TreeNode { parent, children: Vec::new(), edge, label });
    if let Some(p) = parent {
        nodes[p].children.push(idx);
    }
    idx
}

/// Length of the edge leading to `id`; missing lengths are treated as 0.0.
fn edge_length(tree: &PhyloTree, id: usize) -> Result<f64> {
    let length = tree.get(&id)?.parent_edge.unwrap_or(0.0);
    if !length.is_finite() || length < 0.0 {
        return Err(MedoidError::InvalidTree(format!("branch length {length} is not a non-negative number")));
    }
    Ok(length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    /// Sum of edge lengths between two leaves, walking parent pointers.
    fn path_length(tree: &BinaryTree, a: &str, b: &str) -> f64 {
        let mut up_a = HashMap::new();
        let mut v = tree.leaf_by_label(a).unwrap();
        let mut acc = 0.0;
        loop {
            up_a.insert(v, acc);
            match tree.parent(v) {
                Some(p) => {
                    acc += tree.edge(v);
                    v = p;
                }
                None => break,
            }
        }
        let mut v = tree.leaf_by_label(b).unwrap();
        let mut acc = 0.0;
        while !up_a.contains_key(&v) {
            acc += tree.edge(v);
            v = tree.parent(v).unwrap();
        }
        acc + up_a[&v]
    }

    fn assert_binary(tree: &BinaryTree) {
        for v in 0..tree.len() {
            let k = tree.node(v).children.len();
            assert!(k == 0 || k == 2, "node {v} has {k} children");
        }
    }

    #[test]
    fn test_binary_input_kept() {
        let tree = BinaryTree::from_newick("(((a:2,b:1):2,e:1):1,(c:1,d:2):1);").unwrap();
        assert_binary(&tree);
        assert_eq!(tree.n_leaves(), 5);
        assert_eq!(tree.len(), 9);
        assert_eq!(tree.leaf_labels().collect::<Vec<_>>(), vec!["a", "b", "e", "c", "d"]);
        assert_eq!(path_length(&tree, "a", "d"), 8.0);
    }

    /// Multifurcations become zero-length chains; all leaf distances survive.
    #[test]
    fn test_multifurcation_preserves_distances() {
        let newick = "(a:1,b:2,(c:1,d:1,e:3,f:0.5):2,g:4);";
        let tree = BinaryTree::from_newick(newick).unwrap();
        assert_binary(&tree);
        assert_eq!(tree.n_leaves(), 7);
        assert_eq!(tree.len(), 13);

        let expected = [
            ("a", "b", 3.0),
            ("a", "g", 5.0),
            ("c", "d", 2.0),
            ("c", "f", 1.5),
            ("e", "g", 9.0),
            ("a", "f", 3.5),
        ];
        for (x, y, d) in expected {
            assert!((path_length(&tree, x, y) - d).abs() < 1e-12, "{x}-{y}");
        }
    }

    /// Unrooted input (trifurcating root) and degree-1 nodes.
    #[test]
    fn test_unary_nodes_collapsed() {
        let tree = BinaryTree::from_newick("((a:1):2,(b:1,c:2):1,((d:1):1):1);").unwrap();
        assert_binary(&tree);
        assert!((path_length(&tree, "a", "d") - 6.0).abs() < 1e-12);
        assert!((path_length(&tree, "b", "c") - 3.0).abs() < 1e-12);

        let labels = tree.leaf_labels().sorted().collect::<Vec<_>>();
        assert_eq!(labels, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_missing_lengths_are_zero() {
        let tree = BinaryTree::from_newick("((a,b),c:1);").unwrap();
        assert_eq!(path_length(&tree, "a", "b"), 0.0);
        assert_eq!(path_length(&tree, "a", "c"), 1.0);
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let err = BinaryTree::from_newick("((a:1,b:1):1,a:1);").unwrap_err();
        assert!(matches!(err, MedoidError::InvalidTree(_)));
    }

    #[test]
    fn test_quoted_labels_unquoted() {
        assert_eq!(unquote_label("'it''s'"), "it's");
        assert_eq!(unquote_label("plain"), "plain");
        assert_eq!(unquote_label("'"), "'");

        let tree = BinaryTree::from_newick("(('A/swine':1,b:2):1,c:1);").unwrap();
        let labels: Vec<&str> = tree.leaf_labels().collect();
        assert_eq!(labels, vec!["A/swine", "b", "c"]);
        assert!(tree.leaf_by_label("A/swine").is_some());
    }

    #[test]
    fn test_single_leaf_is_degenerate() {
        let err = BinaryTree::from_newick("(a:1);").unwrap_err();
        assert!(matches!(err, MedoidError::DegenerateTree { leaves: 1 }));
    }

    #[test]
    fn test_orders_are_consistent() {
        let tree = BinaryTree::from_newick("((a:1,(b:2.5,c:2.5):1):3,(d:0.5,(e:2.5,f:3):1):2);").unwrap();
        let pre = tree.preorder();
        let post = tree.postorder();
        assert_eq!(pre.len(), tree.len());
        assert_eq!(pre[0], tree.root());
        assert_eq!(*post.last().unwrap(), tree.root());

        let mut seen = vec![false; tree.len()];
        for &v in &post {
            for &c in &tree.node(v).children {
                assert!(seen[c], "child {c} visited after parent {v}");
            }
            seen[v] = true;
        }
    }
}
