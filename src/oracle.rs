//! Exact path distances on a [`BinaryTree`].
//!
//! # Overview
//! One linear pre-order pass records, for every node:
//! - `root_dist`: weighted distance from the root,
//! - `depth`: number of edges from the root,
//! - `tin`/`tout`: entry/exit times of a DFS, so ancestry is an interval test,
//! - an ancestor table for binary lifting.
//!
//! Then `distance(u, v) = root_dist[u] + root_dist[v] - 2 * root_dist[lca(u, v)]`
//! with `lca` answered in O(log depth).
//!
//! The module also owns the radius threshold ([`coverage`]) and the per-node
//! distance to the nearest prior center ([`DistanceOracle::baseline`]).

use crate::tree::{BinaryTree, NodeIndex};

/// Tolerance for distance comparisons against the radius and between routes.
pub const EPSILON: f64 = 1e-9;

/// Whether a distance `x` is within `radius` (equality counts as covered).
#[inline]
pub fn is_covered(x: f64, radius: Option<f64>) -> bool {
    match radius {
        Some(r) => x <= r + EPSILON,
        None => false,
    }
}

/// Cost contributed by a leaf whose best available distance is `x`.
///
/// Either exactly 0 (covered) or exactly `x`, never a clipped value.
#[inline]
pub fn coverage(x: f64, radius: Option<f64>) -> f64 {
    if is_covered(x, radius) { 0.0 } else { x }
}

#[derive(Debug, Clone)]
pub struct DistanceOracle {
    root_dist: Vec<f64>,
    depth: Vec<usize>,
    tin: Vec<usize>,
    tout: Vec<usize>,
    /// `up[i][v]` is the 2^i-th ancestor of `v` (the root maps to itself)
    up: Vec<Vec<NodeIndex>>,
}

impl DistanceOracle {
    pub fn new(tree: &BinaryTree) -> Self {
        let n = tree.len();
        let root = tree.root();
        let mut root_dist = vec![0.0; n];
        let mut depth = vec![0usize; n];
        let mut parent = vec![root; n];

        let preorder = tree.preorder();
        for &v in &preorder {
            if let Some(p) = tree.parent(v) {
                root_dist[v] = root_dist[p] + tree.edge(v);
                depth[v] = depth[p] + 1;
                parent[v] = p;
            }
        }

        // Subtrees are contiguous in pre-order: tout = tin + subtree size.
        let mut tin = vec![0usize; n];
        let mut size = vec![1usize; n];
        for (t, &v) in preorder.iter().enumerate() {
            tin[v] = t;
        }
        for &v in preorder.iter().rev() {
            if let Some(p) = tree.parent(v) {
                size[p] += size[v];
            }
        }
        let tout = (0..n).map(|v| tin[v] + size[v]).collect();

        let levels = usize::BITS as usize - depth.iter().max().copied().unwrap_or(0).leading_zeros() as usize;
        let mut up = vec![parent];
        for i in 1..levels.max(1) {
            let prev = &up[i - 1];
            let next = (0..n).map(|v| prev[prev[v]]).collect();
            up.push(next);
        }

        DistanceOracle { root_dist, depth, tin, tout, up }
    }

    /// True if `a` is an ancestor of `d` (a node is its own ancestor).
    #[inline]
    pub fn is_ancestor(&self, a: NodeIndex, d: NodeIndex) -> bool {
        self.tin[a] <= self.tin[d] && self.tin[d] < self.tout[a]
    }

    pub fn lca(&self, u: NodeIndex, v: NodeIndex) -> NodeIndex {
        if self.is_ancestor(u, v) {
            return u;
        }
        if self.is_ancestor(v, u) {
            return v;
        }
        let mut u = u;
        for level in self.up.iter().rev() {
            if !self.is_ancestor(level[u], v) {
                u = level[u];
            }
        }
        self.up[0][u]
    }

    /// Sum of edge lengths on the path between `u` and `v`.
    #[inline]
    pub fn distance(&self, u: NodeIndex, v: NodeIndex) -> f64 {
        let w = self.lca(u, v);
        // Clamp tiny negative round-off.
        (self.root_dist[u] + self.root_dist[v] - 2.0 * self.root_dist[w]).max(0.0)
    }

    #[inline]
    pub fn depth(&self, v: NodeIndex) -> usize {
        self.depth[v]
    }

    /// Distance from every node to its nearest prior center.
    ///
    /// `f64::INFINITY` everywhere when `priors` is empty. Two sweeps: the
    /// post-order pass finds the nearest prior inside each subtree, the pre-order
    /// pass lets the parent's answer flow down.
    pub fn baseline(&self, tree: &BinaryTree, priors: &[NodeIndex]) -> Vec<f64> {
        let mut best = vec![f64::INFINITY; tree.len()];
        for &p in priors {
            best[p] = 0.0;
        }
        for v in tree.postorder() {
            if let Some(p) = tree.parent(v) {
                best[p] = best[p].min(best[v] + tree.edge(v));
            }
        }
        for v in tree.preorder() {
            if let Some(p) = tree.parent(v) {
                best[v] = best[v].min(best[p] + tree.edge(v));
            }
        }
        best
    }
}
