//! Nearest-representative mapping over the whole tree.
//!
//! Every node (leaves and internal nodes) is mapped to its nearest center
//! among the selected representatives and the prior centers. The mapping lives
//! outside the tree, so one tree can back any number of solves.
//!
//! Two linear sweeps do the work: post-order finds the nearest center inside
//! each subtree, pre-order lets the parent's nearest center compete. Ties go
//! to the center listed first (selected representatives in order, then priors),
//! which keeps every clade connected.

use crate::oracle::{EPSILON, is_covered};
use crate::tree::{BinaryTree, NodeIndex};

/// Which kind of center serves a node, with its position in the input list.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Representative {
    /// Index into the solve result's representatives
    Selected(usize),
    /// Index into the prior centers
    Prior(usize),
}

impl Representative {
    pub fn is_prior(&self) -> bool {
        matches!(self, Representative::Prior(_))
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Assignment {
    /// `None` when no center exists or the nearest one is beyond the radius.
    pub representative: Option<Representative>,
    /// Leaf of the nearest center, even when it is beyond the radius.
    pub center: Option<NodeIndex>,
    pub distance: f64,
}

/// Per-node nearest-center relation for one solve.
#[derive(Debug, Clone)]
pub struct CladeAssignment<'t> {
    tree: &'t BinaryTree,
    nodes: Vec<Assignment>,
}

#[derive(Copy, Clone)]
struct Nearest {
    distance: f64,
    rank: usize,
}

impl Nearest {
    const NONE: Nearest = Nearest { distance: f64::INFINITY, rank: usize::MAX };

    #[inline]
    fn beats(&self, other: &Nearest) -> bool {
        self.distance < other.distance - EPSILON
            || ((self.distance - other.distance).abs() <= EPSILON && self.rank < other.rank)
    }
}

impl<'t> CladeAssignment<'t> {
    /// Assign every node of `tree` to its nearest center.
    ///
    /// `selected` and `priors` are leaf indices; a leaf listed in both acts as
    /// a selected representative. With a radius, nodes farther than the radius
    /// from every center stay unassigned.
    pub fn compute(tree: &'t BinaryTree, selected: &[NodeIndex], priors: &[NodeIndex], radius: Option<f64>) -> Self {
        let centers: Vec<(NodeIndex, Representative)> = selected
            .iter()
            .enumerate()
            .map(|(i, &v)| (v, Representative::Selected(i)))
            .chain(priors.iter().enumerate().map(|(i, &v)| (v, Representative::Prior(i))))
            .collect();

        let mut best = vec![Nearest::NONE; tree.len()];
        for (rank, &(v, _)) in centers.iter().enumerate() {
            let own = Nearest { distance: 0.0, rank };
            if own.beats(&best[v]) {
                best[v] = own;
            }
        }

        for v in tree.postorder() {
            if let Some(p) = tree.parent(v) {
                let via_child = Nearest { distance: best[v].distance + tree.edge(v), rank: best[v].rank };
                if via_child.beats(&best[p]) {
                    best[p] = via_child;
                }
            }
        }
        for v in tree.preorder() {
            if let Some(p) = tree.parent(v) {
                let via_parent = Nearest { distance: best[p].distance + tree.edge(v), rank: best[p].rank };
                if via_parent.beats(&best[v]) {
                    best[v] = via_parent;
                }
            }
        }

        let nodes = best
            .iter()
            .map(|nearest| {
                let Some(&(center, representative)) = centers.get(nearest.rank) else {
                    return Assignment { representative: None, center: None, distance: nearest.distance };
                };
                let within = radius.is_none() || is_covered(nearest.distance, radius);
                Assignment {
                    representative: within.then_some(representative),
                    center: Some(center),
                    distance: nearest.distance,
                }
            })
            .collect();

        CladeAssignment { tree, nodes }
    }

    pub fn tree(&self) -> &'t BinaryTree {
        self.tree
    }

    #[inline]
    pub fn node(&self, v: NodeIndex) -> &Assignment {
        &self.nodes[v]
    }

    pub fn leaf(&self, label: &str) -> Option<&Assignment> {
        self.tree.leaf_by_label(label).map(|v| &self.nodes[v])
    }

    /// Leaves in tree order with their assignment.
    pub fn leaves(&self) -> impl Iterator<Item = (&'t str, &Assignment)> + '_ {
        let tree = self.tree;
        tree.leaves()
            .iter()
            .filter_map(move |&v| tree.label(v).map(|label| (label, &self.nodes[v])))
    }

    /// Clade owning the edge from `v` up to its parent.
    ///
    /// An edge belongs to a clade only if both endpoints map to the same
    /// representative; the root has no edge.
    pub fn edge_clade(&self, v: NodeIndex) -> Option<Representative> {
        let p = self.tree.parent(v)?;
        let head = self.nodes[v].representative?;
        (self.nodes[p].representative == Some(head)).then_some(head)
    }

    /// Labels of the leaves served by `representative`.
    pub fn members(&self, representative: Representative) -> Vec<&'t str> {
        self.leaves()
            .filter(|(_, a)| a.representative == Some(representative))
            .map(|(label, _)| label)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(tree: &BinaryTree, label: &str) -> NodeIndex {
        tree.leaf_by_label(label).unwrap()
    }

    #[test]
    fn test_nearest_with_prior() {
        let tree = BinaryTree::from_newick("(((a:2,b:1):2,e:1):1,(c:1,d:2):1);").unwrap();
        let assignment = CladeAssignment::compute(&tree, &[leaf(&tree, "e")], &[leaf(&tree, "b")], None);

        let a = assignment.leaf("a").unwrap();
        assert_eq!(a.representative, Some(Representative::Prior(0)));
        assert_eq!(a.distance, 3.0);
        assert_eq!(assignment.leaf("b").unwrap().distance, 0.0);

        for (label, distance) in [("e", 0.0), ("c", 4.0), ("d", 5.0)] {
            let got = assignment.leaf(label).unwrap();
            assert_eq!(got.representative, Some(Representative::Selected(0)), "{label}");
            assert_eq!(got.distance, distance, "{label}");
        }

        assert_eq!(assignment.members(Representative::Prior(0)), vec!["a", "b"]);
        assert_eq!(assignment.members(Representative::Selected(0)), vec!["e", "c", "d"]);
    }

    #[test]
    fn test_edges_follow_clades() {
        let tree = BinaryTree::from_newick("(((a:2,b:1):2,e:1):1,(c:1,d:2):1);").unwrap();
        let assignment = CladeAssignment::compute(&tree, &[leaf(&tree, "e")], &[leaf(&tree, "b")], None);

        let a = leaf(&tree, "a");
        let ab = tree.parent(a).unwrap();
        let abe = tree.parent(ab).unwrap();
        assert_eq!(assignment.edge_clade(a), Some(Representative::Prior(0)));
        // (a,b) is served by b, its parent by e.
        assert_eq!(assignment.edge_clade(ab), None);
        assert_eq!(assignment.edge_clade(leaf(&tree, "e")), Some(Representative::Selected(0)));
        assert_eq!(assignment.edge_clade(abe), Some(Representative::Selected(0)));
        assert_eq!(assignment.edge_clade(tree.root()), None);
    }

    #[test]
    fn test_radius_leaves_nodes_unassigned() {
        let tree = BinaryTree::from_newick("((a:1,(b:2.5,c:2.5):1):3,(d:0.5,(e:2.5,f:3):1):2);").unwrap();
        let selected = [leaf(&tree, "a"), leaf(&tree, "d")];
        let assignment = CladeAssignment::compute(&tree, &selected, &[], Some(4.0));

        assert_eq!(assignment.leaf("e").unwrap().representative, Some(Representative::Selected(1)));
        for label in ["b", "c", "f"] {
            let got = assignment.leaf(label).unwrap();
            assert_eq!(got.representative, None, "{label}");
            assert_eq!(got.distance, 4.5);
            assert!(got.center.is_some());
        }
    }

    #[test]
    fn test_ties_prefer_first_listed() {
        let tree = BinaryTree::from_newick("((a:1,b:1):1,c:1);").unwrap();
        let selected = [leaf(&tree, "b"), leaf(&tree, "a")];
        let assignment = CladeAssignment::compute(&tree, &selected, &[], None);
        let ab = tree.parent(leaf(&tree, "a")).unwrap();
        assert_eq!(assignment.node(ab).representative, Some(Representative::Selected(0)));
        assert_eq!(assignment.leaf("c").unwrap().representative, Some(Representative::Selected(0)));
    }

    #[test]
    fn test_no_centers() {
        let tree = BinaryTree::from_newick("((a:1,b:1):1,c:1);").unwrap();
        let assignment = CladeAssignment::compute(&tree, &[], &[], None);
        assert!(assignment.leaves().all(|(_, a)| a.representative.is_none() && a.distance.is_infinite()));
    }
}
