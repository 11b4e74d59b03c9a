//! Exact representative selection on a binary tree.
//!
//! # Objective
//! For a set `S` of `n` selectable leaves,
//! ```text
//! cost(S) = Σ_{counted leaves l} coverage( min(baseline(l), min_{s ∈ S} d(l, s)), radius )
//! ```
//! where `baseline(l)` is the distance to the nearest prior center.
//!
//! # Dynamic program
//! A *candidate* is a leaf that can serve others: a prior center, a
//! selectable leaf, or both. For every internal node `v`, every count
//! `k ≤ n` and every candidate `j` the table holds
//!
//! `F(v, k, j)`: the least cost of the leaves below `v` when exactly `k` new
//! representatives are placed below `v` and `v` itself is served by `j`.
//!
//! If `j` lies below `v`, it must be opened (counted in `k` unless it is a
//! prior). Because the nearest-center regions of a tree are connected, a child
//! `c` of `v` is either served by the same `j`, or by its own best candidate
//! below `c`:
//! ```text
//! G(c, k, j) = min( F(c, k, j), best(c, k) )       best(c, k) = min_{j' below c} F(c, k, j')
//! F(v, k, j) = min_{ka + kb = k} [ F(a, ka, j) if j below a else G(a, ka, j) ]
//!                              + [ F(b, kb, j) if j below b else G(b, kb, j) ]
//! ```
//! Leaves are closed-form: a leaf served by `j` pays `coverage(d(l, j))`. The
//! optimum is `best(root, n)`. The chosen split of `k` is kept as a back-pointer
//! per entry and the representative set is recovered top-down.
//!
//! A pair `(d(v, j), F(v, k, j))` plays the role of a "closest distance /
//! settled cost" state; keeping one entry per candidate makes the merge exact.
//!
//! Columns of one node's table are independent and filled in parallel.

use crate::assign::CladeAssignment;
use crate::classify::{Classification, resolve_labels};
use crate::config::SolverOptions;
use crate::error::{MedoidError, Result};
use crate::oracle::{DistanceOracle, coverage};
use crate::tree::{BinaryTree, NodeIndex};
use rayon::prelude::*;
use tracing::debug;

const INF: f64 = f64::INFINITY;

/// Chosen representatives and the objective they achieve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult {
    /// Exactly `n` labels, in tree order.
    pub representatives: Vec<String>,
    /// Total cost, non-negative (infinite only when `n = 0` and there are no priors).
    pub cost: f64,
}

/// A leaf able to serve other leaves.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    node: NodeIndex,
    prior: bool,
    selectable: bool,
}

/// DP table of one internal node, candidate-major: entry `j * width + k`.
///
/// `width` is one more than the number of representatives that fit below the
/// node (capped by `n`); larger counts are infeasible and not stored.
struct NodeTable {
    width: usize,
    cost: Vec<f64>,
    /// Left child's share of `k` for the entry
    split: Vec<u32>,
    /// `best[k]`: cheapest entry over candidates below the node
    best: Vec<(f64, usize)>,
}

/// Solver prepared for one tree and one set of [`SolverOptions`].
///
/// Preparation validates the options and precomputes distances; [`solve`](Self::solve)
/// can then be called for any number of `n`, also from several threads.
///
/// # Memory
/// A solve keeps one table per internal node with `candidates × (min(n, s) + 1)`
/// entries of 12 bytes, `s` being the number of selectable leaves below the
/// node. For balanced trees this is about `leaves² · log n`; caterpillar-like
/// trees approach `leaves² · n`. Trees with tens of thousands of taxa need a
/// lot of memory.
#[derive(Debug)]
pub struct MedoidSolver<'t> {
    tree: &'t BinaryTree,
    oracle: DistanceOracle,
    classes: Classification,
    radius: Option<f64>,
    priors: Vec<NodeIndex>,
    baseline: Vec<f64>,
    candidates: Vec<Candidate>,
    candidate_of: Vec<Option<usize>>,
    /// Number of selectable leaves below each node
    pool_below: Vec<usize>,
}

impl<'t> MedoidSolver<'t> {
    /// Validate `options` against `tree` and precompute everything `solve` needs.
    ///
    /// # Errors
    /// `InvalidConfiguration` for a negative radius, unknown labels or
    /// overlapping exclusion sets.
    pub fn new(tree: &'t BinaryTree, options: &SolverOptions) -> Result<Self> {
        if let Some(r) = options.radius {
            if r.is_nan() || r < 0.0 {
                return Err(MedoidError::InvalidConfiguration(format!("radius must be non-negative, got {r}")));
            }
        }

        let classes = Classification::classify(tree, &options.excluded, &options.fully_excluded)?;
        let mut priors: Vec<NodeIndex> = resolve_labels(tree, &options.prior_centers, "prior center")?
            .into_iter()
            .collect();
        priors.sort_unstable();

        let oracle = DistanceOracle::new(tree);
        let baseline = oracle.baseline(tree, &priors);

        let mut candidates = Vec::new();
        let mut candidate_of = vec![None; tree.len()];
        for &leaf in tree.leaves() {
            let prior = priors.binary_search(&leaf).is_ok();
            let selectable = classes.is_selectable(leaf);
            if prior || selectable {
                candidate_of[leaf] = Some(candidates.len());
                candidates.push(Candidate { node: leaf, prior, selectable });
            }
        }

        let mut pool_below = vec![0usize; tree.len()];
        for v in tree.postorder() {
            if tree.is_leaf(v) && classes.is_selectable(v) {
                pool_below[v] = 1;
            }
            if let Some(p) = tree.parent(v) {
                pool_below[p] += pool_below[v];
            }
        }

        debug!(
            leaves = tree.n_leaves(),
            selectable = classes.selectable_count(),
            priors = priors.len(),
            candidates = candidates.len(),
            radius = ?options.radius,
            "prepared medoid solver"
        );

        Ok(MedoidSolver {
            tree,
            oracle,
            classes,
            radius: options.radius,
            priors,
            baseline,
            candidates,
            candidate_of,
            pool_below,
        })
    }

    pub fn tree(&self) -> &'t BinaryTree {
        self.tree
    }

    pub fn oracle(&self) -> &DistanceOracle {
        &self.oracle
    }

    pub fn classification(&self) -> &Classification {
        &self.classes
    }

    pub fn radius(&self) -> Option<f64> {
        self.radius
    }

    /// Prior centers as node indices, in tree order.
    pub fn prior_centers(&self) -> &[NodeIndex] {
        &self.priors
    }

    /// Distance from `v` to its nearest prior center (infinite without priors).
    pub fn baseline(&self, v: NodeIndex) -> f64 {
        self.baseline[v]
    }

    /// Largest valid `n`.
    pub fn pool_size(&self) -> usize {
        self.classes.selectable_count()
    }

    /// Objective value of an arbitrary set of representative leaves.
    pub fn objective(&self, selected: &[NodeIndex]) -> f64 {
        self.tree
            .leaves()
            .iter()
            .filter(|&&l| self.classes.is_counted(l))
            .map(|&l| {
                let nearest = selected
                    .iter()
                    .map(|&s| self.oracle.distance(l, s))
                    .fold(self.baseline[l], f64::min);
                coverage(nearest, self.radius)
            })
            .sum()
    }

    /// Objective value of a set given by labels.
    pub fn cost_of<S: AsRef<str>>(&self, labels: &[S]) -> Result<f64> {
        let nodes: Vec<NodeIndex> = resolve_labels(self.tree, labels, "representative")?.into_iter().collect();
        Ok(self.objective(&nodes))
    }

    /// Choose `n` representatives minimizing the objective.
    ///
    /// Ties between optimal sets are broken deterministically, but callers
    /// should not rely on which optimal set comes back.
    ///
    /// # Errors
    /// `InvalidConfiguration` if `n` exceeds the number of selectable leaves.
    pub fn solve(&self, n: usize) -> Result<SolveResult> {
        if n > self.pool_size() {
            return Err(MedoidError::InvalidConfiguration(format!(
                "cannot choose {n} representatives from {} selectable taxa",
                self.pool_size()
            )));
        }
        if n == 0 {
            return Ok(SolveResult { representatives: Vec::new(), cost: self.objective(&[]) });
        }

        let tables = self.fill_tables(n);
        let root = self.tree.root();
        let (dp_cost, root_candidate) = self.best(&tables, root, n);
        if !dp_cost.is_finite() {
            return Err(MedoidError::InvalidConfiguration(format!("no feasible selection of {n} representatives")));
        }

        let mut selected = self.reconstruct(&tables, root, n, root_candidate)?;
        selected.sort_unstable();

        let cost = self.objective(&selected);
        debug_assert!((cost - dp_cost).abs() <= 1e-6 * (1.0 + dp_cost.abs()), "dp {dp_cost} vs objective {cost}");
        debug!(n, cost, dp_cost, "solved");

        let representatives = selected
            .iter()
            .filter_map(|&v| self.tree.label(v).map(str::to_string))
            .collect();
        Ok(SolveResult { representatives, cost })
    }

    /// Nearest-representative mapping for a result of this solver.
    pub fn assign(&self, result: &SolveResult) -> Result<CladeAssignment> {
        let selected = result
            .representatives
            .iter()
            .map(|label| {
                self.tree.leaf_by_label(label).ok_or_else(|| {
                    MedoidError::InvalidConfiguration(format!("representative '{label}' is not a leaf of the tree"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(CladeAssignment::compute(self.tree, &selected, &self.priors, self.radius))
    }

    /// Bottom-up DP tables for `n`, indexed by node (`None` for leaves).
    fn fill_tables(&self, n: usize) -> Vec<Option<NodeTable>> {
        let mut tables: Vec<Option<NodeTable>> = (0..self.tree.len()).map(|_| None).collect();
        for v in self.tree.postorder() {
            if let Some((a, b)) = self.tree.children(v) {
                tables[v] = Some(self.merge(&tables, v, a, b, n));
            }
        }
        tables
    }

    /// `F(l, k, j)` for a leaf `l`.
    fn leaf_entry(&self, l: NodeIndex, k: usize, j: usize) -> f64 {
        let cand = self.candidates[j];
        if cand.node == l {
            return match k {
                0 if cand.prior => 0.0,
                1 if cand.selectable => 0.0,
                _ => INF,
            };
        }
        if k != 0 {
            return INF;
        }
        if !self.classes.is_counted(l) {
            return 0.0;
        }
        coverage(self.oracle.distance(l, cand.node), self.radius)
    }

    #[inline]
    fn entry(&self, tables: &[Option<NodeTable>], v: NodeIndex, k: usize, j: usize) -> f64 {
        match &tables[v] {
            Some(table) if k < table.width => table.cost[j * table.width + k],
            Some(_) => INF,
            None => self.leaf_entry(v, k, j),
        }
    }

    /// `best(v, k)` together with the candidate achieving it.
    fn best(&self, tables: &[Option<NodeTable>], v: NodeIndex, k: usize) -> (f64, usize) {
        match &tables[v] {
            Some(table) => table.best.get(k).copied().unwrap_or((INF, usize::MAX)),
            None => match self.candidate_of[v] {
                Some(j) => (self.leaf_entry(v, k, j), j),
                None => (INF, usize::MAX),
            },
        }
    }

    fn merge(&self, tables: &[Option<NodeTable>], v: NodeIndex, a: NodeIndex, b: NodeIndex, n: usize) -> NodeTable {
        let ka_max = self.pool_below[a].min(n);
        let kb_max = self.pool_below[b].min(n);
        let kv_max = (ka_max + kb_max).min(n);
        let width = kv_max + 1;

        let best_a: Vec<f64> = (0..=ka_max).map(|k| self.best(tables, a, k).0).collect();
        let best_b: Vec<f64> = (0..=kb_max).map(|k| self.best(tables, b, k).0).collect();

        let mut cost = vec![INF; self.candidates.len() * width];
        let mut split = vec![0u32; self.candidates.len() * width];

        cost.par_chunks_mut(width)
            .zip(split.par_chunks_mut(width))
            .enumerate()
            .for_each(|(j, (col, back))| {
                let node_j = self.candidates[j].node;
                let in_a = self.oracle.is_ancestor(a, node_j);
                let in_b = self.oracle.is_ancestor(b, node_j);

                for k in 0..=kv_max {
                    for ka in k.saturating_sub(kb_max)..=k.min(ka_max) {
                        let kb = k - ka;
                        let fa = self.entry(tables, a, ka, j);
                        let left = if in_a { fa } else { fa.min(best_a[ka]) };
                        let fb = self.entry(tables, b, kb, j);
                        let right = if in_b { fb } else { fb.min(best_b[kb]) };

                        let total = left + right;
                        if total < col[k] {
                            col[k] = total;
                            back[k] = ka as u32;
                        }
                    }
                }
            });

        let mut best = vec![(INF, usize::MAX); width];
        for (j, cand) in self.candidates.iter().enumerate() {
            if !self.oracle.is_ancestor(v, cand.node) {
                continue;
            }
            for (k, slot) in best.iter_mut().enumerate() {
                let c = cost[j * width + k];
                if c < slot.0 {
                    *slot = (c, j);
                }
            }
        }

        NodeTable { width, cost, split, best }
    }

    /// Follow back-pointers from `(root, n, j)` down to the opened leaves.
    fn reconstruct(&self, tables: &[Option<NodeTable>], root: NodeIndex, n: usize, j: usize) -> Result<Vec<NodeIndex>> {
        let mut selected = Vec::with_capacity(n);
        let mut stack = vec![(root, n, j)];

        while let Some((v, k, j)) = stack.pop() {
            let Some((a, b)) = self.tree.children(v) else {
                // A leaf only carries a count when it is opened itself.
                if k == 1 {
                    selected.push(v);
                }
                continue;
            };
            let table = tables[v]
                .as_ref()
                .ok_or_else(|| MedoidError::InvalidTree(format!("internal node {v} has no table")))?;
            let ka = table
                .split
                .get(j * table.width + k)
                .filter(|_| k < table.width)
                .map(|&ka| ka as usize)
                .ok_or_else(|| MedoidError::InvalidTree(format!("no split recorded for {k} representatives at node {v}")))?;
            let node_j = self.candidates[j].node;

            for (c, kc) in [(a, ka), (b, k - ka)] {
                let jc = if self.oracle.is_ancestor(c, node_j) {
                    j
                } else {
                    let (best, best_j) = self.best(tables, c, kc);
                    if self.entry(tables, c, kc, j) <= best { j } else { best_j }
                };
                stack.push((c, kc, jc));
            }
        }

        if selected.len() != n {
            return Err(MedoidError::InvalidConfiguration(format!(
                "recovered {} representatives instead of {n}",
                selected.len()
            )));
        }
        Ok(selected)
    }
}

/// Prepare a solver and run it once.
pub fn solve(tree: &BinaryTree, n: usize, options: &SolverOptions) -> Result<SolveResult> {
    MedoidSolver::new(tree, options)?.solve(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    const TREE_1: &str = "(((a:2,b:1):2,e:1):1,(c:1,d:2):1);";
    const TREE_2: &str = "((a:1,(b:2.5,c:2.5):1):3,(d:0.5,(e:2.5,f:3):1):2);";
    const TREE_3: &str = "((a:1,(b:2.5,c:2.5):1):3,(d:0.5,(e:2.5,f:3.5):1):2);";

    /// Small trees with uneven lengths, zero-length edges and multifurcations.
    const SMALL_TREES: [&str; 5] = [
        TREE_1,
        TREE_2,
        "((a:0.3,b:1.2,c:0.7):0.4,((d:2.1,e:0.2):0.9,(f:1.1,(g:0.6,h:1.9):0.5):0.3):1.4,i:2.2);",
        "(((((a:1,b:1):1,c:1):1,d:1):1,e:1):1,((f:0,g:0):3,h:0.5):2);",
        "((a:1.5,(b:0.25,(c:3,d:0.75):0.5):2):0,(e:1,(f:1,(g:2,(h:0.5,(i:1,j:4):1):1):1):1):1);",
    ];

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    fn labels(result: &SolveResult) -> Vec<&str> {
        result.representatives.iter().map(String::as_str).sorted().collect()
    }

    /// Exhaustive minimum over all `n`-subsets of selectable leaves.
    fn brute_force(solver: &MedoidSolver, n: usize) -> f64 {
        let pool: Vec<NodeIndex> = solver
            .tree()
            .leaves()
            .iter()
            .copied()
            .filter(|&v| solver.classification().is_selectable(v))
            .collect();
        pool.into_iter()
            .combinations(n)
            .map(|s| solver.objective(&s))
            .fold(INF, f64::min)
    }

    /// Returns the number of `n` values compared, `n = 0` included.
    fn check_against_brute_force(tree: &BinaryTree, options: &SolverOptions) -> usize {
        let solver = MedoidSolver::new(tree, options).unwrap();
        let mut checked = 0;
        for n in 0..=solver.pool_size() {
            let result = solver.solve(n).unwrap();
            let expected = brute_force(&solver, n);
            assert_eq!(result.representatives.len(), n);
            let recomputed = solver.cost_of(&result.representatives).unwrap();
            if expected.is_infinite() {
                assert!(result.cost.is_infinite(), "n={n} {options:?}: {}", result.cost);
                assert!(recomputed.is_infinite());
            } else {
                assert!((result.cost - expected).abs() < 1e-9, "n={n} {options:?}: {} vs {expected}", result.cost);
                assert_close(recomputed, result.cost);
            }
            checked += 1;
        }
        checked
    }

    #[test]
    fn test_one_medoid() {
        let tree = BinaryTree::from_newick(TREE_1).unwrap();
        let result = solve(&tree, 1, &SolverOptions::new()).unwrap();
        assert_eq!(result.representatives, vec!["e"]);
        assert_close(result.cost, 18.0);
    }

    #[test]
    fn test_two_medoids() {
        let tree = BinaryTree::from_newick(TREE_2).unwrap();
        let result = solve(&tree, 2, &SolverOptions::new()).unwrap();
        assert_eq!(labels(&result), vec!["a", "d"]);
        assert_close(result.cost, 17.5);
    }

    /// d covers e exactly at the radius.
    #[test]
    fn test_two_medoids_with_radius() {
        let tree = BinaryTree::from_newick(TREE_2).unwrap();
        let result = solve(&tree, 2, &SolverOptions::new().with_radius(4.0)).unwrap();
        assert_eq!(labels(&result), vec!["a", "d"]);
        assert_close(result.cost, 13.5);
    }

    /// Only f stays uncovered.
    #[test]
    fn test_two_medoids_with_wider_radius() {
        let tree = BinaryTree::from_newick(TREE_3).unwrap();
        let result = solve(&tree, 2, &SolverOptions::new().with_radius(4.5)).unwrap();
        assert_eq!(labels(&result), vec!["a", "d"]);
        assert_close(result.cost, 5.0);
    }

    #[test]
    fn test_one_medoid_with_prior() {
        let tree = BinaryTree::from_newick(TREE_1).unwrap();
        let result = solve(&tree, 1, &SolverOptions::new().with_prior_centers(["b"])).unwrap();
        assert_eq!(result.representatives.len(), 1);
        assert!(["c", "d"].contains(&result.representatives[0].as_str()));
        assert_close(result.cost, 10.0);
    }

    #[test]
    fn test_zero_representatives() {
        let tree = BinaryTree::from_newick(TREE_1).unwrap();

        let result = solve(&tree, 0, &SolverOptions::new()).unwrap();
        assert!(result.representatives.is_empty());
        assert!(result.cost.is_infinite());

        // a:3 e:4 c:6 d:7, b is its own prior
        let result = solve(&tree, 0, &SolverOptions::new().with_prior_centers(["b"])).unwrap();
        assert!(result.representatives.is_empty());
        assert_close(result.cost, 20.0);

        let options = SolverOptions::new().with_prior_centers(["b"]).with_radius(4.0);
        assert_close(solve(&tree, 0, &options).unwrap().cost, 13.0);
    }

    #[test]
    fn test_matches_brute_force() {
        for newick in SMALL_TREES {
            let tree = BinaryTree::from_newick(newick).unwrap();
            // Unbounded n = 0 costs infinity without priors; every larger n must still be compared.
            assert_eq!(check_against_brute_force(&tree, &SolverOptions::new()), tree.n_leaves() + 1);
            assert_eq!(check_against_brute_force(&tree, &SolverOptions::new().with_radius(2.5)), tree.n_leaves() + 1);
        }
    }

    #[test]
    fn test_matches_brute_force_with_priors_and_exclusions() {
        let tree = BinaryTree::from_newick(SMALL_TREES[2]).unwrap();
        let variants = [
            SolverOptions::new().with_prior_centers(["a", "h"]),
            SolverOptions::new().with_prior_centers(["e"]).with_radius(1.5),
            SolverOptions::new().with_excluded(["d", "f", "g"]),
            SolverOptions::new().with_fully_excluded(["i", "b"]).with_radius(1.0),
            SolverOptions::new()
                .with_prior_centers(["c", "d"])
                .with_excluded(["d", "a"])
                .with_fully_excluded(["h"])
                .with_radius(2.0),
        ];
        for options in &variants {
            let pool = MedoidSolver::new(&tree, options).unwrap().pool_size();
            assert_eq!(check_against_brute_force(&tree, options), pool + 1);
        }

        let tree = BinaryTree::from_newick(SMALL_TREES[4]).unwrap();
        let excluded = SolverOptions::new().with_prior_centers(["j"]).with_excluded(["a", "b"]);
        assert_eq!(check_against_brute_force(&tree, &excluded), 9);
        let fully = SolverOptions::new().with_fully_excluded(["j", "c"]).with_radius(3.0);
        assert_eq!(check_against_brute_force(&tree, &fully), 9);
    }

    #[test]
    fn test_tables_sized_by_pool_below() {
        let tree = BinaryTree::from_newick(SMALL_TREES[4]).unwrap();
        let options = SolverOptions::new().with_excluded(["e", "f", "g", "h", "i", "j"]);
        let solver = MedoidSolver::new(&tree, &options).unwrap();
        assert_eq!(solver.pool_size(), 4);

        let n = 3;
        let tables = solver.fill_tables(n);
        for v in tree.postorder() {
            match &tables[v] {
                Some(table) => {
                    assert_eq!(table.width, solver.pool_below[v].min(n) + 1, "node {v}");
                    assert_eq!(table.cost.len(), solver.candidates.len() * table.width);
                    assert_eq!(solver.entry(&tables, v, table.width, 0), INF);
                }
                None => assert!(tree.is_leaf(v)),
            }
        }
        // The right-hand clade has nothing selectable and keeps only k = 0.
        let e = tree.leaf_by_label("e").unwrap();
        let right = tree.parent(e).unwrap();
        assert_eq!(tables[right].as_ref().unwrap().width, 1);

        assert_eq!(solver.solve(n).unwrap().representatives.len(), n);
    }

    #[test]
    fn test_cost_non_increasing_in_n() {
        for newick in SMALL_TREES {
            let tree = BinaryTree::from_newick(newick).unwrap();
            for options in [SolverOptions::new(), SolverOptions::new().with_radius(1.25)] {
                let solver = MedoidSolver::new(&tree, &options).unwrap();
                let costs: Vec<f64> = (1..=solver.pool_size()).map(|n| solver.solve(n).unwrap().cost).collect();
                for (prev, next) in costs.iter().tuple_windows() {
                    assert!(next <= &(prev + 1e-9), "{costs:?}");
                }
                // Every leaf selected: nothing left to pay.
                assert_close(*costs.last().unwrap(), 0.0);
            }
        }
    }

    #[test]
    fn test_adding_prior_never_increases_cost() {
        let tree = BinaryTree::from_newick(SMALL_TREES[2]).unwrap();
        let mut priors: Vec<&str> = Vec::new();
        let mut previous = vec![INF; 4];
        for extra in ["g", "a", "e", "i"] {
            priors.push(extra);
            let solver = MedoidSolver::new(&tree, &SolverOptions::new().with_prior_centers(priors.clone())).unwrap();
            for (n, prev) in previous.iter_mut().enumerate() {
                let cost = solver.solve(n).unwrap().cost;
                assert!(cost <= *prev + 1e-9);
                *prev = cost;
            }
        }
    }

    #[test]
    fn test_excluded_taxa_never_chosen() {
        let tree = BinaryTree::from_newick(TREE_1).unwrap();
        let options = SolverOptions::new().with_excluded(["e"]).with_fully_excluded(["a"]);
        let solver = MedoidSolver::new(&tree, &options).unwrap();
        assert_eq!(solver.pool_size(), 3);
        for n in 1..=3 {
            let result = solver.solve(n).unwrap();
            assert!(!result.representatives.iter().any(|r| r == "e" || r == "a"));
        }
        // c pays b 6, e 4, d 3; a is not counted at all.
        let result = solver.solve(1).unwrap();
        assert_eq!(result.representatives, vec!["c"]);
        assert_close(result.cost, 13.0);
    }

    #[test]
    fn test_prior_may_also_be_selected() {
        let tree = BinaryTree::from_newick(TREE_1).unwrap();
        let solver = MedoidSolver::new(&tree, &SolverOptions::new().with_prior_centers(["b"])).unwrap();
        let result = solver.solve(5).unwrap();
        assert_eq!(labels(&result), vec!["a", "b", "c", "d", "e"]);
        assert_close(result.cost, 0.0);
    }

    #[test]
    fn test_invalid_configurations() {
        let tree = BinaryTree::from_newick(TREE_1).unwrap();

        let err = solve(&tree, 6, &SolverOptions::new()).unwrap_err();
        assert!(matches!(err, MedoidError::InvalidConfiguration(_)));

        let err = solve(&tree, 5, &SolverOptions::new().with_excluded(["a"])).unwrap_err();
        assert!(matches!(err, MedoidError::InvalidConfiguration(_)));

        let err = MedoidSolver::new(&tree, &SolverOptions::new().with_radius(-1.0)).unwrap_err();
        assert!(matches!(err, MedoidError::InvalidConfiguration(_)));

        let err = MedoidSolver::new(&tree, &SolverOptions::new().with_radius(f64::NAN)).unwrap_err();
        assert!(matches!(err, MedoidError::InvalidConfiguration(_)));

        let err = MedoidSolver::new(&tree, &SolverOptions::new().with_prior_centers(["x"])).unwrap_err();
        assert!(matches!(err, MedoidError::InvalidConfiguration(_)));

        let options = SolverOptions::new().with_excluded(["a"]).with_fully_excluded(["a"]);
        let err = MedoidSolver::new(&tree, &options).unwrap_err();
        assert!(matches!(err, MedoidError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_zero_length_edges() {
        let tree = BinaryTree::from_newick("((a:0,b:0):0,(c:0,d:1):0);").unwrap();
        let solver = MedoidSolver::new(&tree, &SolverOptions::new()).unwrap();
        let result = solver.solve(1).unwrap();
        assert_close(result.cost, 1.0);
        assert_close(solver.solve(2).unwrap().cost, 0.0);
    }

    #[test]
    fn test_solver_is_reusable_across_threads() {
        let tree = BinaryTree::from_newick(SMALL_TREES[4]).unwrap();
        let solver = MedoidSolver::new(&tree, &SolverOptions::new().with_radius(2.0)).unwrap();
        let sequential: Vec<f64> = (0..=4).map(|n| solver.solve(n).unwrap().cost).collect();
        let parallel: Vec<f64> = (0..=4usize).into_par_iter().map(|n| solver.solve(n).unwrap().cost).collect();
        assert_eq!(sequential, parallel);
    }
}
