//! Searches and batches built on top of [`MedoidSolver`].

use crate::config::SolverOptions;
use crate::error::Result;
use crate::oracle::EPSILON;
use crate::solver::{MedoidSolver, SolveResult, solve};
use crate::tree::BinaryTree;
use rayon::prelude::*;
use tracing::debug;

#[inline]
fn is_cover(result: &SolveResult) -> bool {
    result.cost <= EPSILON
}

/// Smallest `n` whose optimal cost is zero, with its solution.
///
/// Cost never increases with `n`, so an exponential probe followed by a binary
/// search needs `O(log n)` solves. `n = 0` is tried first since prior centers
/// may already cover every counted taxon. Returns `None` when even the whole
/// selectable pool leaves some taxon uncovered.
pub fn min_cover(solver: &MedoidSolver) -> Result<Option<SolveResult>> {
    let zero = solver.solve(0)?;
    if is_cover(&zero) {
        debug!("prior centers already cover every taxon");
        return Ok(Some(zero));
    }

    let pool = solver.pool_size();
    let mut lo = 0;
    let mut hi = 1.min(pool);
    let mut found = None;
    while hi > lo {
        let result = solver.solve(hi)?;
        debug!(n = hi, cost = result.cost, "cover probe");
        if is_cover(&result) {
            found = Some(result);
            break;
        }
        lo = hi;
        hi = (hi * 2).min(pool);
    }
    let Some(mut best) = found else {
        return Ok(None);
    };

    // Invariant: `lo` does not cover, `hi` does.
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        let result = solver.solve(mid)?;
        debug!(n = mid, cost = result.cost, "cover bisect");
        if is_cover(&result) {
            hi = mid;
            best = result;
        } else {
            lo = mid;
        }
    }
    Ok(Some(best))
}

/// Solve for several `n` on one prepared solver, in parallel.
pub fn solve_many(solver: &MedoidSolver, ns: &[usize]) -> Result<Vec<SolveResult>> {
    ns.par_iter().map(|&n| solver.solve(n)).collect()
}

/// Solve one `n` under several radii, in parallel; `options.radius` is ignored.
pub fn solve_radii(tree: &BinaryTree, n: usize, options: &SolverOptions, radii: &[f64]) -> Result<Vec<SolveResult>> {
    radii
        .par_iter()
        .map(|&radius| solve(tree, n, &options.clone().with_radius(radius)))
        .collect()
}
