//! Python binding layer for representative selection.
//!
//! Provides Python functions choosing representative taxa of a NEWICK tree.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::config::SolverOptions;
use crate::error::MedoidError;
use crate::search;
use crate::solver::MedoidSolver;
use crate::tree::BinaryTree;

fn to_py_err(e: MedoidError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Helper function to assemble solver options from keyword arguments
fn build_options(
    radius: Option<f64>,
    prior_centers: Option<Vec<String>>,
    excluded: Option<Vec<String>>,
    fully_excluded: Option<Vec<String>>,
) -> SolverOptions {
    SolverOptions {
        radius,
        prior_centers: prior_centers.unwrap_or_default(),
        excluded: excluded.unwrap_or_default(),
        fully_excluded: fully_excluded.unwrap_or_default(),
    }
}

/// Choose `n` representative taxa minimizing the summed distance to the nearest representative.
///
/// Args:
///     newick: Tree in NEWICK format
///     n: Number of representatives to choose
///     radius: Taxa within this distance of a representative cost nothing (default: None)
///     prior_centers: Taxa already chosen as representatives (default: None)
///     excluded: Taxa never chosen but still counted (default: None)
///     fully_excluded: Taxa neither chosen nor counted (default: None)
///
/// Returns:
///     A tuple of (representatives, cost)
///
/// Raises:
///     ValueError: If the tree cannot be parsed, a label is unknown, or n exceeds the selectable taxa
#[pyfunction]
#[pyo3(signature = (newick, n, radius=None, prior_centers=None, excluded=None, fully_excluded=None))]
fn find_medoids(
    newick: &str,
    n: usize,
    radius: Option<f64>,
    prior_centers: Option<Vec<String>>,
    excluded: Option<Vec<String>>,
    fully_excluded: Option<Vec<String>>,
) -> PyResult<(Vec<String>, f64)> {
    let tree = BinaryTree::from_newick(newick).map_err(to_py_err)?;
    let options = build_options(radius, prior_centers, excluded, fully_excluded);

    let solver = MedoidSolver::new(&tree, &options).map_err(to_py_err)?;
    let result = solver.solve(n).map_err(to_py_err)?;
    Ok((result.representatives, result.cost))
}

/// Find the fewest representatives leaving every counted taxon within `radius`.
///
/// Args:
///     newick: Tree in NEWICK format
///     radius: Coverage radius
///     prior_centers: Taxa already chosen as representatives (default: None)
///     excluded: Taxa never chosen but still counted (default: None)
///     fully_excluded: Taxa neither chosen nor counted (default: None)
///
/// Returns:
///     (representatives, cost) for the smallest covering selection, or None if no selection covers
///
/// Raises:
///     ValueError: If the tree cannot be parsed or a label is unknown
#[pyfunction]
#[pyo3(signature = (newick, radius, prior_centers=None, excluded=None, fully_excluded=None))]
fn min_cover(
    newick: &str,
    radius: f64,
    prior_centers: Option<Vec<String>>,
    excluded: Option<Vec<String>>,
    fully_excluded: Option<Vec<String>>,
) -> PyResult<Option<(Vec<String>, f64)>> {
    let tree = BinaryTree::from_newick(newick).map_err(to_py_err)?;
    let options = build_options(Some(radius), prior_centers, excluded, fully_excluded);

    let solver = MedoidSolver::new(&tree, &options).map_err(to_py_err)?;
    let found = search::min_cover(&solver).map_err(to_py_err)?;
    Ok(found.map(|result| (result.representatives, result.cost)))
}

/// Python module definition
#[pymodule]
fn rust_python_tree_medoids(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(find_medoids, m)?)?;
    m.add_function(wrap_pyfunction!(min_cover, m)?)?;
    Ok(())
}
