//! Crate root: lightweight module orchestration and public re-exports.
//!
//! Picks `n` representative taxa (medoids) of a phylogenetic tree so that the
//! summed patristic distance from every counted taxon to its nearest
//! representative is minimal, optionally thresholded by a coverage radius and
//! seeded with prior centers.
//!
//! Modules:
//! - `tree`: binarized arena tree built from NEWICK via `phylotree`.
//! - `oracle`: root distances, LCA and baseline distances to prior centers.
//! - `classify`: selectable / excluded / fully excluded taxa.
//! - `config`: solver options.
//! - `solver`: exact dynamic program over (node, count, serving center).
//! - `search`: minimum cover search and parallel batches of solves.
//! - `assign`: nearest-representative mapping of every node.
//! - `color`: clade colors for tree viewers.
//! - `io`: reading NEWICK/NEXUS trees, writing TSV and colored NEXUS.
//! - `api`: Python bindings via `pyo3` (gated behind "python" feature).

pub mod assign;
pub mod classify;
pub mod color;
pub mod config;
pub mod error;
pub mod io;
pub mod oracle;
pub mod search;
pub mod solver;
pub mod tree;

#[cfg(feature = "python")]
pub mod api;

// Re-export frequently used types & functions
pub use assign::{Assignment, CladeAssignment, Representative};
pub use classify::{Classification, TaxonClass};
pub use color::CladeColoring;
pub use config::SolverOptions;
pub use error::{MedoidError, Result};
pub use io::{read_tree, write_assignments_tsv, write_colored_nexus};
pub use oracle::DistanceOracle;
pub use search::min_cover;
pub use solver::{MedoidSolver, SolveResult, solve};
pub use tree::{BinaryTree, NodeIndex};
