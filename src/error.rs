//! Error taxonomy shared by every stage of a solve.
//!
//! Input problems are reported before any dynamic-programming work starts,
//! so a failed call never returns a partial selection.

use phylotree::tree::TreeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MedoidError {
    /// Bad `n`, negative radius, unknown labels or overlapping exclusion sets.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("degenerate tree: need at least 2 leaves, found {leaves}")]
    DegenerateTree { leaves: usize },

    /// Structural problems found while building the binary tree.
    #[error("invalid tree: {0}")]
    InvalidTree(String),

    #[error("failed to parse newick: {0}")]
    Newick(String),

    #[error("tree error: {0}")]
    Tree(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid taxon pattern: {0}")]
    Regex(#[from] regex::Error),
}

impl From<TreeError> for MedoidError {
    fn from(e: TreeError) -> Self {
        MedoidError::Tree(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MedoidError>;
