//! Per-taxon selectability classes.

use crate::error::{MedoidError, Result};
use crate::tree::{BinaryTree, NodeIndex};
use std::collections::HashSet;

/// How a leaf takes part in a solve.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TaxonClass {
    /// May be chosen as a representative and is counted in the objective.
    #[default]
    Selectable,
    /// Counted in the objective but never chosen.
    ExcludedCounted,
    /// Never chosen and never counted. Stays in the topology, so distances
    /// between other leaves are unchanged.
    FullyExcluded,
}

/// Class of every node of one tree, indexed by [`NodeIndex`].
///
/// Internal nodes are stored as `FullyExcluded`; they are neither candidates
/// nor part of the objective.
#[derive(Debug, Clone)]
pub struct Classification {
    classes: Vec<TaxonClass>,
    selectable: usize,
}

impl Classification {
    /// Classify the leaves of `tree` from two disjoint label sets.
    ///
    /// # Errors
    /// `InvalidConfiguration` if a label is not a leaf of `tree` or appears in both sets.
    pub fn classify<S: AsRef<str>>(tree: &BinaryTree, excluded: &[S], fully_excluded: &[S]) -> Result<Self> {
        let Classification { mut classes, .. } = Self::all_selectable(tree);

        let excluded_nodes = resolve_labels(tree, excluded, "excluded")?;
        let fully_nodes = resolve_labels(tree, fully_excluded, "fully excluded")?;

        if let Some(&shared) = excluded_nodes.intersection(&fully_nodes).next() {
            return Err(MedoidError::InvalidConfiguration(format!(
                "taxon '{}' is both excluded and fully excluded",
                tree.label(shared).unwrap_or_default()
            )));
        }

        for &v in &excluded_nodes {
            classes[v] = TaxonClass::ExcludedCounted;
        }
        for &v in &fully_nodes {
            classes[v] = TaxonClass::FullyExcluded;
        }

        let selectable = tree.leaves().iter().filter(|&&v| classes[v] == TaxonClass::Selectable).count();
        Ok(Classification { classes, selectable })
    }

    /// Every leaf selectable.
    pub fn all_selectable(tree: &BinaryTree) -> Self {
        let mut classes = vec![TaxonClass::FullyExcluded; tree.len()];
        for &leaf in tree.leaves() {
            classes[leaf] = TaxonClass::Selectable;
        }
        Classification { classes, selectable: tree.n_leaves() }
    }

    #[inline]
    pub fn class(&self, v: NodeIndex) -> TaxonClass {
        self.classes[v]
    }

    #[inline]
    pub fn is_selectable(&self, v: NodeIndex) -> bool {
        self.classes[v] == TaxonClass::Selectable
    }

    /// Whether the leaf's coverage is part of the objective.
    #[inline]
    pub fn is_counted(&self, v: NodeIndex) -> bool {
        self.classes[v] != TaxonClass::FullyExcluded
    }

    /// Number of leaves that may be chosen.
    pub fn selectable_count(&self) -> usize {
        self.selectable
    }
}

/// Map labels to leaf indices, rejecting unknown ones.
pub(crate) fn resolve_labels<S: AsRef<str>>(tree: &BinaryTree, labels: &[S], what: &str) -> Result<HashSet<NodeIndex>> {
    labels
        .iter()
        .map(|label| {
            let label = label.as_ref();
            tree.leaf_by_label(label)
                .ok_or_else(|| MedoidError::InvalidConfiguration(format!("{what} taxon '{label}' is not a leaf of the tree")))
        })
        .collect()
}
