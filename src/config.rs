//! Inputs of a solve besides the tree and `n`.

/// Radius, prior centers and exclusion sets for [`crate::MedoidSolver`].
///
/// All label sets refer to leaf labels; they are resolved (and rejected if
/// unknown) when the solver is built.
///
/// # Example
/// ```
/// # use rust_python_tree_medoids::SolverOptions;
/// let options = SolverOptions::new()
///     .with_radius(4.5)
///     .with_prior_centers(["b"])
///     .with_excluded(["c"]);
/// assert_eq!(options.radius, Some(4.5));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolverOptions {
    /// Leaves within this distance of a representative cost nothing; `None` means unbounded.
    pub radius: Option<f64>,
    /// Already placed, fixed representatives.
    pub prior_centers: Vec<String>,
    /// Counted in the objective, never chosen.
    pub excluded: Vec<String>,
    /// Neither counted nor chosen.
    pub fully_excluded: Vec<String>,
}

impl SolverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn with_prior_centers<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prior_centers = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_excluded<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_fully_excluded<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fully_excluded = labels.into_iter().map(Into::into).collect();
        self
    }
}
