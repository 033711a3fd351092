//! Solver configuration.

use serde::{Deserialize, Serialize};

/// Factorization used to solve the reduced stiffness system.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinearSolver {
    /// Cholesky factorization, the natural choice for the symmetric positive
    /// definite system of a stable truss.
    #[default]
    Cholesky,
    /// LU factorization with partial pivoting.
    Lu,
}

/// Options controlling how [`Truss::solve`](crate::Truss::solve) runs.
///
/// Every field has a default, so a JSON options file only needs the values it
/// overrides.
///
/// # Examples
/// ```
/// use spacetruss::{LinearSolver, SolverOptions};
///
/// let options = SolverOptions::default()
///     .with_linear_solver(LinearSolver::Lu)
///     .with_singularity_tolerance(1.0e-12);
/// assert_eq!(options.linear_solver, LinearSolver::Lu);
/// assert!(options.check_equilibrium);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Factorization used for the reduced system.
    pub linear_solver: LinearSolver,
    /// Smallest acceptable ratio between the smallest and largest pivot of the
    /// factorization. Anything below it is reported as a singular structure.
    pub singularity_tolerance: f64,
    /// Verify that reactions balance the applied loads after recovery.
    pub check_equilibrium: bool,
    /// Relative tolerance of the equilibrium check, scaled by the total load.
    pub equilibrium_tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            linear_solver: LinearSolver::Cholesky,
            singularity_tolerance: 1.0e-10,
            check_equilibrium: true,
            equilibrium_tolerance: 1.0e-6,
        }
    }
}

impl SolverOptions {
    /// Select the factorization.
    #[must_use]
    pub fn with_linear_solver(mut self, linear_solver: LinearSolver) -> Self {
        self.linear_solver = linear_solver;
        self
    }

    /// Set the singularity tolerance.
    #[must_use]
    pub fn with_singularity_tolerance(mut self, tolerance: f64) -> Self {
        self.singularity_tolerance = tolerance;
        self
    }

    /// Set the equilibrium tolerance.
    #[must_use]
    pub fn with_equilibrium_tolerance(mut self, tolerance: f64) -> Self {
        self.equilibrium_tolerance = tolerance;
        self
    }

    /// Turn the post-solve equilibrium check off.
    #[must_use]
    pub fn without_equilibrium_check(mut self) -> Self {
        self.check_equilibrium = false;
        self
    }
}
