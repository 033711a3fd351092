//! Linear solve of the reduced stiffness system.

use log::{debug, warn};
use nalgebra::DVector;

use crate::errors::AnalysisError;
use crate::options::{LinearSolver, SolverOptions};
use crate::reduction::ReducedSystem;

/// Ratio between the smallest and largest absolute pivot.
///
/// Zero, NaN or an empty pivot set all read as fully singular.
fn pivot_ratio(pivots: impl Iterator<Item = f64>) -> f64 {
    let (min, max) = pivots.fold((f64::INFINITY, 0.0_f64), |(min, max), pivot| {
        let pivot = pivot.abs();
        (min.min(pivot), max.max(pivot))
    });
    if max > 0.0 && min.is_finite() {
        min / max
    } else {
        0.0
    }
}

/// LU solve guarded by the pivot-ratio singularity check.
fn solve_lu(system: &ReducedSystem, tolerance: f64) -> Result<DVector<f64>, AnalysisError> {
    let singular = |measure: f64| AnalysisError::SingularStructure { measure, tolerance };
    let lu = system.stiffness.clone().lu();
    let measure = pivot_ratio(lu.u().diagonal().iter().copied());
    debug!("lu pivot ratio {measure:e}");
    if measure < tolerance {
        return Err(singular(measure));
    }
    lu.solve(&system.load).ok_or_else(|| singular(measure))
}

/// Solve `Kff * u_f = F_f` for the free displacements.
///
/// An empty system (no free DOFs) has the empty solution. When the Cholesky
/// factorization breaks down the system is handed to LU, which either solves it or
/// reports the failing pivot ratio.
pub(crate) fn solve(
    system: &ReducedSystem,
    options: &SolverOptions,
) -> Result<DVector<f64>, AnalysisError> {
    if system.load.is_empty() {
        return Ok(DVector::zeros(0));
    }
    let tolerance = options.singularity_tolerance;

    match options.linear_solver {
        LinearSolver::Cholesky => {
            let Some(cholesky) = system.stiffness.clone().cholesky() else {
                warn!("stiffness is not positive definite, falling back to lu");
                return solve_lu(system, tolerance);
            };
            // The pivots of K = L L^T are the squared diagonal entries of L.
            let measure = pivot_ratio(cholesky.l_dirty().diagonal().iter().map(|l| l * l));
            debug!("cholesky pivot ratio {measure:e}");
            if measure < tolerance {
                return Err(AnalysisError::SingularStructure { measure, tolerance });
            }
            Ok(cholesky.solve(&system.load))
        }
        LinearSolver::Lu => solve_lu(system, tolerance),
    }
}
