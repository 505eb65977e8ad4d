//! Solver output shared by the dual and primal paths.

use nalgebra::DVector;

/// Result of one solver invocation.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Flattened probability estimate, length n² in row-major cell order.
    pub p: DVector<f64>,
    /// Iterations consumed (0 if the iteration loop never ran).
    pub iterations: usize,
    /// Whether the convergence test passed within the iteration budget.
    ///
    /// An exhausted budget is not an error: the last iterate is still
    /// returned and the caller decides whether it is usable.
    pub converged: bool,
    /// Equality residual norm of the solver's own system at the final
    /// iterate.
    pub residual_norm: f64,
}
