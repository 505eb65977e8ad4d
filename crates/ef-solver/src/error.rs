//! Error types for solver operations.

use ef_core::Deadline;
use thiserror::Error;

/// Errors produced by the maximum-entropy solvers.
#[derive(Error, Debug)]
pub enum SolverError {
    /// The augmented constraint matrix is rank deficient, so the dual
    /// problem has no unique stationary point.
    #[error("degenerate constraint system: augmented rank {rank}, expected {expected}")]
    DegenerateConstraints { rank: usize, expected: usize },

    /// The dual Hessian could not be factorized.
    #[error("singular Hessian in Newton step at iteration {iteration}")]
    SingularHessian { iteration: usize },

    /// The wall-clock budget ran out before convergence.
    #[error("time budget exceeded: {elapsed_s:.3}s elapsed, budget {budget_s:.3}s")]
    TimeoutExceeded { elapsed_s: f64, budget_s: f64 },

    /// The constrained optimizer failed for a reason other than time.
    #[error("optimizer failure: {what}")]
    Optimizer { what: String },

    /// A non-finite value surfaced mid-iteration.
    #[error("non-finite {what} at iteration {iteration}")]
    NonFinite { what: &'static str, iteration: usize },
}

impl SolverError {
    /// Timeout error snapshotting an expired deadline.
    pub(crate) fn timeout(deadline: &Deadline) -> Self {
        Self::TimeoutExceeded {
            elapsed_s: deadline.elapsed().as_secs_f64(),
            budget_s: deadline
                .budget()
                .map(|b| b.as_secs_f64())
                .unwrap_or_default(),
        }
    }
}

/// Convenience alias for solver operations.
pub type SolverResult<T> = Result<T, SolverError>;
