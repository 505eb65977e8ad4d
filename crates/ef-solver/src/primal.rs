//! Primal solver: entropy minimization directly in probability space.
//!
//! Minimizes Σ (x+ε)·ln(x+ε) subject to `A·x = b` and `0 ≤ x ≤ 1`. The
//! ε guard keeps the objective and its derivatives finite at cells the
//! constraints force to zero. The iteration is a damped Newton method on
//! the KKT conditions with the exact (diagonal) Hessian; each step
//! solves the Schur complement system of size M+1 instead of the full
//! KKT system of size n²+M+1, then backtracks just enough to stay inside
//! the box.

use crate::error::{SolverError, SolverResult};
use crate::solution::Solution;
use ef_core::Deadline;
use ef_model::ConstraintSystem;
use nalgebra::{DMatrix, DVector};
use std::time::Duration;
use tracing::debug;

/// Primal solver configuration.
#[derive(Debug, Clone)]
pub struct PrimalConfig {
    /// Convergence threshold applied to both the equality residual norm
    /// and the damped step norm.
    pub tol: f64,
    /// Maximum KKT iterations.
    pub max_iterations: usize,
    /// Optional wall-clock budget, enforced through the iteration
    /// callback.
    pub time_budget: Option<Duration>,
    /// Additive guard inside the logarithm.
    pub epsilon: f64,
}

impl Default for PrimalConfig {
    fn default() -> Self {
        Self {
            tol: 1e-9,
            max_iterations: 1000,
            time_budget: None,
            epsilon: 1e-18,
        }
    }
}

/// Largest step fraction in (0, 1] keeping `x + α·d` inside the unit
/// box. Coordinates whose movement is negligible relative to the
/// largest one are ignored, so roundoff at an already-active bound
/// cannot freeze the iteration at α = 0.
fn max_feasible_step(x: &DVector<f64>, d: &DVector<f64>) -> f64 {
    let scale = d.amax();
    if scale == 0.0 {
        return 1.0;
    }
    let cutoff = 1e-13 * scale;
    let mut alpha: f64 = 1.0;
    for i in 0..x.len() {
        let di = d[i];
        if di < -cutoff {
            alpha = alpha.min(-x[i] / di);
        } else if di > cutoff {
            alpha = alpha.min((1.0 - x[i]) / di);
        }
    }
    alpha.max(0.0)
}

/// Equality- and box-constrained minimizer of Σ (x+ε)·ln(x+ε).
///
/// `on_iteration` runs at the top of every iteration with the 0-based
/// iteration index; returning an error aborts the optimizer mid-run and
/// propagates to the caller unchanged.
///
/// Like the dual solver, running out of iterations returns the last
/// iterate with `converged = false` rather than an error.
pub fn minimize_entropy_constrained<F>(
    x0: DVector<f64>,
    a_eq: &DMatrix<f64>,
    b_eq: &DVector<f64>,
    config: &PrimalConfig,
    mut on_iteration: F,
) -> SolverResult<Solution>
where
    F: FnMut(usize) -> SolverResult<()>,
{
    let mut x = x0;
    let mut iterations = 0;
    let mut converged = false;

    for iter in 0..config.max_iterations {
        on_iteration(iter)?;
        iterations = iter + 1;

        // Gradient ln(x+ε)+1 and inverse curvature diag(x+ε) of the
        // objective at the current iterate.
        let grad = x.map(|v| (v + config.epsilon).ln() + 1.0);
        let weights = x.map(|v| v + config.epsilon);

        let r = b_eq - a_eq * &x;

        // Schur complement S = A·W⁻¹·Aᵗ with W the objective Hessian;
        // the multipliers y solve S·y = −r − A·W⁻¹·∇f and the step is
        // d = −W⁻¹·(∇f + Aᵗy).
        let mut aw = a_eq.clone();
        for (j, mut col) in aw.column_iter_mut().enumerate() {
            col *= weights[j];
        }
        let s_mat = &aw * a_eq.transpose();
        let rhs = -(&aw * &grad) - &r;
        let y = s_mat.lu().solve(&rhs).ok_or_else(|| SolverError::Optimizer {
            what: format!("KKT system solve failed at iteration {iter}"),
        })?;
        let d = -(&grad + a_eq.tr_mul(&y)).component_mul(&weights);

        let alpha = max_feasible_step(&x, &d);
        let step_norm = alpha * d.norm();
        let res_norm = r.norm();
        if !res_norm.is_finite() || !step_norm.is_finite() {
            return Err(SolverError::NonFinite {
                what: "KKT step",
                iteration: iter,
            });
        }

        x += alpha * &d;
        // Clip roundoff so bound-active cells sit at exactly 0 or 1.
        x.apply(|v| *v = v.clamp(0.0, 1.0));

        if res_norm < config.tol && step_norm < config.tol {
            converged = true;
            debug!(iterations, res_norm, "primal optimizer converged");
            break;
        }
    }

    let residual_norm = (a_eq * &x - b_eq).norm();
    Ok(Solution {
        p: x,
        iterations,
        converged,
        residual_norm,
    })
}

/// Solve the maximum-entropy problem in probability space.
///
/// Appends an explicit sum-to-one row to the constraint system (the
/// primal form has no softmax to enforce it), starts from the uniform
/// vector, and installs a deadline callback that aborts the optimizer
/// once the time budget is spent.
pub fn primal_maxent(system: &ConstraintSystem, config: &PrimalConfig) -> SolverResult<Solution> {
    let deadline = Deadline::start(config.time_budget);

    let m = system.num_rows();
    let n = system.num_vars();
    let a_eq = system.g().clone().insert_row(m, 1.0);
    let b_eq = system.a().clone().insert_row(m, 1.0);
    let x0 = DVector::from_element(n, 1.0 / n as f64);

    minimize_entropy_constrained(x0, &a_eq, &b_eq, config, |_iter| {
        if deadline.expired() {
            Err(SolverError::timeout(&deadline))
        } else {
            Ok(())
        }
    })
}
