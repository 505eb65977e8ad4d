//! Dual Newton solver for constrained maximum entropy.
//!
//! Maximizes −Σ p·ln p subject to `G·p = a` and Σp = 1 by running
//! Newton's method on the unconstrained Lagrange dual. The dual variable
//! `z` has one entry per constraint row; the primal iterate is recovered
//! as a softmax of `Gᵗz`, which keeps Σp = 1 and p > 0 by construction,
//! so those two conditions never need explicit handling.

use crate::error::{SolverError, SolverResult};
use crate::rank::numeric_rank;
use crate::solution::Solution;
use ef_core::Deadline;
use ef_model::ConstraintSystem;
use nalgebra::DVector;
use std::time::Duration;
use tracing::debug;

/// Dual Newton configuration.
#[derive(Debug, Clone)]
pub struct NewtonConfig {
    /// Convergence threshold on the constraint residual norm ‖G·p − a‖.
    pub tol: f64,
    /// Maximum Newton iterations.
    pub max_iterations: usize,
    /// Optional wall-clock budget, checked at the top of every iteration.
    pub time_budget: Option<Duration>,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            tol: 1e-8,
            max_iterations: 100,
            time_budget: None,
        }
    }
}

/// Softmax with the maximum subtracted before exponentiating. The shift
/// cancels in the normalization but keeps `exp` away from overflow as
/// the dual variables grow with system size.
fn stable_softmax(scores: &DVector<f64>) -> DVector<f64> {
    let shift = scores.iter().fold(f64::NEG_INFINITY, |m, &v| m.max(v));
    let mut p = scores.map(|v| (v - shift).exp());
    let total = p.sum();
    p /= total;
    p
}

/// Solve the maximum-entropy problem on the dual.
///
/// The constraint rows must be linearly independent of each other *and*
/// of the implicit sum-to-one row: the softmax is invariant under shifts
/// of `Gᵗz` along the all-ones direction, so any dependence there makes
/// the dual Hessian singular everywhere. The augmented matrix `[1ᵗ; G]`
/// is rank-checked up front and degenerate systems are rejected before
/// any iteration runs.
///
/// An exhausted iteration budget is reported through `converged = false`
/// on the returned [`Solution`], not as an error. Rank deficiency, a
/// singular Hessian and an expired time budget are errors.
pub fn newton_maxent(system: &ConstraintSystem, config: &NewtonConfig) -> SolverResult<Solution> {
    let deadline = Deadline::start(config.time_budget);

    let m = system.num_rows();
    let n = system.num_vars();
    let expected = m + 1;
    let rank = numeric_rank(&system.augmented());
    if rank < expected {
        return Err(SolverError::DegenerateConstraints { rank, expected });
    }

    let g = system.g();
    let a = system.a();
    let mut z = DVector::<f64>::zeros(m);
    // Iterate for z = 0; only returned as-is when max_iterations is 0.
    let mut p = DVector::from_element(n, 1.0 / n as f64);
    let mut iterations = 0;
    let mut residual_norm = f64::INFINITY;

    for iter in 0..config.max_iterations {
        if deadline.expired() {
            return Err(SolverError::timeout(&deadline));
        }

        p = stable_softmax(&g.tr_mul(&z));
        let h = g * &p - a;
        residual_norm = h.norm();
        iterations = iter + 1;

        if !residual_norm.is_finite() {
            return Err(SolverError::NonFinite {
                what: "constraint residual",
                iteration: iter,
            });
        }
        if residual_norm < config.tol {
            debug!(iterations, residual_norm, "dual Newton converged");
            return Ok(Solution {
                p,
                iterations,
                converged: true,
                residual_norm,
            });
        }

        // Dual Hessian H = G·diag(p)·Gᵗ − (G·p)(G·p)ᵗ, the covariance of
        // the constraint features under p. Scaling the columns of G by p
        // avoids materializing the n²×n² diagonal.
        let gp = g * &p;
        let mut gw = g.clone();
        for (j, mut col) in gw.column_iter_mut().enumerate() {
            col *= p[j];
        }
        let hess = &gw * g.transpose() - &gp * gp.transpose();

        let dz = hess
            .lu()
            .solve(&(-&h))
            .ok_or(SolverError::SingularHessian { iteration: iter })?;
        z += dz;
    }

    debug!(
        iterations,
        residual_norm, "dual Newton stopped at iteration budget"
    );
    Ok(Solution {
        p,
        iterations,
        converged: false,
        residual_norm,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn softmax_sums_to_one() {
        let p = stable_softmax(&DVector::from_vec(vec![0.3, -1.2, 2.5, 0.0]));
        assert!((p.sum() - 1.0).abs() < 1e-12);
        assert!(p.iter().all(|&v| v > 0.0));
    }

    #[test]
    fn softmax_is_shift_invariant() {
        let s = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let shifted = s.map(|v| v + 100.0);
        let diff = stable_softmax(&s) - stable_softmax(&shifted);
        assert!(diff.amax() < 1e-12);
    }

    #[test]
    fn softmax_survives_large_scores() {
        let p = stable_softmax(&DVector::from_vec(vec![1000.0, 999.0, 500.0]));
        assert!(p.iter().all(|v| v.is_finite()));
        assert!((p.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_scores_give_uniform() {
        let p = stable_softmax(&DVector::zeros(5));
        for v in p.iter() {
            assert!((v - 0.2).abs() < 1e-15);
        }
    }
}
