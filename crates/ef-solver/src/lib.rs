//! Maximum-entropy solvers over flow constraint systems.
//!
//! Two routes to the same optimum:
//!
//! - [`newton_maxent`] runs Newton's method on the Lagrange dual, with
//!   the primal recovered through a stabilized softmax. Fast while the
//!   dual Hessian stays well conditioned, which in practice bounds the
//!   system sizes it is worth attempting.
//! - [`primal_maxent`] minimizes the ε-guarded entropy objective
//!   directly in probability space under equality and box constraints.
//!   Slower per iterate but robust at sizes where the dual stalls.
//!
//! Both take a [`ConstraintSystem`](ef_model::ConstraintSystem) built by
//! `ef-model` and return a [`Solution`]; running out of iterations is a
//! non-converged result, while degenerate constraints, singular Hessians
//! and expired time budgets are [`SolverError`]s.

pub mod error;
pub mod newton;
pub mod primal;
pub mod rank;
pub mod solution;

pub use error::{SolverError, SolverResult};
pub use newton::{newton_maxent, NewtonConfig};
pub use primal::{minimize_entropy_constrained, primal_maxent, PrimalConfig};
pub use rank::numeric_rank;
pub use solution::Solution;
