//! ef-model: origin–destination flow data and linear constraint systems.
//!
//! This crate owns the data the solvers consume: observed flow matrices,
//! their normalized probability form, and the linear constraint system
//! (G, a) that encodes row/column marginals plus forced-zero self-flow.
//! A seeded synthetic generator produces reproducible test problems.

pub mod constraints;
pub mod error;
pub mod flow;
pub mod generator;

pub use constraints::{ConstraintBuilder, ConstraintSystem, marginal_constraints};
pub use error::{ModelError, ModelResult};
pub use flow::{FlowMatrix, ProbabilityMatrix};
pub use generator::{SyntheticSpec, city_names, synthetic_flows};
