//! ef-bench: benchmark orchestration for the entroflow solvers.
//!
//! A sweep takes an [`ExperimentPlan`], generates one synthetic problem
//! per size, runs every applicable [`Method`] under the hard deadline
//! from ef-guard, and persists the measurements through ef-results.

pub mod plan;
pub mod runner;

pub use plan::ExperimentPlan;
pub use runner::{error_metrics, run_method, run_plan, run_scenario, Method};

pub type BenchResult<T> = Result<T, BenchError>;

#[derive(thiserror::Error, Debug)]
pub enum BenchError {
    #[error("model error: {0}")]
    Model(#[from] ef_model::ModelError),

    #[error("results error: {0}")]
    Results(#[from] ef_results::ResultsError),

    #[error("plan YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid plan: {what}")]
    InvalidPlan { what: String },
}
