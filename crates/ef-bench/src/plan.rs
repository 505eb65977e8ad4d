//! Experiment plan: which sizes to sweep and under which limits.

use crate::{BenchError, BenchResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Declarative description of a benchmark sweep.
///
/// Loadable from YAML; omitted fields take their defaults, so a plan
/// file can override just the knob it cares about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentPlan {
    /// Problem sizes (number of cities) to sweep, in run order.
    pub sizes: Vec<usize>,
    /// Hard wall-clock limit per method and size, in seconds.
    pub timeout_s: f64,
    /// Largest size the dual Newton method is attempted at. Its Hessian
    /// work grows much faster than the primal path's, so past this size
    /// only the primal methods run.
    pub newton_max_n: usize,
    /// Base RNG seed. Size n draws its synthetic matrix with seed + n,
    /// so each scenario is reproducible on its own.
    pub seed: u64,
}

impl Default for ExperimentPlan {
    fn default() -> Self {
        Self {
            sizes: (1..=10).map(|k| k * 10).collect(),
            timeout_s: 30.0,
            newton_max_n: 30,
            seed: 42,
        }
    }
}

impl ExperimentPlan {
    pub fn from_yaml(text: &str) -> BenchResult<Self> {
        let plan: ExperimentPlan = serde_yaml::from_str(text)?;
        plan.validate()?;
        Ok(plan)
    }

    pub fn to_yaml(&self) -> BenchResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject plans that cannot produce a meaningful sweep.
    ///
    /// Sizes below 3 are excluded: a 1-city system pins its only cell to
    /// zero while requiring the distribution to sum to one, and a 2-city
    /// system carries more independent constraints (five, counting
    /// normalization) than its four unknowns, so every method fails on
    /// it by construction.
    pub fn validate(&self) -> BenchResult<()> {
        if self.sizes.is_empty() {
            return Err(BenchError::InvalidPlan {
                what: "sizes must not be empty".to_string(),
            });
        }
        if let Some(&n) = self.sizes.iter().find(|&&n| n < 3) {
            return Err(BenchError::InvalidPlan {
                what: format!("size {} is below the 3-city minimum", n),
            });
        }
        if !(self.timeout_s > 0.0) {
            return Err(BenchError::InvalidPlan {
                what: format!("timeout_s must be positive, got {}", self.timeout_s),
            });
        }
        // A plan file can hold any f64; only accept values Duration can
        // carry, so the runner never has to re-check the deadline.
        if Duration::try_from_secs_f64(self.timeout_s).is_err() {
            return Err(BenchError::InvalidPlan {
                what: format!(
                    "timeout_s {} is not representable as a duration",
                    self.timeout_s
                ),
            });
        }
        Ok(())
    }
}
