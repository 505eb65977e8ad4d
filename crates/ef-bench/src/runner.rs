//! Sweep execution: synthetic data in, benchmark records out.

use crate::plan::ExperimentPlan;
use crate::{BenchError, BenchResult};
use ef_guard::{run_with_deadline, GuardOutcome};
use ef_model::{marginal_constraints, synthetic_flows, ConstraintSystem, SyntheticSpec};
use ef_results::{compute_run_id, utc_timestamp, BenchmarkRecord, RunManifest, RunStore};
use ef_solver::{newton_maxent, primal_maxent, NewtonConfig, PrimalConfig, Solution};
use nalgebra::DVector;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Estimation methods as they appear in records and reports.
///
/// The BFGS and L-BFGS labels are kept distinct for reporting because
/// runs are filed under them, but both resolve to the same primal
/// constrained solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Newton,
    Bfgs,
    Lbfgs,
}

impl Method {
    pub const ALL: [Method; 3] = [Method::Newton, Method::Bfgs, Method::Lbfgs];

    pub fn label(&self) -> &'static str {
        match self {
            Method::Newton => "Newton",
            Method::Bfgs => "BFGS",
            Method::Lbfgs => "L-BFGS",
        }
    }

    /// Inverse of [`label`](Self::label), tolerant of case and the
    /// optional hyphen.
    pub fn parse(name: &str) -> Option<Method> {
        match name.to_ascii_lowercase().replace('-', "").as_str() {
            "newton" => Some(Method::Newton),
            "bfgs" => Some(Method::Bfgs),
            "lbfgs" => Some(Method::Lbfgs),
            _ => None,
        }
    }
}

/// Mean absolute and root-mean-square error between an estimate and the
/// ground truth, both flattened.
pub fn error_metrics(estimate: &DVector<f64>, truth: &DVector<f64>) -> (f64, f64) {
    let diff = estimate - truth;
    let mae = diff.abs().mean();
    let rmse = diff.map(|d| d * d).mean().sqrt();
    (mae, rmse)
}

/// Run one method on one constraint system under the hard deadline.
pub fn run_method(
    system: &Arc<ConstraintSystem>,
    method: Method,
    timeout: Duration,
) -> GuardOutcome<Solution> {
    let system = Arc::clone(system);
    run_with_deadline(timeout, method.label(), move || match method {
        Method::Newton => {
            let config = NewtonConfig {
                time_budget: Some(timeout),
                ..Default::default()
            };
            newton_maxent(&system, &config)
        }
        Method::Bfgs | Method::Lbfgs => {
            let config = PrimalConfig {
                time_budget: Some(timeout),
                ..Default::default()
            };
            primal_maxent(&system, &config)
        }
    })
}

fn to_record(
    n_cities: usize,
    method: Method,
    outcome: GuardOutcome<Solution>,
    elapsed_s: f64,
    truth: &DVector<f64>,
) -> BenchmarkRecord {
    let status = outcome.status().to_string();
    let mut record = BenchmarkRecord {
        n_cities,
        method: method.label().to_string(),
        status,
        elapsed_s,
        iterations: None,
        mae: None,
        rmse: None,
        error: None,
    };
    match outcome {
        GuardOutcome::Completed(solution) => {
            let (mae, rmse) = error_metrics(&solution.p, truth);
            record.iterations = Some(solution.iterations);
            record.mae = Some(mae);
            record.rmse = Some(rmse);
        }
        GuardOutcome::Failed { error } => {
            record.error = Some(error);
        }
        GuardOutcome::TimedOut => {}
    }
    record
}

/// Benchmark every applicable method at one problem size.
///
/// Generates the seeded synthetic matrix for this size, derives its
/// constraint system once, and measures each method against the known
/// ground truth. The Newton method is skipped entirely above the plan's
/// `newton_max_n`.
pub fn run_scenario(n_cities: usize, plan: &ExperimentPlan) -> BenchResult<Vec<BenchmarkRecord>> {
    let timeout =
        Duration::try_from_secs_f64(plan.timeout_s).map_err(|_| BenchError::InvalidPlan {
            what: format!(
                "timeout_s {} is not representable as a duration",
                plan.timeout_s
            ),
        })?;
    let spec = SyntheticSpec {
        n_cities,
        seed: plan.seed.wrapping_add(n_cities as u64),
        ..Default::default()
    };
    let (_names, flows) = synthetic_flows(&spec)?;
    let truth = flows.normalize()?;
    let truth_flat = truth.flatten();
    let system = Arc::new(marginal_constraints(&truth));

    let mut records = Vec::new();
    for method in Method::ALL {
        if method == Method::Newton && n_cities > plan.newton_max_n {
            debug!(n_cities, "skipping Newton above its size ceiling");
            continue;
        }

        let started = Instant::now();
        let outcome = run_method(&system, method, timeout);
        let elapsed_s = started.elapsed().as_secs_f64();

        info!(
            n_cities,
            method = method.label(),
            status = outcome.status(),
            elapsed_s,
            "measurement complete"
        );
        records.push(to_record(n_cities, method, outcome, elapsed_s, &truth_flat));
    }

    Ok(records)
}

/// Execute a full plan and persist the run.
///
/// The run ID is a content hash of the plan and solver version, so
/// repeating an identical sweep overwrites its own directory instead of
/// accumulating duplicates.
pub fn run_plan(plan: &ExperimentPlan, store: &RunStore) -> BenchResult<RunManifest> {
    plan.validate()?;

    let solver_version = env!("CARGO_PKG_VERSION");
    let run_id = compute_run_id(plan, solver_version);
    info!(run_id = %run_id, sizes = ?plan.sizes, "starting benchmark sweep");

    let mut records = Vec::new();
    for &n in &plan.sizes {
        records.extend(run_scenario(n, plan)?);
    }

    let manifest = RunManifest {
        run_id,
        timestamp: utc_timestamp(),
        solver_version: solver_version.to_string(),
        sizes: plan.sizes.clone(),
        timeout_s: plan.timeout_s,
        newton_max_n: plan.newton_max_n,
        seed: plan.seed,
    };
    store.save_run(&manifest, &records)?;
    info!(run_id = %manifest.run_id, records = records.len(), "sweep saved");
    Ok(manifest)
}
