use clap::{Parser, Subcommand};
use ef_bench::{error_metrics, run_method, run_plan, ExperimentPlan, Method};
use ef_core::shannon_entropy;
use ef_guard::GuardOutcome;
use ef_model::{marginal_constraints, synthetic_flows, SyntheticSpec};
use ef_results::{records_to_csv, RunStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "ef-cli")]
#[command(about = "EntroFlow CLI - maximum-entropy flow matrix estimation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a benchmark sweep and store the results
    Bench {
        /// Plan YAML file (defaults to the standard sweep)
        #[arg(long)]
        plan: Option<PathBuf>,
        /// Results directory
        #[arg(long, default_value = "runs")]
        out: PathBuf,
    },
    /// Solve one synthetic problem and print a summary
    Solve {
        /// Number of cities
        #[arg(long)]
        n: usize,
        /// Estimation method (newton, bfgs, lbfgs)
        #[arg(long, default_value = "newton")]
        method: String,
        /// RNG seed for the synthetic matrix
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Wall-clock limit in seconds
        #[arg(long, default_value_t = 30.0)]
        timeout: f64,
    },
    /// Validate a plan file without running it
    Validate {
        /// Plan YAML file
        plan: PathBuf,
    },
    /// List stored benchmark runs
    Runs {
        /// Results directory
        #[arg(long, default_value = "runs")]
        out: PathBuf,
    },
    /// Show details of a stored run
    ShowRun {
        /// Run ID to display
        run_id: String,
        /// Results directory
        #[arg(long, default_value = "runs")]
        out: PathBuf,
    },
    /// Export a run's records as CSV
    Export {
        /// Run ID
        run_id: String,
        /// Results directory
        #[arg(long, default_value = "runs")]
        out: PathBuf,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub type CliResult<T> = Result<T, CliError>;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Benchmark error: {0}")]
    Bench(#[from] ef_bench::BenchError),

    #[error("Results error: {0}")]
    Results(#[from] ef_results::ResultsError),

    #[error("Model error: {0}")]
    Model(#[from] ef_model::ModelError),

    #[error("Unknown method: {name} (expected newton, bfgs or lbfgs)")]
    UnknownMethod { name: String },
}

fn main() -> CliResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Bench { plan, out } => cmd_bench(plan.as_deref(), &out),
        Commands::Solve {
            n,
            method,
            seed,
            timeout,
        } => cmd_solve(n, &method, seed, timeout),
        Commands::Validate { plan } => cmd_validate(&plan),
        Commands::Runs { out } => cmd_runs(&out),
        Commands::ShowRun { run_id, out } => cmd_show_run(&run_id, &out),
        Commands::Export {
            run_id,
            out,
            output,
        } => cmd_export(&run_id, &out, output.as_deref()),
    }
}

fn cmd_bench(plan_path: Option<&Path>, out: &Path) -> CliResult<()> {
    let plan = match plan_path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            ExperimentPlan::from_yaml(&text)?
        }
        None => ExperimentPlan::default(),
    };

    println!("Running benchmark sweep over sizes {:?}", plan.sizes);
    println!(
        "  timeout per run: {}s, Newton ceiling: n={}",
        plan.timeout_s, plan.newton_max_n
    );

    let store = RunStore::new(out.to_path_buf())?;
    let started = Instant::now();
    let manifest = run_plan(&plan, &store)?;
    let records = store.load_records(&manifest.run_id)?;

    println!(
        "✓ Sweep completed in {:.1}s: {}",
        started.elapsed().as_secs_f64(),
        manifest.run_id
    );
    println!(
        "{:>6}  {:<8} {:<8} {:>10} {:>12} {:>12}",
        "n", "method", "status", "time_s", "mae", "rmse"
    );
    for r in &records {
        println!(
            "{:>6}  {:<8} {:<8} {:>10.3} {:>12} {:>12}",
            r.n_cities,
            r.method,
            r.status,
            r.elapsed_s,
            fmt_metric(r.mae),
            fmt_metric(r.rmse),
        );
    }
    Ok(())
}

fn fmt_metric(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.3e}", v))
        .unwrap_or_else(|| "-".to_string())
}

fn cmd_solve(n: usize, method_name: &str, seed: u64, timeout: f64) -> CliResult<()> {
    let method = Method::parse(method_name).ok_or_else(|| CliError::UnknownMethod {
        name: method_name.to_string(),
    })?;

    println!(
        "Solving a {}-city synthetic problem with {}",
        n,
        method.label()
    );

    let spec = SyntheticSpec {
        n_cities: n,
        seed,
        ..Default::default()
    };
    let (_names, flows) = synthetic_flows(&spec)?;
    let truth = flows.normalize()?;
    let truth_flat = truth.flatten();
    let system = Arc::new(marginal_constraints(&truth));
    println!(
        "  {} unknowns, {} constraint rows",
        system.num_vars(),
        system.num_rows()
    );

    let started = Instant::now();
    let outcome = run_method(&system, method, Duration::from_secs_f64(timeout));
    let elapsed = started.elapsed().as_secs_f64();

    match outcome {
        GuardOutcome::Completed(solution) => {
            if solution.converged {
                println!(
                    "✓ Converged in {} iterations ({:.3}s)",
                    solution.iterations, elapsed
                );
            } else {
                println!(
                    "✗ Stopped unconverged after {} iterations ({:.3}s)",
                    solution.iterations, elapsed
                );
            }
            println!("  Residual norm: {:.3e}", solution.residual_norm);

            let (mae, rmse) = error_metrics(&solution.p, &truth_flat);
            println!("  MAE vs truth:  {:.3e}", mae);
            println!("  RMSE vs truth: {:.3e}", rmse);
            println!(
                "  Entropy: {:.4} nats (ground truth {:.4})",
                shannon_entropy(solution.p.as_slice()),
                shannon_entropy(truth_flat.as_slice())
            );
        }
        GuardOutcome::Failed { error } => {
            println!("✗ Solver failed: {}", error);
        }
        GuardOutcome::TimedOut => {
            println!("✗ Timed out after {:.1}s", timeout);
        }
    }
    Ok(())
}

fn cmd_validate(path: &Path) -> CliResult<()> {
    println!("Validating plan: {}", path.display());
    let text = std::fs::read_to_string(path)?;
    let plan = ExperimentPlan::from_yaml(&text)?;
    println!(
        "✓ Plan is valid: {} sizes, timeout {}s, seed {}",
        plan.sizes.len(),
        plan.timeout_s,
        plan.seed
    );
    Ok(())
}

fn cmd_runs(out: &Path) -> CliResult<()> {
    let store = RunStore::new(out.to_path_buf())?;
    let runs = store.list_runs()?;

    if runs.is_empty() {
        println!("No stored runs in {}", out.display());
    } else {
        println!("Stored runs in {}:", out.display());
        for manifest in runs {
            println!("  {} ({})", manifest.run_id, manifest.timestamp);
        }
    }
    Ok(())
}

fn cmd_show_run(run_id: &str, out: &Path) -> CliResult<()> {
    let store = RunStore::new(out.to_path_buf())?;
    let manifest = store.load_manifest(run_id)?;
    let records = store.load_records(run_id)?;

    println!("Run {}", manifest.run_id);
    println!("  Timestamp: {}", manifest.timestamp);
    println!("  Solver version: {}", manifest.solver_version);
    println!("  Sizes: {:?}", manifest.sizes);
    println!(
        "  Timeout: {}s, Newton ceiling: n={}",
        manifest.timeout_s, manifest.newton_max_n
    );
    println!("  Seed: {}", manifest.seed);

    let ok = records.iter().filter(|r| r.status == "ok").count();
    let timed_out = records.iter().filter(|r| r.status == "timeout").count();
    let failed = records.iter().filter(|r| r.status == "error").count();
    println!("\nRecords: {}", records.len());
    println!("  ok: {}, timeout: {}, error: {}", ok, timed_out, failed);

    Ok(())
}

fn cmd_export(run_id: &str, out: &Path, output: Option<&Path>) -> CliResult<()> {
    let store = RunStore::new(out.to_path_buf())?;
    let records = store.load_records(run_id)?;
    let csv = records_to_csv(&records);

    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!(
            "✓ Exported {} records to {}",
            records.len(),
            path.display()
        );
    } else {
        print!("{}", csv);
    }

    Ok(())
}
