//! Content-based hashing for run IDs.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Deterministic run ID from a serializable plan and a solver version.
///
/// Equal plans under the same version always map to the same ID, so
/// re-running an identical sweep lands in the same store directory.
pub fn compute_run_id<P: Serialize>(plan: &P, solver_version: &str) -> String {
    let mut hasher = Sha256::new();

    let plan_json = serde_json::to_string(plan).unwrap_or_default();
    hasher.update(plan_json.as_bytes());

    hasher.update(solver_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}
