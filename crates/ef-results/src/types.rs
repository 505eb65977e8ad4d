//! Result data types.

use serde::{Deserialize, Serialize};

pub type RunId = String;

/// Top-level description of one benchmark run, stored next to its
/// records. The plan fields are inlined so a manifest is readable
/// without any other crate's types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub timestamp: String,
    pub solver_version: String,
    pub sizes: Vec<usize>,
    pub timeout_s: f64,
    pub newton_max_n: usize,
    pub seed: u64,
}

/// One method × problem-size measurement.
///
/// `status` is the guard's label ("ok", "error" or "timeout");
/// everything past `elapsed_s` is only present for completed runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    pub n_cities: usize,
    pub method: String,
    pub status: String,
    pub elapsed_s: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mae: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rmse: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Current UTC time in RFC 3339, the format every manifest uses.
pub fn utc_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
