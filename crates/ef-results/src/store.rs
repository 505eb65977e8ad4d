//! Run storage API.
//!
//! Each run gets its own directory under the store root:
//!
//! ```text
//! <root>/<run_id>/manifest.json   run description
//! <root>/<run_id>/records.jsonl   one BenchmarkRecord per line
//! <root>/<run_id>/records.csv     the same records, spreadsheet-ready
//! ```

use crate::types::{BenchmarkRecord, RunManifest};
use crate::{ResultsError, ResultsResult};
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

#[derive(Clone)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(run_id)
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_dir(run_id).join("manifest.json").exists()
    }

    pub fn save_run(
        &self,
        manifest: &RunManifest,
        records: &[BenchmarkRecord],
    ) -> ResultsResult<()> {
        let run_dir = self.run_dir(&manifest.run_id);
        fs::create_dir_all(&run_dir)?;

        let manifest_path = run_dir.join("manifest.json");
        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(manifest_path, manifest_json)?;

        // Records are streamed a line at a time; sweeps can hold many
        // cells and there is no need to assemble the file in memory.
        let jsonl_path = run_dir.join("records.jsonl");
        let mut jsonl = BufWriter::new(fs::File::create(jsonl_path)?);
        for record in records {
            serde_json::to_writer(&mut jsonl, record)?;
            jsonl.write_all(b"\n")?;
        }
        jsonl.flush()?;

        let csv_path = run_dir.join("records.csv");
        fs::write(csv_path, records_to_csv(records))?;

        Ok(())
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        let manifest_path = self.run_dir(run_id).join("manifest.json");

        if !manifest_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(manifest_path)?;
        let manifest = serde_json::from_str(&content)?;
        Ok(manifest)
    }

    pub fn load_records(&self, run_id: &str) -> ResultsResult<Vec<BenchmarkRecord>> {
        let jsonl_path = self.run_dir(run_id).join("records.jsonl");

        if !jsonl_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let reader = BufReader::new(fs::File::open(jsonl_path)?);
        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if !line.trim().is_empty() {
                let record: BenchmarkRecord = serde_json::from_str(&line)?;
                records.push(record);
            }
        }

        Ok(records)
    }

    /// All manifests in the store, newest first.
    pub fn list_runs(&self) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();

        if !self.root_dir.exists() {
            return Ok(runs);
        }

        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if entry.path().is_dir() {
                let run_id = entry.file_name().to_string_lossy().to_string();
                if let Ok(manifest) = self.load_manifest(&run_id) {
                    runs.push(manifest);
                }
            }
        }

        runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(runs)
    }

    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        let run_dir = self.run_dir(run_id);
        if run_dir.exists() {
            fs::remove_dir_all(run_dir)?;
        }
        Ok(())
    }
}

/// Render records as CSV with a header row.
///
/// Absent optional columns become empty fields. Error messages are not
/// included here (they may contain commas); the JSONL file carries them.
pub fn records_to_csv(records: &[BenchmarkRecord]) -> String {
    fn opt<T: ToString>(v: &Option<T>) -> String {
        v.as_ref().map(|x| x.to_string()).unwrap_or_default()
    }

    let mut csv = String::from("n_cities,method,status,elapsed_s,iterations,mae,rmse\n");
    for r in records {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            r.n_cities,
            r.method,
            r.status,
            r.elapsed_s,
            opt(&r.iterations),
            opt(&r.mae),
            opt(&r.rmse),
        ));
    }
    csv
}
