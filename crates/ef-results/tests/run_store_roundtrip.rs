use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use ef_results::{BenchmarkRecord, RunManifest, RunStore};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

fn sample_manifest(run_id: &str, timestamp: &str) -> RunManifest {
    RunManifest {
        run_id: run_id.to_string(),
        timestamp: timestamp.to_string(),
        solver_version: "0.1.0".to_string(),
        sizes: vec![10, 20, 30],
        timeout_s: 30.0,
        newton_max_n: 30,
        seed: 42,
    }
}

#[test]
fn save_list_load_roundtrip() {
    let root = unique_temp_dir("ef_results_store");
    let store = RunStore::new(root.clone()).expect("failed to create run store");

    let manifest = sample_manifest("run-abc", "2026-08-01T00:00:00+00:00");
    let records = vec![
        BenchmarkRecord {
            n_cities: 10,
            method: "Newton".to_string(),
            status: "ok".to_string(),
            elapsed_s: 0.02,
            iterations: Some(9),
            mae: Some(1e-4),
            rmse: Some(2e-4),
            error: None,
        },
        BenchmarkRecord {
            n_cities: 20,
            method: "L-BFGS".to_string(),
            status: "error".to_string(),
            elapsed_s: 1.5,
            iterations: None,
            mae: None,
            rmse: None,
            error: Some("singular KKT system".to_string()),
        },
    ];

    store
        .save_run(&manifest, &records)
        .expect("failed to save run");
    assert!(store.has_run("run-abc"));

    let loaded_manifest = store
        .load_manifest("run-abc")
        .expect("failed to load manifest");
    assert_eq!(loaded_manifest.sizes, vec![10, 20, 30]);
    assert_eq!(loaded_manifest.seed, 42);

    let loaded_records = store
        .load_records("run-abc")
        .expect("failed to load records");
    assert_eq!(loaded_records.len(), 2);
    assert_eq!(loaded_records[0].method, "Newton");
    assert_eq!(
        loaded_records[1].error.as_deref(),
        Some("singular KKT system")
    );

    // All three artifacts exist on disk.
    for file in ["manifest.json", "records.jsonl", "records.csv"] {
        assert!(root.join("run-abc").join(file).exists(), "{} missing", file);
    }

    fs::remove_dir_all(&root).ok();
}

#[test]
fn list_runs_is_newest_first() {
    let root = unique_temp_dir("ef_results_list");
    let store = RunStore::new(root.clone()).expect("failed to create run store");

    store
        .save_run(&sample_manifest("older", "2026-08-01T00:00:00+00:00"), &[])
        .unwrap();
    store
        .save_run(&sample_manifest("newer", "2026-08-02T00:00:00+00:00"), &[])
        .unwrap();

    let runs = store.list_runs().expect("failed to list runs");
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].run_id, "newer");
    assert_eq!(runs[1].run_id, "older");

    fs::remove_dir_all(&root).ok();
}

#[test]
fn blank_jsonl_lines_are_skipped() {
    let root = unique_temp_dir("ef_results_blank_lines");
    let store = RunStore::new(root.clone()).expect("failed to create run store");

    let records = vec![BenchmarkRecord {
        n_cities: 5,
        method: "Newton".to_string(),
        status: "ok".to_string(),
        elapsed_s: 0.01,
        iterations: Some(6),
        mae: Some(1e-3),
        rmse: Some(2e-3),
        error: None,
    }];
    store
        .save_run(&sample_manifest("edited", "2026-08-01T00:00:00+00:00"), &records)
        .unwrap();

    // A hand-edited records file may carry stray blank lines; they must
    // not turn into parse errors.
    let jsonl_path = root.join("edited").join("records.jsonl");
    let content = fs::read_to_string(&jsonl_path).unwrap();
    fs::write(&jsonl_path, format!("\n{}\n\n", content)).unwrap();

    let loaded = store.load_records("edited").expect("failed to load records");
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].iterations, Some(6));

    fs::remove_dir_all(&root).ok();
}

#[test]
fn missing_run_is_an_error() {
    let root = unique_temp_dir("ef_results_missing");
    let store = RunStore::new(root.clone()).expect("failed to create run store");

    let err = store.load_manifest("no-such-run").unwrap_err();
    assert!(format!("{err}").contains("no-such-run"));

    fs::remove_dir_all(&root).ok();
}

#[test]
fn delete_run_removes_directory() {
    let root = unique_temp_dir("ef_results_delete");
    let store = RunStore::new(root.clone()).expect("failed to create run store");

    store
        .save_run(&sample_manifest("doomed", "2026-08-01T00:00:00+00:00"), &[])
        .unwrap();
    assert!(store.has_run("doomed"));

    store.delete_run("doomed").expect("failed to delete run");
    assert!(!store.has_run("doomed"));

    fs::remove_dir_all(&root).ok();
}
