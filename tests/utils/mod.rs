// Integration test utilities
//
// Shared helpers for tests that exercise the provenance log on disk.

#![allow(dead_code)]

use cairn::provenance::{NewRecord, ProvenanceConfig, ProvenanceStore};
use serde_json::json;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Route library logs to the test harness output (set RUST_LOG to see them)
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Persistent store writing its session log under `dir`
pub fn store_in(dir: &Path) -> ProvenanceStore {
    ProvenanceStore::open(ProvenanceConfig::default().with_storage_dir(dir))
}

/// A reviewer decision with realistic payloads
pub fn review_decision(pr: u32, confidence: f64) -> NewRecord {
    NewRecord::new("reviewer", format!("request changes on #{}", pr), confidence)
        .with_job_id(format!("pr-{}", pr))
        .with_inputs(json!({
            "pr": pr,
            "files": ["src/lib.rs", "src/store.rs"],
            "checks": {"clippy": "pass", "tests": "fail"},
        }))
        .with_outputs(json!({"comments": 3}))
        .with_reasoning("integration tests fail on the new store path")
        .with_alternative("approve", "failing checks")
        .with_alternative("close", "change is wanted")
        .with_model_version("reviewer-2025-01")
}
