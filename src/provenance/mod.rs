//! Append-only provenance log for agent decisions
//!
//! Records who decided what, from which inputs, with what confidence, and
//! which alternatives were rejected. Records live in memory for the lifetime
//! of a [`ProvenanceStore`] and are persisted by appending one JSON object per
//! line to a per-session log file.
//!
//! # Lifecycle
//!
//! ```text
//! add_record()          append "record" line        approve_decision()
//!   pending  ──────────────────────────▶ persisted ─────────────────────▶ approved
//!                                                    append "approval" line
//! ```
//!
//! Records are never deleted. The only mutation is attaching approval
//! metadata, which is logged as a separate event, so readers reconstruct
//! state by folding lines last-write-wins by `id`.
//!
//! # Durability
//!
//! A failed append never fails the call: the record stays in memory and the
//! returned [`AddOutcome`] reports [`Persistence::MemoryOnly`]. If the storage
//! directory cannot be created at startup, persistence is disabled for the
//! whole session.
//!
//! # Example
//!
//! ```no_run
//! use cairn::provenance::{NewRecord, ProvenanceConfig, ProvenanceFilter, ProvenanceStore};
//! use serde_json::json;
//!
//! # fn main() -> cairn::provenance::Result<()> {
//! let mut store = ProvenanceStore::open(ProvenanceConfig::default());
//!
//! let outcome = store.add_record(
//!     NewRecord::new("planner", "split task into 3 subtasks", 0.82)
//!         .with_job_id("job-17")
//!         .with_inputs(json!({"task": "add login page"}))
//!         .with_model_version("planner-v2"),
//! )?;
//!
//! assert!(store.verify_integrity(&outcome.record.id));
//! store.approve_decision(&outcome.record.id, "alice");
//!
//! let approved = store.query(&ProvenanceFilter::new().approved_only());
//! assert_eq!(approved.len(), 1);
//! # Ok(())
//! # }
//! ```

mod config;
mod log;
mod query;
mod record;
mod report;
mod store;

pub use config::ProvenanceConfig;
pub use log::{parse_log_line, session_file_name, LogEntry, LogLine, LOG_SCHEMA_VERSION};
pub use query::ProvenanceFilter;
pub use record::{compute_fingerprint, generate_record_id, Alternative, NewRecord, ProvenanceRecord};
pub use report::{AgentSummary, ComplianceReport, DecisionExplanation};
pub use store::{AddOutcome, Persistence, ProvenanceStore, SharedProvenanceStore};

use thiserror::Error;

/// Errors surfaced to callers of the provenance store
#[derive(Error, Debug)]
pub enum ProvenanceError {
    #[error("Unknown provenance record: {0}")]
    UnknownRecord(String),

    #[error("Confidence must be within [0, 1], got {0}")]
    InvalidConfidence(f64),

    #[error("Low-confidence threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid provenance config: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for provenance operations
pub type Result<T> = std::result::Result<T, ProvenanceError>;
