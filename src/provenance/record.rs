//! Provenance record types and content fingerprinting

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::hash::Hasher;

/// An option the agent considered and rejected
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alternative {
    pub option: String,
    pub reason: String,
}

impl Alternative {
    pub fn new(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            option: option.into(),
            reason: reason.into(),
        }
    }
}

/// A single recorded decision
///
/// Serialized with camelCase field names; this is the object stored in each
/// `record` line of the log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProvenanceRecord {
    pub id: String,

    pub timestamp: DateTime<Utc>,

    /// Agent that made the decision (e.g. "planner", "reviewer")
    pub agent_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,

    pub decision: String,

    /// Opaque decision inputs, covered by the fingerprint
    #[serde(default)]
    pub inputs: Value,

    #[serde(default)]
    pub outputs: Value,

    #[serde(default)]
    pub reasoning: String,

    #[serde(default)]
    pub alternatives: Vec<Alternative>,

    /// Confidence in `[0, 1]`
    pub confidence: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,

    /// SHA-256 (hex) over `inputs` and `model_version`
    pub fingerprint: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
}

impl ProvenanceRecord {
    pub fn is_approved(&self) -> bool {
        self.approved_by.is_some()
    }

    /// Fingerprint recomputed from the current `inputs` and `model_version`
    pub fn expected_fingerprint(&self) -> String {
        compute_fingerprint(&self.inputs, self.model_version.as_deref())
    }
}

/// Fields supplied by the caller when recording a decision
///
/// Id, timestamp and fingerprint are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub agent_type: String,
    pub decision: String,
    pub confidence: f64,
    pub job_id: Option<String>,
    pub inputs: Value,
    pub outputs: Value,
    pub reasoning: String,
    pub alternatives: Vec<Alternative>,
    pub model_version: Option<String>,
}

impl NewRecord {
    pub fn new(agent_type: impl Into<String>, decision: impl Into<String>, confidence: f64) -> Self {
        Self {
            agent_type: agent_type.into(),
            decision: decision.into(),
            confidence,
            job_id: None,
            inputs: Value::Null,
            outputs: Value::Null,
            reasoning: String::new(),
            alternatives: Vec::new(),
            model_version: None,
        }
    }

    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }

    pub fn with_inputs(mut self, inputs: Value) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_outputs(mut self, outputs: Value) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }

    pub fn with_alternative(mut self, option: impl Into<String>, reason: impl Into<String>) -> Self {
        self.alternatives.push(Alternative::new(option, reason));
        self
    }

    pub fn with_model_version(mut self, version: impl Into<String>) -> Self {
        self.model_version = Some(version.into());
        self
    }

    /// Finish the record with store-assigned identity
    pub(crate) fn into_record(self, id: String, timestamp: DateTime<Utc>) -> ProvenanceRecord {
        let fingerprint = compute_fingerprint(&self.inputs, self.model_version.as_deref());
        ProvenanceRecord {
            id,
            timestamp,
            agent_type: self.agent_type,
            job_id: self.job_id,
            decision: self.decision,
            inputs: self.inputs,
            outputs: self.outputs,
            reasoning: self.reasoning,
            alternatives: self.alternatives,
            confidence: self.confidence,
            model_version: self.model_version,
            fingerprint,
            approved_by: None,
            approved_at: None,
        }
    }
}

/// Content fingerprint used for reproducibility and tamper checks
///
/// Hashes the compact JSON of `inputs` (object keys in sorted order) followed
/// by the model version. Identical inputs under the same model version always
/// produce the same fingerprint.
///
/// # Example
/// ```
/// use cairn::provenance::compute_fingerprint;
/// use serde_json::json;
///
/// let a = compute_fingerprint(&json!({"b": 1, "a": 2}), Some("v1"));
/// let b = compute_fingerprint(&json!({"a": 2, "b": 1}), Some("v1"));
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 64);
/// assert_ne!(a, compute_fingerprint(&json!({"a": 2, "b": 1}), Some("v2")));
/// ```
pub fn compute_fingerprint(inputs: &Value, model_version: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(inputs.to_string().as_bytes());
    hasher.update(b"\n");
    hasher.update(model_version.unwrap_or_default().as_bytes());
    hex::encode(hasher.finalize())
}

/// Record id derived from session, sequence number and timestamp (FNV-1a)
///
/// Format: `prov_<16 hex digits>`.
pub fn generate_record_id(session: &str, sequence: u64, timestamp: &DateTime<Utc>) -> String {
    let mut hasher = fnv::FnvHasher::default();
    hasher.write(session.as_bytes());
    hasher.write(b"::");
    hasher.write(&sequence.to_le_bytes());
    hasher.write(b"::");
    hasher.write(&timestamp.timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
    format!("prov_{:016x}", hasher.finish())
}
