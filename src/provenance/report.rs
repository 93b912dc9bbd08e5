//! Compliance rollup and per-decision explanations

use super::record::{Alternative, ProvenanceRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Per-agent slice of a [`ComplianceReport`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AgentSummary {
    pub decisions: usize,
    pub approved: usize,
    pub mean_confidence: f64,
}

/// Aggregate view over the records selected by a filter
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComplianceReport {
    pub total_decisions: usize,
    pub approved: usize,
    pub pending_approval: usize,
    /// `approved / total_decisions`, 0.0 when there are no decisions
    pub approval_rate: f64,
    pub mean_confidence: f64,
    pub by_agent: BTreeMap<String, AgentSummary>,
    /// Unapproved records below the configured confidence threshold
    pub low_confidence_unapproved: Vec<String>,
    /// Records whose stored fingerprint no longer matches their content
    pub integrity_failures: Vec<String>,
}

impl ComplianceReport {
    pub(crate) fn build<'a>(
        records: impl IntoIterator<Item = &'a ProvenanceRecord>,
        low_confidence_threshold: f64,
    ) -> Self {
        let mut report = Self::default();
        let mut confidence_sum = 0.0;
        let mut agent_confidence: BTreeMap<String, f64> = BTreeMap::new();

        for record in records {
            report.total_decisions += 1;
            confidence_sum += record.confidence;

            let summary = report.by_agent.entry(record.agent_type.clone()).or_default();
            summary.decisions += 1;
            *agent_confidence.entry(record.agent_type.clone()).or_insert(0.0) += record.confidence;

            if record.is_approved() {
                report.approved += 1;
                summary.approved += 1;
            } else if record.confidence < low_confidence_threshold {
                report.low_confidence_unapproved.push(record.id.clone());
            }

            if record.fingerprint != record.expected_fingerprint() {
                report.integrity_failures.push(record.id.clone());
            }
        }

        report.pending_approval = report.total_decisions - report.approved;
        if report.total_decisions > 0 {
            let total = report.total_decisions as f64;
            report.approval_rate = report.approved as f64 / total;
            report.mean_confidence = confidence_sum / total;
        }
        for (agent, summary) in report.by_agent.iter_mut() {
            if let Some(sum) = agent_confidence.get(agent) {
                summary.mean_confidence = sum / summary.decisions as f64;
            }
        }

        report
    }
}

/// Human-readable account of one decision
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionExplanation {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub agent_type: String,
    pub job_id: Option<String>,
    pub decision: String,
    pub reasoning: String,
    pub alternatives: Vec<Alternative>,
    pub confidence: f64,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub integrity_verified: bool,
}

impl DecisionExplanation {
    pub(crate) fn from_record(record: &ProvenanceRecord) -> Self {
        Self {
            id: record.id.clone(),
            timestamp: record.timestamp,
            agent_type: record.agent_type.clone(),
            job_id: record.job_id.clone(),
            decision: record.decision.clone(),
            reasoning: record.reasoning.clone(),
            alternatives: record.alternatives.clone(),
            confidence: record.confidence,
            approved_by: record.approved_by.clone(),
            approved_at: record.approved_at,
            integrity_verified: record.fingerprint == record.expected_fingerprint(),
        }
    }
}

impl fmt::Display for DecisionExplanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Decision {} by {} at {}",
            self.id,
            self.agent_type,
            self.timestamp.to_rfc3339()
        )?;
        if let Some(job_id) = &self.job_id {
            writeln!(f, "  Job: {}", job_id)?;
        }
        writeln!(f, "  Decision: {}", self.decision)?;
        writeln!(f, "  Confidence: {:.0}%", self.confidence * 100.0)?;
        if !self.reasoning.is_empty() {
            writeln!(f, "  Reasoning: {}", self.reasoning)?;
        }
        if !self.alternatives.is_empty() {
            writeln!(f, "  Alternatives considered:")?;
            for alt in &self.alternatives {
                writeln!(f, "    - {}: {}", alt.option, alt.reason)?;
            }
        }
        match (&self.approved_by, &self.approved_at) {
            (Some(by), Some(at)) => writeln!(f, "  Approval: {} at {}", by, at.to_rfc3339())?,
            (Some(by), None) => writeln!(f, "  Approval: {}", by)?,
            _ => writeln!(f, "  Approval: pending")?,
        }
        let integrity = if self.integrity_verified {
            "verified"
        } else {
            "FINGERPRINT MISMATCH"
        };
        write!(f, "  Integrity: {}", integrity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provenance::record::NewRecord;
    use serde_json::json;

    fn record(id: &str, agent: &str, confidence: f64) -> ProvenanceRecord {
        NewRecord::new(agent, "decide", confidence)
            .with_inputs(json!({"id": id}))
            .into_record(id.to_string(), Utc::now())
    }

    #[test]
    fn test_empty_report() {
        let report = ComplianceReport::build(&[], 0.5);
        assert_eq!(report.total_decisions, 0);
        assert_eq!(report.approval_rate, 0.0);
        assert!(report.by_agent.is_empty());
    }

    #[test]
    fn test_report_counts() {
        let mut approved = record("p1", "planner", 0.9);
        approved.approved_by = Some("erin".to_string());
        let low = record("p2", "planner", 0.2);
        let mut tampered = record("c1", "coder", 0.8);
        tampered.inputs = json!({"id": "other"});

        let records = vec![approved, low, tampered];
        let report = ComplianceReport::build(&records, 0.5);

        assert_eq!(report.total_decisions, 3);
        assert_eq!(report.approved, 1);
        assert_eq!(report.pending_approval, 2);
        assert!((report.approval_rate - 1.0 / 3.0).abs() < 1e-12);
        assert!((report.mean_confidence - (0.9 + 0.2 + 0.8) / 3.0).abs() < 1e-12);
        assert_eq!(report.low_confidence_unapproved, vec!["p2".to_string()]);
        assert_eq!(report.integrity_failures, vec!["c1".to_string()]);

        let planner = &report.by_agent["planner"];
        assert_eq!(planner.decisions, 2);
        assert_eq!(planner.approved, 1);
        assert!((planner.mean_confidence - 0.55).abs() < 1e-12);
    }

    #[test]
    fn test_explanation_display() {
        let mut rec = NewRecord::new("reviewer", "block merge", 0.75)
            .with_job_id("job-9")
            .with_reasoning("tests fail on CI")
            .with_alternative("merge anyway", "breaks main")
            .into_record("prov_9".to_string(), Utc::now());
        rec.approved_by = Some("frank".to_string());

        let text = DecisionExplanation::from_record(&rec).to_string();
        assert!(text.starts_with("Decision prov_9 by reviewer"));
        assert!(text.contains("Job: job-9"));
        assert!(text.contains("Confidence: 75%"));
        assert!(text.contains("- merge anyway: breaks main"));
        assert!(text.contains("Approval: frank"));
        assert!(text.ends_with("Integrity: verified"));
    }
}
