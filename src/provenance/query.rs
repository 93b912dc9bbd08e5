use super::record::ProvenanceRecord;
use chrono::{DateTime, Utc};

/// Criteria for [`ProvenanceStore::query`](super::ProvenanceStore::query)
///
/// All criteria are optional and combined with AND. The time range is
/// inclusive on both ends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProvenanceFilter {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub agent_type: Option<String>,
    pub job_id: Option<String>,
    pub min_confidence: Option<f64>,
    pub approved_only: bool,
}

impl ProvenanceFilter {
    /// Filter matching every record
    pub fn new() -> Self {
        Self::default()
    }

    pub fn since(mut self, start: DateTime<Utc>) -> Self {
        self.since = Some(start);
        self
    }

    pub fn until(mut self, end: DateTime<Utc>) -> Self {
        self.until = Some(end);
        self
    }

    pub fn agent_type(mut self, agent_type: impl Into<String>) -> Self {
        self.agent_type = Some(agent_type.into());
        self
    }

    pub fn job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }

    pub fn min_confidence(mut self, confidence: f64) -> Self {
        self.min_confidence = Some(confidence);
        self
    }

    pub fn approved_only(mut self) -> Self {
        self.approved_only = true;
        self
    }

    pub fn matches(&self, record: &ProvenanceRecord) -> bool {
        if self.since.is_some_and(|start| record.timestamp < start) {
            return false;
        }
        if self.until.is_some_and(|end| record.timestamp > end) {
            return false;
        }
        if let Some(agent_type) = &self.agent_type {
            if &record.agent_type != agent_type {
                return false;
            }
        }
        if let Some(job_id) = &self.job_id {
            if record.job_id.as_ref() != Some(job_id) {
                return false;
            }
        }
        if self.min_confidence.is_some_and(|min| record.confidence < min) {
            return false;
        }
        !self.approved_only || record.is_approved()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provenance::record::NewRecord;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap()
    }

    fn record(agent: &str, job: Option<&str>, confidence: f64, hour: u32) -> ProvenanceRecord {
        let mut new = NewRecord::new(agent, "decide", confidence);
        if let Some(job) = job {
            new = new.with_job_id(job);
        }
        new.into_record(format!("prov_{}", hour), at(hour))
    }

    #[test]
    fn test_empty_filter_matches_all() {
        assert!(ProvenanceFilter::new().matches(&record("a", None, 0.1, 1)));
    }

    #[test]
    fn test_time_range_inclusive() {
        let filter = ProvenanceFilter::new().since(at(2)).until(at(4));
        assert!(!filter.matches(&record("a", None, 0.5, 1)));
        assert!(filter.matches(&record("a", None, 0.5, 2)));
        assert!(filter.matches(&record("a", None, 0.5, 4)));
        assert!(!filter.matches(&record("a", None, 0.5, 5)));

        let just_after = ProvenanceFilter::new().since(at(2) + Duration::seconds(1));
        assert!(!just_after.matches(&record("a", None, 0.5, 2)));
    }

    #[test]
    fn test_agent_and_job() {
        let filter = ProvenanceFilter::new().agent_type("planner").job_id("j1");
        assert!(filter.matches(&record("planner", Some("j1"), 0.5, 1)));
        assert!(!filter.matches(&record("planner", Some("j2"), 0.5, 1)));
        assert!(!filter.matches(&record("planner", None, 0.5, 1)));
        assert!(!filter.matches(&record("coder", Some("j1"), 0.5, 1)));
    }

    #[test]
    fn test_min_confidence_and_approval() {
        let filter = ProvenanceFilter::new().min_confidence(0.7);
        assert!(filter.matches(&record("a", None, 0.7, 1)));
        assert!(!filter.matches(&record("a", None, 0.69, 1)));

        let approved = ProvenanceFilter::new().approved_only();
        let mut rec = record("a", None, 0.9, 1);
        assert!(!approved.matches(&rec));
        rec.approved_by = Some("dana".to_string());
        assert!(approved.matches(&rec));
    }
}
