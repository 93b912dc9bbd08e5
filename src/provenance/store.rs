//! In-memory provenance store with append-only persistence

use super::config::ProvenanceConfig;
use super::log::{
    append_entry, create_session_file, parse_log_line, session_file_name, LogEntry,
    LOG_SCHEMA_VERSION,
};
use super::query::ProvenanceFilter;
use super::record::{generate_record_id, NewRecord, ProvenanceRecord};
use super::report::{ComplianceReport, DecisionExplanation};
use super::{ProvenanceError, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Where a newly added record ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    /// Appended to the session log
    Persisted { path: PathBuf },
    /// Kept in memory only because the append failed
    MemoryOnly { reason: String },
    /// The store has no log file
    Disabled,
}

impl Persistence {
    pub fn is_durable(&self) -> bool {
        matches!(self, Persistence::Persisted { .. })
    }
}

/// Result of [`ProvenanceStore::add_record`]
#[derive(Debug, Clone, PartialEq)]
pub struct AddOutcome {
    pub record: ProvenanceRecord,
    pub persistence: Persistence,
}

/// Append-only store of decision records
///
/// Records are kept in insertion order and indexed by id, job id and agent
/// type. Mutation requires `&mut self`; use [`SharedProvenanceStore`] when
/// several threads record decisions.
#[derive(Debug)]
pub struct ProvenanceStore {
    config: ProvenanceConfig,
    records: Vec<ProvenanceRecord>,
    by_id: HashMap<String, usize>,
    by_job: HashMap<String, Vec<usize>>,
    by_agent: HashMap<String, Vec<usize>>,
    log_file: Option<PathBuf>,
    session: String,
    sequence: u64,
}

impl ProvenanceStore {
    /// Open a store for a new session
    ///
    /// Creates `storage_dir` and claims a session log file that no other
    /// session uses when persistence is enabled. If either step fails the
    /// error is logged and the session runs without a log file.
    pub fn open(config: ProvenanceConfig) -> Self {
        let started = Utc::now();

        let log_file = if config.persist {
            match Self::claim_log_file(&config, &started) {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!(
                        "Failed to create provenance log in {}: {}; persistence disabled",
                        config.storage_dir.display(),
                        e
                    );
                    None
                }
            }
        } else {
            None
        };

        let session = log_file
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| session_file_name(&config.file_prefix, &started));

        Self {
            config,
            records: Vec::new(),
            by_id: HashMap::new(),
            by_job: HashMap::new(),
            by_agent: HashMap::new(),
            log_file,
            session,
            sequence: 0,
        }
    }

    /// Store without a log file
    pub fn in_memory() -> Self {
        Self::open(ProvenanceConfig::in_memory())
    }

    pub fn config(&self) -> &ProvenanceConfig {
        &self.config
    }

    /// Session log file, if persistence is active
    pub fn log_path(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in insertion order
    pub fn records(&self) -> &[ProvenanceRecord] {
        &self.records
    }

    /// Record a decision
    ///
    /// Assigns id, timestamp and fingerprint, indexes the record and appends
    /// it to the session log. An append failure is logged and reported as
    /// [`Persistence::MemoryOnly`]; the record is kept either way.
    ///
    /// # Errors
    ///
    /// [`ProvenanceError::InvalidConfidence`] when confidence is outside `[0, 1]`.
    pub fn add_record(&mut self, new: NewRecord) -> Result<AddOutcome> {
        if !(0.0..=1.0).contains(&new.confidence) {
            return Err(ProvenanceError::InvalidConfidence(new.confidence));
        }

        let timestamp = Utc::now();
        let id = self.next_id(&timestamp);
        let record = new.into_record(id, timestamp);

        let persistence = self.append(LogEntry::Record {
            record: Box::new(record.clone()),
        });

        tracing::debug!(
            "Recorded decision {} from {} ({:?})",
            record.id,
            record.agent_type,
            persistence
        );

        self.insert(record.clone());
        Ok(AddOutcome {
            record,
            persistence,
        })
    }

    pub fn get_record(&self, id: &str) -> Option<&ProvenanceRecord> {
        self.by_id.get(id).map(|&idx| &self.records[idx])
    }

    /// Records for a job, in insertion order
    pub fn records_for_job(&self, job_id: &str) -> Vec<&ProvenanceRecord> {
        self.indexed(self.by_job.get(job_id))
    }

    /// Records from one agent type, in insertion order
    pub fn records_for_agent(&self, agent_type: &str) -> Vec<&ProvenanceRecord> {
        self.indexed(self.by_agent.get(agent_type))
    }

    /// Attach human approval to a record
    ///
    /// Returns `false` for an unknown id. Otherwise sets the approval fields
    /// and appends an `approval` line; a failed append is logged only.
    pub fn approve_decision(&mut self, id: &str, approver: &str) -> bool {
        let Some(&idx) = self.by_id.get(id) else {
            return false;
        };

        let approved_at = Utc::now();
        let record = &mut self.records[idx];
        record.approved_by = Some(approver.to_string());
        record.approved_at = Some(approved_at);

        let persistence = self.append(LogEntry::Approval {
            id: id.to_string(),
            approved_by: approver.to_string(),
            approved_at,
        });
        tracing::debug!("Approved decision {} by {} ({:?})", id, approver, persistence);

        true
    }

    /// Records matching `filter`, in insertion order
    pub fn query(&self, filter: &ProvenanceFilter) -> Vec<&ProvenanceRecord> {
        self.records.iter().filter(|r| filter.matches(r)).collect()
    }

    /// Check the in-memory record against its stored fingerprint
    ///
    /// Returns `false` for unknown ids. The log file is not consulted.
    pub fn verify_integrity(&self, id: &str) -> bool {
        self.get_record(id)
            .is_some_and(|record| record.fingerprint == record.expected_fingerprint())
    }

    /// Explain a recorded decision
    ///
    /// # Errors
    ///
    /// [`ProvenanceError::UnknownRecord`] when no record has this id.
    pub fn explain_decision(&self, id: &str) -> Result<DecisionExplanation> {
        self.get_record(id)
            .map(DecisionExplanation::from_record)
            .ok_or_else(|| ProvenanceError::UnknownRecord(id.to_string()))
    }

    /// Compliance rollup over the records matching `filter`
    pub fn compliance_report(&self, filter: &ProvenanceFilter) -> ComplianceReport {
        ComplianceReport::build(self.query(filter), self.config.low_confidence_threshold)
    }

    /// Load records from a log file into this store
    ///
    /// `record` lines insert records (replacing an existing record with the
    /// same id); `approval` lines update records already known. Malformed
    /// lines, records with confidence outside `[0, 1]` and approvals for
    /// unknown ids are skipped with a warning.
    /// Loaded records are not re-appended to this session's log.
    ///
    /// Returns the number of record lines loaded.
    ///
    /// # Errors
    ///
    /// Fails only if the file cannot be opened.
    pub fn load_from_log(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let mut loaded = 0;

        for (line_no, line) in reader.lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!(
                        "Skipping unreadable line {} in {}: {}",
                        line_no + 1,
                        path.display(),
                        e
                    );
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            let parsed = match parse_log_line(&line) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::warn!(
                        "Skipping malformed line {} in {}: {}",
                        line_no + 1,
                        path.display(),
                        e
                    );
                    continue;
                }
            };
            if parsed.schema_version > LOG_SCHEMA_VERSION {
                tracing::warn!(
                    "Line {} in {} has schema version {} (newer than {})",
                    line_no + 1,
                    path.display(),
                    parsed.schema_version,
                    LOG_SCHEMA_VERSION
                );
            }

            match parsed.entry {
                LogEntry::Record { record } => {
                    if !(0.0..=1.0).contains(&record.confidence) {
                        tracing::warn!(
                            "Skipping record {} at line {} in {}: confidence {} outside [0, 1]",
                            record.id,
                            line_no + 1,
                            path.display(),
                            record.confidence
                        );
                        continue;
                    }
                    self.insert(*record);
                    loaded += 1;
                }
                LogEntry::Approval {
                    id,
                    approved_by,
                    approved_at,
                } => match self.by_id.get(&id) {
                    Some(&idx) => {
                        let record = &mut self.records[idx];
                        record.approved_by = Some(approved_by);
                        record.approved_at = Some(approved_at);
                    }
                    None => {
                        tracing::warn!(
                            "Skipping approval for unknown record {} at line {} in {}",
                            id,
                            line_no + 1,
                            path.display()
                        );
                    }
                },
            }
        }

        tracing::debug!("Loaded {} records from {}", loaded, path.display());
        Ok(loaded)
    }

    fn claim_log_file(config: &ProvenanceConfig, started: &DateTime<Utc>) -> Result<PathBuf> {
        std::fs::create_dir_all(&config.storage_dir)?;
        create_session_file(&config.storage_dir, &config.file_prefix, started)
    }

    fn next_id(&mut self, timestamp: &DateTime<Utc>) -> String {
        loop {
            self.sequence += 1;
            let id = generate_record_id(&self.session, self.sequence, timestamp);
            if !self.by_id.contains_key(&id) {
                return id;
            }
        }
    }

    fn append(&self, entry: LogEntry) -> Persistence {
        let Some(path) = &self.log_file else {
            return Persistence::Disabled;
        };

        match append_entry(path, entry) {
            Ok(()) => Persistence::Persisted { path: path.clone() },
            Err(e) => {
                tracing::warn!("Failed to append to provenance log {}: {}", path.display(), e);
                Persistence::MemoryOnly {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Insert, or replace in place when the id is already present
    fn insert(&mut self, record: ProvenanceRecord) {
        if let Some(&idx) = self.by_id.get(&record.id) {
            let old = std::mem::replace(&mut self.records[idx], record);
            Self::unindex(&mut self.by_agent, &old.agent_type, idx);
            if let Some(job_id) = &old.job_id {
                Self::unindex(&mut self.by_job, job_id, idx);
            }
            self.index(idx);
            return;
        }

        let idx = self.records.len();
        self.by_id.insert(record.id.clone(), idx);
        self.records.push(record);
        self.index(idx);
    }

    fn index(&mut self, idx: usize) {
        let record = &self.records[idx];
        Self::add_to_index(&mut self.by_agent, &record.agent_type, idx);
        if let Some(job_id) = &record.job_id {
            Self::add_to_index(&mut self.by_job, job_id, idx);
        }
    }

    // Keeps each index list sorted so lookups stay in insertion order
    fn add_to_index(index: &mut HashMap<String, Vec<usize>>, key: &str, idx: usize) {
        let list = index.entry(key.to_string()).or_default();
        if let Err(pos) = list.binary_search(&idx) {
            list.insert(pos, idx);
        }
    }

    fn unindex(index: &mut HashMap<String, Vec<usize>>, key: &str, idx: usize) {
        if let Some(list) = index.get_mut(key) {
            list.retain(|&i| i != idx);
            if list.is_empty() {
                index.remove(key);
            }
        }
    }

    fn indexed(&self, indices: Option<&Vec<usize>>) -> Vec<&ProvenanceRecord> {
        indices
            .map(|list| list.iter().map(|&idx| &self.records[idx]).collect())
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub(crate) fn record_mut(&mut self, id: &str) -> Option<&mut ProvenanceRecord> {
        let idx = *self.by_id.get(id)?;
        self.records.get_mut(idx)
    }
}

/// Thread-safe handle to a [`ProvenanceStore`]
///
/// Every operation takes the lock for its whole duration, so concurrent
/// `add_record` calls are serialized along with their log appends.
#[derive(Debug, Clone)]
pub struct SharedProvenanceStore {
    inner: Arc<Mutex<ProvenanceStore>>,
}

impl SharedProvenanceStore {
    pub fn new(store: ProvenanceStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ProvenanceStore> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_record(&self, new: NewRecord) -> Result<AddOutcome> {
        self.lock().add_record(new)
    }

    pub fn approve_decision(&self, id: &str, approver: &str) -> bool {
        self.lock().approve_decision(id, approver)
    }

    pub fn load_from_log(&self, path: impl AsRef<Path>) -> Result<usize> {
        self.lock().load_from_log(path)
    }

    pub fn verify_integrity(&self, id: &str) -> bool {
        self.lock().verify_integrity(id)
    }

    pub fn get_record(&self, id: &str) -> Option<ProvenanceRecord> {
        self.lock().get_record(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Run `f` with shared access to the store
    pub fn with<R>(&self, f: impl FnOnce(&ProvenanceStore) -> R) -> R {
        f(&self.lock())
    }
}
