//! Newline-delimited JSON log format
//!
//! Each line is one event:
//!
//! ```text
//! {"schemaVersion":1,"event":"record","record":{"id":"prov_…","agentType":"planner",…}}
//! {"schemaVersion":1,"event":"approval","id":"prov_…","approvedBy":"alice","approvedAt":"…"}
//! ```
//!
//! Bare record objects without the envelope (older logs) are also accepted
//! when reading and reported with `schema_version` 0.

use super::record::ProvenanceRecord;
use super::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Version written into every new log line
pub const LOG_SCHEMA_VERSION: u32 = 1;

/// One line of the log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogLine {
    pub schema_version: u32,

    #[serde(flatten)]
    pub entry: LogEntry,
}

/// Event carried by a log line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEntry {
    /// Full record as created (or as reloaded)
    Record { record: Box<ProvenanceRecord> },

    /// Approval attached to an earlier record
    #[serde(rename_all = "camelCase")]
    Approval {
        id: String,
        approved_by: String,
        approved_at: DateTime<Utc>,
    },
}

impl LogLine {
    pub fn new(entry: LogEntry) -> Self {
        Self {
            schema_version: LOG_SCHEMA_VERSION,
            entry,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLine {
    Enveloped(LogLine),
    Bare(Box<ProvenanceRecord>),
}

/// Parse one log line
///
/// # Example
/// ```
/// use cairn::provenance::{parse_log_line, LogEntry};
///
/// let line = r#"{"schemaVersion":1,"event":"approval","id":"prov_1","approvedBy":"bob","approvedAt":"2025-03-01T10:00:00Z"}"#;
/// let parsed = parse_log_line(line).unwrap();
/// assert!(matches!(parsed.entry, LogEntry::Approval { ref approved_by, .. } if approved_by == "bob"));
/// ```
pub fn parse_log_line(line: &str) -> Result<LogLine> {
    let raw: RawLine = serde_json::from_str(line)?;
    Ok(match raw {
        RawLine::Enveloped(line) => line,
        RawLine::Bare(record) => LogLine {
            schema_version: 0,
            entry: LogEntry::Record { record },
        },
    })
}

/// Append one event as a single line
pub(crate) fn append_entry(path: &Path, entry: LogEntry) -> Result<()> {
    let mut serialized = serde_json::to_string(&LogLine::new(entry))?;
    serialized.push('\n');

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(serialized.as_bytes())?;
    Ok(())
}

/// Log file name for a session started at `started`
///
/// The ISO-8601 timestamp has `:` and `.` replaced so the name is portable:
/// `provenance-2025-03-01T10-00-00-000Z.jsonl`.
pub fn session_file_name(prefix: &str, started: &DateTime<Utc>) -> String {
    format!("{}-{}.jsonl", prefix, session_stamp(started))
}

fn session_stamp(started: &DateTime<Utc>) -> String {
    started
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

/// Attempts before giving up on finding a free session file name
const MAX_SESSION_SUFFIX: u32 = 1000;

/// Claim a fresh log file for a session started at `started`
///
/// Uses [`session_file_name`] when that file does not exist yet, otherwise
/// appends `-1`, `-2`, ... before the extension. The file is created with
/// `create_new`, so two sessions never share a log, even across processes.
pub(crate) fn create_session_file(
    dir: &Path,
    prefix: &str,
    started: &DateTime<Utc>,
) -> Result<PathBuf> {
    let stamp = session_stamp(started);

    for suffix in 0..MAX_SESSION_SUFFIX {
        let name = match suffix {
            0 => format!("{}-{}.jsonl", prefix, stamp),
            n => format!("{}-{}-{}.jsonl", prefix, stamp, n),
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => return Ok(path),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Err(std::io::Error::new(
        ErrorKind::AlreadyExists,
        format!("no free session file name for {}-{}", prefix, stamp),
    )
    .into())
}
