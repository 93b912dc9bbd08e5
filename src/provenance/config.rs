// Configuration for the provenance store
//
// Every field has a default, so an empty TOML document is a valid config.

use super::{ProvenanceError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Provenance store settings
///
/// # Example
/// ```
/// use cairn::provenance::ProvenanceConfig;
///
/// let config = ProvenanceConfig::from_toml_str(r#"
///     storage_dir = "/var/lib/agents/provenance"
///     low_confidence_threshold = 0.7
/// "#).unwrap();
///
/// assert_eq!(config.file_prefix, "provenance");
/// assert!(config.persist);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProvenanceConfig {
    /// Directory receiving one log file per session
    ///
    /// Default: `.cairn/provenance`
    pub storage_dir: PathBuf,

    /// Log file name prefix, followed by the session start timestamp
    ///
    /// Default: `provenance`
    pub file_prefix: String,

    /// Append records to a log file
    ///
    /// When false the store is memory-only.
    /// Default: true
    pub persist: bool,

    /// Confidence below which unapproved decisions are flagged in compliance
    /// reports
    ///
    /// Default: 0.5
    pub low_confidence_threshold: f64,
}

impl Default for ProvenanceConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(".cairn").join("provenance"),
            file_prefix: "provenance".to_string(),
            persist: true,
            low_confidence_threshold: 0.5,
        }
    }
}

impl ProvenanceConfig {
    /// Memory-only configuration (no log file)
    pub fn in_memory() -> Self {
        Self {
            persist: false,
            ..Self::default()
        }
    }

    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = dir.into();
        self
    }

    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    pub fn with_low_confidence_threshold(mut self, threshold: f64) -> Self {
        self.low_confidence_threshold = threshold;
        self
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings outside their valid range
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.low_confidence_threshold) {
            return Err(ProvenanceError::InvalidThreshold(
                self.low_confidence_threshold,
            ));
        }
        Ok(())
    }

    /// Read and parse a TOML config file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read provenance config {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse provenance config {}", path.display()))
    }
}
