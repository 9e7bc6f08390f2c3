// Audit logger for truth-guard decisions
//
// One JSON object per line. Prompts are stored as SHA-256 hashes only.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::guard::GuardDecision;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DecisionKind {
    Corrected,
    Forwarded,
}

/// A single logged guard decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique ID for this entry
    pub id: String,

    pub timestamp: DateTime<Utc>,

    /// SHA-256 of the prompt
    pub prompt_hash: String,

    pub decision: DecisionKind,

    /// Scenario or custom rule that fired
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// Backend that would serve (or served) the prompt
    pub backend: String,
}

impl AuditEntry {
    pub fn new(prompt: &str, decision: &GuardDecision, backend: &str) -> Self {
        let (kind, rule, confidence) = match decision {
            GuardDecision::Corrected(correction) => (
                DecisionKind::Corrected,
                Some(correction.rule.clone()),
                Some(correction.pattern_match.confidence),
            ),
            GuardDecision::Forward => (DecisionKind::Forwarded, None, None),
        };

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            prompt_hash: hash_prompt(prompt),
            decision: kind,
            rule,
            confidence,
            backend: backend.to_string(),
        }
    }
}

/// Hash a prompt for privacy (SHA256)
pub fn hash_prompt(prompt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Buffered JSONL writer for guard decisions
pub struct AuditLogger {
    log_path: PathBuf,
    buffer: Vec<AuditEntry>,
    flush_threshold: usize,
}

impl AuditLogger {
    /// Create a new logger
    pub fn new(log_path: PathBuf) -> Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create audit log directory: {}", parent.display())
            })?;
        }

        Ok(Self {
            log_path,
            buffer: Vec::new(),
            flush_threshold: 10,
        })
    }

    /// Flush after this many buffered entries (minimum 1)
    pub fn with_flush_threshold(mut self, threshold: usize) -> Self {
        self.flush_threshold = threshold.max(1);
        self
    }

    /// Record a decision; returns the entry ID
    pub fn log_decision(
        &mut self,
        prompt: &str,
        decision: &GuardDecision,
        backend: &str,
    ) -> Result<String> {
        let entry = AuditEntry::new(prompt, decision, backend);
        let id = entry.id.clone();
        self.buffer.push(entry);

        if self.buffer.len() >= self.flush_threshold {
            self.flush()?;
        }

        Ok(id)
    }

    /// Flush buffered entries to disk
    pub fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        debug!("Flushing {} audit entries to disk", self.buffer.len());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open audit log: {}", self.log_path.display()))?;

        for entry in &self.buffer {
            let json = serde_json::to_string(entry).context("Failed to serialize audit entry")?;
            writeln!(file, "{}", json).context("Failed to write audit entry")?;
        }

        self.buffer.clear();
        Ok(())
    }

    /// Read every entry currently on disk (buffered entries excluded)
    pub fn read_entries(&self) -> Result<Vec<AuditEntry>> {
        read_entries(&self.log_path)
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }
}

impl Drop for AuditLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            eprintln!("Failed to flush audit log on drop: {}", e);
        }
    }
}

/// Read an audit log file. A missing file is an empty log.
pub fn read_entries(path: &Path) -> Result<Vec<AuditEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read audit log: {}", path.display()))?;

    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).context("Failed to parse audit entry"))
        .collect()
}
