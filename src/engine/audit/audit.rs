//! Decision Audit Log
//!
//! Append-only, line-delimited JSON record of authorization decisions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

use crate::engine::rbac::{ClaimKeys, Claims, Decision};

/// Current audit log format version
pub const AUDIT_VERSION: u32 = 1;

const LOG_FILE: &str = "decisions.jsonl";

/// A single recorded decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Format version for compatibility
    pub version: u32,

    pub id: Uuid,

    pub timestamp: DateTime<Utc>,

    /// Policy name that was evaluated
    pub policy: String,

    /// Caller identity claim, as presented
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,

    /// Caller role claim, as presented
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    pub decision: Decision,

    /// Ownership fields of the checked resource, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<serde_json::Value>,
}

impl AuditEntry {
    pub fn new(policy: &str, decision: Decision) -> Self {
        Self {
            version: AUDIT_VERSION,
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            policy: policy.to_string(),
            actor: None,
            role: None,
            decision,
            resource: None,
        }
    }

    /// Copy the raw identity and role claims onto the entry
    pub fn with_claims(mut self, claims: &Claims, keys: &ClaimKeys) -> Self {
        self.actor = claims.get(&keys.identity_key).map(str::to_string);
        self.role = claims.get(&keys.role_key).map(str::to_string);
        self
    }

    pub fn with_resource(mut self, resource: serde_json::Value) -> Self {
        self.resource = Some(resource);
        self
    }
}

/// The decision log manager
pub struct AuditLog {
    log_path: PathBuf,
    write_lock: Mutex<()>,
}

impl AuditLog {
    /// Open (creating if needed) the log under `audit_dir`
    pub fn new(audit_dir: &Path) -> std::io::Result<Self> {
        fs::create_dir_all(audit_dir)?;
        Ok(Self {
            log_path: audit_dir.join(LOG_FILE),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    /// Append an entry to the log as one complete line
    pub fn append(&self, entry: &AuditEntry) -> std::io::Result<()> {
        let mut line = serde_json::to_string(entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        line.push('\n');

        // Concurrent appenders must never interleave within a line
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        file.write_all(line.as_bytes())
    }

    /// Query all entries; malformed lines are logged and skipped
    pub fn query_all(&self) -> std::io::Result<Vec<AuditEntry>> {
        if !self.log_path.exists() {
            return Ok(vec![]);
        }

        let file = fs::File::open(&self.log_path)?;
        let reader = BufReader::new(file);

        let mut entries = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let entry: AuditEntry = match serde_json::from_str(&line) {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(
                        path = %self.log_path.display(),
                        line = index + 1,
                        error = %e,
                        "Skipping malformed audit entry"
                    );
                    continue;
                }
            };

            // Entries written by newer versions are skipped
            if entry.version <= AUDIT_VERSION {
                entries.push(entry);
            }
        }

        Ok(entries)
    }

    pub fn query_by_policy(&self, policy: &str) -> std::io::Result<Vec<AuditEntry>> {
        Ok(self
            .query_all()?
            .into_iter()
            .filter(|e| e.policy == policy)
            .collect())
    }

    pub fn query_denied(&self) -> std::io::Result<Vec<AuditEntry>> {
        Ok(self
            .query_all()?
            .into_iter()
            .filter(|e| !e.decision.is_allowed())
            .collect())
    }

    /// Number of non-empty lines in the log
    pub fn count(&self) -> std::io::Result<usize> {
        if !self.log_path.exists() {
            return Ok(0);
        }

        let file = fs::File::open(&self.log_path)?;
        let reader = BufReader::new(file);
        let mut count = 0;
        for line in reader.lines() {
            if !line?.trim().is_empty() {
                count += 1;
            }
        }
        Ok(count)
    }
}
