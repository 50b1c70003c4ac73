//! Append-only audit trail of dispatched operations.
//!
//! Each line of the log file is one JSON object:
//! ```json
//! {"ts":"2026-01-21T10:30:00Z","method":"write_file","intent":["write"],"path":"/srv/box/a.txt","outcome":"success","duration_ms":2}
//! ```

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::path_guard::Intent;
use crate::core::error::{Error, Result};
use crate::core::protocol::ErrorKind;

/// Result of an audited operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Success,
    Error,
}

/// One audited operation.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub ts: DateTime<Utc>,
    pub method: String,
    pub intent: Vec<Intent>,
    pub path: String,
    pub outcome: AuditOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    pub duration_ms: u64,
}

impl AuditRecord {
    pub fn new(
        method: &str,
        intents: &[Intent],
        path: String,
        error: Option<ErrorKind>,
        duration_ms: u64,
    ) -> Self {
        Self {
            ts: Utc::now(),
            method: method.to_string(),
            intent: intents.to_vec(),
            path,
            outcome: if error.is_some() {
                AuditOutcome::Error
            } else {
                AuditOutcome::Success
            },
            error_kind: error.map(|kind| kind.as_str()),
            duration_ms,
        }
    }

    /// Mirror the record to the `audit` tracing target.
    pub fn trace(&self) {
        info!(
            target: "audit",
            method = %self.method,
            path = %self.path,
            outcome = ?self.outcome,
            error_kind = self.error_kind.unwrap_or("-"),
            duration_ms = self.duration_ms,
            "operation"
        );
    }
}

/// Audit log file opened in append mode.
#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl AuditLog {
    /// Open (or create) the log at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::config(format!("Failed to create audit log directory: {e}"))
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| Error::config(format!("Failed to open audit log: {e}")))?;

        info!("Audit log: {}", path.display());
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Append one record and flush it.
    pub fn record(&self, record: &AuditRecord) -> io::Result<()> {
        let json = serde_json::to_string(record)?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| io::Error::other("audit log lock poisoned"))?;
        writeln!(writer, "{json}")?;
        writer.flush()
    }

    /// Append a record, logging instead of failing.
    pub fn record_or_warn(&self, record: &AuditRecord) {
        if let Err(e) = self.record(record) {
            warn!("Failed to write audit record: {}", e);
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
