//! Audit logging — boundary events for every tool invocation.
//!
//! Records the operation name, patient identifier, timestamp, and outcome.
//! Record content never enters an audit entry — the entry type has no
//! field that could carry it.
//!
//! Every entry is forwarded to the configured sinks; the logger itself
//! retains only the most recent [`MAX_RETAINED_ENTRIES`] for inspection,
//! so a long-running server never accumulates an unbounded buffer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Upper bound on entries kept in memory. Older entries are dropped once
/// they have been forwarded to the sinks.
pub const MAX_RETAINED_ENTRIES: usize = 1024;

/// A single audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub event: AuditEvent,
    pub outcome: AuditOutcome,
    /// Error kind on failure ("unauthorized", "not_found", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Types of auditable events at the gateway boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// A tool was invoked.
    ToolInvocation {
        tool: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        patient_id: Option<String>,
    },
    /// A credential was rejected before any data was touched.
    AuthFailure { tool: String },
    /// A scrubbed context left the boundary toward the model provider.
    AssistantCall { patient_id: String },
}

/// Outcome of an audited operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Success,
    Failure,
    Denied,
}

/// Trait for audit log sinks (where entries are written).
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: &AuditEntry);
}

/// Audit logger: forwards every entry to its sinks and retains a bounded
/// window of recent entries.
pub struct AuditLogger {
    entries: std::sync::Mutex<VecDeque<AuditEntry>>,
    sinks: Vec<Box<dyn AuditSink>>,
}

impl std::fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.entries.lock().map(|e| e.len()).unwrap_or(0);
        f.debug_struct("AuditLogger")
            .field("entry_count", &count)
            .field("sink_count", &self.sinks.len())
            .finish()
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditLogger {
    /// Create a new audit logger with no sinks.
    pub fn new() -> Self {
        Self {
            entries: std::sync::Mutex::new(VecDeque::new()),
            sinks: Vec::new(),
        }
    }

    /// Create a new audit logger with the given sinks.
    pub fn with_sinks(sinks: Vec<Box<dyn AuditSink>>) -> Self {
        Self {
            entries: std::sync::Mutex::new(VecDeque::new()),
            sinks,
        }
    }

    /// Record an audit event.
    pub fn log(&self, event: AuditEvent, outcome: AuditOutcome, detail: Option<String>) {
        let entry = AuditEntry {
            timestamp: Utc::now(),
            event,
            outcome,
            detail,
        };

        if let Ok(mut entries) = self.entries.lock() {
            if entries.len() == MAX_RETAINED_ENTRIES {
                entries.pop_front();
            }
            entries.push_back(entry.clone());
        }

        for sink in &self.sinks {
            sink.record(&entry);
        }
    }

    /// The retained entries, oldest first.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .map(|e| e.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Get entries filtered by outcome.
    pub fn entries_by_outcome(&self, outcome: &AuditOutcome) -> Vec<AuditEntry> {
        self.entries()
            .into_iter()
            .filter(|e| &e.outcome == outcome)
            .collect()
    }

    /// Count of stored entries.
    pub fn count(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }
}

/// A tracing-based audit sink.
pub struct TracingSink;

impl AuditSink for TracingSink {
    fn record(&self, entry: &AuditEntry) {
        tracing::info!(
            event = ?entry.event,
            outcome = ?entry.outcome,
            detail = ?entry.detail,
            "AUDIT"
        );
    }
}
