//! Per-session operation record.
//!
//! Every operation applied to an analysis session is recorded with a
//! sequence number, a timestamp, and a human-readable detail line, so a
//! finished workbook can be traced back to the exact steps that produced
//! it. The record exports as plain text or JSON.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A single recorded operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Sequential operation number (1-based).
    pub sequence: usize,
    pub timestamp: DateTime<Local>,
    /// Short operation name, e.g. "calibrate".
    pub operation: String,
    /// Parameter values and outcome.
    pub detail: String,
}

impl LogEntry {
    pub fn to_text(&self) -> String {
        format!(
            "[{:03}] {} | {} | {}",
            self.sequence,
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.operation,
            self.detail
        )
    }
}

/// Ordered operation record of one analysis session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionLog {
    pub session_id: String,
    pub started: DateTime<Local>,
    /// What the session analyzes, e.g. "30 deg spectrum".
    pub subject: String,
    pub entries: Vec<LogEntry>,
}

impl SessionLog {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            started: Local::now(),
            subject: subject.into(),
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, operation: &str, detail: &str) {
        let sequence = self.entries.len() + 1;
        self.entries.push(LogEntry {
            sequence,
            timestamp: Local::now(),
            operation: operation.to_string(),
            detail: detail.to_string(),
        });
        log::info!("[{:03}] {} — {}", sequence, operation, detail);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Analysis log — {}\n", self.subject));
        out.push_str(&format!("  Session:  {}\n", self.session_id));
        out.push_str(&format!(
            "  Started:  {}\n",
            self.started.format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str(&format!("  Steps:    {}\n\n", self.entries.len()));
        for entry in &self.entries {
            out.push_str(&entry.to_text());
            out.push('\n');
        }
        out
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("JSON error: {}", e))
    }
}
