//! In-memory append-only audit log
//!
//! Entries are never mutated or deleted once appended; retention and
//! pruning are storage concerns outside this crate. Persistence is the
//! caller's job via the JSON-lines round-trip.

use chrono::{DateTime, Utc};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::audit::{AuditEntry, EntityType};

#[derive(Debug, Default)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. A clock reading behind the previous entry is
    /// clamped forward so causally related entries never appear to run
    /// backwards.
    pub fn append(&mut self, mut entry: AuditEntry) {
        if let Some(last) = self.entries.last() {
            if entry.timestamp < last.timestamp {
                entry.timestamp = last.timestamp;
            }
        }
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries for one entity, in append order.
    pub fn entries_for_entity(&self, entity_id: &str) -> Vec<&AuditEntry> {
        self.entries
            .iter()
            .filter(|e| e.entity_id == entity_id)
            .collect()
    }

    pub fn entries_by_type(&self, entity_type: EntityType) -> Vec<&AuditEntry> {
        self.entries
            .iter()
            .filter(|e| e.entity_type == entity_type)
            .collect()
    }

    /// Entries with `from <= timestamp <= to`.
    pub fn entries_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<&AuditEntry> {
        self.entries
            .iter()
            .filter(|e| e.timestamp >= from && e.timestamp <= to)
            .collect()
    }

    /// Serialize as JSON lines, one entry per line.
    pub fn to_jsonl(&self) -> ApplicationResult<String> {
        let mut out = String::new();
        for entry in &self.entries {
            let line = serde_json::to_string(entry).map_err(|e| {
                ApplicationError::OperationFailed {
                    context: format!("serialize audit entry {}", entry.id),
                    source: Box::new(e),
                }
            })?;
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out)
    }

    /// Parse a JSON-lines export back into a log. Blank lines are
    /// skipped.
    pub fn from_jsonl(content: &str) -> ApplicationResult<Self> {
        let mut log = Self::new();
        for (number, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let entry: AuditEntry =
                serde_json::from_str(line).map_err(|e| ApplicationError::OperationFailed {
                    context: format!("parse audit log line {}", number + 1),
                    source: Box::new(e),
                })?;
            log.entries.push(entry);
        }
        Ok(log)
    }
}
