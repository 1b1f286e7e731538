//! Field-level audit diffs over entity snapshots.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Kinds of entities that appear in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Risk,
    Process,
    Control,
    ControlLink,
    Row,
    CustomColumn,
    ControlTest,
    RemediationPlan,
    Weight,
    Ticket,
    TicketControlLink,
    PendingChange,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Risk => "risk",
            EntityType::Process => "process",
            EntityType::Control => "control",
            EntityType::ControlLink => "control_link",
            EntityType::Row => "row",
            EntityType::CustomColumn => "custom_column",
            EntityType::ControlTest => "control_test",
            EntityType::RemediationPlan => "remediation_plan",
            EntityType::Weight => "weight",
            EntityType::Ticket => "ticket",
            EntityType::TicketControlLink => "ticket_control_link",
            EntityType::PendingChange => "pending_change",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "risk" => Ok(EntityType::Risk),
            "process" => Ok(EntityType::Process),
            "control" => Ok(EntityType::Control),
            "control_link" => Ok(EntityType::ControlLink),
            "row" => Ok(EntityType::Row),
            "custom_column" => Ok(EntityType::CustomColumn),
            "control_test" => Ok(EntityType::ControlTest),
            "remediation_plan" => Ok(EntityType::RemediationPlan),
            "weight" => Ok(EntityType::Weight),
            "ticket" => Ok(EntityType::Ticket),
            "ticket_control_link" => Ok(EntityType::TicketControlLink),
            "pending_change" => Ok(EntityType::PendingChange),
            other => Err(DomainError::UnknownEntityType(other.to_string())),
        }
    }
}

/// What happened to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Create,
    Update,
    Delete,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeType::Create => "create",
            ChangeType::Update => "update",
            ChangeType::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// One field delta. Paths address nested structures with dots and array
/// indices (`meta.owner`, `tags[2]`), so a change to one element never
/// reports the whole collection as changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
}

/// One record in the audit trail. Immutable once created; the
/// application only ever appends entries, never mutates or deletes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub entity_type: EntityType,
    /// Stable entity id (for tree nodes the node id, never the
    /// hierarchical path).
    pub entity_id: String,
    /// Display label captured at change time, so historical entries stay
    /// readable after renames and deletes.
    pub entity_name: String,
    pub change_type: ChangeType,
    pub field_changes: Vec<FieldChange>,
    pub user: String,
    /// Free-text note for bulk operations that do not map cleanly onto
    /// field-level deltas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Diff two entity snapshots into an audit entry.
///
/// Exactly one snapshot present means create (all `old_value` absent) or
/// delete (mirror image); both present means update with one entry per
/// field that differs by deep structural equality. Calling this with
/// neither snapshot is a programming error in the caller.
pub fn diff(
    before: Option<&Value>,
    after: Option<&Value>,
    entity_type: EntityType,
    actor: &str,
    entity_id: &str,
    entity_name: &str,
) -> Result<AuditEntry, DomainError> {
    let (change_type, field_changes) = match (before, after) {
        (None, None) => return Err(DomainError::MissingSnapshots),
        (None, Some(after)) => (ChangeType::Create, one_sided_changes(after, Side::New)),
        (Some(before), None) => (ChangeType::Delete, one_sided_changes(before, Side::Old)),
        (Some(before), Some(after)) => {
            let mut changes = Vec::new();
            collect_changes("", before, after, &mut changes);
            (ChangeType::Update, changes)
        }
    };
    Ok(AuditEntry {
        id: Uuid::new_v4().to_string(),
        timestamp: Utc::now(),
        entity_type,
        entity_id: entity_id.to_string(),
        entity_name: entity_name.to_string(),
        change_type,
        field_changes,
        user: actor.to_string(),
        summary: None,
    })
}

/// Build an entry for a bulk operation, carrying a summary instead of
/// field deltas.
pub fn summary_entry(
    entity_type: EntityType,
    actor: &str,
    entity_id: &str,
    entity_name: &str,
    change_type: ChangeType,
    summary: &str,
) -> AuditEntry {
    AuditEntry {
        id: Uuid::new_v4().to_string(),
        timestamp: Utc::now(),
        entity_type,
        entity_id: entity_id.to_string(),
        entity_name: entity_name.to_string(),
        change_type,
        field_changes: Vec::new(),
        user: actor.to_string(),
        summary: Some(summary.to_string()),
    }
}

enum Side {
    Old,
    New,
}

/// Enumerate every top-level field of a single snapshot, values on the
/// given side only.
fn one_sided_changes(snapshot: &Value, side: Side) -> Vec<FieldChange> {
    let fields: Vec<(String, Value)> = match snapshot {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        other => vec![(String::new(), other.clone())],
    };
    fields
        .into_iter()
        .map(|(field, value)| match side {
            Side::Old => FieldChange {
                field,
                old_value: Some(value),
                new_value: None,
            },
            Side::New => FieldChange {
                field,
                old_value: None,
                new_value: Some(value),
            },
        })
        .collect()
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn collect_changes(path: &str, old: &Value, new: &Value, changes: &mut Vec<FieldChange>) {
    match (old, new) {
        (Value::Object(old_map), Value::Object(new_map)) => {
            // serde_json object iteration is key-sorted, which keeps the
            // change order stable across runs
            for (key, old_value) in old_map {
                let field = join_key(path, key);
                match new_map.get(key) {
                    Some(new_value) => collect_changes(&field, old_value, new_value, changes),
                    None => changes.push(FieldChange {
                        field,
                        old_value: Some(old_value.clone()),
                        new_value: None,
                    }),
                }
            }
            for (key, new_value) in new_map {
                if !old_map.contains_key(key) {
                    changes.push(FieldChange {
                        field: join_key(path, key),
                        old_value: None,
                        new_value: Some(new_value.clone()),
                    });
                }
            }
        }
        (Value::Array(old_items), Value::Array(new_items)) => {
            let len = old_items.len().max(new_items.len());
            for index in 0..len {
                let field = format!("{path}[{index}]");
                match (old_items.get(index), new_items.get(index)) {
                    (Some(o), Some(n)) => collect_changes(&field, o, n, changes),
                    (Some(o), None) => changes.push(FieldChange {
                        field,
                        old_value: Some(o.clone()),
                        new_value: None,
                    }),
                    (None, Some(n)) => changes.push(FieldChange {
                        field,
                        old_value: None,
                        new_value: Some(n.clone()),
                    }),
                    (None, None) => unreachable!("index below max of both lengths"),
                }
            }
        }
        (old, new) => {
            if old != new {
                changes.push(FieldChange {
                    field: path.to_string(),
                    old_value: Some(old.clone()),
                    new_value: Some(new.clone()),
                });
            }
        }
    }
}
