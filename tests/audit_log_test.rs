//! Tests for the append-only audit log

use chrono::{Duration, Utc};

use rstax::domain::audit::{summary_entry, ChangeType, EntityType};
use rstax::AuditLog;

fn entry(entity_id: &str, entity_type: EntityType) -> rstax::AuditEntry {
    summary_entry(
        entity_type,
        "auditor",
        entity_id,
        entity_id,
        ChangeType::Update,
        "test entry",
    )
}

#[test]
fn given_entries_when_appending_then_kept_in_order() {
    // Arrange
    let mut log = AuditLog::new();

    // Act
    log.append(entry("a", EntityType::Risk));
    log.append(entry("b", EntityType::Control));

    // Assert
    assert_eq!(log.len(), 2);
    assert_eq!(log.entries()[0].entity_id, "a");
    assert_eq!(log.entries()[1].entity_id, "b");
}

#[test]
fn given_regressing_clock_when_appending_then_timestamp_clamped_forward() {
    // Arrange
    let mut log = AuditLog::new();
    let mut first = entry("a", EntityType::Risk);
    let mut second = entry("a", EntityType::Risk);
    let now = Utc::now();
    first.timestamp = now;
    second.timestamp = now - Duration::seconds(30);

    // Act
    log.append(first);
    log.append(second);

    // Assert: causally related entries never run backwards
    assert_eq!(log.entries()[1].timestamp, now);
}

#[test]
fn given_mixed_entries_when_querying_then_filters_apply() {
    // Arrange
    let mut log = AuditLog::new();
    log.append(entry("r1", EntityType::Risk));
    log.append(entry("c1", EntityType::Control));
    log.append(entry("r1", EntityType::Risk));

    // Act & Assert
    assert_eq!(log.entries_for_entity("r1").len(), 2);
    assert_eq!(log.entries_by_type(EntityType::Control).len(), 1);
    assert!(log.entries_for_entity("ghost").is_empty());
}

#[test]
fn given_time_range_when_querying_then_bounds_are_inclusive() {
    // Arrange
    let mut log = AuditLog::new();
    let base = Utc::now();
    for offset in [0, 60, 120] {
        let mut e = entry("r1", EntityType::Risk);
        e.timestamp = base + Duration::seconds(offset);
        log.append(e);
    }

    // Act
    let hits = log.entries_in_range(base, base + Duration::seconds(60));

    // Assert
    assert_eq!(hits.len(), 2);
}

#[test]
fn given_log_when_round_tripping_jsonl_then_entries_survive() {
    // Arrange
    let mut log = AuditLog::new();
    log.append(entry("r1", EntityType::Risk));
    log.append(entry("w1", EntityType::Weight));

    // Act
    let jsonl = log.to_jsonl().unwrap();
    let back = AuditLog::from_jsonl(&jsonl).unwrap();

    // Assert
    assert_eq!(back.len(), 2);
    assert_eq!(back.entries(), log.entries());
}

#[test]
fn given_blank_lines_when_parsing_jsonl_then_skipped() {
    let mut log = AuditLog::new();
    log.append(entry("r1", EntityType::Risk));
    let jsonl = format!("\n{}\n\n", log.to_jsonl().unwrap());

    let back = AuditLog::from_jsonl(&jsonl).unwrap();

    assert_eq!(back.len(), 1);
}

#[test]
fn given_garbage_line_when_parsing_jsonl_then_error_names_line() {
    let err = AuditLog::from_jsonl("not json\n").unwrap_err();
    assert!(err.to_string().contains("line 1"));
}
