//! Tests for TaxonomyService mutation orchestration

use rstax::{
    ApplicationError, ChangeType, EntityType, Payload, TaxonomyService, TreeNode,
};

fn node(id: &str, name: &str, children: Option<Vec<TreeNode>>) -> TreeNode {
    TreeNode {
        id: id.to_string(),
        hierarchical_id: None,
        name: name.to_string(),
        description: None,
        data: Payload::new(),
        children,
    }
}

fn service() -> TaxonomyService {
    rstax::util::testing::init_test_setup();
    TaxonomyService::new(EntityType::Risk, "auditor")
}

fn base_forest() -> Vec<TreeNode> {
    vec![
        node("fraud", "Fraud", Some(vec![node("card", "Card fraud", None)])),
        node("ops", "Operational", None),
    ]
}

#[test]
fn given_insert_under_parent_when_applied_then_ids_recomputed_and_create_logged() {
    // Arrange
    let forest = base_forest();

    // Act
    let outcome = service()
        .insert(
            &forest,
            Some("fraud"),
            node("wire", "Wire fraud", None),
            None,
        )
        .unwrap();

    // Assert: new node appended after existing child, path derived
    let fraud = &outcome.forest[0];
    assert_eq!(fraud.child_nodes()[1].id, "wire");
    assert_eq!(
        fraud.child_nodes()[1].hierarchical_id.as_deref(),
        Some("1.2")
    );

    let entry = &outcome.entry;
    assert_eq!(entry.change_type, ChangeType::Create);
    assert_eq!(entry.entity_id, "wire");
    assert_eq!(entry.entity_name, "Wire fraud");
    assert!(entry.field_changes.iter().all(|c| c.old_value.is_none()));
    // the snapshot captured the freshly assigned path
    assert!(entry
        .field_changes
        .iter()
        .any(|c| c.field == "hierarchical_id"));
}

#[test]
fn given_insert_at_position_when_applied_then_siblings_shift() {
    // Arrange
    let forest = base_forest();

    // Act
    let outcome = service()
        .insert(&forest, None, node("new", "New root", None), Some(0))
        .unwrap();

    // Assert
    assert_eq!(outcome.forest[0].id, "new");
    assert_eq!(outcome.forest[0].hierarchical_id.as_deref(), Some("1"));
    assert_eq!(outcome.forest[1].hierarchical_id.as_deref(), Some("2"));
}

#[test]
fn given_duplicate_id_when_inserting_then_rejected() {
    let err = service()
        .insert(&base_forest(), None, node("ops", "Dup", None), None)
        .unwrap_err();
    assert!(matches!(err, ApplicationError::DuplicateNode(id) if id == "ops"));
}

#[test]
fn given_unknown_parent_when_inserting_then_rejected() {
    let err = service()
        .insert(&base_forest(), Some("ghost"), node("x", "X", None), None)
        .unwrap_err();
    assert!(matches!(err, ApplicationError::NodeNotFound(id) if id == "ghost"));
}

#[test]
fn given_remove_of_subtree_when_applied_then_delete_logged_with_summary() {
    // Arrange
    let forest = base_forest();

    // Act
    let outcome = service().remove(&forest, "fraud").unwrap();

    // Assert: remaining root renumbered from scratch
    assert_eq!(outcome.forest.len(), 1);
    assert_eq!(outcome.forest[0].id, "ops");
    assert_eq!(outcome.forest[0].hierarchical_id.as_deref(), Some("1"));

    let entry = &outcome.entry;
    assert_eq!(entry.change_type, ChangeType::Delete);
    assert!(entry.field_changes.iter().all(|c| c.new_value.is_none()));
    // one descendant went with the subtree
    assert_eq!(
        entry.summary.as_deref(),
        Some("removed 1 descendant nodes with the subtree")
    );
}

#[test]
fn given_move_to_new_parent_when_applied_then_update_shows_path_change() {
    // Arrange: assign first so the before snapshot carries a path
    let forest = rstax::assign_identifiers(&base_forest(), None);

    // Act
    let outcome = service()
        .move_node(&forest, "card", Some("ops"), None)
        .unwrap();

    // Assert
    let ops = &outcome.forest[1];
    assert_eq!(ops.child_nodes()[0].id, "card");
    assert_eq!(ops.child_nodes()[0].hierarchical_id.as_deref(), Some("2.1"));
    // the old parent keeps an explicitly empty child list
    assert_eq!(outcome.forest[0].children, Some(vec![]));

    let entry = &outcome.entry;
    assert_eq!(entry.change_type, ChangeType::Update);
    let path_change = entry
        .field_changes
        .iter()
        .find(|c| c.field == "hierarchical_id")
        .expect("path change recorded");
    assert_eq!(path_change.old_value, Some(serde_json::json!("1.1")));
    assert_eq!(path_change.new_value, Some(serde_json::json!("2.1")));
}

#[test]
fn given_move_into_own_subtree_when_applied_then_rejected() {
    let err = service()
        .move_node(&base_forest(), "fraud", Some("card"), None)
        .unwrap_err();
    assert!(matches!(err, ApplicationError::MoveIntoSubtree(id) if id == "fraud"));
}

#[test]
fn given_reorder_of_roots_when_applied_then_summary_notes_renumbering() {
    // Arrange
    let forest = rstax::assign_identifiers(&base_forest(), None);

    // Act
    let outcome = service().reorder(&forest, None, 1, 0).unwrap();

    // Assert
    assert_eq!(outcome.forest[0].id, "ops");
    assert_eq!(outcome.forest[0].hierarchical_id.as_deref(), Some("1"));
    assert_eq!(outcome.forest[1].hierarchical_id.as_deref(), Some("2"));

    let entry = &outcome.entry;
    assert_eq!(entry.change_type, ChangeType::Update);
    assert_eq!(entry.entity_id, "ops");
    assert_eq!(
        entry.summary.as_deref(),
        Some("reordered siblings under the roots")
    );
}

#[test]
fn given_out_of_range_position_when_reordering_then_rejected() {
    let err = service().reorder(&base_forest(), None, 5, 0).unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::PositionOutOfRange { index: 5, len: 2 }
    ));
}

#[test]
fn given_any_mutation_when_applied_then_input_forest_is_unchanged() {
    // Arrange
    let forest = base_forest();
    let snapshot = serde_json::to_string(&forest).unwrap();

    // Act
    let _ = service().insert(&forest, None, node("x", "X", None), None);
    let _ = service().remove(&forest, "ops");
    let _ = service().move_node(&forest, "card", None, None);
    let _ = service().reorder(&forest, None, 0, 1);

    // Assert
    assert_eq!(serde_json::to_string(&forest).unwrap(), snapshot);
}
