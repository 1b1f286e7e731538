//! Materialized-path identifier assignment.

use tracing::trace;

use crate::domain::node::TreeNode;

/// Recompute `hierarchical_id` for every node in the forest.
///
/// Pure function of input order: the node at 0-based index `i` among its
/// siblings gets position `i + 1`, dot-joined onto `parent_path`. Root
/// nodes carry no dot. Children are recursed when the field is present
/// (even when empty) and left absent otherwise, so the input's
/// presence-vs-empty shape is preserved.
///
/// Idempotent: applying it twice yields identical identifiers. Reordering
/// one sibling list only changes identifiers inside that subtree.
pub fn assign_identifiers<T: Clone>(
    forest: &[TreeNode<T>],
    parent_path: Option<&str>,
) -> Vec<TreeNode<T>> {
    forest
        .iter()
        .enumerate()
        .map(|(index, node)| {
            let position = index + 1;
            let path = match parent_path {
                Some(parent) => format!("{parent}.{position}"),
                None => position.to_string(),
            };
            trace!(id = %node.id, path = %path, "assign");
            let children = node
                .children
                .as_ref()
                .map(|children| assign_identifiers(children, Some(&path)));
            TreeNode {
                hierarchical_id: Some(path),
                children,
                ..node.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::Payload;

    fn node(id: &str, children: Option<Vec<TreeNode>>) -> TreeNode {
        TreeNode {
            id: id.to_string(),
            hierarchical_id: None,
            name: id.to_uppercase(),
            description: None,
            data: Payload::new(),
            children,
        }
    }

    fn paths(forest: &[TreeNode]) -> Vec<(String, Option<String>)> {
        let mut out = Vec::new();
        collect(forest, &mut out);
        return out;

        fn collect(forest: &[TreeNode], out: &mut Vec<(String, Option<String>)>) {
            for n in forest {
                out.push((n.id.clone(), n.hierarchical_id.clone()));
                collect(n.child_nodes(), out);
            }
        }
    }

    #[test]
    fn given_small_forest_when_assigning_then_paths_follow_positions() {
        let forest = vec![node("a", None), node("b", Some(vec![node("c", None)]))];

        let assigned = assign_identifiers(&forest, None);

        assert_eq!(
            paths(&assigned),
            vec![
                ("a".into(), Some("1".into())),
                ("b".into(), Some("2".into())),
                ("c".into(), Some("2.1".into())),
            ]
        );
    }

    #[test]
    fn given_assigned_forest_when_assigning_again_then_output_is_identical() {
        let forest = vec![
            node("a", Some(vec![node("b", None), node("c", Some(vec![]))])),
            node("d", None),
        ];

        let once = assign_identifiers(&forest, None);
        let twice = assign_identifiers(&once, None);

        assert_eq!(once, twice);
    }

    #[test]
    fn given_parent_path_when_assigning_then_paths_are_prefixed() {
        let forest = vec![node("x", None), node("y", None)];

        let assigned = assign_identifiers(&forest, Some("3.1"));

        assert_eq!(assigned[0].hierarchical_id.as_deref(), Some("3.1.1"));
        assert_eq!(assigned[1].hierarchical_id.as_deref(), Some("3.1.2"));
    }

    #[test]
    fn given_empty_forest_when_assigning_then_returns_empty() {
        let assigned = assign_identifiers::<Payload>(&[], None);
        assert!(assigned.is_empty());
    }

    #[test]
    fn given_absent_and_empty_children_when_assigning_then_both_forms_survive() {
        let forest = vec![node("a", None), node("b", Some(vec![]))];

        let assigned = assign_identifiers(&forest, None);

        assert!(assigned[0].children.is_none());
        assert_eq!(assigned[1].children, Some(vec![]));
    }

    #[test]
    fn given_sibling_reorder_when_assigning_then_other_subtrees_unchanged() {
        let stable = node("s", Some(vec![node("s1", None), node("s2", None)]));
        let shuffled = |order: Vec<TreeNode>| {
            vec![stable.clone(), node("p", Some(order))]
        };

        let before = assign_identifiers(
            &shuffled(vec![node("x", None), node("y", None)]),
            None,
        );
        let after = assign_identifiers(
            &shuffled(vec![node("y", None), node("x", None)]),
            None,
        );

        // the untouched first tree is byte-for-byte identical
        assert_eq!(
            serde_json::to_string(&before[0]).unwrap(),
            serde_json::to_string(&after[0]).unwrap()
        );
        // only the reordered siblings swapped identifiers
        assert_eq!(after[1].child_nodes()[0].id, "y");
        assert_eq!(
            after[1].child_nodes()[0].hierarchical_id.as_deref(),
            Some("2.1")
        );
    }
}
