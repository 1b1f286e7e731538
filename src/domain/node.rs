//! Taxonomy forest data shape and inspection helpers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Payload for nodes loaded from JSON documents: extra fields are kept
/// verbatim so documents round-trip unchanged.
pub type Payload = Map<String, Value>;

/// A node in a taxonomy forest.
///
/// `children` keeps the distinction between a missing field (`None`) and
/// an explicitly empty sequence (`Some(vec![])`). Consumers branch on
/// which form was present, so both survive identifier assignment and
/// serde round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode<T = Payload> {
    /// Stable identifier, assigned once at creation. Used as the
    /// aggregation key and as audit entity id.
    pub id: String,
    /// Derived materialized path, e.g. "1.2.3". Recomputed wholesale
    /// after every structural change, never patched incrementally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hierarchical_id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Extra domain fields, flattened into the node object.
    #[serde(flatten)]
    pub data: T,
    /// Ordered children; order defines sibling position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode<T>>>,
}

impl<T> TreeNode<T> {
    /// Children as a slice, treating an absent field as empty.
    pub fn child_nodes(&self) -> &[TreeNode<T>] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Height of the subtree rooted at this node (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        1 + self
            .child_nodes()
            .iter()
            .map(TreeNode::depth)
            .max()
            .unwrap_or(0)
    }
}

/// Height of the tallest tree in the forest.
pub fn forest_depth<T>(forest: &[TreeNode<T>]) -> usize {
    forest.iter().map(TreeNode::depth).max().unwrap_or(0)
}

/// Total number of nodes in the forest.
pub fn node_count<T>(forest: &[TreeNode<T>]) -> usize {
    forest
        .iter()
        .map(|node| 1 + node_count(node.child_nodes()))
        .sum()
}

/// Names of all leaf nodes, in depth-first sibling order.
pub fn leaf_names<T>(forest: &[TreeNode<T>]) -> Vec<String> {
    let mut leaves = Vec::new();
    collect_leaves(forest, &mut leaves);
    leaves
}

fn collect_leaves<T>(forest: &[TreeNode<T>], leaves: &mut Vec<String>) {
    for node in forest {
        if node.child_nodes().is_empty() {
            leaves.push(node.name.clone());
        } else {
            collect_leaves(node.child_nodes(), leaves);
        }
    }
}

/// Find a node by its stable id, depth-first.
pub fn find<'a, T>(forest: &'a [TreeNode<T>], id: &str) -> Option<&'a TreeNode<T>> {
    for node in forest {
        if node.id == id {
            return Some(node);
        }
        if let Some(children) = node.children.as_deref() {
            if let Some(found) = find(children, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Mutable lookup by stable id, depth-first.
pub fn find_mut<'a, T>(forest: &'a mut [TreeNode<T>], id: &str) -> Option<&'a mut TreeNode<T>> {
    for node in forest.iter_mut() {
        if node.id == id {
            return Some(node);
        }
        if let Some(children) = node.children.as_mut() {
            if let Some(found) = find_mut(children, id) {
                return Some(found);
            }
        }
    }
    None
}
