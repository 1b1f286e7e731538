//! Taxonomy mutation service
//!
//! Performs structural edits (insert/remove/move/reorder) as one logical
//! step: mutate a copy of the forest, recompute every hierarchical
//! identifier from scratch, and record the audit entry for the touched
//! node. Inputs are never mutated; callers replace their state with the
//! returned forest.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::audit::{diff, AuditEntry, EntityType};
use crate::domain::identity::assign_identifiers;
use crate::domain::node::{find, find_mut, node_count, TreeNode};

/// New forest plus the audit entry describing the mutation.
#[derive(Debug, Clone)]
pub struct MutationOutcome<T> {
    pub forest: Vec<TreeNode<T>>,
    pub entry: AuditEntry,
}

/// Service for structural edits on one taxonomy.
pub struct TaxonomyService {
    entity_type: EntityType,
    actor: String,
}

impl TaxonomyService {
    /// One service per taxonomy kind; `actor` is recorded on every
    /// audit entry.
    pub fn new(entity_type: EntityType, actor: impl Into<String>) -> Self {
        Self {
            entity_type,
            actor: actor.into(),
        }
    }

    /// Insert `node` (possibly a whole subtree) under `parent_id`, or at
    /// the root level when `parent_id` is `None`. `position` defaults to
    /// appending after the existing siblings.
    #[instrument(level = "debug", skip_all, fields(parent = ?parent_id, position = ?position))]
    pub fn insert<T>(
        &self,
        forest: &[TreeNode<T>],
        parent_id: Option<&str>,
        node: TreeNode<T>,
        position: Option<usize>,
    ) -> ApplicationResult<MutationOutcome<T>>
    where
        T: Clone + Serialize,
    {
        let mut incoming_ids = Vec::new();
        subtree_ids(&node, &mut incoming_ids);
        for id in &incoming_ids {
            if find(forest, id).is_some() {
                return Err(ApplicationError::DuplicateNode(id.clone()));
            }
        }

        let node_id = node.id.clone();
        let node_name = node.name.clone();

        let mut next = forest.to_vec();
        let siblings = match parent_id {
            None => &mut next,
            Some(pid) => {
                let parent = find_mut(&mut next, pid)
                    .ok_or_else(|| ApplicationError::NodeNotFound(pid.to_string()))?;
                parent.children.get_or_insert_with(Vec::new)
            }
        };
        let index = position.unwrap_or(siblings.len());
        if index > siblings.len() {
            return Err(ApplicationError::PositionOutOfRange {
                index,
                len: siblings.len(),
            });
        }
        siblings.insert(index, node);

        let assigned = assign_identifiers(&next, None);
        debug!(id = %node_id, "inserted");

        let after = self.node_snapshot(&assigned, &node_id)?;
        let entry = diff(
            None,
            Some(&after),
            self.entity_type,
            &self.actor,
            &node_id,
            &node_name,
        )?;
        Ok(MutationOutcome {
            forest: assigned,
            entry,
        })
    }

    /// Remove the node with `id` together with its subtree.
    #[instrument(level = "debug", skip_all, fields(id = %id))]
    pub fn remove<T>(
        &self,
        forest: &[TreeNode<T>],
        id: &str,
    ) -> ApplicationResult<MutationOutcome<T>>
    where
        T: Clone + Serialize,
    {
        let target =
            find(forest, id).ok_or_else(|| ApplicationError::NodeNotFound(id.to_string()))?;
        let before = snapshot(target)?;
        let name = target.name.clone();
        let descendants = node_count(target.child_nodes());

        let mut next = forest.to_vec();
        detach(&mut next, id).ok_or_else(|| ApplicationError::NodeNotFound(id.to_string()))?;
        let assigned = assign_identifiers(&next, None);
        debug!(id = %id, descendants, "removed");

        let mut entry = diff(Some(&before), None, self.entity_type, &self.actor, id, &name)?;
        if descendants > 0 {
            entry.summary = Some(format!("removed {descendants} descendant nodes with the subtree"));
        }
        Ok(MutationOutcome {
            forest: assigned,
            entry,
        })
    }

    /// Move the node with `id` under `new_parent` (root level when
    /// `None`), at `position` among the new siblings.
    #[instrument(level = "debug", skip_all, fields(id = %id, parent = ?new_parent))]
    pub fn move_node<T>(
        &self,
        forest: &[TreeNode<T>],
        id: &str,
        new_parent: Option<&str>,
        position: Option<usize>,
    ) -> ApplicationResult<MutationOutcome<T>>
    where
        T: Clone + Serialize,
    {
        let target =
            find(forest, id).ok_or_else(|| ApplicationError::NodeNotFound(id.to_string()))?;
        if let Some(pid) = new_parent {
            if subtree_contains(target, pid) {
                return Err(ApplicationError::MoveIntoSubtree(id.to_string()));
            }
            if find(forest, pid).is_none() {
                return Err(ApplicationError::NodeNotFound(pid.to_string()));
            }
        }
        let before = snapshot(target)?;
        let name = target.name.clone();

        let mut next = forest.to_vec();
        let detached =
            detach(&mut next, id).ok_or_else(|| ApplicationError::NodeNotFound(id.to_string()))?;
        let siblings = match new_parent {
            None => &mut next,
            Some(pid) => {
                let parent = find_mut(&mut next, pid)
                    .ok_or_else(|| ApplicationError::NodeNotFound(pid.to_string()))?;
                parent.children.get_or_insert_with(Vec::new)
            }
        };
        let index = position.unwrap_or(siblings.len());
        if index > siblings.len() {
            return Err(ApplicationError::PositionOutOfRange {
                index,
                len: siblings.len(),
            });
        }
        siblings.insert(index, detached);

        let assigned = assign_identifiers(&next, None);
        debug!(id = %id, "moved");

        let after = self.node_snapshot(&assigned, id)?;
        let entry = diff(
            Some(&before),
            Some(&after),
            self.entity_type,
            &self.actor,
            id,
            &name,
        )?;
        Ok(MutationOutcome {
            forest: assigned,
            entry,
        })
    }

    /// Move the sibling at `from` to `to` within one child list
    /// (root level when `parent_id` is `None`).
    #[instrument(level = "debug", skip_all, fields(parent = ?parent_id, from, to))]
    pub fn reorder<T>(
        &self,
        forest: &[TreeNode<T>],
        parent_id: Option<&str>,
        from: usize,
        to: usize,
    ) -> ApplicationResult<MutationOutcome<T>>
    where
        T: Clone + Serialize,
    {
        let mut next = forest.to_vec();
        let siblings = match parent_id {
            None => &mut next,
            Some(pid) => {
                let parent = find_mut(&mut next, pid)
                    .ok_or_else(|| ApplicationError::NodeNotFound(pid.to_string()))?;
                match parent.children.as_mut() {
                    Some(children) => children,
                    None => {
                        return Err(ApplicationError::PositionOutOfRange { index: from, len: 0 })
                    }
                }
            }
        };
        let len = siblings.len();
        if from >= len {
            return Err(ApplicationError::PositionOutOfRange { index: from, len });
        }
        if to >= len {
            return Err(ApplicationError::PositionOutOfRange { index: to, len });
        }
        let moved = siblings.remove(from);
        let moved_id = moved.id.clone();
        let moved_name = moved.name.clone();
        siblings.insert(to, moved);

        let before = self.node_snapshot(forest, &moved_id)?;
        let assigned = assign_identifiers(&next, None);
        debug!(id = %moved_id, "reordered");

        let after = self.node_snapshot(&assigned, &moved_id)?;
        let mut entry = diff(
            Some(&before),
            Some(&after),
            self.entity_type,
            &self.actor,
            &moved_id,
            &moved_name,
        )?;
        entry.summary = Some(format!(
            "reordered siblings under {}",
            parent_id.unwrap_or("the roots")
        ));
        Ok(MutationOutcome {
            forest: assigned,
            entry,
        })
    }

    fn node_snapshot<T>(&self, forest: &[TreeNode<T>], id: &str) -> ApplicationResult<Value>
    where
        T: Clone + Serialize,
    {
        let node =
            find(forest, id).ok_or_else(|| ApplicationError::NodeNotFound(id.to_string()))?;
        snapshot(node)
    }
}

/// Snapshot of a node's own fields, without its subtree. Structural
/// changes still surface through the recomputed `hierarchical_id`.
fn snapshot<T: Clone + Serialize>(node: &TreeNode<T>) -> ApplicationResult<Value> {
    let mut bare = node.clone();
    bare.children = None;
    serde_json::to_value(&bare).map_err(|e| ApplicationError::OperationFailed {
        context: format!("serialize node {}", node.id),
        source: Box::new(e),
    })
}

fn subtree_ids<T>(node: &TreeNode<T>, ids: &mut Vec<String>) {
    ids.push(node.id.clone());
    for child in node.child_nodes() {
        subtree_ids(child, ids);
    }
}

fn subtree_contains<T>(node: &TreeNode<T>, id: &str) -> bool {
    node.id == id || node.child_nodes().iter().any(|c| subtree_contains(c, id))
}

/// Remove and return the node with `id` from wherever it sits.
fn detach<T>(siblings: &mut Vec<TreeNode<T>>, id: &str) -> Option<TreeNode<T>> {
    if let Some(index) = siblings.iter().position(|n| n.id == id) {
        return Some(siblings.remove(index));
    }
    for node in siblings.iter_mut() {
        if let Some(children) = node.children.as_mut() {
            if let Some(found) = detach(children, id) {
                return Some(found);
            }
        }
    }
    None
}
