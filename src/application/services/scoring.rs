//! Scoring service
//!
//! Rolls up a forest from an explicit id → leaf score map. A leaf
//! without a score entry is an error: silently substituting zero would
//! corrupt every ancestor value.

use std::collections::BTreeMap;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::aggregate::aggregate;
use crate::domain::node::TreeNode;
use crate::domain::weights::WeightConfig;

pub struct ScoringService {
    weights: WeightConfig,
}

impl ScoringService {
    pub fn new(weights: WeightConfig) -> Self {
        Self { weights }
    }

    /// Weighted rollup of `scores` to every node, keyed by node id.
    #[instrument(level = "debug", skip_all)]
    pub fn rollup<T>(
        &self,
        forest: &[TreeNode<T>],
        scores: &BTreeMap<String, f64>,
    ) -> ApplicationResult<BTreeMap<String, f64>> {
        ensure_scores(forest, scores)?;
        debug!(leaves = scores.len(), "rollup");
        let values = aggregate(forest, &self.weights, |node| {
            scores.get(&node.id).copied().unwrap_or(f64::NAN)
        })?;
        Ok(values)
    }
}

/// Every node that will be scored as a leaf (children absent or empty)
/// must have an entry in the score map.
fn ensure_scores<T>(
    forest: &[TreeNode<T>],
    scores: &BTreeMap<String, f64>,
) -> ApplicationResult<()> {
    for node in forest {
        if node.child_nodes().is_empty() {
            if !scores.contains_key(&node.id) {
                return Err(ApplicationError::MissingScore(node.id.clone()));
            }
        } else {
            ensure_scores(node.child_nodes(), scores)?;
        }
    }
    Ok(())
}
