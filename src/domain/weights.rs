//! Weight configuration and effective-weight resolution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Deepest level that may carry a default weight.
pub const MAX_LEVEL: u8 = 5;

/// Weight for nodes with neither an override nor a level default.
/// 1.0 so unconfigured nodes contribute equally instead of vanishing
/// from rollups.
pub const FALLBACK_WEIGHT: f64 = 1.0;

/// Weights driving the aggregation rollup.
///
/// Level defaults cover the common case; per-node overrides handle the
/// exceptions. Resolution order is fixed: override, then level default,
/// then `fallback`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightConfig {
    /// Default weight per depth level, 1-based from the forest roots.
    pub level_defaults: BTreeMap<u8, f64>,
    /// Explicit weight per node id, taking precedence over the level
    /// default for that node only.
    pub node_overrides: BTreeMap<String, f64>,
    /// Weight used when neither an override nor a level default applies.
    pub fallback: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            level_defaults: BTreeMap::new(),
            node_overrides: BTreeMap::new(),
            fallback: FALLBACK_WEIGHT,
        }
    }
}

impl WeightConfig {
    /// Resolve the weight actually used for a node.
    pub fn effective_weight(&self, node_id: &str, level: u8) -> f64 {
        if let Some(weight) = self.node_overrides.get(node_id) {
            return *weight;
        }
        if let Some(weight) = self.level_defaults.get(&level) {
            return *weight;
        }
        self.fallback
    }

    /// Reject negative weights and out-of-range levels.
    ///
    /// Weighted means are undefined for negative weights, so a bad
    /// configuration fails here before any rollup begins.
    pub fn validate(&self) -> Result<(), DomainError> {
        for (level, weight) in &self.level_defaults {
            if !(1..=MAX_LEVEL).contains(level) {
                return Err(DomainError::LevelOutOfRange {
                    level: *level,
                    max: MAX_LEVEL,
                });
            }
            if *weight < 0.0 {
                return Err(DomainError::NegativeWeight {
                    scope: format!("level {level}"),
                    weight: *weight,
                });
            }
        }
        for (id, weight) in &self.node_overrides {
            if *weight < 0.0 {
                return Err(DomainError::NegativeWeight {
                    scope: format!("node {id}"),
                    weight: *weight,
                });
            }
        }
        if self.fallback < 0.0 {
            return Err(DomainError::NegativeWeight {
                scope: "fallback".to_string(),
                weight: self.fallback,
            });
        }
        Ok(())
    }
}
