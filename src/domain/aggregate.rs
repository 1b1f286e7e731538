//! Weighted score rollup over a taxonomy forest.

use std::collections::BTreeMap;

use tracing::trace;

use crate::domain::error::DomainError;
use crate::domain::node::TreeNode;
use crate::domain::weights::WeightConfig;

/// Roll up `leaf_score` values to every node in the forest, keyed by
/// stable node id.
///
/// Post-order traversal: a node without child values (children absent or
/// empty) takes `leaf_score(node)`; an internal node takes the weighted
/// mean of its children's values, each child weighted by its effective
/// weight normalized within the sibling group. A group whose weights sum
/// to zero falls back to the unweighted arithmetic mean instead of
/// dividing by zero.
///
/// Depth for level lookup is 1-based from the forest roots. The config
/// is validated up front; a non-finite leaf score aborts the rollup with
/// an error naming the node, so bad input data never silently corrupts
/// parent values.
pub fn aggregate<T, F>(
    forest: &[TreeNode<T>],
    weights: &WeightConfig,
    leaf_score: F,
) -> Result<BTreeMap<String, f64>, DomainError>
where
    F: Fn(&TreeNode<T>) -> f64,
{
    weights.validate()?;
    let mut values = BTreeMap::new();
    for node in forest {
        aggregate_node(node, 1, weights, &leaf_score, &mut values)?;
    }
    Ok(values)
}

fn aggregate_node<T, F>(
    node: &TreeNode<T>,
    level: u8,
    weights: &WeightConfig,
    leaf_score: &F,
    values: &mut BTreeMap<String, f64>,
) -> Result<f64, DomainError>
where
    F: Fn(&TreeNode<T>) -> f64,
{
    let children = node.child_nodes();
    let value = if children.is_empty() {
        let score = leaf_score(node);
        if !score.is_finite() {
            return Err(DomainError::NonFiniteScore(node.id.clone()));
        }
        score
    } else {
        let child_level = level.saturating_add(1);
        let mut weighted_sum = 0.0;
        let mut weight_sum = 0.0;
        let mut plain_sum = 0.0;
        for child in children {
            let child_value = aggregate_node(child, child_level, weights, leaf_score, values)?;
            let weight = weights.effective_weight(&child.id, child_level);
            weighted_sum += weight * child_value;
            weight_sum += weight;
            plain_sum += child_value;
        }
        if weight_sum == 0.0 {
            plain_sum / children.len() as f64
        } else {
            weighted_sum / weight_sum
        }
    };
    trace!(id = %node.id, value, "rollup");
    values.insert(node.id.clone(), value);
    Ok(value)
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

    fn score_of(values: &BTreeMap<String, f64>, id: &str) -> f64 {
        *values.get(id).expect("node id present in rollup")
    }

    #[test]
    fn given_weighted_children_when_aggregating_then_parent_is_weighted_mean() {
        let forest = vec![node("p", Some(vec![node("a", None), node("b", None)]))];
        let weights = WeightConfig {
            node_overrides: BTreeMap::from([("a".to_string(), 3.0), ("b".to_string(), 1.0)]),
            ..WeightConfig::default()
        };

        let values = aggregate(&forest, &weights, |n| match n.id.as_str() {
            "a" => 10.0,
            _ => 2.0,
        })
        .unwrap();

        // (3*10 + 1*2) / 4
        assert_eq!(score_of(&values, "p"), 8.0);
    }

    #[test]
    fn given_all_zero_weights_when_aggregating_then_falls_back_to_plain_mean() {
        let forest = vec![node("p", Some(vec![node("a", None), node("b", None)]))];
        let weights = WeightConfig {
            node_overrides: BTreeMap::from([("a".to_string(), 0.0), ("b".to_string(), 0.0)]),
            ..WeightConfig::default()
        };

        let values = aggregate(&forest, &weights, |n| match n.id.as_str() {
            "a" => 10.0,
            _ => 2.0,
        })
        .unwrap();

        assert_eq!(score_of(&values, "p"), 6.0);
    }

    #[test]
    fn given_level_defaults_when_aggregating_then_depth_is_one_based() {
        // children of a root sit at level 2
        let forest = vec![node("p", Some(vec![node("a", None), node("b", None)]))];
        let weights = WeightConfig {
            level_defaults: BTreeMap::from([(2, 5.0)]),
            node_overrides: BTreeMap::from([("b".to_string(), 0.0)]),
            ..WeightConfig::default()
        };

        let values = aggregate(&forest, &weights, |n| match n.id.as_str() {
            "a" => 4.0,
            _ => 100.0,
        })
        .unwrap();

        // a weighs 5 (level default), b weighs 0 (override)
        assert_eq!(score_of(&values, "p"), 4.0);
    }

    #[test]
    fn given_negative_weight_when_aggregating_then_config_rejected_before_traversal() {
        let forest = vec![node("p", Some(vec![node("a", None)]))];
        let weights = WeightConfig {
            node_overrides: BTreeMap::from([("a".to_string(), -1.0)]),
            ..WeightConfig::default()
        };

        let err = aggregate(&forest, &weights, |_| 1.0).unwrap_err();
        assert!(matches!(err, DomainError::NegativeWeight { .. }));
    }

    #[test]
    fn given_non_finite_leaf_score_when_aggregating_then_error_names_node() {
        let forest = vec![node("p", Some(vec![node("bad", None)]))];

        let err = aggregate(&forest, &WeightConfig::default(), |n| {
            if n.id == "bad" {
                f64::NAN
            } else {
                1.0
            }
        })
        .unwrap_err();

        assert_eq!(err, DomainError::NonFiniteScore("bad".to_string()));
    }

    #[test]
    fn given_explicitly_empty_children_when_aggregating_then_scored_as_leaf() {
        let forest = vec![node("p", Some(vec![]))];

        let values = aggregate(&forest, &WeightConfig::default(), |_| 7.0).unwrap();

        assert_eq!(score_of(&values, "p"), 7.0);
    }

    #[test]
    fn given_three_levels_when_aggregating_then_values_roll_up_to_root() {
        let forest = vec![node(
            "root",
            Some(vec![
                node("mid", Some(vec![node("l1", None), node("l2", None)])),
                node("l3", None),
            ]),
        )];

        let values = aggregate(&forest, &WeightConfig::default(), |n| match n.id.as_str() {
            "l1" => 2.0,
            "l2" => 4.0,
            _ => 6.0,
        })
        .unwrap();

        assert_eq!(score_of(&values, "mid"), 3.0);
        assert_eq!(score_of(&values, "root"), 4.5);
        // every node received a value
        assert_eq!(values.len(), 5);
    }
}
