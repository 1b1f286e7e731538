//! Domain layer: the taxonomy forest and the three core engines
//!
//! Everything here is pure and synchronous: no I/O, no shared state
//! beyond explicit arguments and return values. Inputs are never
//! mutated; callers decide whether to replace their state with the
//! returned values.

pub mod aggregate;
pub mod audit;
pub mod error;
pub mod identity;
pub mod node;
pub mod weights;

pub use aggregate::aggregate;
pub use audit::{diff, summary_entry, AuditEntry, ChangeType, EntityType, FieldChange};
pub use error::DomainError;
pub use identity::assign_identifiers;
pub use node::{find, find_mut, forest_depth, leaf_names, node_count, Payload, TreeNode};
pub use weights::{WeightConfig, FALLBACK_WEIGHT, MAX_LEVEL};
