//! rstax: risk taxonomy engine
//!
//! Hierarchical identifier assignment, weighted score rollups, and
//! field-level audit trails over one shared forest shape. The domain
//! layer holds the three pure engines; the application layer sequences
//! them (mutate, reassign identifiers, record the audit entry) so
//! persisted state never observes a half-updated tree.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;

pub use application::{
    ApplicationError, ApplicationResult, AuditLog, MutationOutcome, ScoringService,
    TaxonomyService,
};
pub use config::Settings;
pub use domain::{
    aggregate, assign_identifiers, diff, AuditEntry, ChangeType, DomainError, EntityType,
    FieldChange, Payload, TreeNode, WeightConfig,
};
