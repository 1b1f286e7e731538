//! Application layer: services and use cases
//!
//! Orchestrates the domain engines: structural edits with identifier
//! recomputation and audit capture, score rollups, and the audit log.

pub mod error;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use services::{AuditLog, MutationOutcome, ScoringService, TaxonomyService};
