//! Application services

pub mod audit_log;
pub mod scoring;
pub mod taxonomy;

pub use audit_log::AuditLog;
pub use scoring::ScoringService;
pub use taxonomy::{MutationOutcome, TaxonomyService};
