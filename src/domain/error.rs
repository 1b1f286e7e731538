//! Domain-level errors (no I/O concerns)

use thiserror::Error;

/// Domain errors represent violations of core invariants.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("negative weight {weight} configured for {scope}")]
    NegativeWeight { scope: String, weight: f64 },

    #[error("weight level {level} outside supported range 1..={max}")]
    LevelOutOfRange { level: u8, max: u8 },

    #[error("non-finite score for node: {0}")]
    NonFiniteScore(String),

    #[error("audit diff requires at least one snapshot")]
    MissingSnapshots,

    #[error("unknown entity type: {0}")]
    UnknownEntityType(String),
}
