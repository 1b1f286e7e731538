//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add orchestration context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("node already exists: {0}")]
    DuplicateNode(String),

    #[error("cannot move {0} into its own subtree")]
    MoveIntoSubtree(String),

    #[error("position {index} out of range for {len} siblings")]
    PositionOutOfRange { index: usize, len: usize },

    #[error("no score provided for leaf node: {0}")]
    MissingScore(String),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
