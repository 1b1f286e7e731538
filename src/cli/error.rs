//! CLI-level errors (wraps application errors)

use std::path::PathBuf;

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => crate::exitcode::USAGE,
            CliError::Read { .. } => crate::exitcode::NOINPUT,
            CliError::Write { .. } => crate::exitcode::CANTCREAT,
            CliError::Json { .. } => crate::exitcode::DATAERR,
            CliError::Application(e) => match e {
                ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                ApplicationError::Domain(DomainError::NegativeWeight { .. })
                | ApplicationError::Domain(DomainError::LevelOutOfRange { .. }) => {
                    crate::exitcode::CONFIG
                }
                ApplicationError::Domain(_) => crate::exitcode::DATAERR,
                ApplicationError::NodeNotFound(_)
                | ApplicationError::DuplicateNode(_)
                | ApplicationError::MoveIntoSubtree(_)
                | ApplicationError::PositionOutOfRange { .. }
                | ApplicationError::MissingScore(_) => crate::exitcode::DATAERR,
                ApplicationError::OperationFailed { .. } => crate::exitcode::SOFTWARE,
            },
        }
    }
}
