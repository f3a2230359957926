//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        CliError::from(ApplicationError::Domain(e))
    }
}

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => exitcode::USAGE,
            CliError::Infra(InfraError::ClientSetup(_)) => exitcode::SOFTWARE,
            CliError::Infra(InfraError::Application(e)) => match e {
                ApplicationError::Domain(DomainError::MissingCredential)
                | ApplicationError::Domain(DomainError::InvalidBaseUrl { .. })
                | ApplicationError::Config { .. } => exitcode::CONFIG,
                ApplicationError::Domain(_) => exitcode::USAGE,
                ApplicationError::Remote { .. } => exitcode::UNAVAILABLE,
                ApplicationError::Io { .. } => exitcode::IOERR,
                ApplicationError::TemplateNotFound { .. }
                | ApplicationError::Render { .. }
                | ApplicationError::Serialize(_)
                | ApplicationError::OperationFailed { .. } => exitcode::SOFTWARE,
            },
        }
    }
}
