//! Infrastructure-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::github::RemoteError;

/// Infrastructure errors wrap application errors and add wiring-level concerns.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("cannot set up API client: {0}")]
    ClientSetup(#[source] RemoteError),
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;
