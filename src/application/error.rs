//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::github::RemoteError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("{context}: {source}")]
    Remote {
        context: String,
        #[source]
        source: RemoteError,
    },

    #[error("template {name} not found in {location}")]
    TemplateNotFound { name: String, location: String },

    #[error("render {name}: {message}")]
    Render { name: String, message: String },

    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    /// Wrap a remote failure with what was being attempted.
    pub fn remote(context: impl Into<String>, source: RemoteError) -> Self {
        Self::Remote {
            context: context.into(),
            source,
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
