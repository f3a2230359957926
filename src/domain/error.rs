//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent invalid input values.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("the GitHub token is missing: create an access token and export GITHUB_TOKEN")]
    MissingCredential,

    #[error("invalid base url {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("invalid repository reference: owner={owner:?} name={name:?} branch={branch:?}")]
    InvalidRepo {
        owner: String,
        name: String,
        branch: String,
    },

    #[error("unknown report format: {0} (expected html or json)")]
    UnknownFormat(String),
}
