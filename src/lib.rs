//! commit-report: render the latest commits of a GitHub branch as HTML or JSON.
//!
//! Layers, innermost first:
//! - [`domain`]: commit records, repository references, endpoint selection
//! - [`application`]: fetching and rendering services
//! - [`infrastructure`]: GitHub client, filesystem, templates, wiring
//! - [`cli`]: argument parsing and command execution

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
