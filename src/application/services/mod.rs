//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, GitHubApi, TemplateSource)
//! but are themselves concrete structs, not traits.

mod commits;
mod report;

pub use commits::{project_entries, ClientConfig, CommitService};
pub use report::{report_path, to_json_string, ReportService};
