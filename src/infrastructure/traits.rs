//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io;
use std::path::Path;

use crate::domain::RepoRef;
use crate::infrastructure::github::{CommitEntry, RemoteError, RepositoryInfo};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file, truncating any previous content.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path is a file.
    fn is_file(&self, path: &Path) -> bool;

    /// Check if path is a directory.
    fn is_dir(&self, path: &Path) -> bool;
}

/// Hosted repository API (GitHub REST v3).
pub trait GitHubApi: Send + Sync {
    /// Look up repository metadata. Fails for unknown owners or repositories.
    fn get_repository(&self, repo: &RepoRef) -> Result<RepositoryInfo, RemoteError>;

    /// One page of commits reachable from `repo.branch`, most recent first.
    ///
    /// `page` is 1-based.
    fn list_commits(
        &self,
        repo: &RepoRef,
        per_page: usize,
        page: usize,
    ) -> Result<Vec<CommitEntry>, RemoteError>;
}

/// Named template lookup.
pub trait TemplateSource: Send + Sync {
    /// Load template text by name.
    ///
    /// Returns `io::ErrorKind::NotFound` when the template does not exist.
    fn load(&self, name: &str) -> io::Result<String>;

    /// Human readable location, used in error messages.
    fn location(&self) -> String;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}
