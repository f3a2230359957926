//! Directory-backed template source
//!
//! Template names resolve strictly below the configured directory.

use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::infrastructure::traits::{FileSystem, TemplateSource};

/// Loads templates from a single directory.
pub struct DirTemplateSource {
    dir: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl DirTemplateSource {
    pub fn new(dir: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            dir: dir.into(),
            fs,
        }
    }

    /// Resolve `name` inside the directory, rejecting absolute paths and `..`.
    fn resolve(&self, name: &str) -> io::Result<PathBuf> {
        let relative = Path::new(name);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if name.is_empty() || escapes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("template name must be relative to the template directory: {name}"),
            ));
        }
        Ok(self.dir.join(relative))
    }
}

impl TemplateSource for DirTemplateSource {
    fn load(&self, name: &str) -> io::Result<String> {
        if !self.fs.is_dir(&self.dir) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("template directory not found: {}", self.dir.display()),
            ));
        }

        let path = self.resolve(name)?;
        debug!("load template: {}", path.display());
        if !self.fs.is_file(&path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("template not found: {}", path.display()),
            ));
        }
        self.fs.read_to_string(&path)
    }

    fn location(&self) -> String {
        self.dir.display().to_string()
    }
}
