//! Report rendering service
//!
//! Renders commit records as HTML (through a template) or JSON and writes the
//! result to `<output_file>.<ext>`, overwriting any existing file.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use minijinja::{context, Environment, ErrorKind};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::{debug, info};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{CommitRecord, ReportFormat};
use crate::infrastructure::traits::{FileSystem, TemplateSource};

const JSON_INDENT: &[u8] = b"    ";

/// Service for writing reports.
pub struct ReportService {
    fs: Arc<dyn FileSystem>,
    templates: Arc<dyn TemplateSource>,
}

impl ReportService {
    /// Create a report service reading templates only from `templates`.
    pub fn new(fs: Arc<dyn FileSystem>, templates: Arc<dyn TemplateSource>) -> Self {
        Self { fs, templates }
    }

    /// Render in the requested format and return the written path.
    ///
    /// `template_file` is ignored for JSON.
    pub fn render(
        &self,
        format: ReportFormat,
        records: &[CommitRecord],
        output_file: &Path,
        template_file: &str,
    ) -> ApplicationResult<PathBuf> {
        match format {
            ReportFormat::Html => self.render_html(records, output_file, template_file),
            ReportFormat::Json => self.render_json(records, output_file),
        }
    }

    /// Render `template_file` with the records bound to `items` and write `<output_file>.html`.
    pub fn render_html(
        &self,
        records: &[CommitRecord],
        output_file: &Path,
        template_file: &str,
    ) -> ApplicationResult<PathBuf> {
        debug!(
            "render_html: template={} records={}",
            template_file,
            records.len()
        );
        let html = self.render_template(template_file, records)?;
        let path = report_path(output_file, ReportFormat::Html);
        self.fs
            .write(&path, &html)
            .with_path_context("write report", &path)?;
        info!("wrote {}", path.display());
        Ok(path)
    }

    /// Write the records to `<output_file>.json`.
    pub fn render_json(
        &self,
        records: &[CommitRecord],
        output_file: &Path,
    ) -> ApplicationResult<PathBuf> {
        debug!("render_json: records={}", records.len());
        let json = to_json_string(records)?;
        let path = report_path(output_file, ReportFormat::Json);
        self.fs
            .write(&path, &json)
            .with_path_context("write report", &path)?;
        info!("wrote {}", path.display());
        Ok(path)
    }

    fn render_template(&self, name: &str, records: &[CommitRecord]) -> ApplicationResult<String> {
        let mut env = Environment::new();
        let templates = Arc::clone(&self.templates);
        // Includes and extends resolve through the same source.
        env.set_loader(move |name| match templates.load(name) {
            Ok(source) => Ok(Some(source)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(minijinja::Error::new(ErrorKind::InvalidOperation, e.to_string())),
        });

        let template = env.get_template(name).map_err(|e| self.template_error(name, e))?;
        template
            .render(context! { items => records })
            .map_err(|e| self.template_error(name, e))
    }

    fn template_error(&self, name: &str, e: minijinja::Error) -> ApplicationError {
        if e.kind() == ErrorKind::TemplateNotFound {
            ApplicationError::TemplateNotFound {
                name: name.to_string(),
                location: self.templates.location(),
            }
        } else {
            ApplicationError::Render {
                name: name.to_string(),
                message: e.to_string(),
            }
        }
    }
}

/// `<output_file>.<ext>`; an existing extension on `output_file` is kept.
pub fn report_path(output_file: &Path, format: ReportFormat) -> PathBuf {
    let mut path = OsString::from(output_file.as_os_str());
    path.push(".");
    path.push(format.extension());
    PathBuf::from(path)
}

/// Serialize records as a JSON array with lexically sorted keys and 4-space indent.
pub fn to_json_string(records: &[CommitRecord]) -> ApplicationResult<String> {
    let rows: Vec<BTreeMap<&str, &str>> = records
        .iter()
        .map(|r| {
            BTreeMap::from([
                ("author", r.author.as_str()),
                ("message", r.message.as_str()),
                ("sha", r.sha.as_str()),
            ])
        })
        .collect();

    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(JSON_INDENT));
    rows.serialize(&mut serializer)?;

    String::from_utf8(buf).map_err(|e| ApplicationError::OperationFailed {
        context: "encode JSON report".to_string(),
        source: Box::new(e),
    })
}
