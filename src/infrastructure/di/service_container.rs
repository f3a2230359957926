//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{ClientConfig, CommitService, ReportService};
use crate::config::Settings;
use crate::infrastructure::github::UreqGitHubApi;
use crate::infrastructure::templates::DirTemplateSource;
use crate::infrastructure::traits::{FileSystem, GitHubApi, RealFileSystem, TemplateSource};
use crate::infrastructure::{InfraError, InfraResult};

/// Container holding everything one report run needs.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Endpoint, repository, history and credential for this run
    pub client: ClientConfig,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Repository API abstraction
    pub api: Arc<dyn GitHubApi>,

    /// Template lookup for HTML reports
    pub templates: Arc<dyn TemplateSource>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings, client: ClientConfig) -> InfraResult<Self> {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let api = UreqGitHubApi::new(&client.endpoint, client.credential.clone())
            .map_err(InfraError::ClientSetup)?;
        let templates = Arc::new(DirTemplateSource::new(
            settings.template_dir.clone(),
            Arc::clone(&fs),
        ));

        Ok(Self::with_deps(settings, client, fs, Arc::new(api), templates))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        client: ClientConfig,
        fs: Arc<dyn FileSystem>,
        api: Arc<dyn GitHubApi>,
        templates: Arc<dyn TemplateSource>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            client,
            fs,
            api,
            templates,
        }
    }

    pub fn commit_service(&self) -> CommitService {
        CommitService::new(Arc::clone(&self.api))
    }

    pub fn report_service(&self) -> ReportService {
        ReportService::new(Arc::clone(&self.fs), Arc::clone(&self.templates))
    }
}
