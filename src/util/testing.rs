//! Test support: logging setup and an in-memory repository API

use std::env;
use std::sync::{Mutex, Once};

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::RepoRef;
use crate::infrastructure::github::{CommitEntry, RemoteError, RepositoryInfo};
use crate::infrastructure::traits::GitHubApi;

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// A request received by [`ScriptedGitHubApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    GetRepository(String),
    ListCommits {
        branch: String,
        per_page: usize,
        page: usize,
    },
}

/// In-memory [`GitHubApi`] serving a fixed commit list, paginated like the real API.
#[derive(Debug, Default)]
pub struct ScriptedGitHubApi {
    commits: Vec<CommitEntry>,
    repository_failure: Option<(u16, String)>,
    commits_failure: Option<(u16, String)>,
    calls: Mutex<Vec<ApiCall>>,
}

impl ScriptedGitHubApi {
    /// Serve `commits`, most recent first.
    pub fn with_commits(commits: Vec<CommitEntry>) -> Self {
        Self {
            commits,
            ..Self::default()
        }
    }

    /// Repository lookup fails with 404.
    pub fn unknown_repository() -> Self {
        Self {
            repository_failure: Some((404, "Not Found".to_string())),
            ..Self::default()
        }
    }

    /// Repository exists but listing the branch fails with 404.
    pub fn unknown_branch() -> Self {
        Self {
            commits_failure: Some((404, "No commit found for SHA".to_string())),
            ..Self::default()
        }
    }

    /// Requests received so far, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: ApiCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn failure(status: u16, message: &str, url: String) -> RemoteError {
        RemoteError::Status {
            status,
            url,
            message: message.to_string(),
        }
    }
}

impl GitHubApi for ScriptedGitHubApi {
    fn get_repository(&self, repo: &RepoRef) -> Result<RepositoryInfo, RemoteError> {
        self.record(ApiCall::GetRepository(repo.full_name()));
        if let Some((status, message)) = &self.repository_failure {
            return Err(Self::failure(
                *status,
                message,
                format!("scripted://repos/{}", repo.full_name()),
            ));
        }
        Ok(RepositoryInfo {
            full_name: repo.full_name(),
            default_branch: Some(repo.branch.clone()),
        })
    }

    fn list_commits(
        &self,
        repo: &RepoRef,
        per_page: usize,
        page: usize,
    ) -> Result<Vec<CommitEntry>, RemoteError> {
        self.record(ApiCall::ListCommits {
            branch: repo.branch.clone(),
            per_page,
            page,
        });
        if let Some((status, message)) = &self.commits_failure {
            return Err(Self::failure(
                *status,
                message,
                format!("scripted://repos/{}/commits", repo.full_name()),
            ));
        }
        let start = page.saturating_sub(1) * per_page;
        let end = (start + per_page).min(self.commits.len());
        Ok(self
            .commits
            .get(start..end)
            .map(|slice| slice.to_vec())
            .unwrap_or_default())
    }
}
