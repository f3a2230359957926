//! Commit fetching service
//!
//! Pages through the commit list of a branch, truncates to the requested
//! history and projects every entry onto a [`CommitRecord`].

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{is_commit_sha, ApiEndpoint, CommitRecord, Credential, FetchOutcome, RepoRef};
use crate::infrastructure::github::{CommitEntry, RepositoryInfo, MAX_PER_PAGE};
use crate::infrastructure::traits::GitHubApi;

/// Everything needed to talk to the repository API for one run.
///
/// The credential is resolved by the caller and handed in here; services never
/// read the process environment.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: ApiEndpoint,
    pub repo: RepoRef,
    /// Maximum number of most recent commits to fetch
    pub commit_history: usize,
    pub credential: Credential,
}

/// Service for fetching the latest commits of a branch.
pub struct CommitService {
    api: Arc<dyn GitHubApi>,
}

impl CommitService {
    /// Create a new commit service.
    pub fn new(api: Arc<dyn GitHubApi>) -> Self {
        Self { api }
    }

    /// Look up the repository; fails for unknown owners or repositories.
    pub fn repository(&self, repo: &RepoRef) -> ApplicationResult<RepositoryInfo> {
        debug!("repository: {}", repo.full_name());
        self.api
            .get_repository(repo)
            .map_err(|e| ApplicationError::remote(format!("get repository {}", repo.full_name()), e))
    }

    /// Fetch at most `history` commits of `repo.branch`, most recent first.
    ///
    /// Entries without a commit payload or with an invalid sha are dropped and
    /// counted in [`FetchOutcome::skipped`].
    pub fn fetch(&self, repo: &RepoRef, history: usize) -> ApplicationResult<FetchOutcome> {
        debug!(
            "fetch: repo={} branch={} history={}",
            repo.full_name(),
            repo.branch,
            history
        );
        let info = self.repository(repo)?;
        debug!("fetch: resolved repository {}", info.full_name);

        let entries = self.collect_entries(repo, history)?;
        let outcome = project_entries(entries);

        if outcome.skipped > 0 {
            warn!(
                "skipped {} malformed commit entries in {}",
                outcome.skipped,
                repo.full_name()
            );
        }
        info!(
            "fetched {} commits from {}@{}",
            outcome.records.len(),
            repo.full_name(),
            repo.branch
        );
        Ok(outcome)
    }

    /// Page through the commit list until `history` entries are collected
    /// or the remote runs out.
    fn collect_entries(&self, repo: &RepoRef, history: usize) -> ApplicationResult<Vec<CommitEntry>> {
        if history == 0 {
            return Ok(Vec::new());
        }

        let per_page = history.clamp(1, MAX_PER_PAGE);
        let mut entries = Vec::with_capacity(per_page);
        let mut page = 1;

        loop {
            let batch = self.api.list_commits(repo, per_page, page).map_err(|e| {
                ApplicationError::remote(
                    format!("list commits of {}@{}", repo.full_name(), repo.branch),
                    e,
                )
            })?;
            let received = batch.len();
            debug!("collect_entries: page {} returned {} entries", page, received);
            entries.extend(batch);

            if entries.len() >= history || received < per_page {
                break;
            }
            page += 1;
        }

        entries.truncate(history);
        Ok(entries)
    }
}

/// Project raw entries onto records, keeping order and counting malformed ones.
pub fn project_entries(entries: Vec<CommitEntry>) -> FetchOutcome {
    let total = entries.len();
    let records: Vec<CommitRecord> = entries.into_iter().filter_map(project_entry).collect();

    FetchOutcome {
        skipped: total - records.len(),
        records,
    }
}

fn project_entry(entry: CommitEntry) -> Option<CommitRecord> {
    let payload = entry.commit?;
    let sha = entry.sha.filter(|sha| is_commit_sha(sha))?;
    let author = payload.author.and_then(|a| a.name).unwrap_or_default();
    let message = payload.message.unwrap_or_default();
    Some(CommitRecord {
        sha,
        author,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::github::{CommitPayload, GitActor};

    #[test]
    fn given_well_formed_entries_when_projecting_then_keeps_order() {
        let entries = vec![
            CommitEntry::new("aaaaaaa1", "Ann", "second"),
            CommitEntry::new("bbbbbbb2", "Bob", "first"),
        ];

        let outcome = project_entries(entries);

        assert_eq!(outcome.skipped, 0);
        assert_eq!(
            outcome.records,
            vec![
                CommitRecord::new("aaaaaaa1", "Ann", "second"),
                CommitRecord::new("bbbbbbb2", "Bob", "first"),
            ]
        );
    }

    #[test]
    fn given_null_payload_when_projecting_then_skips_and_counts() {
        let entries = vec![
            CommitEntry::new("aaaaaaa1", "Ann", "kept"),
            CommitEntry::without_payload("bbbbbbb2"),
        ];

        let outcome = project_entries(entries);

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.skipped, 1);
    }

    #[test]
    fn given_invalid_sha_when_projecting_then_skips() {
        let mut missing = CommitEntry::new("ccccccc3", "Cy", "no sha");
        missing.sha = None;
        let entries = vec![CommitEntry::new("not-a-sha", "Ann", "bad"), missing];

        let outcome = project_entries(entries);

        assert!(outcome.records.is_empty());
        assert_eq!(outcome.skipped, 2);
    }

    #[test]
    fn given_missing_author_when_projecting_then_author_is_empty() {
        let entry = CommitEntry {
            sha: Some("ddddddd4".to_string()),
            commit: Some(CommitPayload {
                author: Some(GitActor { name: None }),
                message: Some("anonymous".to_string()),
            }),
        };

        let outcome = project_entries(vec![entry]);

        assert_eq!(outcome.records[0].author, "");
        assert_eq!(outcome.records[0].message, "anonymous");
    }
}
