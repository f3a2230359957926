//! GitHub REST client on top of `ureq`
//!
//! Blocking, one request per call. No retries and no rate-limit handling.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, trace};
use url::Url;

use crate::domain::{ApiEndpoint, Credential, RepoRef};
use crate::infrastructure::traits::GitHubApi;

/// Upper bound the API accepts for `per_page`.
pub const MAX_PER_PAGE: usize = 100;

/// Failure talking to the remote API.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("{url} returned {status}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("invalid API url {url}: {message}")]
    InvalidUrl { url: String, message: String },
}

/// Entry of `GET /repos/{owner}/{repo}/commits`.
///
/// Only the fields used for reports are decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CommitEntry {
    pub sha: Option<String>,
    /// Git commit payload; null for some malformed entries
    pub commit: Option<CommitPayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CommitPayload {
    pub author: Option<GitActor>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GitActor {
    pub name: Option<String>,
}

impl CommitEntry {
    /// Well-formed entry.
    pub fn new(sha: &str, author: &str, message: &str) -> Self {
        Self {
            sha: Some(sha.to_string()),
            commit: Some(CommitPayload {
                author: Some(GitActor {
                    name: Some(author.to_string()),
                }),
                message: Some(message.to_string()),
            }),
        }
    }

    /// Entry whose commit payload is null.
    pub fn without_payload(sha: &str) -> Self {
        Self {
            sha: Some(sha.to_string()),
            commit: None,
        }
    }
}

/// Subset of `GET /repos/{owner}/{repo}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RepositoryInfo {
    pub full_name: String,
    pub default_branch: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Real API client.
pub struct UreqGitHubApi {
    agent: ureq::Agent,
    api_root: Url,
    credential: Credential,
}

impl UreqGitHubApi {
    /// Create a client for the given endpoint, authenticating every request with `credential`.
    pub fn new(endpoint: &ApiEndpoint, credential: Credential) -> Result<Self, RemoteError> {
        let root = endpoint.api_root();
        let api_root = Url::parse(&root).map_err(|e| RemoteError::InvalidUrl {
            url: root.clone(),
            message: e.to_string(),
        })?;
        let agent = ureq::AgentBuilder::new()
            .user_agent(&format!("commit-report/{}", env!("CARGO_PKG_VERSION")))
            .build();

        Ok(Self {
            agent,
            api_root,
            credential,
        })
    }

    /// Append path segments to the API root; segments are percent-encoded.
    fn endpoint_url(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        build_url(&self.api_root, segments)
    }

    fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, RemoteError> {
        debug!("GET {}", url);
        let request = self
            .agent
            .request_url("GET", &url)
            .set(
                "Authorization",
                &format!("token {}", self.credential.expose()),
            )
            .set("Accept", "application/vnd.github+json");

        match request.call() {
            Ok(response) => {
                trace!("{} -> {}", url, response.status());
                response
                    .into_json::<T>()
                    .map_err(|e| RemoteError::Decode {
                        url: url.to_string(),
                        message: e.to_string(),
                    })
            }
            Err(ureq::Error::Status(status, response)) => {
                let status_text = response.status_text().to_string();
                let message = response
                    .into_json::<ErrorBody>()
                    .ok()
                    .and_then(|body| body.message)
                    .unwrap_or(status_text);
                Err(RemoteError::Status {
                    status,
                    url: url.to_string(),
                    message,
                })
            }
            Err(ureq::Error::Transport(transport)) => Err(RemoteError::Transport {
                url: url.to_string(),
                message: transport.to_string(),
            }),
        }
    }
}

impl GitHubApi for UreqGitHubApi {
    fn get_repository(&self, repo: &RepoRef) -> Result<RepositoryInfo, RemoteError> {
        let url = self.endpoint_url(&["repos", &repo.owner, &repo.name])?;
        self.get(url)
    }

    fn list_commits(
        &self,
        repo: &RepoRef,
        per_page: usize,
        page: usize,
    ) -> Result<Vec<CommitEntry>, RemoteError> {
        let mut url = self.endpoint_url(&["repos", &repo.owner, &repo.name, "commits"])?;
        url.query_pairs_mut()
            .append_pair("sha", &repo.branch)
            .append_pair("per_page", &per_page.clamp(1, MAX_PER_PAGE).to_string())
            .append_pair("page", &page.to_string());
        self.get(url)
    }
}

fn build_url(root: &Url, segments: &[&str]) -> Result<Url, RemoteError> {
    let mut url = root.clone();
    url.path_segments_mut()
        .map_err(|_| RemoteError::InvalidUrl {
            url: root.to_string(),
            message: "cannot be a base".to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_public_root_when_building_url_then_appends_segments() {
        let root = Url::parse("https://api.github.com").unwrap();
        let url = build_url(&root, &["repos", "acme", "tools", "commits"]).unwrap();
        assert_eq!(url.as_str(), "https://api.github.com/repos/acme/tools/commits");
    }

    #[test]
    fn given_enterprise_root_when_building_url_then_keeps_api_prefix() {
        let root = Url::parse("https://git.example.com/api/v3").unwrap();
        let url = build_url(&root, &["repos", "acme", "tools"]).unwrap();
        assert_eq!(url.as_str(), "https://git.example.com/api/v3/repos/acme/tools");
    }

    #[test]
    fn given_segment_with_slash_when_building_url_then_escapes_it() {
        let root = Url::parse("https://api.github.com").unwrap();
        let url = build_url(&root, &["repos", "a/b", "c"]).unwrap();
        assert_eq!(url.as_str(), "https://api.github.com/repos/a%2Fb/c");
    }

    #[test]
    fn given_commit_list_json_when_decoding_then_null_payload_is_none() {
        let json = r#"[
            {"sha": "153b391a8d6bf36264e5b44786faf844c0df2d76",
             "commit": {"author": {"name": "Gary", "email": "g@example.com"},
                        "message": "Initial commit"},
             "html_url": "https://github.com/acme/tools/commit/153b391"},
            {"sha": "a1b2c3d4e5", "commit": null}
        ]"#;

        let entries: Vec<CommitEntry> = serde_json::from_str(json).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0],
            CommitEntry::new(
                "153b391a8d6bf36264e5b44786faf844c0df2d76",
                "Gary",
                "Initial commit"
            )
        );
        assert_eq!(entries[1], CommitEntry::without_payload("a1b2c3d4e5"));
    }

    #[test]
    fn given_endpoint_when_creating_client_then_root_matches_endpoint() {
        let credential = Credential::new("token").unwrap();
        let client = UreqGitHubApi::new(&ApiEndpoint::Public, credential).unwrap();
        assert_eq!(client.api_root.as_str(), "https://api.github.com/");
    }
}
