//! Domain entities: core data structures

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::DomainError;

/// Public GitHub web endpoint; any other base URL is treated as GitHub Enterprise.
pub const DEFAULT_BASE_URL: &str = "https://github.com/";

/// REST API root of the public endpoint.
pub const PUBLIC_API_ROOT: &str = "https://api.github.com";

/// Path suffix of the REST API on an enterprise host.
pub const ENTERPRISE_API_PATH: &str = "api/v3";

/// One commit as it appears in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Full commit hash
    pub sha: String,
    /// Author display name (empty when upstream has none)
    pub author: String,
    /// Commit message
    pub message: String,
}

impl CommitRecord {
    pub fn new(
        sha: impl Into<String>,
        author: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            sha: sha.into(),
            author: author.into(),
            message: message.into(),
        }
    }
}

/// Records produced by a fetch plus the number of upstream entries dropped as malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Most recent first
    pub records: Vec<CommitRecord>,
    /// Entries without a commit payload or with an invalid sha
    pub skipped: usize,
}

/// Branch reference in a hosted repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
    pub branch: String,
}

impl RepoRef {
    /// Create a repository reference, rejecting empty components.
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        branch: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let repo = Self {
            owner: owner.into().trim().to_string(),
            name: name.into().trim().to_string(),
            branch: branch.into().trim().to_string(),
        };
        if repo.owner.is_empty() || repo.name.is_empty() || repo.branch.is_empty() {
            return Err(DomainError::InvalidRepo {
                owner: repo.owner,
                name: repo.name,
                branch: repo.branch,
            });
        }
        Ok(repo)
    }

    /// `owner/name`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Access token for the hosting API.
///
/// The token never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a token; blank tokens are treated as missing.
    pub fn new(token: impl Into<String>) -> Result<Self, DomainError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(DomainError::MissingCredential);
        }
        Ok(Self(token))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// API endpoint selected from the configured base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiEndpoint {
    /// github.com
    Public,
    /// GitHub Enterprise; `base` always ends with `/`
    Enterprise { base: String },
}

impl ApiEndpoint {
    /// Resolve the endpoint for a base URL.
    ///
    /// The URL is normalized to end with `/` before it is compared with
    /// [`DEFAULT_BASE_URL`].
    pub fn from_base_url(base_url: &str) -> Result<Self, DomainError> {
        let base = normalize_base_url(base_url);
        Url::parse(&base).map_err(|e| DomainError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        if base == DEFAULT_BASE_URL {
            Ok(Self::Public)
        } else {
            Ok(Self::Enterprise { base })
        }
    }

    /// Root URL for REST calls, without trailing slash.
    pub fn api_root(&self) -> String {
        match self {
            Self::Public => PUBLIC_API_ROOT.to_string(),
            Self::Enterprise { base } => format!("{}{}", base, ENTERPRISE_API_PATH),
        }
    }

    /// Web URL of a repository, e.g. `https://github.com/owner/name`.
    pub fn web_url(&self, repo: &RepoRef) -> String {
        let base = match self {
            Self::Public => DEFAULT_BASE_URL,
            Self::Enterprise { base } => base.as_str(),
        };
        format!("{}{}", base, repo.full_name())
    }
}

/// Append a trailing `/` if missing.
pub fn normalize_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    }
}

/// Output format of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Html,
    Json,
}

impl ReportFormat {
    /// File extension, also used as the format name.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ReportFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "json" => Ok(Self::Json),
            other => Err(DomainError::UnknownFormat(other.to_string())),
        }
    }
}

/// Whether `sha` looks like a git object hash (abbreviated or full, SHA-1 or SHA-256).
pub fn is_commit_sha(sha: &str) -> bool {
    (7..=64).contains(&sha.len()) && sha.chars().all(|c| c.is_ascii_hexdigit())
}

/// Expand environment variables in a path string.
///
/// Supports `$VAR`, `${VAR}` and `~`. Unknown variables leave the input unchanged.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_default_base_url_when_resolving_endpoint_then_public() {
        let endpoint = ApiEndpoint::from_base_url("https://github.com").unwrap();
        assert_eq!(endpoint, ApiEndpoint::Public);
        assert_eq!(endpoint.api_root(), "https://api.github.com");
    }

    #[test]
    fn given_enterprise_base_url_when_resolving_endpoint_then_uses_api_v3() {
        let endpoint = ApiEndpoint::from_base_url("https://git.example.com").unwrap();
        assert_eq!(
            endpoint,
            ApiEndpoint::Enterprise {
                base: "https://git.example.com/".to_string()
            }
        );
        assert_eq!(endpoint.api_root(), "https://git.example.com/api/v3");
    }

    #[test]
    fn given_garbage_base_url_when_resolving_endpoint_then_error() {
        let result = ApiEndpoint::from_base_url("not a url");
        assert!(matches!(result, Err(DomainError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn given_repo_when_web_url_then_joins_base_owner_and_name() {
        let repo = RepoRef::new("acme", "tools", "main").unwrap();
        assert_eq!(
            ApiEndpoint::Public.web_url(&repo),
            "https://github.com/acme/tools"
        );
    }

    #[test]
    fn given_blank_owner_when_creating_repo_ref_then_error() {
        assert!(RepoRef::new("  ", "tools", "main").is_err());
    }

    #[test]
    fn given_blank_token_when_creating_credential_then_missing() {
        assert!(matches!(
            Credential::new(""),
            Err(DomainError::MissingCredential)
        ));
    }

    #[test]
    fn given_credential_when_debug_formatted_then_token_is_hidden() {
        let cred = Credential::new("ghp_secret").unwrap();
        assert!(!format!("{:?}", cred).contains("ghp_secret"));
        assert_eq!(cred.expose(), "ghp_secret");
    }

    #[test]
    fn given_format_names_when_parsing_then_case_insensitive() {
        assert_eq!("HTML".parse::<ReportFormat>().unwrap(), ReportFormat::Html);
        assert_eq!("json".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert!("xml".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_is_commit_sha() {
        assert!(is_commit_sha("a1b2c3d"));
        assert!(is_commit_sha("153b391a8d6bf36264e5b44786faf844c0df2d76"));
        assert!(!is_commit_sha(""));
        assert!(!is_commit_sha("abc"));
        assert!(!is_commit_sha("zzzzzzzz"));
    }
}
