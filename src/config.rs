//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/commit-report/commit-report.toml`
//! 3. Explicit config file (`--config <FILE>`)
//! 4. Environment variables: `COMMIT_REPORT_*` prefix
//! 5. Command-line flags
//!
//! The access token is deliberately not part of the settings.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{expand_env_vars, ReportFormat, DEFAULT_BASE_URL};

/// Prefix of environment variable overrides, e.g. `COMMIT_REPORT_BRANCH`.
pub const ENV_PREFIX: &str = "COMMIT_REPORT";

/// Raw settings for intermediate parsing (every field optional to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RawSettings {
    pub base_url: Option<String>,
    pub branch: Option<String>,
    pub commit_history: Option<usize>,
    pub output_file: Option<PathBuf>,
    pub template_file: Option<String>,
    pub template_dir: Option<PathBuf>,
    pub format: Option<ReportFormat>,
}

/// Unified configuration for commit-report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Web base URL; anything but https://github.com/ is treated as GitHub Enterprise
    pub base_url: String,
    /// Branch to read commits from
    pub branch: String,
    /// Maximum number of most recent commits
    pub commit_history: usize,
    /// Report path without extension
    pub output_file: PathBuf,
    /// Template name inside `template_dir`
    pub template_file: String,
    /// Directory holding HTML templates
    pub template_dir: PathBuf,
    /// Report format
    pub format: ReportFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            branch: "master".to_string(),
            commit_history: 5,
            output_file: PathBuf::from("output_report"),
            template_file: "report.html".to_string(),
            template_dir: PathBuf::from("templates"),
            format: ReportFormat::Html,
        }
    }
}

/// Get the XDG config directory for commit-report.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "commit-report").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("commit-report.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.template_dir.to_string_lossy().as_ref());
        self.template_dir = PathBuf::from(expanded);

        let expanded = expand_env_vars(self.output_file.to_string_lossy().as_ref());
        self.output_file = PathBuf::from(expanded);
    }

    /// Merge overlay onto self: every field the overlay specifies wins.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            base_url: overlay
                .base_url
                .clone()
                .unwrap_or_else(|| self.base_url.clone()),
            branch: overlay.branch.clone().unwrap_or_else(|| self.branch.clone()),
            commit_history: overlay.commit_history.unwrap_or(self.commit_history),
            output_file: overlay
                .output_file
                .clone()
                .unwrap_or_else(|| self.output_file.clone()),
            template_file: overlay
                .template_file
                .clone()
                .unwrap_or_else(|| self.template_file.clone()),
            template_dir: overlay
                .template_dir
                .clone()
                .unwrap_or_else(|| self.template_dir.clone()),
            format: overlay.format.unwrap_or(self.format),
        }
    }

    /// Defaults, global file, explicit file and environment, without path expansion.
    fn load_layers(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config, skipped when absent
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Explicit config file must exist
        if let Some(path) = config_file {
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        // 4. Environment variables
        Self::apply_env_overrides(current, env_source())
    }

    /// Load settings with layered precedence (defaults → global → file → env).
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut settings = Self::load_layers(config_file)?;
        settings.expand_paths();
        Ok(settings)
    }

    /// Load settings and apply command-line overrides on top.
    pub fn resolve(
        config_file: Option<&Path>,
        cli_overrides: &RawSettings,
    ) -> Result<Self, ApplicationError> {
        let mut settings = Self::load_layers(config_file)?.merge_with(cli_overrides);
        settings.expand_paths();
        Ok(settings)
    }

    /// Apply `COMMIT_REPORT_*` variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Some(val) = optional::<String>(&config, "base_url")? {
            settings.base_url = val;
        }
        if let Some(val) = optional::<String>(&config, "branch")? {
            settings.branch = val;
        }
        if let Some(val) = optional::<usize>(&config, "commit_history")? {
            settings.commit_history = val;
        }
        if let Some(val) = optional::<String>(&config, "output_file")? {
            settings.output_file = PathBuf::from(val);
        }
        if let Some(val) = optional::<String>(&config, "template_file")? {
            settings.template_file = val;
        }
        if let Some(val) = optional::<String>(&config, "template_dir")? {
            settings.template_dir = PathBuf::from(val);
        }
        if let Some(val) = optional::<String>(&config, "format")? {
            settings.format = val.parse()?;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# commit-report configuration
#
# Locations (by precedence, lowest to highest):
#   Global:   ~/.config/commit-report/commit-report.toml
#   Explicit: --config <FILE>
#   Env:      COMMIT_REPORT_* environment variables (e.g. COMMIT_REPORT_BRANCH=main)
#   Flags:    command-line options
#
# The access token is read from GITHUB_TOKEN only and never stored here.

# Web base URL; any other value than https://github.com/ selects GitHub Enterprise
# base_url = "https://github.com/"

# Branch to read commits from
# branch = "master"

# Number of most recent commits in the report
# commit_history = 5

# Report path without extension
# output_file = "output_report"

# Template name inside template_dir
# template_file = "report.html"

# Directory holding HTML templates
# template_dir = "templates"

# Report format: "html" or "json"
# format = "html"
"#
        .to_string()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Read `key`, treating "not set" as `None` and any other failure as a config error.
fn optional<T: DeserializeOwned>(config: &Config, key: &str) -> Result<Option<T>, ApplicationError> {
    match config.get::<T>(key) {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
