//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum, ValueHint};

use crate::config::RawSettings;
use crate::domain::ReportFormat;

/// Retrieves the last n commits of a GitHub branch (sha, author and message) and renders a report.
///
/// The access token is read from the GITHUB_TOKEN environment variable.
#[derive(Parser, Debug)]
#[command(name = "commit-report")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity: -v prints the repository URL and fetched items, -vvv every commit in detail
    #[arg(short, long, action = ArgAction::Count)]
    pub verbosity: u8,

    /// Base URL of the GitHub web UI [default: https://github.com/]
    #[arg(short = 'u', long, value_hint = ValueHint::Url)]
    pub base_url: Option<String>,

    /// The GitHub repo owner aka organisation
    #[arg(short = 'o', long, required_unless_present_any = ["completion", "show_config", "config_template"])]
    pub repo_owner: Option<String>,

    /// The GitHub repo name
    #[arg(short = 'n', long, required_unless_present_any = ["completion", "show_config", "config_template"])]
    pub repo_name: Option<String>,

    /// The GitHub repo branch [default: master]
    #[arg(short = 'b', long)]
    pub repo_branch: Option<String>,

    /// Number of most recent commits to report [default: 5]
    #[arg(short = 'y', long, value_name = "N")]
    pub commit_history: Option<usize>,

    /// Output file without extension [default: output_report]
    #[arg(short = 'f', long, value_hint = ValueHint::FilePath)]
    pub output_file: Option<PathBuf>,

    /// Template file name in the template directory [default: report.html]
    #[arg(short = 't', long)]
    pub template_file: Option<String>,

    /// Directory holding HTML templates [default: templates]
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub template_dir: Option<PathBuf>,

    /// Report format [default: html]
    #[arg(short = 'm', long, value_enum)]
    pub format: Option<FormatArg>,

    /// Additional settings file (TOML), layered above the global config
    #[arg(short = 'c', long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Print the effective settings as TOML and exit
    #[arg(long)]
    pub show_config: bool,

    /// Print a commented settings template and exit
    #[arg(long)]
    pub config_template: bool,

    /// Print shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completion: Option<clap_complete::Shell>,
}

/// Report format as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Html,
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Html => ReportFormat::Html,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

impl Cli {
    /// Settings given on the command line, as the topmost config layer.
    pub fn settings_overrides(&self) -> RawSettings {
        RawSettings {
            base_url: self.base_url.clone(),
            branch: self.repo_branch.clone(),
            commit_history: self.commit_history,
            output_file: self.output_file.clone(),
            template_file: self.template_file.clone(),
            template_dir: self.template_dir.clone(),
            format: self.format.map(ReportFormat::from),
        }
    }
}
