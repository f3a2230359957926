//! Command execution: resolves settings and credential, fetches, renders

use std::io;
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::services::ClientConfig;
use crate::cli::args::Cli;
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::Settings;
use crate::domain::{ApiEndpoint, CommitRecord, Credential, DomainError, RepoRef};
use crate::infrastructure::di::ServiceContainer;

/// Environment variable holding the access token.
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    if let Some(shell) = cli.completion {
        print_completions(shell);
        return Ok(());
    }
    if cli.config_template {
        output::info(&Settings::template());
        return Ok(());
    }

    let settings = Settings::resolve(cli.config.as_deref(), &cli.settings_overrides())?;
    if cli.show_config {
        output::info(&settings.to_toml()?);
        return Ok(());
    }

    let owner = cli
        .repo_owner
        .as_deref()
        .ok_or_else(|| CliError::InvalidArgs("--repo-owner is required".to_string()))?;
    let name = cli
        .repo_name
        .as_deref()
        .ok_or_else(|| CliError::InvalidArgs("--repo-name is required".to_string()))?;

    let client = build_client_config(&settings, owner, name, |key| std::env::var(key).ok())?;
    let container = ServiceContainer::new(settings, client)?;
    let path = run_report(&container, cli.verbosity)?;

    output::success(&format!(
        "The report was successfully generated and stored in {}",
        path.display()
    ));
    Ok(())
}

/// Read the access token through `lookup`; unset or blank is a configuration error.
pub fn resolve_credential(lookup: impl Fn(&str) -> Option<String>) -> CliResult<Credential> {
    let token = lookup(TOKEN_ENV_VAR).ok_or(DomainError::MissingCredential)?;
    Ok(Credential::new(token)?)
}

/// Assemble the client configuration for one run.
///
/// The credential is resolved first so a missing token fails before anything else.
pub fn build_client_config(
    settings: &Settings,
    owner: &str,
    name: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> CliResult<ClientConfig> {
    let credential = resolve_credential(lookup)?;
    let endpoint = ApiEndpoint::from_base_url(&settings.base_url)?;
    let repo = RepoRef::new(owner, name, settings.branch.as_str())?;
    debug!("client config: endpoint={:?} repo={:?}", endpoint, repo);

    Ok(ClientConfig {
        endpoint,
        repo,
        commit_history: settings.commit_history,
        credential,
    })
}

/// Fetch commits and write the report; returns the written path.
#[instrument(skip_all, fields(repo = %container.client.repo.full_name()))]
pub fn run_report(container: &ServiceContainer, verbosity: u8) -> CliResult<PathBuf> {
    let client = &container.client;
    let settings = &container.settings;

    if verbosity > 0 {
        output::detail(&format!("URL - {}", client.endpoint.web_url(&client.repo)));
    }

    let outcome = container
        .commit_service()
        .fetch(&client.repo, client.commit_history)?;

    if verbosity > 2 {
        for record in &outcome.records {
            print_record_detail(record);
        }
    }
    if verbosity > 0 {
        for record in &outcome.records {
            print_record(record);
        }
        if outcome.skipped > 0 {
            output::warning(&format!(
                "skipped {} commit entries without commit data",
                outcome.skipped
            ));
        }
    }

    let path = container.report_service().render(
        settings.format,
        &outcome.records,
        &settings.output_file,
        &settings.template_file,
    )?;
    Ok(path)
}

fn print_record(record: &CommitRecord) {
    match serde_json::to_string(record) {
        Ok(line) => output::info(&line),
        Err(e) => output::warning(&format!("cannot display commit {}: {}", record.sha, e)),
    }
}

fn print_record_detail(record: &CommitRecord) {
    output::info(&format!("sha: {}", record.sha));
    output::info(&format!("message: {}", record.message));
    output::info(&format!("author: {}", record.author));
    output::info(&"-".repeat(80));
}

fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    eprintln!("Generating completion file for {shell:?}...");
    generate(shell, &mut cmd, name, &mut io::stdout());
}
