//! End-to-end report runs through the service container with a scripted API

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use commit_report::cli::commands::{build_client_config, run_report};
use commit_report::config::Settings;
use commit_report::domain::{CommitRecord, ReportFormat};
use commit_report::exitcode;
use commit_report::infrastructure::di::ServiceContainer;
use commit_report::infrastructure::github::CommitEntry;
use commit_report::infrastructure::templates::DirTemplateSource;
use commit_report::infrastructure::traits::{FileSystem, GitHubApi, RealFileSystem};
use commit_report::util::testing::{init_test_setup, ApiCall, ScriptedGitHubApi};

fn settings_in(dir: &Path, format: ReportFormat) -> Settings {
    let template_dir = dir.join("templates");
    fs::create_dir_all(&template_dir).unwrap();
    fs::write(
        template_dir.join("report.html"),
        "{% for item in items %}{{ item.sha }} {{ item.author }} {{ item.message }}\n{% endfor %}",
    )
    .unwrap();

    Settings {
        branch: "main".to_string(),
        commit_history: 2,
        output_file: dir.join("output_report"),
        template_dir,
        format,
        ..Settings::default()
    }
}

fn container(settings: Settings, api: Arc<dyn GitHubApi>) -> ServiceContainer {
    let client = build_client_config(&settings, "acme", "tools", |_| Some("token".to_string()))
        .expect("client config");
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let templates = Arc::new(DirTemplateSource::new(
        settings.template_dir.clone(),
        Arc::clone(&fs),
    ));
    ServiceContainer::with_deps(settings, client, fs, api, templates)
}

fn three_commits() -> Vec<CommitEntry> {
    vec![
        CommitEntry::new("ccccccc3", "Cy", "third"),
        CommitEntry::new("bbbbbbb2", "Bob", "second"),
        CommitEntry::new("aaaaaaa1", "Ann", "first"),
    ]
}

#[test]
fn given_repository_when_running_html_report_then_writes_latest_commits() {
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let api = Arc::new(ScriptedGitHubApi::with_commits(three_commits()));
    let container = container(settings_in(temp.path(), ReportFormat::Html), api.clone());

    let path = run_report(&container, 0).unwrap();

    assert_eq!(path, temp.path().join("output_report.html"));
    let html = fs::read_to_string(&path).unwrap();
    assert!(html.contains("ccccccc3 Cy third"));
    assert!(html.contains("bbbbbbb2 Bob second"));
    assert!(!html.contains("aaaaaaa1"));
    assert_eq!(api.calls()[0], ApiCall::GetRepository("acme/tools".to_string()));
}

#[test]
fn given_repository_when_running_json_report_then_writes_records() {
    let temp = TempDir::new().unwrap();
    let api = Arc::new(ScriptedGitHubApi::with_commits(three_commits()));
    let container = container(settings_in(temp.path(), ReportFormat::Json), api);

    let path = run_report(&container, 1).unwrap();

    assert_eq!(path, temp.path().join("output_report.json"));
    let records: Vec<CommitRecord> =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        records,
        vec![
            CommitRecord::new("ccccccc3", "Cy", "third"),
            CommitRecord::new("bbbbbbb2", "Bob", "second"),
        ]
    );
}

#[test]
fn given_unknown_repository_when_running_report_then_unavailable_and_no_output() {
    let temp = TempDir::new().unwrap();
    let api = Arc::new(ScriptedGitHubApi::unknown_repository());
    let container = container(settings_in(temp.path(), ReportFormat::Html), api);

    let err = run_report(&container, 0).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::UNAVAILABLE);
    assert!(!temp.path().join("output_report.html").exists());
}

#[test]
fn given_unknown_branch_when_running_report_then_unavailable_and_no_output() {
    let temp = TempDir::new().unwrap();
    let api = Arc::new(ScriptedGitHubApi::unknown_branch());
    let container = container(settings_in(temp.path(), ReportFormat::Json), api);

    let err = run_report(&container, 0).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::UNAVAILABLE);
    assert!(!temp.path().join("output_report.json").exists());
}

#[test]
fn given_missing_template_when_running_report_then_software_error() {
    let temp = TempDir::new().unwrap();
    let mut settings = settings_in(temp.path(), ReportFormat::Html);
    settings.template_file = "absent.html".to_string();
    let api = Arc::new(ScriptedGitHubApi::with_commits(three_commits()));
    let container = container(settings, api);

    let err = run_report(&container, 0).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::SOFTWARE);
    assert!(err.to_string().contains("absent.html"));
}

#[test]
fn given_no_token_when_building_client_config_then_config_error() {
    let temp = TempDir::new().unwrap();
    let settings = settings_in(temp.path(), ReportFormat::Html);

    let err = build_client_config(&settings, "acme", "tools", |_| None).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::CONFIG);
    assert!(!temp.path().join("output_report.html").exists());
}

#[test]
fn given_blank_owner_when_building_client_config_then_usage_error() {
    let settings = Settings::default();

    let err =
        build_client_config(&settings, "  ", "tools", |_| Some("token".to_string())).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::USAGE);
}
