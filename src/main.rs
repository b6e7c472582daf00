mod config;
mod event;
mod pipeline;
mod report;
mod scenario;
mod source;
mod tracker;

use clap::Parser;
use std::path::PathBuf;
use tracing::{info, info_span, Instrument};
use tracing_subscriber::EnvFilter;

/// Feature Sync: keeps Jira test cases in step with the Gherkin scenarios
/// of merged GitHub Pull Requests.
///
/// Every `Scenario Outline` in a changed `.feature` file becomes a test case
/// linked to the requirement ticket named in the PR's branch, or updates the
/// test case of the same name if one is already linked. A failure midway
/// leaves the scenarios synced before it in Jira; re-running the same event
/// is safe.
#[derive(Parser, Debug)]
#[command(name = "feature-sync", version, about)]
struct Cli {
    /// GitHub `pull_request` webhook payload (JSON)
    #[arg(short, long, required_unless_present = "data_file", conflicts_with = "data_file")]
    data: Option<String>,

    /// Read the webhook payload from a file instead
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// Jira project key (e.g., PROJ)
    #[arg(short, long)]
    project: Option<String>,

    /// GitHub user (falls back to config, then GITHUB_USER)
    #[arg(long)]
    github_user: Option<String>,

    /// GitHub password or token (falls back to config, then GITHUB_PASSWORD)
    #[arg(long)]
    github_password: Option<String>,

    /// Jira user (falls back to config, then JIRA_USER)
    #[arg(long)]
    jira_user: Option<String>,

    /// Jira password (falls back to config, then JIRA_PASS)
    #[arg(long)]
    jira_password: Option<String>,

    /// Jira server URL
    #[arg(short, long)]
    server: Option<String>,

    /// Optional output file path for a markdown report
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let mut config = config::Config::load()?;
    apply_overrides(&mut config, &cli);
    if config.tracker.settings.project_key.is_empty() {
        return Err(config::ConfigError::Missing("Jira project key").into());
    }

    let raw = match (&cli.data, &cli.data_file) {
        (Some(data), _) => data.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => return Err("either --data or --data-file is required".into()),
    };
    let payload = event::parse_payload(&raw)?;

    let github = source::GitHubSource::new(
        config.source_credentials()?,
        config.source.accept_invalid_certs,
    )?;
    let jira = tracker::JiraClient::new(
        config.tracker_server()?,
        config.tracker_credentials()?,
        config.tracker.accept_invalid_certs,
    )?;

    let pipeline = pipeline::Pipeline {
        source: &github,
        tracker: &jira,
        settings: &config.tracker.settings,
        extension: &config.source.extension,
    };

    let span = info_span!("feature_sync", project = %config.tracker.settings.project_key);
    let Some(built_report) = pipeline.run(payload).instrument(span).await? else {
        return Ok(());
    };

    report::output(&built_report, cli.output.as_deref())?;
    info!(
        created = built_report.created(),
        updated = built_report.updated(),
        "done"
    );

    Ok(())
}

/// Command-line values win over the config file and the environment.
fn apply_overrides(config: &mut config::Config, cli: &Cli) {
    let overrides = [
        (&mut config.source.user, &cli.github_user),
        (&mut config.source.password, &cli.github_password),
        (&mut config.tracker.user, &cli.jira_user),
        (&mut config.tracker.password, &cli.jira_password),
        (&mut config.tracker.server, &cli.server),
    ];
    for (slot, value) in overrides {
        if value.is_some() {
            *slot = value.clone();
        }
    }
    if let Some(project) = &cli.project {
        config.tracker.settings.project_key = project.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_original_flags() {
        let cli = Cli::try_parse_from([
            "feature-sync",
            "--data",
            "{}",
            "--project",
            "PROJ",
            "--jira-user",
            "bot",
            "-s",
            "https://jira.example.com",
        ])
        .unwrap();
        assert_eq!(cli.project.as_deref(), Some("PROJ"));
        assert_eq!(cli.server.as_deref(), Some("https://jira.example.com"));
    }

    #[test]
    fn test_cli_requires_payload() {
        assert!(Cli::try_parse_from(["feature-sync", "--project", "PROJ"]).is_err());
    }

    #[test]
    fn test_cli_rejects_both_payload_sources() {
        assert!(Cli::try_parse_from(["feature-sync", "--data", "{}", "--data-file", "x.json"]).is_err());
    }

    #[test]
    fn test_overrides_win_over_config() {
        let mut config = config::Config::default();
        config.tracker.user = Some("from-file".to_string());
        config.tracker.password = Some("kept".to_string());
        let cli = Cli::try_parse_from([
            "feature-sync",
            "--data",
            "{}",
            "--project",
            "PROJ",
            "--jira-user",
            "from-cli",
        ])
        .unwrap();

        apply_overrides(&mut config, &cli);
        assert_eq!(config.tracker.user.as_deref(), Some("from-cli"));
        assert_eq!(config.tracker.password.as_deref(), Some("kept"));
        assert_eq!(config.tracker.settings.project_key, "PROJ");
    }
}
