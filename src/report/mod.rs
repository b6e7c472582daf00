pub mod types;

pub use types::{FileOutcome, FileReport, ScenarioOutcome, SyncReport};

use crate::tracker::SyncAction;
use colored::Colorize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report file: {0}")]
    FileWrite(#[from] std::io::Error),
}

/// Output the report to the terminal (default) or to a markdown file.
#[instrument(skip(report), fields(ticket = %report.ticket_id))]
pub fn output(report: &SyncReport, output_path: Option<&Path>) -> Result<(), ReportError> {
    match output_path {
        None => {
            debug!("writing report to terminal");
            print_terminal_report(report);
            Ok(())
        }
        Some(path) => {
            debug!(path = %path.display(), "writing report to file");
            std::fs::write(path, render_markdown(report))?;
            Ok(())
        }
    }
}

/// Format and print the report to the terminal with colors.
///
/// ═══ PROJ-42 ═══
/// PR: "Add login" | Author: alice | Merged: 2024-05-01T10:00:00Z
///
/// - features/login.feature (added)
///   + Login succeeds → created PROJ-101
/// - README.md (modified): not a specification file
///
/// ═══ 1 created, 0 updated ═══
fn print_terminal_report(report: &SyncReport) {
    println!();
    println!("═══ {} ═══", report.ticket_id.bold());
    println!(
        "PR: \"{}\" | Author: {} | Merged: {}",
        report.pull_request.title,
        report.pull_request.author,
        report.pull_request.merged_at.as_deref().unwrap_or("unknown")
    );
    println!();

    for file in &report.files {
        match &file.outcome {
            FileOutcome::NotSpecification => println!(
                "- {} ({}): {}",
                file.filename,
                file.status,
                "not a specification file".dimmed()
            ),
            FileOutcome::Removed => println!(
                "- {} ({}): {}",
                file.filename,
                file.status,
                "removed, nothing to sync".dimmed()
            ),
            FileOutcome::Synced(scenarios) => {
                println!("- {} ({})", file.filename, file.status);
                if scenarios.is_empty() {
                    println!("  No scenarios.");
                }
                for scenario in scenarios {
                    println!("  {} {} → {}", action_marker(&scenario.action), scenario.name, scenario.action);
                }
            }
        }
    }

    println!();
    println!(
        "═══ {} created, {} updated ═══",
        report.created().to_string().green().bold(),
        report.updated().to_string().yellow().bold()
    );
    println!();
}

fn render_markdown(report: &SyncReport) -> String {
    let mut md = String::new();
    md.push_str(&format!("# Test cases for {}\n\n", report.ticket_id));
    md.push_str(&format!(
        "**PR:** \"{}\" | **Author:** {} | **Merged:** {}\n\n",
        report.pull_request.title,
        report.pull_request.author,
        report.pull_request.merged_at.as_deref().unwrap_or("unknown")
    ));

    for file in &report.files {
        md.push_str(&format!("## `{}` ({})\n\n", file.filename, file.status));
        match &file.outcome {
            FileOutcome::NotSpecification => md.push_str("Not a specification file.\n\n"),
            FileOutcome::Removed => md.push_str("Removed, nothing to sync.\n\n"),
            FileOutcome::Synced(scenarios) if scenarios.is_empty() => md.push_str("No scenarios.\n\n"),
            FileOutcome::Synced(scenarios) => {
                for scenario in scenarios {
                    md.push_str(&format!("- **{}** {}\n", scenario.name, scenario.action));
                }
                md.push('\n');
            }
        }
    }

    md.push_str(&format!(
        "**Summary:** {} created, {} updated\n",
        report.created(),
        report.updated()
    ));
    md
}

fn action_marker(action: &SyncAction) -> colored::ColoredString {
    match action {
        SyncAction::Created { .. } => "+".green().bold(),
        SyncAction::Updated { .. } => "~".yellow().bold(),
    }
}
