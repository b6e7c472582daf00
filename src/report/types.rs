use crate::event::PullRequestSummary;
use crate::tracker::SyncAction;

/// What happened to one changed file of the pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Not a specification file
    NotSpecification,
    /// Specification file deleted by the pull request, nothing to fetch
    Removed,
    /// Scenarios synchronized, in document order
    Synced(Vec<ScenarioOutcome>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioOutcome {
    /// Scenario name
    pub name: String,
    pub action: SyncAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// Path within the repository
    pub filename: String,
    /// Change status reported by GitHub ("added", "modified", ...)
    pub status: String,
    pub outcome: FileOutcome,
}

/// Complete report of one run.
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Requirement ticket the scenarios were synced against
    pub ticket_id: String,
    pub pull_request: PullRequestSummary,
    /// Changed files in the order GitHub listed them
    pub files: Vec<FileReport>,
}

impl SyncReport {
    pub fn scenarios(&self) -> impl Iterator<Item = &ScenarioOutcome> {
        self.files
            .iter()
            .filter_map(|file| match &file.outcome {
                FileOutcome::Synced(scenarios) => Some(scenarios),
                _ => None,
            })
            .flatten()
    }

    pub fn created(&self) -> usize {
        self.scenarios()
            .filter(|s| matches!(s.action, SyncAction::Created { .. }))
            .count()
    }

    pub fn updated(&self) -> usize {
        self.scenarios()
            .filter(|s| matches!(s.action, SyncAction::Updated { .. }))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(name: &str, action: SyncAction) -> ScenarioOutcome {
        ScenarioOutcome {
            name: name.to_string(),
            action,
        }
    }

    #[test]
    fn test_report_counts() {
        let report = SyncReport {
            ticket_id: "PROJ-42".to_string(),
            pull_request: PullRequestSummary {
                title: "Add login".to_string(),
                author: "alice".to_string(),
                merged_at: None,
            },
            files: vec![
                FileReport {
                    filename: "README.md".to_string(),
                    status: "modified".to_string(),
                    outcome: FileOutcome::NotSpecification,
                },
                FileReport {
                    filename: "login.feature".to_string(),
                    status: "added".to_string(),
                    outcome: FileOutcome::Synced(vec![
                        outcome("A", SyncAction::Created { key: "TC-1".to_string() }),
                        outcome("B", SyncAction::Updated { key: "TC-0".to_string() }),
                        outcome("C", SyncAction::Created { key: "TC-2".to_string() }),
                    ]),
                },
            ],
        };
        assert_eq!(report.scenarios().count(), 3);
        assert_eq!(report.created(), 2);
        assert_eq!(report.updated(), 1);
    }
}
