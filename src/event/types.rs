use serde::Deserialize;

/// The parts of a GitHub `pull_request` webhook payload that the sync needs.
/// Decoded only after the event passed the merge gate.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestEvent {
    pub pull_request: PullRequestPayload,
    pub repository: RepositoryPayload,
}

/// `state` and `merged` are checked on the raw payload by the merge gate.
/// `title` and `user` only feed the report, so they may be missing.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestPayload {
    #[serde(default)]
    pub title: String,
    pub head: HeadPayload,
    #[serde(default)]
    pub user: UserPayload,
    /// ISO 8601 timestamp, absent on unmerged pull requests
    #[serde(default)]
    pub merged_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HeadPayload {
    /// Source branch name (e.g., "feature/PROJ-42-login")
    #[serde(rename = "ref")]
    pub branch: String,
    pub sha: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPayload {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryPayload {
    /// URL template ending in `{/sha}`
    pub commits_url: String,
}

/// Pull request details carried into the run report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestSummary {
    pub title: String,
    pub author: String,
    pub merged_at: Option<String>,
}

impl PullRequestEvent {
    pub fn summary(&self) -> PullRequestSummary {
        PullRequestSummary {
            title: self.pull_request.title.clone(),
            author: self.pull_request.user.login.clone(),
            merged_at: self.pull_request.merged_at.clone(),
        }
    }
}
