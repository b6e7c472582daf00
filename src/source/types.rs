use serde::Deserialize;

/// A file touched by a commit, as listed by `GET /repos/{owner}/{repo}/commits/{sha}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangedFile {
    /// Path within the repository (e.g., "features/login.feature")
    pub filename: String,
    /// "added", "modified", "removed", "renamed", ...
    pub status: String,
    /// Download URL for the file at this commit
    pub raw_url: String,
}

impl ChangedFile {
    pub fn is_removed(&self) -> bool {
        self.status == "removed"
    }
}

/// Response body of the commit endpoint. Other fields are ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct CommitResponse {
    #[serde(default)]
    pub files: Vec<ChangedFile>,
}
