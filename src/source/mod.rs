pub mod types;

pub use types::ChangedFile;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::Credentials;
use types::CommitResponse;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("GitHub API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),
}

/// Read access to the repository hosting the specification files.
#[async_trait]
pub trait SourceHost: Send + Sync {
    /// List the files changed by the commit at `commit_url`, in API order.
    async fn changed_files(&self, commit_url: &str) -> Result<Vec<ChangedFile>, SourceError>;

    /// Download a file's text content.
    async fn file_text(&self, raw_url: &str) -> Result<String, SourceError>;
}

/// Whether a changed file is a specification file worth syncing.
pub fn is_specification_file(file: &ChangedFile, extension: &str) -> bool {
    file.filename.ends_with(extension)
}

/// GitHub REST client authenticated with basic auth.
pub struct GitHubSource {
    client: reqwest::Client,
    credentials: Credentials,
}

impl GitHubSource {
    pub fn new(credentials: Credentials, accept_invalid_certs: bool) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("feature-sync/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;
        Ok(Self {
            client,
            credentials,
        })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .basic_auth(&self.credentials.user, Some(&self.credentials.password))
    }
}

#[async_trait]
impl SourceHost for GitHubSource {
    #[instrument(skip(self))]
    async fn changed_files(&self, commit_url: &str) -> Result<Vec<ChangedFile>, SourceError> {
        debug!("fetching commit from GitHub API");
        let commit = self
            .get(commit_url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?
            .error_for_status()?
            .json::<CommitResponse>()
            .await?;
        debug!(files = commit.files.len(), "received commit");
        Ok(commit.files)
    }

    #[instrument(skip(self))]
    async fn file_text(&self, raw_url: &str) -> Result<String, SourceError> {
        let text = self
            .get(raw_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        debug!(bytes = text.len(), "received file");
        Ok(text)
    }
}
