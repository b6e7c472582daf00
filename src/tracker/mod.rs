pub mod jira;
pub mod locator;
pub mod sync;
pub mod types;

pub use jira::JiraClient;
pub use sync::{SyncAction, TrackerSynchronizer};
pub use types::{FieldMap, Issue};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Jira request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("Invalid Jira server URL: {0}")]
    InvalidServer(String),

    #[error("Issue {0} does not exist")]
    NotFound(String),

    #[error("Jira rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Issue tracker operations needed to keep test cases in sync.
///
/// Every call is a single blocking round trip; nothing is retried.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Fetch an issue with its summary and relationship links.
    async fn fetch_issue(&self, id: &str) -> Result<Issue, TrackerError>;

    /// Create an issue and return its key.
    async fn create_issue(&self, fields: FieldMap) -> Result<String, TrackerError>;

    async fn update_issue(&self, key: &str, fields: FieldMap) -> Result<(), TrackerError>;

    /// Link two issues. `link_type` may be the type's name or its inward or
    /// outward description; an inward description reads the link from the
    /// `outward` issue's side.
    async fn create_link(&self, link_type: &str, inward: &str, outward: &str) -> Result<(), TrackerError>;
}
