pub mod types;

pub use types::{PullRequestEvent, PullRequestSummary};

use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Placeholder GitHub puts at the end of `repository.commits_url`.
const SHA_PLACEHOLDER: &str = "{/sha}";

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Invalid event payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Invalid ticket pattern for project: {0}")]
    Pattern(#[from] regex::Error),
}

/// Parse the raw webhook body into untyped JSON.
pub fn parse_payload(raw: &str) -> Result<Value, EventError> {
    Ok(serde_json::from_str(raw)?)
}

/// A pull request event is handled only when it was closed by a merge.
///
/// Payloads lacking `pull_request.state` or `pull_request.merged` are not
/// errors, they are simply not handled.
pub fn should_be_handled(payload: &Value) -> bool {
    let state = payload.pointer("/pull_request/state").and_then(Value::as_str);
    let merged = payload.pointer("/pull_request/merged").and_then(Value::as_bool);

    match (state, merged) {
        (Some("closed"), Some(true)) => true,
        _ => {
            debug!(?state, ?merged, "event is not a merged pull request");
            false
        }
    }
}

/// Decode the fields the sync needs from a payload that passed the gate.
///
/// Only `head.ref`, `head.sha` and `repository.commits_url` are required.
pub fn decode(payload: Value) -> Result<PullRequestEvent, EventError> {
    Ok(serde_json::from_value(payload)?)
}

/// Extract the requirement ticket id from a branch name.
///
/// Looks for the first `<PROJECT>-<digits>` in the upper-cased branch name.
/// Falls back to the branch name as-is when nothing matches.
pub fn resolve_ticket_id(branch: &str, project: &str) -> Result<String, EventError> {
    let pattern = Regex::new(&format!("{}-[0-9]+", regex::escape(&project.to_uppercase())))?;
    let upper = branch.to_uppercase();

    match pattern.find(&upper) {
        Some(found) => Ok(found.as_str().to_string()),
        None => {
            warn!(branch, project, "branch name carries no ticket id, using it verbatim");
            Ok(branch.to_string())
        }
    }
}

/// Substitute the head commit into the repository's commits URL template.
pub fn commit_url(commits_url: &str, sha: &str) -> String {
    match commits_url.strip_suffix(SHA_PLACEHOLDER) {
        Some(base) => format!("{}/{}", base, sha),
        None => {
            warn!(commits_url, "commits URL has no {{/sha}} placeholder");
            commits_url.to_string()
        }
    }
}
