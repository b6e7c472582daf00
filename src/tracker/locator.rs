use std::collections::HashMap;

use tracing::{debug, instrument};

use super::types::RemoteTestCase;
use super::{IssueTracker, TrackerError};

/// Test cases already linked to a requirement ticket, keyed by summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingTestCases {
    by_name: HashMap<String, String>,
}

impl ExistingTestCases {
    /// Key of the linked test case whose summary equals `name`.
    pub fn key_for(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl FromIterator<RemoteTestCase> for ExistingTestCases {
    /// On duplicate summaries the last link wins.
    fn from_iter<I: IntoIterator<Item = RemoteTestCase>>(iter: I) -> Self {
        ExistingTestCases {
            by_name: iter.into_iter().map(|tc| (tc.summary, tc.key)).collect(),
        }
    }
}

/// Collect the test cases linked to `ticket_id` through `link_type`.
///
/// Only links whose other side is the outward issue count: that is where a
/// requirement sees the test cases it is tested by. Fails with
/// [`TrackerError::NotFound`] when the ticket does not exist.
#[instrument(skip(tracker))]
pub async fn locate(
    tracker: &dyn IssueTracker,
    ticket_id: &str,
    link_type: &str,
) -> Result<ExistingTestCases, TrackerError> {
    let ticket = tracker.fetch_issue(ticket_id).await?;
    let existing: ExistingTestCases = ticket
        .fields
        .issuelinks
        .iter()
        .filter(|link| link.link_type.matches(link_type))
        .filter_map(|link| link.outward_issue.as_ref())
        .map(RemoteTestCase::from)
        .collect();
    if existing.is_empty() {
        debug!(ticket = %ticket.key, "no test cases linked yet");
        return Ok(existing);
    }
    debug!(
        ticket = %ticket.key,
        summary = %ticket.fields.summary,
        linked = existing.len(),
        "located existing test cases"
    );
    Ok(existing)
}
