use std::fmt;

use serde_json::{json, Value};
use tracing::{info, instrument};

use super::locator::{locate, ExistingTestCases};
use super::types::FieldMap;
use super::{IssueTracker, TrackerError};
use crate::config::TrackerSettings;
use crate::scenario::TestCaseRecord;

/// What the synchronizer did with one scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// A new test case was created and linked to the ticket
    Created { key: String },
    /// The existing test case's sections were overwritten
    Updated { key: String },
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncAction::Created { key } => write!(f, "created {}", key),
            SyncAction::Updated { key } => write!(f, "updated {}", key),
        }
    }
}

/// Creates or updates the Jira test case of each scenario.
///
/// Scenarios are matched by name against the summaries of the test cases
/// already linked to the requirement ticket. Mutations are not transactional:
/// when a later scenario fails, earlier ones stay committed.
pub struct TrackerSynchronizer<'a> {
    tracker: &'a dyn IssueTracker,
    settings: &'a TrackerSettings,
}

impl<'a> TrackerSynchronizer<'a> {
    pub fn new(tracker: &'a dyn IssueTracker, settings: &'a TrackerSettings) -> Self {
        Self { tracker, settings }
    }

    /// Look up the ticket's linked test cases, then create or update.
    ///
    /// The lookup runs for every scenario so that test cases created earlier
    /// in the same run are seen.
    #[instrument(skip(self, record), fields(scenario = %record.name))]
    pub async fn sync(&self, ticket_id: &str, record: &TestCaseRecord) -> Result<SyncAction, TrackerError> {
        let existing = locate(self.tracker, ticket_id, &self.settings.link_type).await?;
        self.apply(ticket_id, record, &existing).await
    }

    /// Create or update against an already located set of test cases.
    pub async fn apply(
        &self,
        ticket_id: &str,
        record: &TestCaseRecord,
        existing: &ExistingTestCases,
    ) -> Result<SyncAction, TrackerError> {
        match existing.key_for(&record.name) {
            Some(key) => {
                self.tracker.update_issue(key, self.update_fields(record)).await?;
                info!(key, "updated test case");
                Ok(SyncAction::Updated {
                    key: key.to_string(),
                })
            }
            None => {
                let key = self.tracker.create_issue(self.create_fields(record)).await?;
                self.tracker
                    .create_link(&self.settings.link_type, ticket_id, &key)
                    .await?;
                info!(key = %key, "created and linked test case");
                Ok(SyncAction::Created { key })
            }
        }
    }

    /// The four scenario sections, keyed by their custom field ids.
    pub fn update_fields(&self, record: &TestCaseRecord) -> FieldMap {
        let ids = &self.settings.fields;
        let mut fields = FieldMap::new();
        fields.insert(ids.pre_requisite.clone(), Value::from(record.pre_requisite.as_str()));
        fields.insert(ids.procedure.clone(), Value::from(record.procedure.as_str()));
        fields.insert(ids.expected.clone(), Value::from(record.expected.as_str()));
        fields.insert(ids.dataset.clone(), Value::from(record.dataset.as_str()));
        fields
    }

    /// Everything a new test case is created with: fixed metadata, summary,
    /// description and the four sections.
    pub fn create_fields(&self, record: &TestCaseRecord) -> FieldMap {
        let settings = self.settings;
        let ids = &settings.fields;
        let mut fields = FieldMap::new();
        fields.insert(
            "project".to_string(),
            json!({ "id": settings.project_id, "name": settings.project_key }),
        );
        fields.insert("summary".to_string(), Value::from(record.name.as_str()));
        fields.insert(
            "description".to_string(),
            Value::from(record.feature_description.as_str()),
        );
        fields.insert("issuetype".to_string(), json!({ "name": settings.issue_type }));
        fields.insert(ids.execution_mode.clone(), json!({ "value": settings.execution_mode }));
        fields.insert(
            ids.automation_candidate.clone(),
            json!({ "value": settings.automation_candidate }),
        );
        fields.insert(ids.priority.clone(), json!({ "value": settings.priority }));
        fields.insert(ids.reviewed.clone(), json!({ "value": settings.reviewed }));
        fields.extend(self.update_fields(record));
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::fake::{FakeTracker, TrackerCall};

    fn settings() -> TrackerSettings {
        TrackerSettings {
            project_key: "PROJ".to_string(),
            ..TrackerSettings::default()
        }
    }

    fn login_record() -> TestCaseRecord {
        TestCaseRecord {
            name: "Login succeeds".to_string(),
            feature_description: "As a user...".to_string(),
            pre_requisite: "Given a registered user".to_string(),
            procedure: "When the user logs in".to_string(),
            expected: "Then the dashboard is shown".to_string(),
            dataset: "Examples:\n| alice |".to_string(),
        }
    }

    #[tokio::test]
    async fn test_unknown_scenario_is_created_and_linked() {
        let tracker = FakeTracker::default().with_ticket("PROJ-42");
        let settings = settings();
        let synchronizer = TrackerSynchronizer::new(&tracker, &settings);

        let action = synchronizer.sync("PROJ-42", &login_record()).await.unwrap();
        assert_eq!(action, SyncAction::Created { key: "TC-1".to_string() });

        let creates = tracker.creates();
        assert_eq!(creates.len(), 1);
        assert_eq!(creates[0]["summary"], "Login succeeds");
        assert_eq!(
            tracker.links(),
            vec![(
                "is tested by".to_string(),
                "PROJ-42".to_string(),
                "TC-1".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_known_scenario_is_updated_without_link() {
        let tracker = FakeTracker::default()
            .with_ticket("PROJ-42")
            .with_linked_test_case("PROJ-42", "PROJ-100", "Login succeeds");
        let settings = settings();
        let synchronizer = TrackerSynchronizer::new(&tracker, &settings);

        let action = synchronizer.sync("PROJ-42", &login_record()).await.unwrap();
        assert_eq!(action, SyncAction::Updated { key: "PROJ-100".to_string() });

        let calls = tracker.calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            TrackerCall::Update { key, fields } => {
                assert_eq!(key, "PROJ-100");
                assert_eq!(fields.len(), 4);
                assert!(!fields.contains_key("summary"));
                assert_eq!(fields["customfield_10071"], "When the user logs in");
            }
            other => panic!("expected an update, got {:?}", other),
        }
        assert!(tracker.links().is_empty());
    }

    #[tokio::test]
    async fn test_second_sync_of_same_scenario_updates() {
        let tracker = FakeTracker::default().with_ticket("PROJ-42");
        let settings = settings();
        let synchronizer = TrackerSynchronizer::new(&tracker, &settings);

        synchronizer.sync("PROJ-42", &login_record()).await.unwrap();
        let again = synchronizer.sync("PROJ-42", &login_record()).await.unwrap();

        assert_eq!(again, SyncAction::Updated { key: "TC-1".to_string() });
        assert_eq!(tracker.creates().len(), 1);
        assert_eq!(tracker.links().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_ticket_makes_no_mutation() {
        let tracker = FakeTracker::default();
        let settings = settings();
        let synchronizer = TrackerSynchronizer::new(&tracker, &settings);

        let err = synchronizer.sync("PROJ-42", &login_record()).await.unwrap_err();
        assert!(matches!(err, TrackerError::NotFound(_)));
        assert!(tracker.calls().is_empty());
    }

    #[test]
    fn test_create_fields_carry_fixed_metadata() {
        let tracker = FakeTracker::default();
        let settings = settings();
        let synchronizer = TrackerSynchronizer::new(&tracker, &settings);

        let fields = synchronizer.create_fields(&login_record());
        assert_eq!(fields["project"], json!({ "id": "10500", "name": "PROJ" }));
        assert_eq!(fields["issuetype"], json!({ "name": "Test Case" }));
        assert_eq!(fields["description"], "As a user...");
        assert_eq!(fields["customfield_10150"], json!({ "value": "Automatic" }));
        assert_eq!(fields["customfield_10161"], json!({ "value": "Unknown" }));
        assert_eq!(fields["customfield_10152"], json!({ "value": "High" }));
        assert_eq!(fields["customfield_10162"], json!({ "value": "Yes" }));
        assert_eq!(fields["customfield_10070"], "Given a registered user");
        assert_eq!(fields["customfield_10153"], "Examples:\n| alice |");
    }

    #[test]
    fn test_custom_settings_are_used() {
        let tracker = FakeTracker::default();
        let mut settings = settings();
        settings.priority = "Low".to_string();
        settings.fields.priority = "customfield_1".to_string();
        let synchronizer = TrackerSynchronizer::new(&tracker, &settings);

        let fields = synchronizer.create_fields(&login_record());
        assert_eq!(fields["customfield_1"], json!({ "value": "Low" }));
        assert!(!fields.contains_key("customfield_10152"));
    }
}
