use serde::Deserialize;
use serde_json::{Map, Value};

/// Field map sent to Jira on create and update (`{"fields": {...}}`).
pub type FieldMap = Map<String, Value>;

/// An issue as returned by `GET /rest/api/2/issue/{id}`, reduced to the
/// fields the sync reads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Issue {
    pub key: String,
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IssueFields {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub issuelinks: Vec<IssueLink>,
}

/// One relationship link on an issue. Exactly one side is set: the other
/// issue of the link.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueLink {
    #[serde(rename = "type")]
    pub link_type: LinkType,
    #[serde(default)]
    pub outward_issue: Option<LinkedIssue>,
    #[serde(default)]
    pub inward_issue: Option<LinkedIssue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LinkType {
    pub name: String,
    #[serde(default)]
    pub inward: String,
    #[serde(default)]
    pub outward: String,
}

impl LinkType {
    /// Jira addresses link types by name but users know them by their inward
    /// or outward description ("is tested by"); accept any of the three.
    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.inward == name || self.outward == name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LinkedIssue {
    pub key: String,
    pub fields: LinkedIssueFields,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LinkedIssueFields {
    #[serde(default)]
    pub summary: String,
}

/// A test case tracked in Jira.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTestCase {
    pub key: String,
    pub summary: String,
}

impl From<&LinkedIssue> for RemoteTestCase {
    fn from(issue: &LinkedIssue) -> Self {
        RemoteTestCase {
            key: issue.key.clone(),
            summary: issue.fields.summary.clone(),
        }
    }
}
