use async_trait::async_trait;
use reqwest::{Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use super::types::{FieldMap, Issue, LinkType};
use super::{IssueTracker, TrackerError};
use crate::config::Credentials;

/// Jira REST API v2 client authenticated with basic auth.
pub struct JiraClient {
    client: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
}

#[derive(Deserialize)]
struct CreatedIssue {
    key: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkTypesResponse {
    issue_link_types: Vec<LinkType>,
}

impl JiraClient {
    pub fn new(
        server: &str,
        credentials: Credentials,
        accept_invalid_certs: bool,
    ) -> Result<Self, TrackerError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("feature-sync/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;
        let base_url = Url::parse(server).map_err(|_| TrackerError::InvalidServer(server.to_string()))?;
        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    /// REST v2 endpoint below the server URL. Each segment is percent-encoded,
    /// so a `/` or `#` inside an issue key stays part of that key.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, TrackerError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TrackerError::InvalidServer(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["rest", "api", "2"])
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, segments: &[&str]) -> Result<reqwest::RequestBuilder, TrackerError> {
        Ok(self
            .client
            .request(method, self.endpoint(segments)?)
            .basic_auth(&self.credentials.user, Some(&self.credentials.password)))
    }

    async fn link_types(&self) -> Result<Vec<LinkType>, TrackerError> {
        let response = self.request(reqwest::Method::GET, &["issueLinkType"])?.send().await?;
        let types = check(response).await?.json::<LinkTypesResponse>().await?;
        Ok(types.issue_link_types)
    }
}

/// A link request in the form Jira accepts: a type name plus the two issues.
#[derive(Debug, PartialEq, Eq)]
struct ResolvedLink<'a> {
    name: String,
    inward: &'a str,
    outward: &'a str,
}

/// Resolve `link_type` against the server's link types.
///
/// A type name is used as is. An outward description maps to its type name.
/// An inward description ("is tested by") maps to its type name with the two
/// issues swapped, since it reads from the other side of the link. Anything
/// else is passed through for Jira to reject.
fn resolve_link<'a>(types: &[LinkType], link_type: &str, inward: &'a str, outward: &'a str) -> ResolvedLink<'a> {
    let same = |name: String| ResolvedLink { name, inward, outward };
    if types.iter().any(|t| t.name == link_type) {
        return same(link_type.to_string());
    }
    for t in types {
        if t.outward == link_type {
            return same(t.name.clone());
        }
        if t.inward == link_type {
            return ResolvedLink {
                name: t.name.clone(),
                inward: outward,
                outward: inward,
            };
        }
    }
    same(link_type.to_string())
}

/// Turn non-success responses into errors carrying Jira's message body.
async fn check(response: Response) -> Result<Response, TrackerError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(TrackerError::Rejected {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl IssueTracker for JiraClient {
    #[instrument(skip(self))]
    async fn fetch_issue(&self, id: &str) -> Result<Issue, TrackerError> {
        let response = self
            .request(reqwest::Method::GET, &["issue", id])?
            .query(&[("fields", "summary,issuelinks")])
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(TrackerError::NotFound(id.to_string()));
        }
        let issue = check(response).await?.json::<Issue>().await?;
        debug!(links = issue.fields.issuelinks.len(), "received issue");
        Ok(issue)
    }

    #[instrument(skip_all)]
    async fn create_issue(&self, fields: FieldMap) -> Result<String, TrackerError> {
        debug!(fields = %serde_json::Value::Object(fields.clone()), "creating issue");
        let response = self
            .request(reqwest::Method::POST, &["issue"])?
            .json(&json!({ "fields": fields }))
            .send()
            .await?;
        let created = check(response).await?.json::<CreatedIssue>().await?;
        Ok(created.key)
    }

    #[instrument(skip(self, fields))]
    async fn update_issue(&self, key: &str, fields: FieldMap) -> Result<(), TrackerError> {
        let response = self
            .request(reqwest::Method::PUT, &["issue", key])?
            .json(&json!({ "fields": fields }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn create_link(&self, link_type: &str, inward: &str, outward: &str) -> Result<(), TrackerError> {
        let types = self.link_types().await?;
        let link = resolve_link(&types, link_type, inward, outward);
        debug!(name = %link.name, inward = link.inward, outward = link.outward, "resolved link type");
        let response = self
            .request(reqwest::Method::POST, &["issueLink"])?
            .json(&json!({
                "type": { "name": link.name },
                "inwardIssue": { "key": link.inward },
                "outwardIssue": { "key": link.outward },
            }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(server: &str) -> JiraClient {
        let credentials = Credentials {
            user: "bot".to_string(),
            password: "secret".to_string(),
        };
        JiraClient::new(server, credentials, true).unwrap()
    }

    fn tests_type() -> Vec<LinkType> {
        vec![LinkType {
            name: "Tests".to_string(),
            inward: "is tested by".to_string(),
            outward: "tests".to_string(),
        }]
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let jira = client("https://jira.example.com/");
        assert_eq!(
            jira.endpoint(&["issue", "PROJ-1"]).unwrap().as_str(),
            "https://jira.example.com/rest/api/2/issue/PROJ-1"
        );
    }

    #[test]
    fn test_endpoint_keeps_context_path() {
        let jira = client("https://example.com/jira");
        assert_eq!(
            jira.endpoint(&["issueLink"]).unwrap().as_str(),
            "https://example.com/jira/rest/api/2/issueLink"
        );
    }

    #[test]
    fn test_endpoint_escapes_issue_id() {
        let jira = client("https://jira.example.com");
        let url = jira.endpoint(&["issue", "hotfix/typo#1"]).unwrap();
        assert_eq!(url.as_str(), "https://jira.example.com/rest/api/2/issue/hotfix%2Ftypo%231");
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_invalid_server_is_rejected() {
        let credentials = Credentials {
            user: "bot".to_string(),
            password: "secret".to_string(),
        };
        let err = JiraClient::new("not a url", credentials, true).err().unwrap();
        assert!(matches!(err, TrackerError::InvalidServer(ref s) if s == "not a url"));
    }

    #[test]
    fn test_inward_description_swaps_issues() {
        let link = resolve_link(&tests_type(), "is tested by", "PROJ-42", "TC-1");
        assert_eq!(
            link,
            ResolvedLink {
                name: "Tests".to_string(),
                inward: "TC-1",
                outward: "PROJ-42",
            }
        );
    }

    #[test]
    fn test_outward_description_and_name_keep_direction() {
        for link_type in ["tests", "Tests"] {
            let link = resolve_link(&tests_type(), link_type, "PROJ-42", "TC-1");
            assert_eq!(link.name, "Tests");
            assert_eq!((link.inward, link.outward), ("PROJ-42", "TC-1"));
        }
    }

    #[test]
    fn test_unknown_link_type_passes_through() {
        let link = resolve_link(&tests_type(), "relates to", "PROJ-42", "TC-1");
        assert_eq!(link.name, "relates to");
        assert_eq!((link.inward, link.outward), ("PROJ-42", "TC-1"));
    }

    #[test]
    fn test_deserialize_link_types() {
        let body = r#"{"issueLinkTypes": [
            {"id": "1", "name": "Tests", "inward": "is tested by", "outward": "tests"},
            {"id": "2", "name": "Blocks", "inward": "is blocked by", "outward": "blocks"}
        ]}"#;
        let types: LinkTypesResponse = serde_json::from_str(body).unwrap();
        let found = types
            .issue_link_types
            .iter()
            .find(|t| t.matches("is tested by"))
            .unwrap();
        assert_eq!(found.name, "Tests");
    }

    #[test]
    fn test_deserialize_created_issue() {
        let created: CreatedIssue =
            serde_json::from_str(r#"{"id": "10", "key": "PROJ-101", "self": "https://x"}"#).unwrap();
        assert_eq!(created.key, "PROJ-101");
    }
}
