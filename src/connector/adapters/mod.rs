//! Connector adapters: one HTTP adapter per tracker plus a scripted
//! in-memory connector.

mod factory;
mod github;
mod gitlab;
mod jira;
mod memory;

pub use factory::{HttpConnectorFactory, StaticConnectorFactory};
pub use github::GitHubConnector;
pub use gitlab::GitLabConnector;
pub use jira::JiraConnector;
pub use memory::InMemoryConnector;

#[cfg(test)]
pub(crate) use github::{GitHubIssuePayload, map_github_issue, map_github_item};
#[cfg(test)]
pub(crate) use gitlab::{
    GitLabIssuePayload, issues_url as gitlab_issues_url, map_gitlab_issue, map_gitlab_item,
    next_page,
};
#[cfg(test)]
pub(crate) use jira::{
    JiraIssuePayload, default_jql, flatten_adf, map_jira_issue, map_jira_item,
    parse_jira_timestamp,
};

use super::{ConnectorError, ConnectorResult, IssueStream, ports::boxed_stream};
use crate::source::domain::{SourceKind, TaskSource};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Stream yielding a single configuration error for a source of another kind.
fn mismatched_source(expected: SourceKind, source: &TaskSource) -> IssueStream {
    let error = ConnectorError::configuration(format!(
        "source {} is {}, connector serves {expected}",
        source.id(),
        source.kind()
    ));
    boxed_stream(futures_util::stream::iter([Err(error)]))
}

/// Returns the `id` member of a raw issue payload for error reports.
fn payload_id(payload: &Value) -> String {
    match payload.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => "unknown".to_owned(),
    }
}

/// Decodes one issue of a page, reporting failures against that issue only.
fn decode_payload<T: DeserializeOwned>(payload: Value) -> ConnectorResult<T> {
    let issue_id = payload_id(&payload);
    serde_json::from_value(payload)
        .map_err(|err| ConnectorError::invalid_issue(issue_id, err.to_string()))
}
