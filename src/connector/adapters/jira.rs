//! Jira Cloud connector (REST v3 search).
//!
//! Authentication uses basic auth with the account email and an API token.
//! Descriptions arrive in Atlassian document format and are flattened to
//! plain text.

use super::{decode_payload, mismatched_source};
use crate::connector::{
    ConnectorError, ConnectorResult, IssueConnector, IssueStream, http::send_checked,
    ports::boxed_page_stream,
};
use crate::source::{
    domain::{JiraSourceConfig, SourceConfig, SourceKind, TaskSource},
    ports::CredentialResolver,
};
use crate::task::domain::{ExternalIssueId, IssueMetadata, SourceIssue};
use async_stream::try_stream;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

const PAGE_SIZE: u64 = 50;
const SEARCH_FIELDS: &str = "summary,description,updated,labels";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JiraSearchResponse {
    #[serde(default)]
    start_at: u64,
    #[serde(default)]
    total: u64,
    #[serde(default)]
    issues: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct JiraFieldsPayload {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    description: Option<Value>,
    updated: String,
    #[serde(default)]
    labels: Vec<String>,
}

/// One entry of the search response's `issues` array.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct JiraIssuePayload {
    id: String,
    key: String,
    fields: JiraFieldsPayload,
}

/// Connector for Jira project tickets.
#[derive(Clone)]
pub struct JiraConnector {
    client: Client,
    credentials: Arc<dyn CredentialResolver>,
}

impl JiraConnector {
    /// Creates a connector using a shared HTTP client.
    #[must_use]
    pub fn new(client: Client, credentials: Arc<dyn CredentialResolver>) -> Self {
        Self {
            client,
            credentials,
        }
    }
}

impl IssueConnector for JiraConnector {
    fn kind(&self) -> SourceKind {
        SourceKind::Jira
    }

    fn fetch_issues(&self, source: &TaskSource) -> IssueStream {
        let SourceConfig::Jira(config) = source.config().clone() else {
            return mismatched_source(self.kind(), source);
        };
        let client = self.client.clone();
        let credentials = Arc::clone(&self.credentials);
        let source_id = source.id();

        boxed_page_stream(try_stream! {
            let token = credentials.decrypt(config.credential())?;
            let url = format!("{}/rest/api/3/search", config.host());
            let resource = format!("Jira project {}", config.project_key());
            let jql = config.jql().map_or_else(|| default_jql(&config), ToOwned::to_owned);
            let mut start_at = 0_u64;

            loop {
                let request = client
                    .get(&url)
                    .basic_auth(config.email(), Some(token.expose()))
                    .query(&[("jql", jql.as_str()), ("fields", SEARCH_FIELDS)])
                    .query(&[("startAt", start_at), ("maxResults", PAGE_SIZE)]);

                let response = send_checked(request, &resource).await?;
                let page: JiraSearchResponse = response.json().await?;
                let count = page.issues.len() as u64;
                debug!(%source_id, start_at, count, total = page.total, "fetched Jira search page");

                for payload in page.issues {
                    yield map_jira_item(payload, &config);
                }
                start_at = page.start_at.saturating_add(count);
                if count == 0 || start_at >= page.total {
                    break;
                }
            }
        })
    }
}

/// Builds the project query used when a source has no custom JQL.
pub(crate) fn default_jql(config: &JiraSourceConfig) -> String {
    let mut jql = format!(
        "project = \"{}\" AND statusCategory != Done",
        config.project_key()
    );
    for label in config.labels() {
        jql.push_str(&format!(" AND labels = \"{}\"", label.replace('"', "\\\"")));
    }
    jql.push_str(" ORDER BY updated ASC");
    jql
}

/// Decodes and maps one entry of a search page.
pub(crate) fn map_jira_item(payload: Value, config: &JiraSourceConfig) -> ConnectorResult<SourceIssue> {
    map_jira_issue(decode_payload(payload)?, config)
}

pub(crate) fn map_jira_issue(
    payload: JiraIssuePayload,
    config: &JiraSourceConfig,
) -> ConnectorResult<SourceIssue> {
    let JiraIssuePayload { id, key, fields } = payload;
    let external_id = ExternalIssueId::new(id.as_str())
        .map_err(|err| ConnectorError::invalid_issue(id.as_str(), err.to_string()))?;
    let updated_at = parse_jira_timestamp(&fields.updated)
        .map_err(|message| ConnectorError::invalid_issue(id.as_str(), message))?;
    let description = fields.description.as_ref().and_then(flatten_adf);
    let metadata = IssueMetadata::Jira {
        host: config.host().to_owned(),
        project_key: config.project_key().to_owned(),
        web_url: Some(format!("{}/browse/{key}", config.host())),
        issue_key: key,
    };

    Ok(
        SourceIssue::new(external_id, fields.summary, updated_at, metadata)
            .with_description(description)
            .with_labels(fields.labels),
    )
}

/// Parses Jira timestamps such as `2024-01-01T10:00:00.000+0000`.
pub(crate) fn parse_jira_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|err| format!("invalid Jira timestamp '{raw}': {err}"))
}

/// Flattens an Atlassian document to plain text.
///
/// Plain string descriptions pass through. Returns `None` for documents
/// without text.
pub(crate) fn flatten_adf(document: &Value) -> Option<String> {
    let mut text = String::new();
    match document {
        Value::String(plain) => text.push_str(plain),
        other => collect_adf_text(other, &mut text),
    }
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn collect_adf_text(node: &Value, out: &mut String) {
    let node_type = node.get("type").and_then(Value::as_str).unwrap_or_default();
    if node_type == "hardBreak" {
        out.push('\n');
        return;
    }
    if let Some(fragment) = node.get("text").and_then(Value::as_str) {
        out.push_str(fragment);
    }
    if let Some(children) = node.get("content").and_then(Value::as_array) {
        for child in children {
            collect_adf_text(child, out);
        }
    }
    let is_block = matches!(
        node_type,
        "paragraph" | "heading" | "listItem" | "codeBlock" | "blockquote" | "rule"
    );
    if is_block && !out.ends_with('\n') {
        out.push('\n');
    }
}
