//! GitHub issues connector (REST v3).

use super::{decode_payload, mismatched_source};
use crate::connector::{
    ConnectorError, ConnectorResult, IssueConnector, IssueStream, http::send_checked,
    ports::boxed_page_stream,
};
use crate::source::{
    domain::{GitHubSourceConfig, SourceConfig, SourceKind, TaskSource},
    ports::CredentialResolver,
};
use crate::task::domain::{ExternalIssueId, IssueMetadata, IssueNumber, SourceIssue};
use async_stream::try_stream;
use chrono::{DateTime, Utc};
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

const PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GitHubLabelPayload {
    name: String,
}

/// Issue as returned by `GET /repos/{owner}/{repo}/issues`.
///
/// The endpoint also lists pull requests; those carry a `pull_request` member.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GitHubIssuePayload {
    id: u64,
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    labels: Vec<GitHubLabelPayload>,
    #[serde(default)]
    html_url: Option<String>,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

/// Connector for GitHub repository issues.
#[derive(Clone)]
pub struct GitHubConnector {
    client: Client,
    credentials: Arc<dyn CredentialResolver>,
}

impl GitHubConnector {
    /// Creates a connector using a shared HTTP client.
    #[must_use]
    pub fn new(client: Client, credentials: Arc<dyn CredentialResolver>) -> Self {
        Self {
            client,
            credentials,
        }
    }
}

impl IssueConnector for GitHubConnector {
    fn kind(&self) -> SourceKind {
        SourceKind::GithubIssues
    }

    fn fetch_issues(&self, source: &TaskSource) -> IssueStream {
        let SourceConfig::GitHub(config) = source.config().clone() else {
            return mismatched_source(self.kind(), source);
        };
        let client = self.client.clone();
        let credentials = Arc::clone(&self.credentials);
        let source_id = source.id();

        boxed_page_stream(try_stream! {
            let token = credentials.decrypt(config.credential())?;
            let (owner, repo) = config.repository().segments();
            let url = format!("{}/repos/{owner}/{repo}/issues", config.api_base());
            let resource = format!("GitHub repository {}", config.repository());
            let mut page = 1_u32;

            loop {
                let mut request = client
                    .get(&url)
                    .bearer_auth(token.expose())
                    .header(ACCEPT, "application/vnd.github+json")
                    .query(&[("state", "open")])
                    .query(&[("per_page", PAGE_SIZE)])
                    .query(&[("page", page)]);
                if !config.labels().is_empty() {
                    request = request.query(&[("labels", config.labels().join(","))]);
                }

                let response = send_checked(request, &resource).await?;
                let payloads: Vec<Value> = response.json().await?;
                let count = payloads.len();
                debug!(%source_id, page, count, "fetched GitHub issue page");

                for payload in payloads {
                    if let Some(item) = map_github_item(payload, &config) {
                        yield item;
                    }
                }
                if count < PAGE_SIZE {
                    break;
                }
                page += 1;
            }
        })
    }
}

/// Decodes and maps one entry of an issue page, dropping pull requests.
pub(crate) fn map_github_item(
    payload: Value,
    config: &GitHubSourceConfig,
) -> Option<ConnectorResult<SourceIssue>> {
    decode_payload::<GitHubIssuePayload>(payload)
        .and_then(|decoded| map_github_issue(decoded, config))
        .transpose()
}

/// Maps an issue payload, returning `None` for pull requests.
pub(crate) fn map_github_issue(
    payload: GitHubIssuePayload,
    config: &GitHubSourceConfig,
) -> ConnectorResult<Option<SourceIssue>> {
    if payload.pull_request.is_some() {
        return Ok(None);
    }
    let raw_id = payload.id.to_string();
    let id = ExternalIssueId::new(raw_id.as_str())
        .map_err(|err| ConnectorError::invalid_issue(raw_id.as_str(), err.to_string()))?;
    let number = IssueNumber::new(payload.number)
        .map_err(|err| ConnectorError::invalid_issue(raw_id.as_str(), err.to_string()))?;
    let metadata = IssueMetadata::GitHub {
        repository: config.repository().clone(),
        web_url: payload.html_url,
    };

    Ok(Some(
        SourceIssue::new(id, payload.title, payload.updated_at, metadata)
            .with_iid(number)
            .with_description(payload.body)
            .with_labels(payload.labels.into_iter().map(|label| label.name)),
    ))
}
