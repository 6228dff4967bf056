//! GitLab issues connector (REST v4).

use super::{decode_payload, mismatched_source};
use crate::connector::{
    ConnectorError, ConnectorResult, IssueConnector, IssueStream, http::send_checked,
    ports::boxed_page_stream,
};
use crate::source::{
    domain::{GitLabSourceConfig, SourceConfig, SourceKind, TaskSource},
    ports::CredentialResolver,
};
use crate::task::domain::{ExternalIssueId, IssueMetadata, IssueNumber, SourceIssue};
use async_stream::try_stream;
use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

const PAGE_SIZE: &str = "100";

/// Issue as returned by `GET /projects/:id/issues`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GitLabIssuePayload {
    id: u64,
    iid: u64,
    title: String,
    #[serde(default)]
    description: Option<String>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    web_url: Option<String>,
}

/// Connector for GitLab project issues.
#[derive(Clone)]
pub struct GitLabConnector {
    client: Client,
    credentials: Arc<dyn CredentialResolver>,
}

impl GitLabConnector {
    /// Creates a connector using a shared HTTP client.
    #[must_use]
    pub fn new(client: Client, credentials: Arc<dyn CredentialResolver>) -> Self {
        Self {
            client,
            credentials,
        }
    }
}

impl IssueConnector for GitLabConnector {
    fn kind(&self) -> SourceKind {
        SourceKind::GitlabIssues
    }

    fn fetch_issues(&self, source: &TaskSource) -> IssueStream {
        let SourceConfig::GitLab(config) = source.config().clone() else {
            return mismatched_source(self.kind(), source);
        };
        let client = self.client.clone();
        let credentials = Arc::clone(&self.credentials);
        let source_id = source.id();

        boxed_page_stream(try_stream! {
            let token = credentials.decrypt(config.credential())?;
            let url = issues_url(&config)?;
            let resource = format!("GitLab project {}", config.project_path());
            let mut page = Some(1_u32);

            while let Some(current) = page {
                let mut request = client
                    .get(url.clone())
                    .header("PRIVATE-TOKEN", token.expose())
                    .query(&[("state", "opened"), ("per_page", PAGE_SIZE)])
                    .query(&[("page", current)]);
                if !config.labels().is_empty() {
                    request = request.query(&[("labels", config.labels().join(","))]);
                }

                let response = send_checked(request, &resource).await?;
                page = next_page(response.headers());
                let payloads: Vec<Value> = response.json().await?;
                debug!(%source_id, page = current, count = payloads.len(), "fetched GitLab issue page");

                for payload in payloads {
                    yield map_gitlab_item(payload, &config);
                }
            }
        })
    }
}

/// Builds `{host}/api/v4/projects/{url-encoded path}/issues`.
pub(crate) fn issues_url(config: &GitLabSourceConfig) -> ConnectorResult<Url> {
    let mut url = Url::parse(config.host())
        .map_err(|err| ConnectorError::configuration(format!("invalid GitLab host: {err}")))?;
    url.path_segments_mut()
        .map_err(|()| ConnectorError::configuration("GitLab host cannot carry a path"))?
        .pop_if_empty()
        .extend(["api", "v4", "projects", config.project_path(), "issues"]);
    Ok(url)
}

/// Reads `X-Next-Page`; GitLab sends an empty value on the last page.
pub(crate) fn next_page(headers: &HeaderMap) -> Option<u32> {
    headers
        .get("x-next-page")?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Decodes and maps one entry of an issue page.
pub(crate) fn map_gitlab_item(
    payload: Value,
    config: &GitLabSourceConfig,
) -> ConnectorResult<SourceIssue> {
    map_gitlab_issue(decode_payload(payload)?, config)
}

pub(crate) fn map_gitlab_issue(
    payload: GitLabIssuePayload,
    config: &GitLabSourceConfig,
) -> ConnectorResult<SourceIssue> {
    let raw_id = payload.id.to_string();
    let id = ExternalIssueId::new(raw_id.as_str())
        .map_err(|err| ConnectorError::invalid_issue(raw_id.as_str(), err.to_string()))?;
    let iid = IssueNumber::new(payload.iid)
        .map_err(|err| ConnectorError::invalid_issue(raw_id.as_str(), err.to_string()))?;
    let metadata = IssueMetadata::GitLab {
        host: config.host().to_owned(),
        project_path: config.project_path().to_owned(),
        web_url: payload.web_url,
    };

    Ok(SourceIssue::new(id, payload.title, payload.updated_at, metadata)
        .with_iid(iid)
        .with_description(payload.description)
        .with_labels(payload.labels))
}
