//! Tests for tracker payload mapping and request construction helpers.

use crate::connector::ConnectorError;
use crate::connector::adapters::{
    GitHubIssuePayload, GitLabIssuePayload, JiraIssuePayload, default_jql, flatten_adf,
    gitlab_issues_url, map_github_issue, map_github_item, map_gitlab_issue, map_gitlab_item,
    map_jira_issue, map_jira_item, next_page, parse_jira_timestamp,
};
use crate::source::domain::{
    EncryptedCredential, GitHubSourceConfig, GitLabSourceConfig, JiraSourceConfig,
};
use crate::task::domain::{IssueMetadata, RepositoryFullName};
use chrono::{TimeZone, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn gitlab_config() -> GitLabSourceConfig {
    let credential = EncryptedCredential::new("glpat-test").expect("valid credential");
    GitLabSourceConfig::new("acme/widgets", credential).expect("valid path")
}

#[fixture]
fn github_config() -> GitHubSourceConfig {
    let credential = EncryptedCredential::new("ghp-test").expect("valid credential");
    let repository = RepositoryFullName::new("acme/widgets").expect("valid repository");
    GitHubSourceConfig::new(repository, credential)
}

#[fixture]
fn jira_config() -> JiraSourceConfig {
    let credential = EncryptedCredential::new("jira-token").expect("valid credential");
    JiraSourceConfig::new("https://acme.atlassian.net", "ops", "bot@acme.test", credential)
        .expect("valid config")
}

#[rstest]
fn gitlab_payload_maps_to_source_issue(gitlab_config: GitLabSourceConfig) {
    let payload: GitLabIssuePayload = serde_json::from_value(json!({
        "id": 4242,
        "iid": 42,
        "title": "Fix login",
        "description": "Users cannot log in",
        "updated_at": "2024-01-01T10:00:00Z",
        "labels": ["bug", "sync"],
        "web_url": "https://gitlab.com/acme/widgets/-/issues/42",
        "state": "opened"
    }))
    .expect("valid payload");

    let issue = map_gitlab_issue(payload, &gitlab_config).expect("mappable payload");

    assert_eq!(issue.id().as_str(), "4242");
    assert_eq!(issue.iid().map(|iid| iid.value()), Some(42));
    assert_eq!(issue.title(), "Fix login");
    assert_eq!(issue.description(), Some("Users cannot log in"));
    assert_eq!(issue.labels(), ["bug".to_owned(), "sync".to_owned()]);
    assert_eq!(
        issue.updated_at(),
        Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0)
            .single()
            .expect("valid timestamp")
    );
    assert_eq!(
        issue.metadata(),
        &IssueMetadata::GitLab {
            host: "https://gitlab.com".to_owned(),
            project_path: "acme/widgets".to_owned(),
            web_url: Some("https://gitlab.com/acme/widgets/-/issues/42".to_owned()),
        }
    );
}

#[rstest]
fn gitlab_payload_without_description_maps_to_none(gitlab_config: GitLabSourceConfig) {
    let payload: GitLabIssuePayload = serde_json::from_value(json!({
        "id": 7,
        "iid": 1,
        "title": "Tidy",
        "description": null,
        "updated_at": "2024-01-01T10:00:00Z"
    }))
    .expect("valid payload");

    let issue = map_gitlab_issue(payload, &gitlab_config).expect("mappable payload");
    assert_eq!(issue.description(), None);
    assert!(issue.labels().is_empty());
}

#[rstest]
fn gitlab_issues_url_encodes_nested_project_path() {
    let credential = EncryptedCredential::new("glpat-test").expect("valid credential");
    let config = GitLabSourceConfig::new("acme/platform/widgets", credential)
        .expect("valid path")
        .with_host("https://gitlab.example.com/")
        .expect("valid host");

    let url = gitlab_issues_url(&config).expect("valid url");
    assert_eq!(
        url.as_str(),
        "https://gitlab.example.com/api/v4/projects/acme%2Fplatform%2Fwidgets/issues"
    );
}

#[rstest]
fn gitlab_issues_url_uses_public_host_by_default(gitlab_config: GitLabSourceConfig) {
    let url = gitlab_issues_url(&gitlab_config).expect("valid url");
    assert_eq!(
        url.as_str(),
        "https://gitlab.com/api/v4/projects/acme%2Fwidgets/issues"
    );
}

#[rstest]
#[case(Some("3"), Some(3))]
#[case(Some(""), None)]
#[case(None, None)]
fn next_page_follows_gitlab_header(#[case] header: Option<&'static str>, #[case] expected: Option<u32>) {
    let mut headers = HeaderMap::new();
    if let Some(value) = header {
        headers.insert("x-next-page", HeaderValue::from_static(value));
    }
    assert_eq!(next_page(&headers), expected);
}

#[rstest]
fn github_payload_maps_to_source_issue(github_config: GitHubSourceConfig) {
    let payload: GitHubIssuePayload = serde_json::from_value(json!({
        "id": 9001,
        "number": 12,
        "title": "Crash on start",
        "body": "Stack trace attached",
        "updated_at": "2024-02-03T04:05:06Z",
        "labels": [{ "name": "bug", "color": "f00" }],
        "html_url": "https://github.com/acme/widgets/issues/12"
    }))
    .expect("valid payload");

    let issue = map_github_issue(payload, &github_config)
        .expect("mappable payload")
        .expect("issues are kept");

    assert_eq!(issue.id().as_str(), "9001");
    assert_eq!(issue.iid().map(|number| number.value()), Some(12));
    assert_eq!(issue.labels(), ["bug".to_owned()]);
    assert_eq!(issue.description(), Some("Stack trace attached"));
    assert_eq!(
        issue.metadata().web_url(),
        Some("https://github.com/acme/widgets/issues/12")
    );
}

#[rstest]
fn github_pull_requests_are_skipped(github_config: GitHubSourceConfig) {
    let payload: GitHubIssuePayload = serde_json::from_value(json!({
        "id": 9002,
        "number": 13,
        "title": "Add feature",
        "updated_at": "2024-02-03T04:05:06Z",
        "pull_request": { "url": "https://api.github.com/repos/acme/widgets/pulls/13" }
    }))
    .expect("valid payload");

    assert!(
        map_github_issue(payload, &github_config)
            .expect("mappable payload")
            .is_none()
    );
}

#[rstest]
fn jira_payload_maps_key_and_browse_url(jira_config: JiraSourceConfig) {
    let payload: JiraIssuePayload = serde_json::from_value(json!({
        "id": "10042",
        "key": "OPS-7",
        "fields": {
            "summary": "Rotate certificates",
            "description": {
                "type": "doc",
                "version": 1,
                "content": [
                    { "type": "paragraph", "content": [{ "type": "text", "text": "Expires soon." }] }
                ]
            },
            "updated": "2024-01-01T10:00:00.000+0000",
            "labels": ["ops"]
        }
    }))
    .expect("valid payload");

    let issue = map_jira_issue(payload, &jira_config).expect("mappable payload");

    assert_eq!(issue.id().as_str(), "10042");
    assert_eq!(issue.iid(), None);
    assert_eq!(issue.description(), Some("Expires soon."));
    assert_eq!(
        issue.metadata(),
        &IssueMetadata::Jira {
            host: "https://acme.atlassian.net".to_owned(),
            project_key: "OPS".to_owned(),
            issue_key: "OPS-7".to_owned(),
            web_url: Some("https://acme.atlassian.net/browse/OPS-7".to_owned()),
        }
    );
}

#[rstest]
fn jira_payload_with_bad_timestamp_is_an_issue_error(jira_config: JiraSourceConfig) {
    let payload: JiraIssuePayload = serde_json::from_value(json!({
        "id": "10043",
        "key": "OPS-8",
        "fields": { "summary": "Broken", "updated": "yesterday" }
    }))
    .expect("valid payload");

    let error = map_jira_issue(payload, &jira_config).expect_err("timestamp rejected");
    assert!(error.is_issue_error());
    assert!(matches!(
        &error,
        ConnectorError::InvalidIssue { issue_id, message }
            if issue_id == "10043" && message.contains("yesterday")
    ));
}

#[rstest]
fn undecodable_page_entries_report_their_own_id(
    gitlab_config: GitLabSourceConfig,
    github_config: GitHubSourceConfig,
    jira_config: JiraSourceConfig,
) {
    let gitlab = map_gitlab_item(
        json!({ "id": 4243, "iid": 43, "title": "Bad", "updated_at": "not-a-date" }),
        &gitlab_config,
    );
    let github = map_github_item(json!({ "id": 9003, "title": "No number" }), &github_config);
    let jira = map_jira_item(json!({ "key": "OPS-9", "fields": {} }), &jira_config);

    assert!(matches!(
        gitlab,
        Err(ConnectorError::InvalidIssue { ref issue_id, .. }) if issue_id == "4243"
    ));
    assert!(matches!(
        github,
        Some(Err(ConnectorError::InvalidIssue { ref issue_id, .. })) if issue_id == "9003"
    ));
    assert!(matches!(
        jira,
        Err(ConnectorError::InvalidIssue { ref issue_id, .. }) if issue_id == "unknown"
    ));
}

#[rstest]
fn github_page_entries_skip_pull_requests(github_config: GitHubSourceConfig) {
    let pull_request = json!({
        "id": 9004,
        "number": 14,
        "title": "Add feature",
        "updated_at": "2024-02-03T04:05:06Z",
        "pull_request": {}
    });
    assert!(map_github_item(pull_request, &github_config).is_none());
}

#[rstest]
#[case("2024-01-01T10:00:00.000+0000")]
#[case("2024-01-01T12:00:00.000+0200")]
#[case("2024-01-01T10:00:00Z")]
fn jira_timestamps_normalise_to_utc(#[case] raw: &str) {
    let expected = Utc
        .with_ymd_and_hms(2024, 1, 1, 10, 0, 0)
        .single()
        .expect("valid timestamp");
    assert_eq!(parse_jira_timestamp(raw).expect("parsable"), expected);
}

#[rstest]
fn default_jql_filters_open_project_issues(jira_config: JiraSourceConfig) {
    assert_eq!(
        default_jql(&jira_config),
        "project = \"OPS\" AND statusCategory != Done ORDER BY updated ASC"
    );
}

#[rstest]
fn default_jql_appends_label_filters(jira_config: JiraSourceConfig) {
    let config = jira_config.with_labels(vec!["sync".to_owned(), "team \"a\"".to_owned()]);
    assert_eq!(
        default_jql(&config),
        "project = \"OPS\" AND statusCategory != Done AND labels = \"sync\" \
         AND labels = \"team \\\"a\\\"\" ORDER BY updated ASC"
    );
}

#[rstest]
fn adf_documents_flatten_to_lines() {
    let document = json!({
        "type": "doc",
        "content": [
            { "type": "heading", "content": [{ "type": "text", "text": "Summary" }] },
            {
                "type": "paragraph",
                "content": [
                    { "type": "text", "text": "First" },
                    { "type": "hardBreak" },
                    { "type": "text", "text": "second" }
                ]
            },
            {
                "type": "bulletList",
                "content": [
                    { "type": "listItem", "content": [
                        { "type": "paragraph", "content": [{ "type": "text", "text": "item" }] }
                    ] }
                ]
            }
        ]
    });

    assert_eq!(
        flatten_adf(&document).as_deref(),
        Some("Summary\nFirst\nsecond\nitem")
    );
}

#[rstest]
#[case(json!("plain text"), Some("plain text"))]
#[case(json!({ "type": "doc", "content": [] }), None)]
#[case(json!("   "), None)]
fn adf_edge_cases(#[case] document: serde_json::Value, #[case] expected: Option<&str>) {
    assert_eq!(flatten_adf(&document).as_deref(), expected);
}
