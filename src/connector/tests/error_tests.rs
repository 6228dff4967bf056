//! Tests for HTTP status and transport error classification.

use crate::connector::{ConnectorError, parse_retry_after};
use crate::source::ports::CredentialError;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};
use rstest::rstest;
use std::time::Duration;

#[rstest]
#[case(StatusCode::UNAUTHORIZED)]
#[case(StatusCode::FORBIDDEN)]
fn auth_statuses_map_to_authentication(#[case] status: StatusCode) {
    let error = ConnectorError::from_status(status, &HeaderMap::new(), "GitLab project acme/widgets");
    assert!(matches!(error, ConnectorError::Authentication { .. }));
}

#[rstest]
fn missing_resource_maps_to_not_found() {
    let error = ConnectorError::from_status(
        StatusCode::NOT_FOUND,
        &HeaderMap::new(),
        "GitHub repository acme/widgets",
    );
    assert_eq!(
        error,
        ConnectorError::not_found("GitHub repository acme/widgets")
    );
}

#[rstest]
fn throttling_honours_retry_after_seconds() {
    let mut headers = HeaderMap::new();
    headers.insert(RETRY_AFTER, HeaderValue::from_static("17"));

    let error = ConnectorError::from_status(StatusCode::TOO_MANY_REQUESTS, &headers, "Jira");
    assert_eq!(
        error,
        ConnectorError::RateLimited {
            retry_after: Some(Duration::from_secs(17))
        }
    );
    assert!(error.is_retryable());
    assert!(error.to_string().contains("retry after 17s"));
}

#[rstest]
fn http_date_retry_after_is_ignored() {
    let mut headers = HeaderMap::new();
    headers.insert(
        RETRY_AFTER,
        HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
    );
    assert_eq!(parse_retry_after(&headers), None);
}

#[rstest]
fn server_errors_are_invalid_responses() {
    let error = ConnectorError::from_status(
        StatusCode::BAD_GATEWAY,
        &HeaderMap::new(),
        "GitLab project acme/widgets",
    );
    assert!(matches!(error, ConnectorError::InvalidResponse { .. }));
    assert!(!error.is_retryable());
}

#[rstest]
fn credential_failures_are_authentication_errors() {
    let error = ConnectorError::from(CredentialError::Undecryptable("bad key".to_owned()));
    assert!(matches!(error, ConnectorError::Authentication { message } if message.contains("bad key")));
}
