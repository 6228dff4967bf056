//! Common error taxonomy for tracker connectors.

use crate::source::ports::CredentialError;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::time::Duration;
use thiserror::Error;

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;

/// Provider-independent connector failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectorError {
    /// The tracker rejected the credential, or it could not be decrypted.
    #[error("authentication failed: {message}")]
    Authentication {
        /// Provider or resolver detail.
        message: String,
    },

    /// The tracker throttled the request.
    #[error("rate limited by tracker{}", retry_hint(*retry_after))]
    RateLimited {
        /// Delay requested by the tracker, when it sent one.
        retry_after: Option<Duration>,
    },

    /// The configured project, repository, or endpoint does not exist.
    #[error("not found: {resource}")]
    NotFound {
        /// The resource that was requested.
        resource: String,
    },

    /// The request never produced a response.
    #[error("network error: {message}")]
    Network {
        /// Transport detail.
        message: String,
    },

    /// The tracker answered with an unexpected status or payload.
    #[error("invalid tracker response: {message}")]
    InvalidResponse {
        /// Status or decode detail.
        message: String,
    },

    /// One issue in an otherwise readable page could not be mapped.
    ///
    /// Unlike every other variant this does not end the stream.
    #[error("issue {issue_id} could not be mapped: {message}")]
    InvalidIssue {
        /// Provider issue id as sent, or `unknown` when absent.
        issue_id: String,
        /// Decode or validation detail.
        message: String,
    },

    /// The source configuration cannot be used by this connector.
    #[error("connector configuration error: {message}")]
    Configuration {
        /// Configuration detail.
        message: String,
    },
}

fn retry_hint(retry_after: Option<Duration>) -> String {
    retry_after.map_or_else(String::new, |delay| {
        format!(", retry after {}s", delay.as_secs())
    })
}

impl ConnectorError {
    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates an invalid-response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Creates a per-issue mapping error.
    pub fn invalid_issue(issue_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidIssue {
            issue_id: issue_id.into(),
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Classifies a non-success HTTP response.
    #[must_use]
    pub fn from_status(status: StatusCode, headers: &HeaderMap, resource: &str) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Self::authentication(format!("{resource} returned {status}"))
            }
            StatusCode::NOT_FOUND => Self::not_found(resource),
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited {
                retry_after: parse_retry_after(headers),
            },
            _ => Self::invalid_response(format!("{resource} returned {status}")),
        }
    }

    /// Returns whether the error concerns a single issue, so the stream
    /// carries on after it.
    #[must_use]
    pub const fn is_issue_error(&self) -> bool {
        matches!(self, Self::InvalidIssue { .. })
    }

    /// Returns whether retrying the same request later may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Network { .. })
    }
}

/// Reads a `Retry-After` header given in whole seconds.
///
/// HTTP-date values are ignored.
#[must_use]
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

impl From<reqwest::Error> for ConnectorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::invalid_response(err.to_string());
        }
        if let Some(status) = err.status() {
            return Self::from_status(status, &HeaderMap::new(), "tracker request");
        }
        Self::network(err.to_string())
    }
}

impl From<CredentialError> for ConnectorError {
    fn from(err: CredentialError) -> Self {
        Self::authentication(err.to_string())
    }
}
