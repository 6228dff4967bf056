//! Shared HTTP client settings and request helpers for tracker adapters.

use super::{ConnectorError, ConnectorResult};
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;

/// Default per-request timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for the HTTP client shared by all tracker adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    timeout: Duration,
    user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_HTTP_TIMEOUT,
            user_agent: concat!("tracksync/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl HttpSettings {
    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the `User-Agent` header. GitHub rejects requests without one.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the `User-Agent` header value.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Builds a client with these settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Configuration`] when the TLS backend cannot
    /// be initialised.
    pub fn build_client(&self) -> ConnectorResult<Client> {
        Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.clone())
            .build()
            .map_err(|err| ConnectorError::configuration(err.to_string()))
    }
}

/// Sends a request and classifies non-success statuses.
pub(crate) async fn send_checked(
    request: RequestBuilder,
    resource: &str,
) -> ConnectorResult<Response> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(ConnectorError::from_status(
        status,
        response.headers(),
        resource,
    ))
}
