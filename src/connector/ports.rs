//! Connector capability contract and the factory that selects adapters.

use super::ConnectorResult;
use crate::source::domain::{SourceKind, TaskSource};
use crate::task::domain::SourceIssue;
use futures_util::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;

/// Lazy, finite sequence of fetched issues.
///
/// Nothing is requested from the tracker until the stream is polled. A
/// stream cannot be restarted; fetching again means calling
/// [`IssueConnector::fetch_issues`] again.
///
/// An [`ConnectorError::InvalidIssue`](super::ConnectorError::InvalidIssue)
/// item reports one unmappable issue and is followed by the rest of the
/// page. Any other error is the last item.
pub type IssueStream = Pin<Box<dyn Stream<Item = ConnectorResult<SourceIssue>> + Send>>;

/// Read-only access to one tracker's issue list.
pub trait IssueConnector: Send + Sync {
    /// Returns the source kind this connector serves.
    fn kind(&self) -> SourceKind;

    /// Streams the source's open issues in tracker order.
    ///
    /// Errors are yielded as stream items. A source configured for another
    /// tracker yields a single [`ConnectorError::Configuration`](super::ConnectorError::Configuration).
    fn fetch_issues(&self, source: &TaskSource) -> IssueStream;
}

/// Chooses the connector for a source kind.
pub trait ConnectorFactory: Send + Sync {
    /// Returns the connector serving `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Configuration`](super::ConnectorError::Configuration)
    /// when no connector is registered for the kind.
    fn connector_for(&self, kind: SourceKind) -> ConnectorResult<Arc<dyn IssueConnector>>;
}

/// Boxes a concrete issue stream.
pub(crate) fn boxed_stream<S>(stream: S) -> IssueStream
where
    S: Stream<Item = ConnectorResult<SourceIssue>> + Send + 'static,
{
    Box::pin(stream)
}

/// Boxes a stream of per-issue results produced page by page.
///
/// Outer errors (transport, status, page decode) end the stream; inner
/// per-issue errors are passed through as items.
pub(crate) fn boxed_page_stream<S>(stream: S) -> IssueStream
where
    S: Stream<Item = ConnectorResult<ConnectorResult<SourceIssue>>> + Send + 'static,
{
    Box::pin(stream.map(|item| item.and_then(std::convert::identity)))
}
