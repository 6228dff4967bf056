//! Scripted connector for tests and local runs.

use crate::connector::{
    ConnectorError, ConnectorResult, IssueConnector, IssueStream, ports::boxed_stream,
};
use crate::source::domain::{SourceKind, TaskSource, TaskSourceId};
use crate::task::domain::SourceIssue;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Default)]
struct Script {
    items: Vec<ConnectorResult<SourceIssue>>,
    failure: Option<(usize, ConnectorError)>,
}

/// Connector replaying issues registered per source.
///
/// A failure can be scripted to occur after a number of issues have been
/// yielded, which mimics a tracker error in the middle of pagination.
#[derive(Debug, Clone)]
pub struct InMemoryConnector {
    kind: SourceKind,
    scripts: Arc<RwLock<HashMap<TaskSourceId, Script>>>,
    fetches: Arc<AtomicUsize>,
}

impl InMemoryConnector {
    /// Creates a connector serving `kind` with no scripted issues.
    #[must_use]
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            scripts: Arc::default(),
            fetches: Arc::default(),
        }
    }

    /// Replaces the issues returned for a source and clears any failure.
    pub fn set_issues(&self, source_id: TaskSourceId, issues: Vec<SourceIssue>) {
        self.set_items(source_id, issues.into_iter().map(Ok).collect());
    }

    /// Replaces the stream items for a source and clears any failure.
    ///
    /// Use [`ConnectorError::InvalidIssue`] items to script unmappable issues
    /// in the middle of a page. The replay stops after any other error.
    pub fn set_items(&self, source_id: TaskSourceId, items: Vec<ConnectorResult<SourceIssue>>) {
        if let Ok(mut scripts) = self.scripts.write() {
            scripts.insert(
                source_id,
                Script {
                    items,
                    failure: None,
                },
            );
        }
    }

    /// Makes fetches for a source fail after yielding `after` issues.
    pub fn fail_after(&self, source_id: TaskSourceId, after: usize, error: ConnectorError) {
        if let Ok(mut scripts) = self.scripts.write() {
            scripts.entry(source_id).or_default().failure = Some((after, error));
        }
    }

    /// Returns how many times `fetch_issues` has been called.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl IssueConnector for InMemoryConnector {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn fetch_issues(&self, source: &TaskSource) -> IssueStream {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let script = match self.scripts.read() {
            Ok(scripts) => scripts.get(&source.id()).cloned().unwrap_or_default(),
            Err(err) => Script {
                items: Vec::new(),
                failure: Some((0, ConnectorError::network(err.to_string()))),
            },
        };

        let Script { items, failure } = script;
        let mut replay: Vec<_> = match failure {
            Some((after, error)) => items
                .into_iter()
                .take(after)
                .chain(std::iter::once(Err(error)))
                .collect(),
            None => items,
        };
        if let Some(last) = replay
            .iter()
            .position(|item| item.as_ref().is_err_and(|err| !err.is_issue_error()))
        {
            replay.truncate(last + 1);
        }
        boxed_stream(futures_util::stream::iter(replay))
    }
}
