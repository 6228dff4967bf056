//! Shared world state for sync run BDD scenarios.

use crate::test_helpers::SyncFixture;
use rstest::fixture;
use tracksync::source::domain::TaskSource;
use tracksync::sync::domain::SyncRunResult;
use tracksync::task::domain::SourceIssue;

/// Scenario world for sync run behaviour tests.
pub struct SyncRunWorld {
    pub fixture: SyncFixture,
    pub source: Option<TaskSource>,
    pub issues: Vec<SourceIssue>,
    pub last_result: Option<SyncRunResult>,
}

impl SyncRunWorld {
    /// Returns the source created by the scenario.
    ///
    /// # Errors
    ///
    /// Returns an error when no source step has run.
    pub fn source(&self) -> Result<&TaskSource, eyre::Report> {
        self.source
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task source in scenario world"))
    }

    /// Returns the result of the latest run.
    ///
    /// # Errors
    ///
    /// Returns an error when no run has happened yet.
    pub fn last_result(&self) -> Result<&SyncRunResult, eyre::Report> {
        self.last_result
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing sync run result in scenario world"))
    }

    /// Replaces or adds an issue and republishes the tracker's issue list.
    ///
    /// # Errors
    ///
    /// Returns an error when no source step has run.
    pub fn report_issue(&mut self, issue: SourceIssue) -> Result<(), eyre::Report> {
        let source = self.source()?.clone();
        self.issues.retain(|existing| existing.id() != issue.id());
        self.issues.push(issue);
        self.fixture
            .connector(source.kind())
            .set_issues(source.id(), self.issues.clone());
        Ok(())
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> SyncRunWorld {
    SyncRunWorld {
        fixture: SyncFixture::new().expect("fixture adapters"),
        source: None,
        issues: Vec::new(),
        last_result: None,
    }
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
