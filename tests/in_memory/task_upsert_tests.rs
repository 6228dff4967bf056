//! In-memory integration tests for task upserts per provider.

use std::sync::Arc;

use crate::test_helpers::{ManualClock, issue, timestamp};
use rstest::{fixture, rstest};
use tracksync::source::domain::{ProjectId, SourceKind, TaskSourceId};
use tracksync::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{IssueNumber, UpsertOutcome},
    services::{TaskUpsertService, TaskUpserter},
};

type TestService = TaskUpsertService<InMemoryTaskRepository, ManualClock>;

#[fixture]
fn service() -> TestService {
    let start = timestamp("2024-01-10T00:00:00Z").expect("valid timestamp");
    TaskUpsertService::new(
        Arc::new(InMemoryTaskRepository::new()),
        Arc::new(ManualClock::at(start)),
    )
}

#[rstest]
#[case::gitlab(SourceKind::GitlabIssues, Some(17))]
#[case::github(SourceKind::GithubIssues, Some(17))]
#[case::jira(SourceKind::Jira, None)]
#[tokio::test(flavor = "multi_thread")]
async fn stored_sub_record_matches_fetched_issue(
    service: TestService,
    #[case] kind: SourceKind,
    #[case] expected_iid: Option<u64>,
) -> Result<(), eyre::Report> {
    let fetched = issue(kind, "17", "Fix login", timestamp("2024-01-01T00:00:00Z")?)?;

    let upserted = service
        .upsert(TaskSourceId::new(), ProjectId::new(), &fetched)
        .await?;
    let stored = service
        .find_by_issue_key(&fetched.issue_key())
        .await?
        .ok_or_else(|| eyre::eyre!("task not stored"))?;

    assert_eq!(upserted.outcome, UpsertOutcome::Created);
    assert_eq!(stored, upserted.task);
    let fields = stored.source_issue().fields();
    assert_eq!(fields.id, *fetched.id());
    assert_eq!(fields.title, "Fix login");
    assert_eq!(fields.updated_at, fetched.updated_at());
    assert_eq!(fields.iid, expected_iid.map(IssueNumber::new).transpose()?);
    assert_eq!(stored.source_issue().provider(), kind.provider());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repeated_upsert_of_same_snapshot_is_unchanged(
    service: TestService,
) -> Result<(), eyre::Report> {
    let fetched = issue(
        SourceKind::GithubIssues,
        "5",
        "Flaky test",
        timestamp("2024-01-01T00:00:00Z")?,
    )?;
    let source_id = TaskSourceId::new();
    let project_id = ProjectId::new();

    let first = service.upsert(source_id, project_id, &fetched).await?;
    let second = service.upsert(source_id, project_id, &fetched).await?;

    assert!(first.was_created());
    assert_eq!(second.outcome, UpsertOutcome::Unchanged);
    assert_eq!(second.task.id(), first.task.id());
    Ok(())
}
