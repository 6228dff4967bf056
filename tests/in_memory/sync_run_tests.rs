//! In-memory integration tests for complete sync runs.

use crate::test_helpers::{SyncFixture, issue, timestamp};
use rstest::rstest;
use tracksync::source::{
    domain::{SourceKind, SyncStatus},
    ports::ProjectRepository,
};
use tracksync::task::{domain::TaskStatus, ports::TaskRepository};

#[rstest]
#[case::gitlab(SourceKind::GitlabIssues)]
#[case::github(SourceKind::GithubIssues)]
#[case::jira(SourceKind::Jira)]
#[tokio::test(flavor = "multi_thread")]
async fn incremental_runs_touch_only_changed_issues(
    #[case] kind: SourceKind,
) -> Result<(), eyre::Report> {
    let fixture = SyncFixture::new()?;
    let source = fixture.add_source(kind).await?;
    let orchestrator = fixture.orchestrator("worker-a")?;
    let first_seen = timestamp("2024-01-01T00:00:00Z")?;
    fixture.connector(kind).set_issues(
        source.id(),
        vec![
            issue(kind, "42", "Fix login", first_seen)?,
            issue(kind, "43", "Tidy docs", first_seen)?,
        ],
    );

    let first = orchestrator.run(source.id(), kind).await;
    eyre::ensure!(first.status == SyncStatus::Completed, "first run: {first:?}");
    eyre::ensure!(first.tasks_created == 2, "expected 2 creations: {first:?}");

    fixture.connector(kind).set_issues(
        source.id(),
        vec![
            issue(kind, "42", "Fix login on Safari", timestamp("2024-01-02T00:00:00Z")?)?,
            issue(kind, "43", "Tidy docs", first_seen)?,
        ],
    );
    let second = orchestrator.run(source.id(), kind).await;
    assert_eq!((second.tasks_created, second.tasks_updated), (0, 1));
    assert!(second.errors.is_empty());

    let third = orchestrator.run(source.id(), kind).await;
    assert_eq!((third.tasks_created, third.tasks_updated), (0, 0));
    assert_eq!(third.issues_skipped, 2);
    assert!(third.errors.is_empty());

    let tasks = fixture.tasks.list_by_source(source.id()).await?;
    assert_eq!(tasks.len(), 2);
    assert!(tasks.iter().all(|task| task.status() == TaskStatus::Pending));
    assert_eq!(fixture.events.events().len(), 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sources_keep_separate_sync_state() -> Result<(), eyre::Report> {
    let fixture = SyncFixture::new()?;
    let gitlab = fixture.add_source(SourceKind::GitlabIssues).await?;
    let github = fixture.add_source(SourceKind::GithubIssues).await?;
    let orchestrator = fixture.orchestrator("worker-a")?;
    let at = timestamp("2024-01-01T00:00:00Z")?;
    fixture.gitlab.set_issues(
        gitlab.id(),
        vec![issue(SourceKind::GitlabIssues, "7", "GitLab seven", at)?],
    );
    fixture.github.set_issues(
        github.id(),
        vec![issue(SourceKind::GithubIssues, "7", "GitHub seven", at)?],
    );

    let gitlab_run = orchestrator.run(gitlab.id(), SourceKind::GitlabIssues).await;
    let github_run = orchestrator.run(github.id(), SourceKind::GithubIssues).await;

    assert_eq!(gitlab_run.tasks_created, 1);
    assert_eq!(github_run.tasks_created, 1);
    assert_eq!(fixture.tasks.len()?, 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn overlapping_workers_create_every_task_exactly_once() -> Result<(), eyre::Report> {
    let fixture = SyncFixture::new()?;
    let source = fixture.add_source(SourceKind::GitlabIssues).await?;
    let at = timestamp("2024-01-01T00:00:00Z")?;
    let issues = (1..=6)
        .map(|number| issue(SourceKind::GitlabIssues, &number.to_string(), "Overlap", at))
        .collect::<Result<Vec<_>, _>>()?;
    fixture.gitlab.set_issues(source.id(), issues);

    let mut handles = Vec::new();
    for worker in ["worker-a", "worker-b", "worker-c", "worker-d"] {
        let orchestrator = fixture.orchestrator(worker)?;
        let source_id = source.id();
        handles.push(tokio::spawn(async move {
            orchestrator.run(source_id, SourceKind::GitlabIssues).await
        }));
    }

    let mut created = 0;
    for handle in handles {
        let result = handle.await?;
        eyre::ensure!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
        created += result.tasks_created;
    }
    assert_eq!(created, 6);
    assert_eq!(fixture.tasks.len()?, 6);
    assert_eq!(fixture.events.events().len(), 6);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn disabled_project_fails_every_source() -> Result<(), eyre::Report> {
    let fixture = SyncFixture::new()?;
    let source = fixture.add_source(SourceKind::Jira).await?;
    let mut project = fixture.project.clone();
    project.disable();
    fixture.projects.update(&project).await?;

    let result = fixture
        .orchestrator("worker-a")?
        .run(source.id(), SourceKind::Jira)
        .await;

    assert_eq!(result.status, SyncStatus::Failed);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(fixture.jira.fetch_count(), 0);
    Ok(())
}
