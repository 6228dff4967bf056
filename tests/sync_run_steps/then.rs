//! Then steps for sync run BDD scenarios.

use super::world::{SyncRunWorld, run_async};
use rstest_bdd_macros::then;
use tracksync::source::domain::SyncStatus;
use tracksync::sync::domain::SyncErrorKind;
use tracksync::task::{domain::IssueKey, ports::TaskRepository};

#[then(r#"the run status is "{status}""#)]
fn run_status_is(world: &SyncRunWorld, status: String) -> Result<(), eyre::Report> {
    let expected = SyncStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let result = world.last_result()?;
    eyre::ensure!(
        result.status == expected,
        "expected status {expected}, found {} ({:?})",
        result.status,
        result.errors
    );
    Ok(())
}

#[then("the run created {created:u64} and updated {updated:u64} tasks")]
fn run_counts(world: &SyncRunWorld, created: u64, updated: u64) -> Result<(), eyre::Report> {
    let result = world.last_result()?;
    let actual = (
        u64::try_from(result.tasks_created)?,
        u64::try_from(result.tasks_updated)?,
    );
    eyre::ensure!(
        actual == (created, updated),
        "expected created/updated {created}/{updated}, found {}/{}",
        actual.0,
        actual.1
    );
    Ok(())
}

#[then("the run skipped {skipped:u64} issues")]
fn run_skipped(world: &SyncRunWorld, skipped: u64) -> Result<(), eyre::Report> {
    let result = world.last_result()?;
    eyre::ensure!(
        u64::try_from(result.issues_skipped)? == skipped,
        "expected {skipped} skipped issues, found {}",
        result.issues_skipped
    );
    Ok(())
}

#[then("{count:u64} evaluation requests were published")]
fn evaluations_published(world: &SyncRunWorld, count: u64) -> Result<(), eyre::Report> {
    let published = u64::try_from(world.fixture.events.events().len())?;
    eyre::ensure!(
        published == count,
        "expected {count} evaluation requests, found {published}"
    );
    Ok(())
}

#[then(r#"task "{id}" has title "{title}""#)]
fn task_has_title(world: &SyncRunWorld, id: String, title: String) -> Result<(), eyre::Report> {
    let provider = world.source()?.kind().provider();
    let key = IssueKey::from_parts(provider.as_str(), &id)?;
    let task = run_async(world.fixture.tasks.find_by_issue_key(&key))?
        .ok_or_else(|| eyre::eyre!("no task for issue {id}"))?;
    eyre::ensure!(
        task.title() == title,
        "expected title {title:?}, found {:?}",
        task.title()
    );
    Ok(())
}

#[then(r#"the run reported an "{kind}" error for issue "{id}""#)]
fn run_reported_issue_error(
    world: &SyncRunWorld,
    kind: String,
    id: String,
) -> Result<(), eyre::Report> {
    let result = world.last_result()?;
    let found = result.errors.iter().any(|error| {
        error.kind().as_str() == kind
            && error.issue_id().is_some_and(|issue_id| issue_id.as_str() == id)
    });
    eyre::ensure!(found, "no {kind} error for issue {id}: {:?}", result.errors);
    Ok(())
}

#[then(r#"the run reported a "{kind}" error"#)]
fn run_reported_error(world: &SyncRunWorld, kind: String) -> Result<(), eyre::Report> {
    let result = world.last_result()?;
    let count = result
        .errors
        .iter()
        .filter(|error| error.kind().as_str() == kind)
        .count();
    eyre::ensure!(count == 1, "expected one {kind} error, found {:?}", result.errors);
    Ok(())
}
