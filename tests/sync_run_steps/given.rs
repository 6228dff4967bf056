//! Given steps for sync run BDD scenarios.

use std::time::Duration;

use super::world::{SyncRunWorld, run_async};
use crate::test_helpers::{issue, timestamp};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use tracksync::source::domain::SourceKind;
use tracksync::sync::{
    domain::{HolderId, LockKey},
    ports::WorkLock,
};

#[given(r#"a "{kind}" task source"#)]
fn task_source(world: &mut SyncRunWorld, kind: String) -> Result<(), eyre::Report> {
    let source_kind = SourceKind::try_from(kind.as_str())
        .map_err(|err| eyre::eyre!("invalid source kind in scenario: {err}"))?;
    let source = run_async(world.fixture.add_source(source_kind)).wrap_err("add task source")?;
    world.source = Some(source);
    Ok(())
}

#[given(r#"the tracker reports issue "{id}" titled "{title}" updated at "{updated_at}""#)]
fn tracker_reports_issue(
    world: &mut SyncRunWorld,
    id: String,
    title: String,
    updated_at: String,
) -> Result<(), eyre::Report> {
    let kind = world.source()?.kind();
    let fetched = issue(kind, &id, &title, timestamp(&updated_at)?)?;
    world.report_issue(fetched)
}

#[given(r#"the tracker reports issue "{id}" with a blank title updated at "{updated_at}""#)]
fn tracker_reports_blank_issue(
    world: &mut SyncRunWorld,
    id: String,
    updated_at: String,
) -> Result<(), eyre::Report> {
    let kind = world.source()?.kind();
    let fetched = issue(kind, &id, "   ", timestamp(&updated_at)?)?;
    world.report_issue(fetched)
}

#[given(r#"worker "{worker}" has synced the source"#)]
fn worker_has_synced(world: &mut SyncRunWorld, worker: String) -> Result<(), eyre::Report> {
    let source = world.source()?.clone();
    let orchestrator = world.fixture.orchestrator(&worker)?;
    let result = run_async(orchestrator.run(source.id(), source.kind()));
    eyre::ensure!(result.errors.is_empty(), "setup run failed: {result:?}");
    world.last_result = Some(result);
    Ok(())
}

#[given(r#"worker "{worker}" holds the lock for issue "{id}""#)]
fn worker_holds_lock(world: &mut SyncRunWorld, worker: String, id: String) -> Result<(), eyre::Report> {
    let claimed = world
        .issues
        .iter()
        .find(|reported| reported.id().as_str() == id)
        .ok_or_else(|| eyre::eyre!("issue {id} has not been reported"))?;
    let key = LockKey::for_issue(&claimed.issue_key());
    let holder = HolderId::new(worker)?;
    let acquired = run_async(
        world
            .fixture
            .work_lock
            .try_acquire(&key, &holder, Duration::from_secs(30)),
    )?;
    eyre::ensure!(acquired, "lock for issue {id} was already held");
    Ok(())
}
