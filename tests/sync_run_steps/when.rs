//! When steps for sync run BDD scenarios.

use std::time::Duration;

use super::world::{SyncRunWorld, run_async};
use crate::test_helpers::{issue, timestamp};
use rstest_bdd_macros::when;
use tracksync::source::domain::{SourceKind, TaskSourceId};

#[when(r#"worker "{worker}" syncs the source"#)]
fn worker_syncs(world: &mut SyncRunWorld, worker: String) -> Result<(), eyre::Report> {
    let source = world.source()?.clone();
    let orchestrator = world.fixture.orchestrator(&worker)?;
    world.last_result = Some(run_async(orchestrator.run(source.id(), source.kind())));
    Ok(())
}

#[when(r#"worker "{worker}" syncs an unknown source"#)]
fn worker_syncs_unknown(world: &mut SyncRunWorld, worker: String) -> Result<(), eyre::Report> {
    let orchestrator = world.fixture.orchestrator(&worker)?;
    world.last_result = Some(run_async(
        orchestrator.run(TaskSourceId::new(), SourceKind::GitlabIssues),
    ));
    Ok(())
}

#[when(r#"the tracker reports issue "{id}" titled "{title}" updated at "{updated_at}""#)]
fn tracker_changes_issue(
    world: &mut SyncRunWorld,
    id: String,
    title: String,
    updated_at: String,
) -> Result<(), eyre::Report> {
    let kind = world.source()?.kind();
    let fetched = issue(kind, &id, &title, timestamp(&updated_at)?)?;
    world.report_issue(fetched)
}

#[when("{seconds:u64} seconds pass")]
fn time_passes(world: &mut SyncRunWorld, seconds: u64) -> Result<(), eyre::Report> {
    world.fixture.clock.advance(Duration::from_secs(seconds))
}
