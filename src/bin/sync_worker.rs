//! Runs task source syncs requested over standard input.
//!
//! Usage:
//!
//! ```text
//! DATABASE_URL=postgres://... sync_worker < requests.jsonl
//! ```
//!
//! Each input line is a sync request such as
//! `{"taskSourceId": "6f1c...", "provider": "gitlab_issues"}`. Every run
//! result and every evaluation request produced by a run is written to
//! standard output as one JSON line tagged with `type`. Logs go to standard
//! error; set `TRACKSYNC_LOG_FORMAT=json` for structured output and
//! `RUST_LOG` to change the filter.

use std::sync::Arc;

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tracksync::connector::{HttpSettings, adapters::HttpConnectorFactory};
use tracksync::pg::build_pool;
use tracksync::source::adapters::{
    memory::PlaintextCredentialResolver,
    postgres::{PostgresProjectRepository, PostgresTaskSourceRepository},
};
use tracksync::sync::{
    adapters::{
        memory::ChannelEventPublisher,
        postgres::{PostgresSyncStateStore, PostgresWorkLock},
    },
    domain::{DownstreamEvent, SyncConfig, SyncRequest, SyncRunResult},
    services::{SyncOrchestrator, SyncPorts},
};
use tracksync::task::{adapters::postgres::PostgresTaskRepository, services::TaskUpsertService};

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

const POOL_SIZE: u32 = 8;
const EVENT_BUFFER: usize = 256;

/// One line of worker output.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WorkerOutput {
    SyncResult(SyncRunResult),
    Event(DownstreamEvent),
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("TRACKSYNC_LOG_FORMAT").is_ok_and(|format| format == "json");
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    init_tracing();

    let config = SyncConfig::from_env()?;
    let database_url = std::env::var("DATABASE_URL")
        .map_err(|err| format!("DATABASE_URL must be set: {err}"))?;
    let pool = build_pool(&database_url, POOL_SIZE)?;
    let clock = Arc::new(mockable::DefaultClock);

    let (publisher, mut events) = ChannelEventPublisher::channel(EVENT_BUFFER);
    let connectors = HttpConnectorFactory::new(
        &HttpSettings::default(),
        Arc::new(PlaintextCredentialResolver),
    )?;
    let ports = SyncPorts {
        sources: Arc::new(PostgresTaskSourceRepository::new(pool.clone())),
        projects: Arc::new(PostgresProjectRepository::new(pool.clone())),
        connectors: Arc::new(connectors),
        sync_state: Arc::new(PostgresSyncStateStore::new(pool.clone())),
        work_lock: Arc::new(PostgresWorkLock::new(pool.clone(), Arc::clone(&clock))),
        tasks: Arc::new(TaskUpsertService::new(
            Arc::new(PostgresTaskRepository::new(pool)),
            Arc::clone(&clock),
        )),
        events: Arc::new(publisher),
    };
    let orchestrator = SyncOrchestrator::new(ports, clock, config);
    info!(worker_id = %orchestrator.config().worker_id(), "sync worker started");

    let (output_tx, mut output_rx) = mpsc::channel::<WorkerOutput>(EVENT_BUFFER);
    let event_output = output_tx.clone();
    let forwarder = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if event_output.send(WorkerOutput::Event(event)).await.is_err() {
                break;
            }
        }
    });
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(output) = output_rx.recv().await {
            let mut line = serde_json::to_vec(&output)?;
            line.push(b'\n');
            stdout.write_all(&line).await?;
            stdout.flush().await?;
        }
        Ok::<(), BoxError>(())
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let request: SyncRequest = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(err) => {
                warn!(error = %err, "skipping malformed sync request");
                continue;
            }
        };
        let result = orchestrator.run_request(request).await;
        if output_tx.send(WorkerOutput::SyncResult(result)).await.is_err() {
            break;
        }
    }

    // Dropping the orchestrator closes the event channel so the forwarder
    // drains and exits before the writer.
    drop(orchestrator);
    forwarder.await?;
    drop(output_tx);
    writer.await??;
    info!("sync worker stopped");
    Ok(())
}
