//! Polls the durable queue and drives `DeliverEvent` / `InvokeDispatcher`
//! — the "external worker" §1 names as out of scope for execution, but
//! whose consumption of enqueued jobs the testable properties (§8)
//! require to actually happen. Shaped after the teacher's
//! `bin/fc-scheduler-server` poll loop, minus its HTTP surface.

mod runs_client;

use std::sync::Arc;
use std::time::Duration;

use fc_common::SystemClock;
use fc_config::ConfigLoader;
use fc_events::EventsService;
use fc_queue::job::{DeliverEventPayload, InvokeDispatcherPayload};
use fc_queue::postgres::PgJobQueue;
use fc_queue::{QueueConsumer, JOB_NAME_DELIVER_EVENT, JOB_NAME_INVOKE_DISPATCHER};
use fc_store::PgStore;
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info, warn};

use crate::runs_client::LoggingRunsClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fc_common::logging::init_logging("fc-worker");

    let config = ConfigLoader::new().load()?;
    info!(
        poll_interval_ms = config.queue.poll_interval_ms,
        batch_size = config.queue.batch_size,
        "configuration loaded"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.postgres.max_connections)
        .connect(&config.postgres.url)
        .await?;
    sqlx::migrate!("../../crates/fc-store/migrations").run(&pool).await?;

    let store = PgStore::new(pool.clone());
    let events = Arc::new(EventsService::new(store, SystemClock));
    let queue = PgJobQueue::new(pool, config.queue.visibility_timeout_seconds);
    let runs = LoggingRunsClient;

    info!("fc-worker polling started");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
            _ = poll_once(&queue, &events, &runs, config.queue.batch_size) => {}
        }
        tokio::time::sleep(Duration::from_millis(config.queue.poll_interval_ms)).await;
    }

    info!("fc-worker stopped");
    Ok(())
}

async fn poll_once(
    queue: &PgJobQueue,
    events: &EventsService<SystemClock>,
    runs: &LoggingRunsClient,
    batch_size: u32,
) {
    let jobs = match queue.poll(batch_size).await {
        Ok(jobs) => jobs,
        Err(err) => {
            error!(error = %err, "failed to poll queue");
            return;
        }
    };

    for job in jobs {
        let result = match job.job_name.as_str() {
            JOB_NAME_DELIVER_EVENT => {
                match serde_json::from_value::<DeliverEventPayload>(job.payload.clone()) {
                    Ok(payload) => events.deliver_event(payload.id).await.map_err(|e| e.to_string()),
                    Err(err) => Err(format!("malformed deliverEvent payload: {err}")),
                }
            }
            JOB_NAME_INVOKE_DISPATCHER => {
                match serde_json::from_value::<InvokeDispatcherPayload>(job.payload.clone()) {
                    Ok(payload) => events
                        .invoke_dispatcher(payload.dispatcher_id, payload.event_record_id, runs)
                        .await
                        .map_err(|e| e.to_string()),
                    Err(err) => Err(format!("malformed invokeDispatcher payload: {err}")),
                }
            }
            other => Err(format!("unrecognized job name: {other}")),
        };

        match result {
            Ok(()) => {
                if let Err(err) = queue.ack(&job.receipt_handle).await {
                    error!(error = %err, job_id = %job.id, "failed to ack completed job");
                }
            }
            Err(err) => {
                warn!(error = %err, job_id = %job.id, job_name = %job.job_name, "job failed, nacking for retry");
                if let Err(err) = queue.nack(&job.receipt_handle, Some(30)).await {
                    error!(error = %err, job_id = %job.id, "failed to nack failed job");
                }
            }
        }
    }
}
