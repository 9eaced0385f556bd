//! Postgres-backed queue: transactional enqueue plus a `FOR UPDATE SKIP
//! LOCKED` polling consumer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::job::{
    DeliverEventPayload, InvokeDispatcherPayload, QueuedJob, JOB_NAME_DELIVER_EVENT,
    JOB_NAME_INVOKE_DISPATCHER,
};
use crate::{QueueConsumer, QueueError, QueueMetrics, Result};

/// `EnqueueDeliverEventTx(tx, {event_id, deliver_at?})` (§4.4).
/// `deliver_at` absent means eligible immediately.
pub async fn enqueue_deliver_event_tx(
    tx: &mut Transaction<'_, Postgres>,
    event_id: Uuid,
    deliver_at: Option<DateTime<Utc>>,
) -> Result<()> {
    let run_at = deliver_at.unwrap_or_else(Utc::now);
    let payload = serde_json::to_value(DeliverEventPayload { id: event_id })?;

    sqlx::query(
        "INSERT INTO queued_jobs (id, job_name, payload, run_at, created_at) VALUES ($1, $2, $3, $4, $4)",
    )
    .bind(Uuid::new_v4())
    .bind(JOB_NAME_DELIVER_EVENT)
    .bind(payload)
    .bind(run_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// `EnqueueInvokeDispatcherTx(tx, {dispatcher_id, event_record_id})` (§4.4).
pub async fn enqueue_invoke_dispatcher_tx(
    tx: &mut Transaction<'_, Postgres>,
    dispatcher_id: Uuid,
    event_record_id: Uuid,
) -> Result<()> {
    let payload = serde_json::to_value(InvokeDispatcherPayload {
        dispatcher_id,
        event_record_id,
    })?;
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO queued_jobs (id, job_name, payload, run_at, created_at) VALUES ($1, $2, $3, $4, $4)",
    )
    .bind(Uuid::new_v4())
    .bind(JOB_NAME_INVOKE_DISPATCHER)
    .bind(payload)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

pub struct PgJobQueue {
    pool: PgPool,
    visibility_timeout_seconds: i64,
}

impl PgJobQueue {
    pub fn new(pool: PgPool, visibility_timeout_seconds: u32) -> Self {
        Self {
            pool,
            visibility_timeout_seconds: visibility_timeout_seconds as i64,
        }
    }
}

#[async_trait]
impl QueueConsumer for PgJobQueue {
    async fn poll(&self, max_jobs: u32) -> Result<Vec<QueuedJob>> {
        let now = Utc::now();
        let new_visible_at = now + chrono::Duration::seconds(self.visibility_timeout_seconds);

        let mut tx = self.pool.begin().await?;

        let rows: Vec<(Uuid, String, serde_json::Value, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT id, job_name, payload, run_at
            FROM queued_jobs
            WHERE run_at <= $1 AND (locked_until IS NULL OR locked_until < $1)
            ORDER BY run_at ASC
            LIMIT $2
            FOR UPDATE SKIP LOCKED
            "#,
        )
        .bind(now)
        .bind(max_jobs as i64)
        .fetch_all(&mut *tx)
        .await?;

        let mut jobs = Vec::with_capacity(rows.len());
        for (id, job_name, payload, run_at) in rows {
            let receipt_handle = Uuid::new_v4().to_string();
            sqlx::query(
                "UPDATE queued_jobs SET receipt_handle = $1, locked_until = $2 WHERE id = $3",
            )
            .bind(&receipt_handle)
            .bind(new_visible_at)
            .bind(id)
            .execute(&mut *tx)
            .await?;

            jobs.push(QueuedJob {
                id,
                job_name,
                payload,
                receipt_handle,
                run_at,
            });
        }

        tx.commit().await?;
        Ok(jobs)
    }

    async fn ack(&self, receipt_handle: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM queued_jobs WHERE receipt_handle = $1")
            .bind(receipt_handle)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(QueueError::NotFound(receipt_handle.to_string()));
        }
        Ok(())
    }

    async fn nack(&self, receipt_handle: &str, delay_seconds: Option<u32>) -> Result<()> {
        let run_at = Utc::now() + chrono::Duration::seconds(delay_seconds.unwrap_or(0) as i64);
        sqlx::query(
            "UPDATE queued_jobs SET run_at = $1, locked_until = NULL, receipt_handle = NULL WHERE receipt_handle = $2",
        )
        .bind(run_at)
        .bind(receipt_handle)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn metrics(&self) -> Result<QueueMetrics> {
        let pending: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM queued_jobs WHERE locked_until IS NULL OR locked_until < now()",
        )
        .fetch_one(&self.pool)
        .await?;
        let in_flight: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM queued_jobs WHERE locked_until IS NOT NULL AND locked_until >= now()",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(QueueMetrics {
            pending_jobs: pending.0 as u64,
            in_flight_jobs: in_flight.0 as u64,
            ..Default::default()
        })
    }
}
