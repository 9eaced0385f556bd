//! SQLite-backed queue for local development and tests without Postgres.
//! Same table shape and polling strategy as [`crate::postgres`], adapted
//! to SQLite's integer-epoch timestamps, mirroring the teacher's
//! `SqliteQueue` dev-mode pattern.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::job::{
    DeliverEventPayload, InvokeDispatcherPayload, QueuedJob, JOB_NAME_DELIVER_EVENT,
    JOB_NAME_INVOKE_DISPATCHER,
};
use crate::{QueueConsumer, QueueError, QueueMetrics, Result};

pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS queued_jobs (
            id TEXT PRIMARY KEY,
            job_name TEXT NOT NULL,
            payload TEXT NOT NULL,
            run_at INTEGER NOT NULL,
            locked_until INTEGER,
            receipt_handle TEXT,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_queued_jobs_run_at ON queued_jobs (run_at)")
        .execute(pool)
        .await?;

    Ok(())
}

pub struct SqliteJobQueue {
    pool: SqlitePool,
    visibility_timeout_seconds: i64,
}

impl SqliteJobQueue {
    pub fn new(pool: SqlitePool, visibility_timeout_seconds: u32) -> Self {
        Self {
            pool,
            visibility_timeout_seconds: visibility_timeout_seconds as i64,
        }
    }

    pub async fn enqueue_deliver_event(
        &self,
        event_id: Uuid,
        deliver_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let run_at = deliver_at.unwrap_or_else(Utc::now).timestamp();
        let payload = serde_json::to_string(&DeliverEventPayload { id: event_id })?;
        let now = Utc::now().timestamp();

        sqlx::query(
            "INSERT INTO queued_jobs (id, job_name, payload, run_at, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(JOB_NAME_DELIVER_EVENT)
        .bind(payload)
        .bind(run_at)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn enqueue_invoke_dispatcher(
        &self,
        dispatcher_id: Uuid,
        event_record_id: Uuid,
    ) -> Result<()> {
        let payload = serde_json::to_string(&InvokeDispatcherPayload {
            dispatcher_id,
            event_record_id,
        })?;
        let now = Utc::now().timestamp();

        sqlx::query(
            "INSERT INTO queued_jobs (id, job_name, payload, run_at, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(JOB_NAME_INVOKE_DISPATCHER)
        .bind(payload)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl QueueConsumer for SqliteJobQueue {
    async fn poll(&self, max_jobs: u32) -> Result<Vec<QueuedJob>> {
        let now = Utc::now().timestamp();
        let new_visible_at = now + self.visibility_timeout_seconds;

        let rows = sqlx::query(
            r#"
            SELECT id, job_name, payload, run_at
            FROM queued_jobs
            WHERE run_at <= ? AND (locked_until IS NULL OR locked_until < ?)
            ORDER BY run_at ASC
            LIMIT ?
            "#,
        )
        .bind(now)
        .bind(now)
        .bind(max_jobs as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut jobs = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.get("id");
            let job_name: String = row.get("job_name");
            let payload_str: String = row.get("payload");
            let run_at_ts: i64 = row.get("run_at");
            let receipt_handle = Uuid::new_v4().to_string();

            let updated = sqlx::query(
                "UPDATE queued_jobs SET receipt_handle = ?, locked_until = ? WHERE id = ? AND (locked_until IS NULL OR locked_until < ?)",
            )
            .bind(&receipt_handle)
            .bind(new_visible_at)
            .bind(&id)
            .bind(now)
            .execute(&self.pool)
            .await?;

            if updated.rows_affected() == 0 {
                continue;
            }

            jobs.push(QueuedJob {
                id: Uuid::parse_str(&id).map_err(|e| QueueError::Database(e.to_string()))?,
                job_name,
                payload: serde_json::from_str(&payload_str)?,
                receipt_handle,
                run_at: DateTime::from_timestamp(run_at_ts, 0).unwrap_or_else(Utc::now),
            });
        }

        Ok(jobs)
    }

    async fn ack(&self, receipt_handle: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM queued_jobs WHERE receipt_handle = ?")
            .bind(receipt_handle)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(QueueError::NotFound(receipt_handle.to_string()));
        }
        Ok(())
    }

    async fn nack(&self, receipt_handle: &str, delay_seconds: Option<u32>) -> Result<()> {
        let run_at = Utc::now().timestamp() + delay_seconds.unwrap_or(0) as i64;
        sqlx::query(
            "UPDATE queued_jobs SET run_at = ?, locked_until = NULL, receipt_handle = NULL WHERE receipt_handle = ?",
        )
        .bind(run_at)
        .bind(receipt_handle)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn metrics(&self) -> Result<QueueMetrics> {
        let now = Utc::now().timestamp();
        let pending: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM queued_jobs WHERE locked_until IS NULL OR locked_until < ?",
        )
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        let in_flight: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM queued_jobs WHERE locked_until IS NOT NULL AND locked_until >= ?",
        )
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(QueueMetrics {
            pending_jobs: pending.0 as u64,
            in_flight_jobs: in_flight.0 as u64,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .unwrap();
        init_schema(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn enqueued_job_is_polled_and_acked() {
        let pool = test_pool().await;
        let queue = SqliteJobQueue::new(pool, 30);
        let event_id = Uuid::new_v4();
        queue.enqueue_deliver_event(event_id, None).await.unwrap();

        let jobs = queue.poll(10).await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].job_name, JOB_NAME_DELIVER_EVENT);

        queue.ack(&jobs[0].receipt_handle).await.unwrap();
        let remaining = queue.poll(10).await.unwrap();
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn polled_job_is_invisible_until_nacked() {
        let pool = test_pool().await;
        let queue = SqliteJobQueue::new(pool, 30);
        queue
            .enqueue_invoke_dispatcher(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap();

        let first_poll = queue.poll(10).await.unwrap();
        assert_eq!(first_poll.len(), 1);

        let second_poll = queue.poll(10).await.unwrap();
        assert!(second_poll.is_empty());

        queue.nack(&first_poll[0].receipt_handle, Some(0)).await.unwrap();
        let after_nack = queue.poll(10).await.unwrap();
        assert_eq!(after_nack.len(), 1);
    }
}
