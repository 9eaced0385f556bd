//! Work Queue Adapter (§4.4)
//!
//! Two roles: a transactional enqueue surface the `Events`/`Jobs`
//! orchestrators call from inside an open `sqlx::Transaction` (so the
//! enqueue commits atomically with whatever row it describes), and a
//! standalone poll/ack/nack consumer surface an external worker uses to
//! drain the table. Only this crate writes to the queue tables — no
//! direct SQL from services (§4.4).

pub mod error;
pub mod job;
pub mod postgres;
pub mod sqlite;

pub use error::QueueError;
pub use job::{
    DeliverEventPayload, InvokeDispatcherPayload, QueuedJob, JOB_NAME_DELIVER_EVENT,
    JOB_NAME_INVOKE_DISPATCHER,
};

use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, QueueError>;

#[derive(Debug, Clone, Default)]
pub struct QueueMetrics {
    pub pending_jobs: u64,
    pub in_flight_jobs: u64,
    pub total_polled: u64,
    pub total_acked: u64,
    pub total_nacked: u64,
}

/// Consumer-side surface for the external worker (§1: "the worker pool
/// that actually executes enqueued jobs" is out of scope; this is the
/// boundary it polls).
#[async_trait]
pub trait QueueConsumer: Send + Sync {
    async fn poll(&self, max_jobs: u32) -> Result<Vec<QueuedJob>>;
    async fn ack(&self, receipt_handle: &str) -> Result<()>;
    async fn nack(&self, receipt_handle: &str, delay_seconds: Option<u32>) -> Result<()>;
    async fn metrics(&self) -> Result<QueueMetrics>;
}
