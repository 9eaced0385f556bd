//! The two opaque job names the queue protocol carries (§6).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload for the `deliverEvent` job: `{id}` (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliverEventPayload {
    pub id: Uuid,
}

/// Payload for the `events.invokeDispatcher` job: `{dispatcherId, eventRecordId}` (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeDispatcherPayload {
    pub dispatcher_id: Uuid,
    pub event_record_id: Uuid,
}

pub const JOB_NAME_DELIVER_EVENT: &str = "deliverEvent";
pub const JOB_NAME_INVOKE_DISPATCHER: &str = "events.invokeDispatcher";

/// A job as handed back to a consumer: opaque name plus the receipt
/// handle needed to ack/nack it.
#[derive(Debug, Clone)]
pub struct QueuedJob {
    pub id: Uuid,
    pub job_name: String,
    pub payload: serde_json::Value,
    pub receipt_handle: String,
    pub run_at: DateTime<Utc>,
}
