//! Logging stand-in for the Runs service boundary (§1: the execution
//! service itself is out of scope — only the hand-off is implemented).

use async_trait::async_trait;
use fc_events::RunsClient;
use tracing::info;
use uuid::Uuid;

pub struct LoggingRunsClient;

#[async_trait]
impl RunsClient for LoggingRunsClient {
    async fn invoke_job_version(
        &self,
        job_version_id: Uuid,
        event_record_id: Uuid,
    ) -> Result<(), String> {
        info!(%job_version_id, %event_record_id, "invoking job version (mock runs client)");
        Ok(())
    }

    async fn invoke_dynamic_trigger(
        &self,
        dynamic_trigger_id: Uuid,
        event_record_id: Uuid,
    ) -> Result<(), String> {
        info!(%dynamic_trigger_id, %event_record_id, "invoking dynamic trigger (mock runs client)");
        Ok(())
    }
}
