//! Boundary to the Run/Endpoint execution service.
//!
//! Out of scope per §1: "`JOB_VERSION` and `DYNAMIC_TRIGGER` invocation
//! terminates at an enqueue call into the Runs service." This trait is
//! that enqueue call; implementations live outside this crate.

use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait RunsClient: Send + Sync {
    /// Hand off to the Runs service for a specific job version.
    async fn invoke_job_version(
        &self,
        job_version_id: Uuid,
        event_record_id: Uuid,
    ) -> Result<(), String>;

    /// Hand off to the Runs service for a dynamic-trigger expansion,
    /// which later fans out to multiple job versions on its own.
    async fn invoke_dynamic_trigger(
        &self,
        dynamic_trigger_id: Uuid,
        event_record_id: Uuid,
    ) -> Result<(), String>;
}
