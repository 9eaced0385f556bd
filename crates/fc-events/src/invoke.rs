//! `InvokeDispatcher(dispatcher_id, event_record_id)` (§4.5.3).

use fc_store::event_dispatcher::{self, DispatchableType};
use fc_store::event_record;
use tracing::info;
use uuid::Uuid;

use crate::error::EventsError;
use crate::ingest::EventsService;
use crate::runs_client::RunsClient;

impl<C: fc_common::Clock> EventsService<C> {
    /// Loads both rows; a disabled dispatcher is a no-op success. Parses
    /// `dispatchable` (`{type, id}`) and delegates to the Runs service
    /// boundary — invocation terminates at that handoff (§1, §4.5.3).
    pub async fn invoke_dispatcher<R: RunsClient + ?Sized>(
        &self,
        dispatcher_id: Uuid,
        event_record_id: Uuid,
        runs: &R,
    ) -> Result<(), EventsError> {
        let dispatcher = event_dispatcher::find_by_id(self.store.pool(), dispatcher_id)
            .await?
            .ok_or_else(|| EventsError::NotFound(format!("event_dispatcher {dispatcher_id}")))?;

        if !dispatcher.enabled {
            info!(%dispatcher_id, "dispatcher disabled, skipping invocation");
            return Ok(());
        }

        let record = event_record::find_by_id(self.store.pool(), event_record_id)
            .await?
            .ok_or_else(|| EventsError::NotFound(format!("event_record {event_record_id}")))?;

        let dispatchable = dispatcher.dispatchable()?;

        let result = match dispatchable.kind {
            DispatchableType::JobVersion => {
                runs.invoke_job_version(dispatchable.id, record.id).await
            }
            DispatchableType::DynamicTrigger => {
                runs.invoke_dynamic_trigger(dispatchable.id, record.id).await
            }
        };

        result.map_err(EventsError::Validation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use fc_common::SystemClock;
    use fc_store::event_dispatcher::{Dispatchable, DispatchableType};
    use serde_json::json;

    struct RecordingRunsClient;

    #[async_trait]
    impl RunsClient for RecordingRunsClient {
        async fn invoke_job_version(&self, _job_version_id: Uuid, _event_record_id: Uuid) -> Result<(), String> {
            Ok(())
        }
        async fn invoke_dynamic_trigger(&self, _dynamic_trigger_id: Uuid, _event_record_id: Uuid) -> Result<(), String> {
            Ok(())
        }
    }

    #[test]
    fn dispatchable_closed_sum_round_trips_job_version() {
        let value = json!({"type": "JOB_VERSION", "id": Uuid::new_v4().to_string()});
        let parsed = Dispatchable::parse(&value).unwrap();
        assert_eq!(parsed.kind, DispatchableType::JobVersion);
    }

    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn _compile_check() {
        assert_send::<EventsService<SystemClock>>();
        let _ = RecordingRunsClient;
    }
}
