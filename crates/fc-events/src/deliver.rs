//! `DeliverEvent(event_record_id)` (§4.5.2).

use chrono::Utc;
use fc_matcher::matches as filter_matches;
use fc_store::{event_dispatcher, event_record};
use tracing::{error, info};
use uuid::Uuid;

use crate::error::EventsError;
use crate::ingest::EventsService;

impl<C: fc_common::Clock> EventsService<C> {
    /// In one transaction: load the record, evaluate dispatchers in
    /// `created_at ASC` order, enqueue one `invokeDispatcher` job per
    /// match, then mark the record delivered.
    ///
    /// Safe to re-run: a conditional `UPDATE ... WHERE delivered_at IS
    /// NULL` means a concurrent/retried run that loses the race skips
    /// the enqueue loop entirely rather than double-dispatching (§5, §8).
    pub async fn deliver_event(&self, event_record_id: Uuid) -> Result<(), EventsError> {
        self.store
            .with_tx(move |tx| {
                Box::pin(async move {
                    let record = event_record::find_by_id(&mut **tx, event_record_id)
                        .await?
                        .ok_or_else(|| {
                            EventsError::NotFound(format!("event_record {event_record_id}"))
                        })?;

                    let won_race =
                        event_record::mark_delivered_if_pending(&mut **tx, record.id, Utc::now())
                            .await?;
                    if !won_race {
                        info!(event_record_id = %record.id, "already delivered, skipping dispatch");
                        return Ok(());
                    }

                    let candidates = event_dispatcher::find_automatic_candidates(
                        &mut **tx,
                        record.environment_id,
                        &record.name,
                        &record.source,
                    )
                    .await?;

                    for dispatcher in candidates {
                        // `payload_filter`/`context_filter` are each leaf
                        // filter trees, not pre-wrapped with their root
                        // key — combine them into the shape
                        // `fc_matcher::matches` expects before evaluating
                        // (§4.3: "top-level filter is applied with keys
                        // payload and context as roots").
                        let combined_filter = serde_json::json!({
                            "payload": dispatcher.payload_filter,
                            "context": dispatcher.context_filter,
                        });
                        if !filter_matches(&record.payload, &record.context, &combined_filter) {
                            continue;
                        }

                        if let Err(err) = fc_queue::postgres::enqueue_invoke_dispatcher_tx(
                            tx,
                            dispatcher.id,
                            record.id,
                        )
                        .await
                        {
                            // A failure to enqueue one dispatcher must not
                            // abort delivery to the rest (§4.5.2, §7).
                            error!(
                                error = %err,
                                dispatcher_id = %dispatcher.id,
                                event_record_id = %record.id,
                                "failed to enqueue invokeDispatcher, skipping this dispatcher"
                            );
                        }
                    }

                    Ok(())
                })
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use fc_matcher::matches;
    use serde_json::json;

    #[test]
    fn empty_filters_match_unconditionally() {
        assert!(matches(&json!({"any": "thing"}), &json!({}), &json!({})));
    }

    #[test]
    fn payload_filter_applies_against_payload_root_only() {
        let filter = json!({"payload": {"status": ["paid"]}});
        assert!(matches(&json!({"status": "paid"}), &json!({}), &filter));
        assert!(!matches(&json!({"status": "pending"}), &json!({}), &filter));
    }
}
