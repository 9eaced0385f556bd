//! `IngestSendEvent(env, event, opts) → EventRecord` (§4.5.1).

use chrono::{DateTime, Utc};
use fc_auth::{AuthenticatedEnvironment, EnvironmentType};
use fc_common::Clock;
use serde_json::Value;
use sqlx::Postgres;
use tracing::warn;
use uuid::Uuid;

use fc_store::{event_record, external_account, PgStore};

use crate::error::EventsError;

/// Caller-supplied event fields; `id` and `timestamp` default when absent.
#[derive(Debug, Clone)]
pub struct SendEventRequest {
    pub event_id: Option<String>,
    pub name: String,
    pub source: String,
    pub payload: Value,
    pub context: Value,
    pub timestamp: Option<DateTime<Utc>>,
    pub external_account_identifier: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    pub deliver_at: Option<DateTime<Utc>>,
    pub deliver_after_seconds: Option<i64>,
    pub test: Option<bool>,
}

pub struct EventsService<C: Clock> {
    pub(crate) store: PgStore,
    pub(crate) clock: C,
}

impl<C: Clock> EventsService<C> {
    pub fn new(store: PgStore, clock: C) -> Self {
        Self { store, clock }
    }

    pub async fn ingest_send_event(
        &self,
        env: &AuthenticatedEnvironment,
        req: SendEventRequest,
        opts: IngestOptions,
    ) -> Result<event_record::EventRecord, EventsError> {
        let now = self.clock.now();
        let deliver_at = compute_deliver_at(&opts, now);
        let is_test = compute_is_test(&opts, env, &req.name);

        let external_account = match &req.external_account_identifier {
            Some(identifier) => {
                match external_account::find_by_environment_and_identifier(
                    self.store.pool(),
                    env.environment_id,
                    identifier,
                )
                .await
                {
                    Ok(found) => found,
                    Err(err) => {
                        warn!(error = %err, %identifier, "external account lookup failed, treating as null");
                        None
                    }
                }
            }
            None => None,
        };

        let id = Uuid::new_v4();
        let event_id = req.event_id.unwrap_or_else(|| id.to_string());
        let timestamp = req.timestamp.unwrap_or(now);

        let record = event_record::EventRecord::new(
            id,
            event_id.clone(),
            req.name,
            req.source,
            req.payload,
            req.context,
            env.environment_id,
            env.organization_id,
            env.project_id,
            deliver_at,
            is_test,
            now,
        )
        .with_external_account_id(external_account.map(|a| a.id));
        let mut record = record;
        record.timestamp = timestamp;

        let environment_id = env.environment_id;
        let event_id_for_tx = event_id.clone();

        self.store
            .with_tx(move |tx| {
                Box::pin(async move {
                    insert_with_idempotent_recovery(tx, &record, &event_id_for_tx, environment_id)
                        .await
                })
            })
            .await
            .map_err(EventsError::from)
    }
}

fn compute_deliver_at(opts: &IngestOptions, now: DateTime<Utc>) -> DateTime<Utc> {
    if let Some(deliver_at) = opts.deliver_at {
        return deliver_at;
    }
    if let Some(after_seconds) = opts.deliver_after_seconds {
        return now + chrono::Duration::seconds(after_seconds);
    }
    now
}

/// Ordered predicate chain, first hit wins (§4.5.1).
fn compute_is_test(opts: &IngestOptions, env: &AuthenticatedEnvironment, event_name: &str) -> bool {
    if let Some(explicit) = opts.test {
        return explicit;
    }
    if env.environment_type == EnvironmentType::Development {
        return true;
    }
    if fc_auth::key_classifier::is_dev_tier_key(&env.api_key) {
        return true;
    }
    if event_name.starts_with("test.") {
        return true;
    }
    false
}

/// Insert the record; on a `(event_id, environment_id)` unique
/// violation, fetch and return the existing row instead of failing, and
/// skip the `deliverEvent` enqueue — this is the idempotent-insert path
/// (§4.5.1, §9).
async fn insert_with_idempotent_recovery(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    record: &event_record::EventRecord,
    event_id: &str,
    environment_id: Uuid,
) -> Result<event_record::EventRecord, EventsError> {
    match event_record::insert(&mut **tx, record).await {
        Ok(inserted) => {
            fc_queue::postgres::enqueue_deliver_event_tx(tx, inserted.id, Some(inserted.deliver_at))
                .await?;
            Ok(inserted)
        }
        Err(fc_store::StoreError::Conflict(_)) => {
            let existing = event_record::find_by_event_id_and_environment(
                &mut **tx,
                event_id,
                environment_id,
            )
            .await?
            .ok_or_else(|| {
                EventsError::NotFound(format!(
                    "event_id={event_id} environment_id={environment_id} vanished after conflict"
                ))
            })?;
            Ok(existing)
        }
        Err(other) => Err(EventsError::Store(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deliver_at_defaults_to_now() {
        let now = Utc::now();
        let deliver_at = compute_deliver_at(&IngestOptions::default(), now);
        assert_eq!(deliver_at, now);
    }

    #[test]
    fn deliver_after_seconds_offsets_now() {
        let now = Utc::now();
        let opts = IngestOptions {
            deliver_after_seconds: Some(60),
            ..Default::default()
        };
        assert_eq!(compute_deliver_at(&opts, now), now + chrono::Duration::seconds(60));
    }

    fn sample_env(env_type: EnvironmentType, api_key: &str) -> AuthenticatedEnvironment {
        AuthenticatedEnvironment {
            environment_id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            environment_slug: "env".to_string(),
            api_key: api_key.to_string(),
            environment_type: env_type,
            project_slug: "proj".to_string(),
            project_name: "Project".to_string(),
            org_slug: "org".to_string(),
            org_title: "Org".to_string(),
        }
    }

    #[test]
    fn explicit_test_flag_wins_over_everything() {
        let env = sample_env(EnvironmentType::Production, "tr_live_ABCDEFGH");
        let opts = IngestOptions { test: Some(false), ..Default::default() };
        assert!(!compute_is_test(&opts, &env, "test.foo"));
    }

    #[test]
    fn development_environment_is_always_test() {
        let env = sample_env(EnvironmentType::Development, "tr_live_ABCDEFGH");
        assert!(compute_is_test(&IngestOptions::default(), &env, "order.placed"));
    }

    #[test]
    fn dev_tier_api_key_is_test() {
        let env = sample_env(EnvironmentType::Production, "tr_dev_ABCDEFGH");
        assert!(compute_is_test(&IngestOptions::default(), &env, "order.placed"));
    }

    #[test]
    fn event_name_prefixed_test_dot_is_test() {
        let env = sample_env(EnvironmentType::Production, "tr_live_ABCDEFGH");
        assert!(compute_is_test(&IngestOptions::default(), &env, "test.foo"));
    }

    #[test]
    fn event_named_exactly_test_is_not_a_test_event() {
        let env = sample_env(EnvironmentType::Production, "tr_live_ABCDEFGH");
        assert!(!compute_is_test(&IngestOptions::default(), &env, "test"));
    }

    #[test]
    fn production_live_key_is_not_test() {
        let env = sample_env(EnvironmentType::Production, "tr_live_ABCDEFGH");
        assert!(!compute_is_test(&IngestOptions::default(), &env, "order.placed"));
    }
}
