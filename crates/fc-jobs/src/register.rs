//! `RegisterJob(endpoint_id, req)` (§4.6.1).

use chrono::Utc;
use fc_auth::AuthenticatedEnvironment;
use fc_store::{event_example, job, job_alias, job_queue, job_version, PgStore};
use serde_json::Value;
use uuid::Uuid;

use crate::error::JobsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerType {
    Static,
    Scheduled,
}

impl TriggerType {
    fn parse(value: &str) -> Result<Self, JobsError> {
        match value {
            "static" => Ok(Self::Static),
            "scheduled" => Ok(Self::Scheduled),
            other => Err(JobsError::Validation(format!(
                "trigger.type must be 'static' or 'scheduled', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TriggerSpec {
    pub trigger_type: String,
    pub rule: Option<Value>,
    pub schedule: Option<Value>,
    pub properties: Value,
}

#[derive(Debug, Clone)]
pub struct EventSpec {
    pub name: String,
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct QueueSpec {
    pub name: Option<String>,
    pub max_concurrent: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct RegisterJobRequest {
    pub id: String,
    pub name: String,
    pub version: String,
    pub internal: bool,
    pub event: EventSpec,
    pub trigger: TriggerSpec,
    pub queue: Option<QueueSpec>,
    pub start_position: Option<String>,
    pub preprocess_runs: bool,
    pub examples: Vec<event_example::EventExampleInput>,
}

#[derive(Debug, Clone)]
pub struct RegisterJobResult {
    pub job: job::Job,
    pub job_version: job_version::JobVersion,
    pub job_queue: job_queue::JobQueue,
    pub latest_alias_updated: bool,
}

/// Synchronous validation, run before any write (§4.6.1).
fn validate(req: &RegisterJobRequest) -> Result<TriggerType, JobsError> {
    if req.id.trim().is_empty() {
        return Err(JobsError::Validation("id must not be empty".to_string()));
    }
    if req.name.trim().is_empty() {
        return Err(JobsError::Validation("name must not be empty".to_string()));
    }
    if req.version.trim().is_empty() {
        return Err(JobsError::Validation("version must not be empty".to_string()));
    }
    if req.event.name.trim().is_empty() {
        return Err(JobsError::Validation("event.name must not be empty".to_string()));
    }

    let trigger_type = TriggerType::parse(&req.trigger.trigger_type)?;
    match trigger_type {
        TriggerType::Static if req.trigger.rule.is_none() => {
            return Err(JobsError::Validation(
                "trigger.rule is required when trigger.type is 'static'".to_string(),
            ));
        }
        TriggerType::Scheduled if req.trigger.schedule.is_none() => {
            return Err(JobsError::Validation(
                "trigger.schedule is required when trigger.type is 'scheduled'".to_string(),
            ));
        }
        _ => {}
    }

    Ok(trigger_type)
}

pub struct JobsService {
    store: PgStore,
}

impl JobsService {
    pub fn new(store: PgStore) -> Self {
        Self { store }
    }

    pub(crate) fn store(&self) -> &PgStore {
        &self.store
    }

    /// Five-step upsert-in-one-transaction protocol: Job, JobQueue,
    /// JobVersion, EventExample reconciliation, `latest` alias
    /// maintenance. Any step failing aborts the whole transaction — no
    /// partial registration is ever visible (§4.6.1, §7).
    pub async fn register_job(
        &self,
        env: &AuthenticatedEnvironment,
        endpoint_id: Uuid,
        req: RegisterJobRequest,
    ) -> Result<RegisterJobResult, JobsError> {
        validate(&req)?;

        let organization_id = env.organization_id;
        let project_id = env.project_id;
        let environment_id = env.environment_id;

        self.store
            .with_tx(move |tx| {
                Box::pin(async move {
                    let now = Utc::now();

                    // 1. Upsert Job by (project_id, slug).
                    let job_row = job::upsert(
                        &mut **tx,
                        project_id,
                        organization_id,
                        &req.id,
                        &req.name,
                        req.internal,
                        now,
                    )
                    .await?;

                    // 2. Upsert JobQueue by (environment_id, name).
                    let queue_spec = req.queue.unwrap_or_default();
                    let queue_name = queue_spec
                        .name
                        .unwrap_or_else(|| job_queue::DEFAULT_QUEUE_NAME.to_string());
                    let max_jobs = queue_spec.max_concurrent.unwrap_or(job_queue::DEFAULT_MAX_JOBS);
                    let queue_row =
                        job_queue::upsert(&mut **tx, environment_id, &queue_name, max_jobs, now)
                            .await?;

                    // 3. Upsert JobVersion by (job_id, version, environment_id).
                    let event_specification = serde_json::json!({
                        "name": req.event.name,
                        "source": req.event.source,
                    });
                    let start_position =
                        job_version::StartPosition::from_request_str(req.start_position.as_deref());
                    let version_row = job_version::upsert(
                        &mut **tx,
                        job_row.id,
                        &req.version,
                        event_specification,
                        req.trigger.properties,
                        Some(endpoint_id),
                        environment_id,
                        organization_id,
                        project_id,
                        queue_row.id,
                        start_position,
                        req.preprocess_runs,
                        now,
                    )
                    .await?;

                    // 4. Reconcile EventExamples: upsert submitted set,
                    // then delete anything not in it.
                    let mut kept_slugs = Vec::with_capacity(req.examples.len());
                    for example in &req.examples {
                        event_example::upsert(&mut **tx, version_row.id, example).await?;
                        kept_slugs.push(example.slug.clone());
                    }
                    event_example::delete_not_in(&mut **tx, version_row.id, &kept_slugs).await?;

                    // 5. Maintain the `latest` alias: this version is
                    // newest for (job_id, environment_id) iff no sibling
                    // version's string sorts lexicographically greater.
                    let newer_count = job_version::count_lexicographically_newer(
                        &mut **tx,
                        job_row.id,
                        environment_id,
                        &req.version,
                    )
                    .await?;

                    let latest_alias_updated = newer_count == 0;
                    if latest_alias_updated {
                        job_alias::upsert(
                            &mut **tx,
                            job_row.id,
                            environment_id,
                            job_alias::LATEST_ALIAS_NAME,
                            version_row.id,
                            &req.version,
                            now,
                        )
                        .await?;
                    }

                    Ok(RegisterJobResult {
                        job: job_row,
                        job_version: version_row,
                        job_queue: queue_row,
                        latest_alias_updated,
                    })
                })
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> RegisterJobRequest {
        RegisterJobRequest {
            id: "job1".to_string(),
            name: "Job One".to_string(),
            version: "1.0.0".to_string(),
            internal: false,
            event: EventSpec {
                name: "order.placed".to_string(),
                source: Some("api".to_string()),
            },
            trigger: TriggerSpec {
                trigger_type: "static".to_string(),
                rule: Some(serde_json::json!({})),
                schedule: None,
                properties: serde_json::json!({}),
            },
            queue: None,
            start_position: None,
            preprocess_runs: false,
            examples: vec![],
        }
    }

    #[test]
    fn validate_requires_non_empty_fields() {
        let mut req = base_request();
        req.id = "".to_string();
        assert!(validate(&req).is_err());
    }

    #[test]
    fn validate_rejects_static_trigger_without_rule() {
        let mut req = base_request();
        req.trigger.rule = None;
        assert!(validate(&req).is_err());
    }

    #[test]
    fn validate_rejects_scheduled_trigger_without_schedule() {
        let mut req = base_request();
        req.trigger.trigger_type = "scheduled".to_string();
        req.trigger.schedule = None;
        assert!(validate(&req).is_err());
    }

    #[test]
    fn validate_accepts_scheduled_trigger_with_schedule() {
        let mut req = base_request();
        req.trigger.trigger_type = "scheduled".to_string();
        req.trigger.schedule = Some(serde_json::json!({"cron": "0 * * * *"}));
        assert!(validate(&req).is_ok());
    }

    #[test]
    fn validate_rejects_unknown_trigger_type() {
        let mut req = base_request();
        req.trigger.trigger_type = "manual".to_string();
        assert!(validate(&req).is_err());
    }
}
