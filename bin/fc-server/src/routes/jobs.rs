//! `POST /jobs/register` and `POST /jobs/test` — the Jobs orchestrator's
//! two caller-facing operations (§4.6).

use axum::extract::State;
use axum::Json;
use fc_jobs::{EventSpec, QueueSpec, RegisterJobRequest, TestJobRequest, TriggerSpec};
use fc_store::event_example::EventExampleInput;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::RequireAuth;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterJobBody {
    pub endpoint_id: Uuid,
    pub id: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub internal: bool,
    pub event: EventSpecBody,
    pub trigger: TriggerSpecBody,
    pub queue: Option<QueueSpecBody>,
    pub start_position: Option<String>,
    #[serde(default)]
    pub preprocess_runs: bool,
    #[serde(default)]
    pub examples: Vec<EventExampleBody>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EventExampleBody {
    pub slug: String,
    pub name: String,
    pub icon: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub payload: Value,
}

impl From<EventExampleBody> for EventExampleInput {
    fn from(body: EventExampleBody) -> Self {
        EventExampleInput { slug: body.slug, name: body.name, icon: body.icon, payload: body.payload }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EventSpecBody {
    pub name: String,
    pub source: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TriggerSpecBody {
    #[serde(rename = "type")]
    pub trigger_type: String,
    #[schema(value_type = Option<Object>)]
    pub rule: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub schedule: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub properties: Value,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QueueSpecBody {
    pub name: Option<String>,
    pub max_concurrent: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterJobResponse {
    pub job_id: String,
    pub job_version_id: String,
    pub job_queue_id: String,
    pub latest_alias_updated: bool,
}

#[utoipa::path(
    post,
    path = "/jobs/register",
    tag = "jobs",
    request_body = RegisterJobBody,
    responses(
        (status = 200, description = "Job registered", body = RegisterJobResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
    )
)]
#[tracing::instrument(name = "POST /jobs/register", skip(state, body))]
pub async fn register_job(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Json(body): Json<RegisterJobBody>,
) -> Result<Json<RegisterJobResponse>, ApiError> {
    let request = RegisterJobRequest {
        id: body.id,
        name: body.name,
        version: body.version,
        internal: body.internal,
        event: EventSpec { name: body.event.name, source: body.event.source },
        trigger: TriggerSpec {
            trigger_type: body.trigger.trigger_type,
            rule: body.trigger.rule,
            schedule: body.trigger.schedule,
            properties: body.trigger.properties,
        },
        queue: body.queue.map(|q| QueueSpec { name: q.name, max_concurrent: q.max_concurrent }),
        start_position: body.start_position,
        preprocess_runs: body.preprocess_runs,
        examples: body.examples.into_iter().map(EventExampleInput::from).collect(),
    };

    let result = state
        .jobs
        .register_job(&auth.environment, body.endpoint_id, request)
        .await?;

    Ok(Json(RegisterJobResponse {
        job_id: result.job.id.to_string(),
        job_version_id: result.job_version.id.to_string(),
        job_queue_id: result.job_queue.id.to_string(),
        latest_alias_updated: result.latest_alias_updated,
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TestJobBody {
    pub job_version_id: Uuid,
    pub environment_id: Uuid,
    #[schema(value_type = Option<Object>)]
    pub payload: Option<Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TestJobResponse {
    pub run_id: Option<String>,
    pub event_id: String,
    pub status: String,
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/jobs/test",
    tag = "jobs",
    request_body = TestJobBody,
    responses(
        (status = 200, description = "Test event ingested", body = TestJobResponse),
        (status = 404, description = "Job version or environment not found"),
        (status = 401, description = "Unauthorized"),
    )
)]
#[tracing::instrument(name = "POST /jobs/test", skip(state, body))]
pub async fn test_job(
    State(state): State<AppState>,
    RequireAuth(_auth): RequireAuth,
    Json(body): Json<TestJobBody>,
) -> Result<Json<TestJobResponse>, ApiError> {
    let request = TestJobRequest {
        job_version_id: body.job_version_id,
        environment_id: body.environment_id,
        payload: body.payload,
    };

    let response = state.jobs.test_job(&state.events, request).await?;

    Ok(Json(TestJobResponse {
        run_id: response.run_id.map(|id| id.to_string()),
        event_id: response.event_id,
        status: response.status.as_str().to_string(),
        message: response.message,
    }))
}
