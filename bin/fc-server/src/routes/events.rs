//! `POST /events` — the only caller-facing route onto `IngestSendEvent`
//! (§1: `DeliverEvent`/`InvokeDispatcher` are worker-only, not routed).

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use fc_events::{IngestOptions, SendEventRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::middleware::RequireApiKey;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendEventBody {
    pub event_id: Option<String>,
    pub name: String,
    pub source: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub payload: Value,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub context: Value,
    pub timestamp: Option<DateTime<Utc>>,
    pub external_account_identifier: Option<String>,
    #[serde(default)]
    pub deliver_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deliver_after_seconds: Option<i64>,
    #[serde(default)]
    pub test: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SendEventResponse {
    pub id: String,
    pub event_id: String,
    pub is_test: bool,
    pub deliver_at: DateTime<Utc>,
}

#[utoipa::path(
    post,
    path = "/events",
    tag = "events",
    request_body = SendEventBody,
    responses(
        (status = 200, description = "Event ingested", body = SendEventResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
    )
)]
#[tracing::instrument(name = "POST /events", skip(state, body))]
pub async fn send_event(
    State(state): State<AppState>,
    RequireApiKey(auth): RequireApiKey,
    Json(body): Json<SendEventBody>,
) -> Result<Json<SendEventResponse>, ApiError> {
    let request = SendEventRequest {
        event_id: body.event_id,
        name: body.name,
        source: body.source,
        payload: body.payload,
        context: body.context,
        timestamp: body.timestamp,
        external_account_identifier: body.external_account_identifier,
    };
    let opts = IngestOptions {
        deliver_at: body.deliver_at,
        deliver_after_seconds: body.deliver_after_seconds,
        test: body.test,
    };

    let record = state
        .events
        .ingest_send_event(&auth.environment, request, opts)
        .await?;

    Ok(Json(SendEventResponse {
        id: record.id.to_string(),
        event_id: record.event_id,
        is_test: record.is_test,
        deliver_at: record.deliver_at,
    }))
}
