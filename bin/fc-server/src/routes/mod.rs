pub mod events;
pub mod jobs;

use axum::routing::{get, post};
use axum::{Json, Router};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(events::send_event, jobs::register_job, jobs::test_job),
    components(schemas(
        events::SendEventBody,
        events::SendEventResponse,
        jobs::RegisterJobBody,
        jobs::EventSpecBody,
        jobs::TriggerSpecBody,
        jobs::QueueSpecBody,
        jobs::EventExampleBody,
        jobs::RegisterJobResponse,
        jobs::TestJobBody,
        jobs::TestJobResponse,
    )),
    tags(
        (name = "events", description = "Event ingestion"),
        (name = "jobs", description = "Job registration and testing"),
    )
)]
struct ApiDoc;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/events", post(events::send_event))
        .route("/jobs/register", post(jobs::register_job))
        .route("/jobs/test", post(jobs::test_job))
        .route("/q/health", get(|| async { Json(serde_json::json!({"status": "UP"})) }))
        .route("/q/health/live", get(|| async { Json(serde_json::json!({"status": "UP"})) }))
        .route("/q/health/ready", get(|| async { Json(serde_json::json!({"status": "UP"})) }))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(crate::middleware::StateLayer::new(state.clone()))
        .with_state(state)
}
