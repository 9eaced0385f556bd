//! Maps library error enums to HTTP responses, following the teacher's
//! `PlatformError::into_response` pattern but with the wire shape §7
//! specifies: `{"error": "<message>"}`, no extra fields.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

impl From<fc_events::EventsError> for ApiError {
    fn from(err: fc_events::EventsError) -> Self {
        use fc_events::EventsError::*;
        match err {
            Validation(msg) => ApiError::new(StatusCode::BAD_REQUEST, msg),
            NotFound(msg) => ApiError::new(StatusCode::NOT_FOUND, msg),
            Store(fc_store::StoreError::Conflict(msg)) => ApiError::new(StatusCode::CONFLICT, msg),
            Store(store_err) => ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, store_err.to_string()),
            Queue(queue_err) => ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, queue_err.to_string()),
            Dispatchable(parse_err) => ApiError::new(StatusCode::BAD_REQUEST, parse_err.to_string()),
        }
    }
}

impl From<fc_jobs::JobsError> for ApiError {
    fn from(err: fc_jobs::JobsError) -> Self {
        use fc_jobs::JobsError::*;
        match err {
            Validation(msg) => ApiError::new(StatusCode::BAD_REQUEST, msg),
            NotFound(msg) => ApiError::new(StatusCode::NOT_FOUND, msg),
            Store(fc_store::StoreError::Conflict(msg)) => ApiError::new(StatusCode::CONFLICT, msg),
            Store(store_err) => ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, store_err.to_string()),
            Events(events_err) => ApiError::from(events_err),
        }
    }
}
