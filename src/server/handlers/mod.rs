pub mod availability;
pub mod bookings;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::models::ValidationError;
use crate::scheduling::AvailabilityError;
use crate::server::AppState;

/// Liveness plus the calendar and zone this instance schedules against
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let config = state.scheduler.config();
    Json(json!({
        "status": "ok",
        "calendar_id": config.calendar_id,
        "timezone": config.timezone.name(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// A failed request, rendered as `{"error": message}` with its status
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, e.to_string())
    }
}

impl From<AvailabilityError> for ApiError {
    fn from(e: AvailabilityError) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, e.to_string())
    }
}
