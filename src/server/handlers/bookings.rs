use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::ApiError;
use crate::models::{BookingRequest, CancelResponse};
use crate::server::AppState;

/// Reserve a slot
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BookingRequest>,
) -> Result<Response, ApiError> {
    req.validate()?;

    let result = state.scheduler.create_booking(&req).await;
    let status = if result.success {
        StatusCode::CREATED
    } else {
        StatusCode::BAD_GATEWAY
    };
    Ok((status, Json(result)).into_response())
}

/// Cancel a booked event
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let cancelled = state.scheduler.cancel_booking(&id).await;
    let status = if cancelled {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    (status, Json(CancelResponse { cancelled })).into_response()
}
