use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use super::ApiError;
use crate::models::{DatesResponse, SlotsQuery, SlotsResponse};
use crate::server::AppState;

/// List the dates open for booking
pub async fn list_dates(State(state): State<Arc<AppState>>) -> Json<DatesResponse> {
    let scheduler = &state.scheduler;
    Json(DatesResponse {
        timezone: scheduler.config().timezone.name().to_string(),
        dates: scheduler.get_available_dates(),
    })
}

/// List the slots for a single date
pub async fn list_slots(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotsResponse>, ApiError> {
    let scheduler = &state.scheduler;
    let slots = scheduler.get_available_slots(query.date).await?;
    Ok(Json(SlotsResponse {
        date: query.date,
        timezone: scheduler.config().timezone.name().to_string(),
        slots,
    }))
}
