use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        // Availability
        .route("/v1/dates", get(handlers::availability::list_dates))
        .route("/v1/slots", get(handlers::availability::list_slots))
        // Bookings
        .route("/v1/bookings", post(handlers::bookings::create_booking))
        .route("/v1/bookings/:id", delete(handlers::bookings::cancel_booking))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
