mod handlers;
mod routes;

pub use routes::create_router;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use crate::calendar::{GoogleCalendar, ServiceAccountCredentials};
use crate::models::ScheduleConfig;
use crate::scheduling::Scheduler;

/// Shared application state
pub struct AppState {
    pub scheduler: Scheduler,
}

impl AppState {
    pub fn new(scheduler: Scheduler) -> Self {
        Self { scheduler }
    }
}

/// Run the API server
pub async fn run_server(addr: SocketAddr, config_path: Option<&Path>) -> Result<()> {
    let config = ScheduleConfig::load(config_path).context("Failed to load schedule config")?;

    // Credentials are checked here, before the listener comes up
    let credentials =
        ServiceAccountCredentials::from_env().context("Missing Google service account")?;
    let calendar = GoogleCalendar::new(credentials, &config)
        .context("Failed to initialise Google Calendar client")?;

    tracing::info!(
        "Scheduling on calendar {} in {}",
        config.calendar_id,
        config.timezone
    );

    let scheduler = Scheduler::new(Arc::new(calendar), Arc::new(config));
    let state = Arc::new(AppState::new(scheduler));

    // Create router
    let app = create_router(state);

    tracing::info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
