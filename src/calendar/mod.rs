mod google;
#[cfg(test)]
pub mod mock;

pub use google::*;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::BusyInterval;

/// Failures reaching or talking to the remote calendar
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("Invalid service credentials: {0}")]
    Credentials(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Calendar request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Calendar API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Event not found: {0}")]
    NotFound(String),

    #[error("Unexpected calendar response: {0}")]
    Parse(String),
}

/// Capability interface over the remote calendar. The scheduling logic only
/// ever sees this trait, so tests can swap in a fake.
#[async_trait]
pub trait CalendarGateway: Send + Sync {
    /// Busy intervals for events overlapping `[start, end)`
    async fn list_busy(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, CalendarError>;

    /// Insert an event, inviting all attendees
    async fn insert_event(&self, event: &NewEvent) -> Result<CreatedEvent, CalendarError>;

    /// Delete an event, notifying all attendees
    async fn delete_event(&self, event_id: &str) -> Result<(), CalendarError>;
}

/// Event payload handed to the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewEvent {
    pub summary: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub attendees: Vec<String>,
    /// Idempotency key for the conferencing request
    pub conference_request_id: String,
    pub reminders: Vec<Reminder>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderMethod {
    Email,
    Popup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub method: ReminderMethod,
    pub minutes: u32,
}

/// Result of creating a calendar event
#[derive(Debug, Clone)]
pub struct CreatedEvent {
    pub id: String,
    pub html_link: Option<String>,
}
