use sha2::{Digest, Sha256};

use super::Scheduler;
use crate::calendar::{NewEvent, Reminder, ReminderMethod};
use crate::models::{BookingRequest, BookingResult};

/// Shown to callers whenever the calendar rejects or fails a booking
pub const BOOKING_FAILED_MESSAGE: &str =
    "We could not complete your booking. Please try again later.";

const REMINDERS: [Reminder; 2] = [
    Reminder {
        method: ReminderMethod::Email,
        minutes: 60,
    },
    Reminder {
        method: ReminderMethod::Popup,
        minutes: 30,
    },
];

/// Idempotency key for the conferencing request. Identical submissions map
/// to the same key so a resubmission does not mint a second conference.
pub fn conference_request_key(request: &BookingRequest) -> String {
    let mut hasher = Sha256::new();
    hasher.update(request.email.trim().to_lowercase().as_bytes());
    hasher.update(b"|");
    hasher.update(request.start.timestamp().to_be_bytes());
    hasher.update(b"|");
    hasher.update(request.end.timestamp().to_be_bytes());
    hex::encode(&hasher.finalize()[..16])
}

/// Plain-text event description; absent fields are left out
pub fn describe(request: &BookingRequest) -> String {
    let mut lines = vec![
        format!("Name: {}", request.name.trim()),
        format!("Email: {}", request.email.trim()),
    ];
    if let Some(company) = request.company() {
        lines.push(format!("Company: {}", company));
    }
    if let Some(phone) = request.phone() {
        lines.push(format!("Phone: {}", phone));
    }
    if let Some(message) = request.message() {
        lines.push(String::new());
        lines.push(message.to_string());
    }
    lines.join("\n")
}

pub fn build_event(request: &BookingRequest) -> NewEvent {
    let name = request.name.trim();
    let summary = match request.company() {
        Some(company) => format!("Meeting with {} ({})", name, company),
        None => format!("Meeting with {}", name),
    };

    NewEvent {
        summary,
        description: describe(request),
        start: request.start,
        end: request.end,
        attendees: vec![request.email.trim().to_string()],
        conference_request_id: conference_request_key(request),
        reminders: REMINDERS.to_vec(),
    }
}

impl Scheduler {
    /// Create the calendar event for `request`. Never retries; failures come
    /// back as an unsuccessful result carrying a generic message.
    pub async fn create_booking(&self, request: &BookingRequest) -> BookingResult {
        let event = build_event(request);

        match self.gateway.insert_event(&event).await {
            Ok(created) => {
                tracing::info!(
                    "Booked {} for {} at {}",
                    created.id,
                    request.email,
                    request.start
                );
                BookingResult::confirmed(created.id, created.html_link)
            }
            Err(e) => {
                tracing::error!(
                    "Failed to create booking for {} at {}: {}",
                    request.email,
                    request.start,
                    e
                );
                BookingResult::failed(BOOKING_FAILED_MESSAGE)
            }
        }
    }
}
