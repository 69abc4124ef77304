use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::StatusCode;

use super::{ApiClient, OutputFormat};
use crate::models::{BookingRequest, BookingResult, CancelResponse};

impl std::fmt::Display for CancelResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cancelled {
            write!(f, "Booking cancelled.")
        } else {
            write!(f, "Booking could not be cancelled.")
        }
    }
}

/// Parse a slot time like "2026-02-03T10:00" or "2026-02-03T10:00:00Z".
/// Times without an offset are taken as UTC.
pub fn parse_slot_time(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt.and_utc());
    }

    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M") {
        return Ok(dt.and_utc());
    }

    anyhow::bail!("Invalid time format. Use: YYYY-MM-DDTHH:MM or RFC3339")
}

/// Fields for a booking collected from the command line
pub struct BookArgs<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub company: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub message: Option<&'a str>,
    pub start: &'a str,
    pub end: &'a str,
}

impl BookArgs<'_> {
    fn into_request(self) -> Result<BookingRequest> {
        let request = BookingRequest {
            name: self.name.to_string(),
            email: self.email.to_string(),
            company: self.company.map(str::to_string),
            phone: self.phone.map(str::to_string),
            message: self.message.map(str::to_string),
            start: parse_slot_time(self.start)?,
            end: parse_slot_time(self.end)?,
        };
        request.validate()?;
        Ok(request)
    }
}

/// Book a slot
pub async fn run_book(client: &ApiClient, args: BookArgs<'_>, format: OutputFormat) -> Result<()> {
    let request = args.into_request()?;

    let resp = client
        .http()
        .post(client.url("/v1/bookings"))
        .json(&request)
        .send()
        .await
        .context("Failed to submit booking")?;

    // Calendar failures still come back as a result body
    let status = resp.status();
    if status != StatusCode::CREATED && status != StatusCode::BAD_GATEWAY {
        let error = resp.text().await.unwrap_or_default();
        anyhow::bail!("Failed to submit booking: {}", error);
    }

    let result: BookingResult = resp.json().await.context("Failed to parse response")?;
    format.print(&result);
    if !result.success {
        anyhow::bail!("Booking was not created");
    }
    Ok(())
}

/// Cancel a booking by event id
pub async fn run_cancel(client: &ApiClient, event_id: &str, format: OutputFormat) -> Result<()> {
    let resp = client
        .http()
        .delete(client.url(&format!("/v1/bookings/{}", urlencoding::encode(event_id))))
        .send()
        .await
        .context("Failed to cancel booking")?;

    let response: CancelResponse = resp.json().await.context("Failed to parse response")?;
    format.print(&response);
    if !response.cancelled {
        anyhow::bail!("Cancellation failed for {}", event_id);
    }
    Ok(())
}
