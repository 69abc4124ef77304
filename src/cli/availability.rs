use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;

use super::{ApiClient, OutputFormat};
use crate::models::{DatesResponse, SlotsResponse};

impl std::fmt::Display for DatesResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.dates.is_empty() {
            return writeln!(f, "No bookable dates in the booking window.");
        }
        writeln!(f, "Bookable dates ({}):", self.timezone)?;
        for date in &self.dates {
            writeln!(f, "  {}", date.format("%a %Y-%m-%d"))?;
        }
        Ok(())
    }
}

impl std::fmt::Display for SlotsResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.slots.is_empty() {
            return writeln!(f, "No slots on {}.", self.date);
        }
        let tz: Tz = self.timezone.parse().unwrap_or(Tz::UTC);
        writeln!(f, "Slots on {} ({}):", self.date, tz)?;
        for slot in &self.slots {
            writeln!(
                f,
                "  {} - {} ({} min)  {}",
                slot.start.with_timezone(&tz).format("%H:%M"),
                slot.end.with_timezone(&tz).format("%H:%M"),
                slot.duration_minutes(),
                if slot.available { "free" } else { "taken" }
            )?;
        }
        Ok(())
    }
}

/// Words that name a date relative to the server's current day
fn is_relative_date(s: &str) -> bool {
    matches!(s.trim().to_lowercase().as_str(), "today" | "tomorrow")
}

/// Parse a date like "2026-03-02". "today" and "tomorrow" are taken in `tz`,
/// which should be the schedule's timezone so they agree with the server.
pub fn parse_date(s: &str, tz: Tz) -> Result<NaiveDate> {
    let today = Utc::now().with_timezone(&tz).date_naive();
    match s.trim().to_lowercase().as_str() {
        "today" => Ok(today),
        "tomorrow" => today.succ_opt().context("Date out of range"),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
            .context("Invalid date format. Use: YYYY-MM-DD"),
    }
}

async fn fetch_dates(client: &ApiClient) -> Result<DatesResponse> {
    let resp = client
        .http()
        .get(client.url("/v1/dates"))
        .send()
        .await
        .context("Failed to query dates")?;

    if !resp.status().is_success() {
        let error = resp.text().await.unwrap_or_default();
        anyhow::bail!("Failed to query dates: {}", error);
    }

    resp.json().await.context("Failed to parse response")
}

/// List bookable dates
pub async fn run_dates(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let response = fetch_dates(client).await?;
    format.print(&response);
    Ok(())
}

/// List slots for one date
pub async fn run_slots(client: &ApiClient, date: &str, format: OutputFormat) -> Result<()> {
    let tz = if is_relative_date(date) {
        let timezone = fetch_dates(client).await?.timezone;
        timezone
            .parse::<Tz>()
            .map_err(|_| anyhow::anyhow!("Server reported unknown timezone {}", timezone))?
    } else {
        Tz::UTC
    };
    let date = parse_date(date, tz)?;

    let resp = client
        .http()
        .get(client.url("/v1/slots"))
        .query(&[("date", date.to_string())])
        .send()
        .await
        .context("Failed to query slots")?;

    if !resp.status().is_success() {
        let error = resp.text().await.unwrap_or_default();
        anyhow::bail!("Failed to query slots: {}", error);
    }

    let response: SlotsResponse = resp.json().await.context("Failed to parse response")?;
    format.print(&response);
    Ok(())
}
