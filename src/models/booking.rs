use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Problems with caller-supplied booking input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Booking must end after it starts")]
    InvalidRange,
}

/// A reservation request for a single slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BookingRequest {
    /// Boundary validation for HTTP and CLI input. The orchestrator trusts
    /// whatever reaches it.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(ValidationError::MissingField("email"));
        }
        match email.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {}
            _ => return Err(ValidationError::InvalidEmail),
        }
        if self.start >= self.end {
            return Err(ValidationError::InvalidRange);
        }
        Ok(())
    }

    pub fn company(&self) -> Option<&str> {
        non_blank(&self.company)
    }

    pub fn phone(&self) -> Option<&str> {
        non_blank(&self.phone)
    }

    pub fn message(&self) -> Option<&str> {
        non_blank(&self.message)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Outcome of a booking attempt. `error` never carries gateway internals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BookingResult {
    pub fn confirmed(event_id: String, html_link: Option<String>) -> Self {
        Self {
            success: true,
            event_id: Some(event_id),
            html_link,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            event_id: None,
            html_link: None,
            error: Some(message.into()),
        }
    }
}

impl std::fmt::Display for BookingResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.success {
            write!(f, "Booked: {}", self.event_id.as_deref().unwrap_or("-"))?;
            if let Some(link) = &self.html_link {
                write!(f, "\n  {}", link)?;
            }
            Ok(())
        } else {
            write!(
                f,
                "Booking failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            )
        }
    }
}
