use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use chrono_tz::Tz;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::{CalendarError, CalendarGateway, CreatedEvent, NewEvent};
use crate::models::{local_to_utc, BusyInterval, ScheduleConfig};

pub const GOOGLE_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
const JWT_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

pub const SERVICE_ACCOUNT_EMAIL_ENV: &str = "GOOGLE_SERVICE_ACCOUNT_EMAIL";
pub const PRIVATE_KEY_ENV: &str = "GOOGLE_PRIVATE_KEY";
pub const CREDENTIALS_FILE_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Service-account key material
#[derive(Clone, Deserialize)]
pub struct ServiceAccountCredentials {
    pub client_email: String,
    pub private_key: String,
}

impl std::fmt::Debug for ServiceAccountCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountCredentials")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl ServiceAccountCredentials {
    pub fn new(client_email: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            client_email: client_email.into(),
            // Keys pasted into env files usually carry literal "\n" sequences
            private_key: private_key.into().replace("\\n", "\n"),
        }
    }

    /// Read credentials from `GOOGLE_SERVICE_ACCOUNT_EMAIL` and
    /// `GOOGLE_PRIVATE_KEY`, falling back to the JSON key file named by
    /// `GOOGLE_APPLICATION_CREDENTIALS`.
    pub fn from_env() -> Result<Self, CalendarError> {
        let email = std::env::var(SERVICE_ACCOUNT_EMAIL_ENV).ok();
        let key = std::env::var(PRIVATE_KEY_ENV).ok();

        match (email, key) {
            (Some(email), Some(key)) => Ok(Self::new(email, key)),
            (None, None) => match std::env::var(CREDENTIALS_FILE_ENV) {
                Ok(path) => Self::from_json_file(&path),
                Err(_) => Err(CalendarError::Credentials(format!(
                    "set {} and {}, or {}",
                    SERVICE_ACCOUNT_EMAIL_ENV, PRIVATE_KEY_ENV, CREDENTIALS_FILE_ENV
                ))),
            },
            (None, Some(_)) => Err(CalendarError::Credentials(format!(
                "{} is not set",
                SERVICE_ACCOUNT_EMAIL_ENV
            ))),
            (Some(_), None) => Err(CalendarError::Credentials(format!(
                "{} is not set",
                PRIVATE_KEY_ENV
            ))),
        }
    }

    /// Parse a downloaded service-account JSON key file
    pub fn from_json_file(path: &str) -> Result<Self, CalendarError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CalendarError::Credentials(format!("cannot read {}: {}", path, e)))?;
        let creds: ServiceAccountCredentials = serde_json::from_str(&content)
            .map_err(|e| CalendarError::Credentials(format!("malformed key file: {}", e)))?;
        Ok(Self::new(creds.client_email, creds.private_key))
    }
}

/// Google Calendar implementation using direct API calls
pub struct GoogleCalendar {
    client: reqwest::Client,
    calendar_id: String,
    timezone: Tz,
    api_base: String,
    token_uri: String,
    token_manager: Arc<RwLock<TokenManager>>,
}

struct TokenManager {
    client_email: String,
    signing_key: EncodingKey,
    access_token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

impl TokenManager {
    async fn get_access_token(
        &mut self,
        client: &reqwest::Client,
        token_uri: &str,
    ) -> Result<String, CalendarError> {
        if let (Some(token), Some(expires)) = (&self.access_token, self.expires_at) {
            if Utc::now() < expires - chrono::Duration::minutes(5) {
                return Ok(token.clone());
            }
        }

        let now = Utc::now();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: CALENDAR_SCOPE,
            aud: token_uri,
            iat: now.timestamp(),
            exp: (now + chrono::Duration::hours(1)).timestamp(),
        };
        let assertion =
            jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
                .map_err(|e| CalendarError::Auth(format!("failed to sign assertion: {}", e)))?;

        let resp = client
            .post(token_uri)
            .form(&[("grant_type", JWT_GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error = resp.text().await.unwrap_or_default();
            return Err(CalendarError::Auth(format!(
                "token exchange returned {}: {}",
                status, error
            )));
        }

        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
            expires_in: i64,
        }

        let tokens: TokenResponse = resp
            .json()
            .await
            .map_err(|e| CalendarError::Parse(format!("token response: {}", e)))?;

        tracing::debug!("Obtained access token for {}", self.client_email);
        self.access_token = Some(tokens.access_token.clone());
        self.expires_at = Some(Utc::now() + chrono::Duration::seconds(tokens.expires_in));

        Ok(tokens.access_token)
    }
}

impl GoogleCalendar {
    /// Build a client for the configured calendar. Key material is parsed
    /// here so bad credentials fail at startup rather than on first request.
    pub fn new(
        credentials: ServiceAccountCredentials,
        config: &ScheduleConfig,
    ) -> Result<Self, CalendarError> {
        if credentials.client_email.trim().is_empty() {
            return Err(CalendarError::Credentials(
                "service account email is empty".to_string(),
            ));
        }
        let signing_key = EncodingKey::from_rsa_pem(credentials.private_key.as_bytes())
            .map_err(|e| CalendarError::Credentials(format!("unreadable private key: {}", e)))?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            calendar_id: config.calendar_id.clone(),
            timezone: config.timezone,
            api_base: GOOGLE_API_BASE.to_string(),
            token_uri: GOOGLE_TOKEN_URI.to_string(),
            token_manager: Arc::new(RwLock::new(TokenManager {
                client_email: credentials.client_email,
                signing_key,
                access_token: None,
                expires_at: None,
            })),
        })
    }

    /// Point the client at different API and token endpoints
    pub fn with_endpoints(mut self, api_base: &str, token_uri: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self.token_uri = token_uri.to_string();
        self
    }

    async fn get_token(&self) -> Result<String, CalendarError> {
        let mut manager = self.token_manager.write().await;
        manager.get_access_token(&self.client, &self.token_uri).await
    }

    fn events_url(&self) -> String {
        format!(
            "{}/calendars/{}/events",
            self.api_base,
            urlencoding::encode(&self.calendar_id)
        )
    }

    async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response, CalendarError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Err(CalendarError::Api { status, body })
    }

    /// Convert an event into the interval it occupies, if it blocks time
    fn busy_interval(&self, event: &EventItem) -> Option<BusyInterval> {
        if event.status.as_deref() == Some("cancelled")
            || event.transparency.as_deref() == Some("transparent")
        {
            return None;
        }
        let start = self.resolve(event.start.as_ref()?)?;
        let end = self.resolve(event.end.as_ref()?)?;
        (start < end).then(|| BusyInterval::new(start, end))
    }

    fn resolve(&self, time: &EventTime) -> Option<DateTime<Utc>> {
        match (time.date_time, time.date) {
            (Some(dt), _) => Some(dt.with_timezone(&Utc)),
            // All-day events span local midnights
            (None, Some(date)) => local_to_utc(self.timezone, date.and_hms_opt(0, 0, 0)?),
            (None, None) => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventList {
    #[serde(default)]
    items: Vec<EventItem>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct EventItem {
    status: Option<String>,
    transparency: Option<String>,
    start: Option<EventTime>,
    end: Option<EventTime>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    date_time: Option<DateTime<FixedOffset>>,
    date: Option<NaiveDate>,
}

#[async_trait::async_trait]
impl CalendarGateway for GoogleCalendar {
    async fn list_busy(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, CalendarError> {
        let token = self.get_token().await?;
        let time_min = start.to_rfc3339();
        let time_max = end.to_rfc3339();

        let mut busy = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("timeMin", time_min.as_str()),
                ("timeMax", time_max.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
                ("maxResults", "250"),
            ];
            if let Some(page) = page_token.as_deref() {
                query.push(("pageToken", page));
            }

            let resp = self
                .client
                .get(self.events_url())
                .bearer_auth(&token)
                .query(&query)
                .send()
                .await?;
            let page: EventList = Self::ensure_success(resp)
                .await?
                .json()
                .await
                .map_err(|e| CalendarError::Parse(format!("event list: {}", e)))?;

            busy.extend(page.items.iter().filter_map(|e| self.busy_interval(e)));

            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        tracing::debug!(
            "Calendar {} has {} busy intervals in {}..{}",
            self.calendar_id,
            busy.len(),
            time_min,
            time_max
        );
        Ok(busy)
    }

    async fn insert_event(&self, event: &NewEvent) -> Result<CreatedEvent, CalendarError> {
        let token = self.get_token().await?;

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct EventRequest<'a> {
            summary: &'a str,
            description: &'a str,
            start: EventDateTime,
            end: EventDateTime,
            attendees: Vec<Attendee<'a>>,
            conference_data: ConferenceData<'a>,
            reminders: Reminders<'a>,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct EventDateTime {
            date_time: String,
            time_zone: &'static str,
        }

        #[derive(Serialize)]
        struct Attendee<'a> {
            email: &'a str,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct ConferenceData<'a> {
            create_request: CreateConferenceRequest<'a>,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct CreateConferenceRequest<'a> {
            request_id: &'a str,
            conference_solution_key: ConferenceSolutionKey,
        }

        #[derive(Serialize)]
        struct ConferenceSolutionKey {
            #[serde(rename = "type")]
            kind: &'static str,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Reminders<'a> {
            use_default: bool,
            overrides: &'a [super::Reminder],
        }

        let local = |t: DateTime<Utc>| EventDateTime {
            date_time: t.with_timezone(&self.timezone).to_rfc3339(),
            time_zone: self.timezone.name(),
        };

        let body = EventRequest {
            summary: &event.summary,
            description: &event.description,
            start: local(event.start),
            end: local(event.end),
            attendees: event
                .attendees
                .iter()
                .map(|email| Attendee { email })
                .collect(),
            conference_data: ConferenceData {
                create_request: CreateConferenceRequest {
                    request_id: &event.conference_request_id,
                    conference_solution_key: ConferenceSolutionKey {
                        kind: "hangoutsMeet",
                    },
                },
            },
            reminders: Reminders {
                use_default: false,
                overrides: &event.reminders,
            },
        };

        let resp = self
            .client
            .post(self.events_url())
            .bearer_auth(&token)
            .query(&[("conferenceDataVersion", "1"), ("sendUpdates", "all")])
            .json(&body)
            .send()
            .await?;

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct EventResponse {
            id: Option<String>,
            html_link: Option<String>,
        }

        let created: EventResponse = Self::ensure_success(resp)
            .await?
            .json()
            .await
            .map_err(|e| CalendarError::Parse(format!("created event: {}", e)))?;

        let id = created
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| CalendarError::Parse("created event has no id".to_string()))?;

        Ok(CreatedEvent {
            id,
            html_link: created.html_link,
        })
    }

    async fn delete_event(&self, event_id: &str) -> Result<(), CalendarError> {
        let token = self.get_token().await?;

        let resp = self
            .client
            .delete(format!(
                "{}/{}",
                self.events_url(),
                urlencoding::encode(event_id)
            ))
            .bearer_auth(&token)
            .query(&[("sendUpdates", "all")])
            .send()
            .await?;

        match Self::ensure_success(resp).await {
            Ok(_) => Ok(()),
            Err(CalendarError::Api {
                status: 404 | 410, ..
            }) => Err(CalendarError::NotFound(event_id.to_string())),
            Err(e) => Err(e),
        }
    }
}
