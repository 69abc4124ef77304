use std::path::Path;

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable pointing at a JSON schedule file
pub const CONFIG_PATH_ENV: &str = "SLOTD_CONFIG";
pub const CALENDAR_ID_ENV: &str = "SLOTD_CALENDAR_ID";
pub const TIMEZONE_ENV: &str = "SLOTD_TIMEZONE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unknown timezone: {0}")]
    Timezone(String),

    #[error("Invalid schedule: {0}")]
    Invalid(String),
}

/// Daily working window, in whole local hours. `end` may be 24.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    pub start: u32,
    pub end: u32,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self { start: 10, end: 18 }
    }
}

/// Process-wide scheduling settings. Read-only once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub calendar_id: String,
    pub timezone: Tz,
    pub slot_duration_minutes: u32,
    pub working_hours: WorkingHours,
    pub working_days: Vec<Weekday>,
    pub buffer_minutes: u32,
    pub booking_window_days: u32,
    /// Upper bound on any single calendar API call
    pub request_timeout_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            calendar_id: "primary".to_string(),
            timezone: Tz::UTC,
            slot_duration_minutes: 30,
            working_hours: WorkingHours::default(),
            working_days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            buffer_minutes: 15,
            booking_window_days: 14,
            request_timeout_secs: 30,
        }
    }
}

impl ScheduleConfig {
    /// Load from an optional JSON file, then apply environment overrides.
    ///
    /// When `path` is `None`, `SLOTD_CONFIG` is consulted; if that is unset
    /// too, defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var(CONFIG_PATH_ENV).ok();
        let path = path.or(env_path.as_deref().map(Path::new));

        let mut config = match path {
            Some(path) => {
                tracing::info!("Loading schedule from {}", path.display());
                Self::from_json(&std::fs::read_to_string(path)?)?
            }
            None => Self::default(),
        };

        if let Ok(calendar_id) = std::env::var(CALENDAR_ID_ENV) {
            config.calendar_id = calendar_id;
        }
        if let Ok(tz) = std::env::var(TIMEZONE_ENV) {
            config.timezone = tz.parse().map_err(|_| ConfigError::Timezone(tz))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: ScheduleConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.calendar_id.trim().is_empty() {
            return Err(ConfigError::Invalid("calendar_id must not be empty".into()));
        }
        if self.slot_duration_minutes == 0 {
            return Err(ConfigError::Invalid(
                "slot_duration_minutes must be positive".into(),
            ));
        }
        let WorkingHours { start, end } = self.working_hours;
        if start >= end || end > 24 {
            return Err(ConfigError::Invalid(format!(
                "working_hours {}..{} must satisfy start < end <= 24",
                start, end
            )));
        }
        let window_minutes = (end - start) * 60;
        if self.slot_duration_minutes > window_minutes {
            return Err(ConfigError::Invalid(format!(
                "slot_duration_minutes {} exceeds the {} minute working window",
                self.slot_duration_minutes, window_minutes
            )));
        }
        if self.buffer_minutes > window_minutes {
            return Err(ConfigError::Invalid(format!(
                "buffer_minutes {} exceeds the {} minute working window",
                self.buffer_minutes, window_minutes
            )));
        }
        if self.working_days.is_empty() {
            return Err(ConfigError::Invalid("working_days must not be empty".into()));
        }
        if self.booking_window_days == 0 {
            return Err(ConfigError::Invalid(
                "booking_window_days must be positive".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn slot_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.slot_duration_minutes))
    }

    /// Distance between consecutive slot starts
    pub fn slot_step(&self) -> Duration {
        Duration::minutes(i64::from(self.slot_duration_minutes) + i64::from(self.buffer_minutes))
    }

    pub fn is_working_day(&self, day: Weekday) -> bool {
        self.working_days.contains(&day)
    }
}

/// Resolve a wall-clock time in `tz` to UTC. Ambiguous times take the earlier
/// instant; times inside a DST gap are pushed forward by an hour.
pub fn local_to_utc(tz: Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&local)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(local + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_local_to_utc_handles_dst_gap() {
        let berlin = chrono_tz::Europe::Berlin;
        let gap = chrono::NaiveDate::from_ymd_opt(2026, 3, 29)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        let resolved = local_to_utc(berlin, gap).unwrap();
        assert_eq!(resolved.to_rfc3339(), "2026-03-29T01:30:00+00:00");
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = ScheduleConfig::default();
        config.validate().unwrap();
        assert_eq!(config.slot_step(), Duration::minutes(45));
        assert!(config.is_working_day(Weekday::Mon));
        assert!(!config.is_working_day(Weekday::Sat));
    }

    #[test]
    fn test_from_json_partial_overrides() {
        let config = ScheduleConfig::from_json(
            r#"{"timezone": "Europe/Berlin", "working_days": ["Mon", "Wed"], "buffer_minutes": 0}"#,
        )
        .unwrap();

        assert_eq!(config.timezone, chrono_tz::Europe::Berlin);
        assert_eq!(config.working_days, vec![Weekday::Mon, Weekday::Wed]);
        assert_eq!(config.buffer_minutes, 0);
        assert_eq!(config.slot_duration_minutes, 30);
    }

    #[test]
    fn test_rejects_invalid_schedules() {
        let mut config = ScheduleConfig::default();
        config.slot_duration_minutes = 0;
        assert!(config.validate().is_err());

        let mut config = ScheduleConfig::default();
        config.working_hours = WorkingHours { start: 18, end: 10 };
        assert!(config.validate().is_err());

        let mut config = ScheduleConfig::default();
        config.working_hours = WorkingHours { start: 0, end: 25 };
        assert!(config.validate().is_err());

        let mut config = ScheduleConfig::default();
        config.booking_window_days = 0;
        assert!(config.validate().is_err());

        let mut config = ScheduleConfig::default();
        config.working_days.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_durations_longer_than_window() {
        let config = ScheduleConfig {
            slot_duration_minutes: 1,
            buffer_minutes: u32::MAX,
            ..ScheduleConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = ScheduleConfig {
            slot_duration_minutes: 8 * 60 + 1,
            ..ScheduleConfig::default()
        };
        assert!(config.validate().is_err());

        // A single slot filling the whole window is fine
        let config = ScheduleConfig {
            slot_duration_minutes: 8 * 60,
            buffer_minutes: 8 * 60,
            ..ScheduleConfig::default()
        };
        config.validate().unwrap();
    }

    #[test]
    fn test_slot_step_does_not_overflow() {
        let config = ScheduleConfig {
            slot_duration_minutes: u32::MAX,
            buffer_minutes: u32::MAX,
            ..ScheduleConfig::default()
        };
        assert_eq!(
            config.slot_step(),
            Duration::minutes(2 * i64::from(u32::MAX))
        );
    }

    #[test]
    fn test_unknown_timezone_fails_to_parse() {
        assert!(ScheduleConfig::from_json(r#"{"timezone": "Mars/Olympus"}"#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"calendar_id": "team@example.com", "booking_window_days": 7}}"#)
            .unwrap();

        let config = ScheduleConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.booking_window_days, 7);
    }
}
