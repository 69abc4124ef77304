use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use thiserror::Error;

use super::Scheduler;
use crate::models::{local_to_utc, BusyInterval, ScheduleConfig, TimeSlot};

/// Raised when slots cannot be computed. The message is safe to show users;
/// the underlying cause is only logged.
#[derive(Debug, Error)]
#[error("Unable to load available time slots. Please try again later.")]
pub struct AvailabilityError;

/// The `[start, end)` working window for `date`, in UTC
pub fn day_window(config: &ScheduleConfig, date: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    let hours = config.working_hours;
    let start = local_to_utc(
        config.timezone,
        midnight + Duration::hours(i64::from(hours.start)),
    )?;
    let end = local_to_utc(config.timezone, midnight + Duration::hours(i64::from(hours.end)))?;
    Some((start, end))
}

/// Lay slots across `[window_start, window_end)` and flag each one.
///
/// A slot is available when it starts after `now` and does not overlap any
/// busy interval. Slots never run past `window_end`.
pub fn build_slots(
    config: &ScheduleConfig,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    busy: &[BusyInterval],
    now: DateTime<Utc>,
) -> Vec<TimeSlot> {
    let duration = config.slot_duration();
    let step = config.slot_step();

    let mut slots = Vec::new();
    let mut start = window_start;
    while start + duration <= window_end {
        let mut slot = TimeSlot::new(start, duration, false);
        let free = !busy.iter().any(|b| slot.overlaps(b));
        slot.available = free && start > now;
        slots.push(slot);
        start += step;
    }
    slots
}

/// Working days in `[today + 1, today + booking_window]`, ascending
pub fn dates_after(config: &ScheduleConfig, today: NaiveDate) -> Vec<NaiveDate> {
    today
        .iter_days()
        .skip(1)
        .take(config.booking_window_days as usize)
        .filter(|d| config.is_working_day(d.weekday()))
        .collect()
}

impl Scheduler {
    /// Slots for `date`, each flagged available or not. Non-working days
    /// return nothing without touching the calendar.
    pub async fn get_available_slots(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<TimeSlot>, AvailabilityError> {
        self.slots_at(date, Utc::now()).await
    }

    /// As [`Scheduler::get_available_slots`], evaluated against a fixed `now`
    pub async fn slots_at(
        &self,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Vec<TimeSlot>, AvailabilityError> {
        if !self.config.is_working_day(date.weekday()) {
            return Ok(Vec::new());
        }

        let Some((start, end)) = day_window(&self.config, date) else {
            tracing::warn!("No working window for {} in {}", date, self.config.timezone);
            return Ok(Vec::new());
        };

        let busy = self.gateway.list_busy(start, end).await.map_err(|e| {
            tracing::error!("Failed to list busy intervals for {}: {}", date, e);
            AvailabilityError
        })?;

        let slots = build_slots(&self.config, start, end, &busy, now);
        tracing::debug!(
            "{}: {} slots, {} available, {} busy intervals",
            date,
            slots.len(),
            slots.iter().filter(|s| s.available).count(),
            busy.len()
        );
        Ok(slots)
    }

    /// Bookable dates starting tomorrow in the configured timezone
    pub fn get_available_dates(&self) -> Vec<NaiveDate> {
        let today = Utc::now().with_timezone(&self.config.timezone).date_naive();
        dates_after(&self.config, today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::mock::MockCalendar;
    use crate::models::WorkingHours;
    use chrono::{NaiveTime, TimeZone, Weekday};
    use std::sync::Arc;

    // 2026-03-02 is a Monday
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn utc(date: NaiveDate, h: u32, m: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(&date.and_hms_opt(h, m, 0).unwrap())
    }

    fn long_ago() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
    }

    fn scheduler(mock: Arc<MockCalendar>, config: ScheduleConfig) -> Scheduler {
        Scheduler::new(mock, Arc::new(config))
    }

    #[tokio::test]
    async fn test_slots_follow_slot_plus_buffer_cadence() {
        let mock = Arc::new(MockCalendar::new());
        let sched = scheduler(mock.clone(), ScheduleConfig::default());

        let slots = sched.slots_at(monday(), long_ago()).await.unwrap();

        let starts: Vec<NaiveTime> = slots.iter().map(|s| s.start.time()).collect();
        assert_eq!(starts[0], NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(starts[1], NaiveTime::from_hms_opt(10, 45, 0).unwrap());
        assert_eq!(starts[2], NaiveTime::from_hms_opt(11, 30, 0).unwrap());
        assert_eq!(starts[3], NaiveTime::from_hms_opt(12, 15, 0).unwrap());
        assert_eq!(*starts.last().unwrap(), NaiveTime::from_hms_opt(17, 30, 0).unwrap());
        assert_eq!(slots.len(), 11);

        for pair in slots.windows(2) {
            assert!(pair[0].start < pair[1].start);
        }
        for slot in &slots {
            assert_eq!(slot.end, slot.start + Duration::minutes(30));
            assert!(slot.start >= utc(monday(), 10, 0));
            assert!(slot.end <= utc(monday(), 18, 0));
            assert!(slot.available);
        }

        assert_eq!(mock.list_calls(), 1);
        assert_eq!(
            mock.queried_ranges(),
            vec![(utc(monday(), 10, 0), utc(monday(), 18, 0))]
        );
    }

    #[tokio::test]
    async fn test_busy_interval_marks_overlapping_slots() {
        let busy = BusyInterval::new(utc(monday(), 12, 0), utc(monday(), 13, 0));
        let mock = Arc::new(MockCalendar::with_busy(vec![busy]));
        let sched = scheduler(mock, ScheduleConfig::default());

        let slots = sched.slots_at(monday(), long_ago()).await.unwrap();
        let by_start = |h, m| slots.iter().find(|s| s.start == utc(monday(), h, m)).unwrap();

        assert!(by_start(11, 30).available);
        assert!(!by_start(12, 15).available);
        assert!(by_start(13, 0).available);

        for slot in slots.iter().filter(|s| s.available) {
            assert!(!(slot.start < busy.end && slot.end > busy.start));
        }
    }

    #[tokio::test]
    async fn test_past_slots_are_never_available() {
        let mock = Arc::new(MockCalendar::new());
        let sched = scheduler(mock, ScheduleConfig::default());

        // Now is exactly the 11:30 start: that slot has begun
        let now = utc(monday(), 11, 30);
        let slots = sched.slots_at(monday(), now).await.unwrap();

        for slot in &slots {
            assert_eq!(slot.available, slot.start > now, "{}", slot.start);
        }
        assert_eq!(slots.len(), 11);
    }

    #[tokio::test]
    async fn test_non_working_day_skips_gateway() {
        let mock = Arc::new(MockCalendar::failing());
        let sched = scheduler(mock.clone(), ScheduleConfig::default());

        let saturday = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(saturday.weekday(), Weekday::Sat);

        let slots = sched.slots_at(saturday, long_ago()).await.unwrap();
        assert!(slots.is_empty());
        assert_eq!(mock.list_calls(), 0);
    }

    #[tokio::test]
    async fn test_gateway_failure_yields_generic_error() {
        let mock = Arc::new(MockCalendar::failing());
        let sched = scheduler(mock, ScheduleConfig::default());

        let err = sched.slots_at(monday(), long_ago()).await.unwrap_err();
        let message = err.to_string();
        assert!(!message.contains("quota"));
        assert!(message.contains("try again"));
    }

    #[tokio::test]
    async fn test_window_uses_configured_timezone() {
        let config = ScheduleConfig {
            timezone: chrono_tz::Asia::Tokyo,
            working_hours: WorkingHours { start: 9, end: 12 },
            buffer_minutes: 0,
            slot_duration_minutes: 60,
            ..ScheduleConfig::default()
        };
        let mock = Arc::new(MockCalendar::new());
        let sched = scheduler(mock, config);

        let slots = sched.slots_at(monday(), long_ago()).await.unwrap();

        // 09:00 JST is 00:00 UTC
        let starts: Vec<_> = slots.iter().map(|s| s.start).collect();
        assert_eq!(
            starts,
            vec![utc(monday(), 0, 0), utc(monday(), 1, 0), utc(monday(), 2, 0)]
        );
    }

    #[test]
    fn test_slots_never_overrun_window() {
        let config = ScheduleConfig {
            slot_duration_minutes: 50,
            buffer_minutes: 10,
            working_hours: WorkingHours { start: 10, end: 12 },
            ..ScheduleConfig::default()
        };
        let (start, end) = day_window(&config, monday()).unwrap();
        let slots = build_slots(&config, start, end, &[], long_ago());

        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].end, utc(monday(), 11, 50));
    }

    #[test]
    fn test_dates_cover_window_working_days_only() {
        let config = ScheduleConfig::default();
        // Friday
        let today = NaiveDate::from_ymd_opt(2026, 3, 6).unwrap();

        let dates = dates_after(&config, today);

        assert_eq!(dates.len(), 10);
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2026, 3, 9).unwrap());
        assert_eq!(*dates.last().unwrap(), NaiveDate::from_ymd_opt(2026, 3, 20).unwrap());
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
        assert!(dates
            .iter()
            .all(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun)));
        assert!(dates.iter().all(|d| *d > today && *d <= today + Duration::days(14)));
    }

    #[test]
    fn test_dates_respect_custom_weekdays() {
        let config = ScheduleConfig {
            working_days: vec![Weekday::Sat],
            booking_window_days: 3,
            ..ScheduleConfig::default()
        };
        let today = NaiveDate::from_ymd_opt(2026, 3, 6).unwrap();
        assert_eq!(
            dates_after(&config, today),
            vec![NaiveDate::from_ymd_opt(2026, 3, 7).unwrap()]
        );
    }

    #[test]
    fn test_available_dates_start_tomorrow() {
        let mock = Arc::new(MockCalendar::new());
        let config = ScheduleConfig {
            working_days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
                Weekday::Sun,
            ],
            ..ScheduleConfig::default()
        };
        let sched = scheduler(mock.clone(), config);
        let today = Utc::now().date_naive();

        let dates = sched.get_available_dates();
        assert_eq!(dates.len(), 14);
        assert_eq!(dates[0], today.succ_opt().unwrap());
        assert_eq!(mock.list_calls(), 0);
    }
}
