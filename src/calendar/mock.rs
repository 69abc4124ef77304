//! In-memory gateway for tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{CalendarError, CalendarGateway, CreatedEvent, NewEvent};
use crate::models::BusyInterval;

#[derive(Default)]
pub struct MockCalendar {
    busy: Vec<BusyInterval>,
    failing: AtomicBool,
    list_calls: AtomicUsize,
    queried: Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>,
    inserted: Mutex<Vec<NewEvent>>,
    deleted: Mutex<Vec<String>>,
}

impl MockCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_busy(busy: Vec<BusyInterval>) -> Self {
        Self {
            busy,
            ..Self::default()
        }
    }

    /// Every call fails with an API error from now on
    pub fn failing() -> Self {
        let mock = Self::default();
        mock.failing.store(true, Ordering::SeqCst);
        mock
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn queried_ranges(&self) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        self.queried.lock().unwrap().clone()
    }

    pub fn inserted(&self) -> Vec<NewEvent> {
        self.inserted.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), CalendarError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CalendarError::Api {
                status: 500,
                body: "backend exploded: quota project 1234".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CalendarGateway for MockCalendar {
    async fn list_busy(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, CalendarError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.queried.lock().unwrap().push((start, end));
        self.check()?;
        Ok(self
            .busy
            .iter()
            .filter(|b| b.start < end && b.end > start)
            .copied()
            .collect())
    }

    async fn insert_event(&self, event: &NewEvent) -> Result<CreatedEvent, CalendarError> {
        self.check()?;
        let mut inserted = self.inserted.lock().unwrap();
        inserted.push(event.clone());
        let id = format!("evt{}", inserted.len());
        Ok(CreatedEvent {
            html_link: Some(format!("https://calendar.example.com/event?eid={}", id)),
            id,
        })
    }

    async fn delete_event(&self, event_id: &str) -> Result<(), CalendarError> {
        self.check()?;
        self.deleted.lock().unwrap().push(event_id.to_string());
        Ok(())
    }
}
