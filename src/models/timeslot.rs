use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A bookable time slot. Slots are returned whether or not they are free;
/// callers must check `available`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub available: bool,
}

impl TimeSlot {
    pub fn new(start: DateTime<Utc>, duration: Duration, available: bool) -> Self {
        Self {
            id: Self::id_for(start),
            start,
            end: start + duration,
            available,
        }
    }

    /// Slot identifiers are the start instant in epoch milliseconds.
    pub fn id_for(start: DateTime<Utc>) -> String {
        format!("slot-{}", start.timestamp_millis())
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Half-open overlap test against a busy interval
    pub fn overlaps(&self, busy: &BusyInterval) -> bool {
        self.start < busy.end && self.end > busy.start
    }
}

/// A range during which the remote calendar is already occupied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BusyInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }
}
