use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::TimeSlot;

/// Response for the bookable dates query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatesResponse {
    pub timezone: String,
    pub dates: Vec<NaiveDate>,
}

/// Query parameters for the slots endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
}

/// Response for the slots query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotsResponse {
    pub date: NaiveDate,
    pub timezone: String,
    pub slots: Vec<TimeSlot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelResponse {
    pub cancelled: bool,
}
