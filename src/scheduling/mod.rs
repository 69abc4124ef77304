//! Availability, booking and cancellation against a [`CalendarGateway`].
//!
//! Nothing here is cached: every call goes back to the remote calendar, which
//! stays the only record of what is booked. There is no hold between a slot
//! being reported free and it being booked, so two callers can race for the
//! same slot.

mod availability;
mod booking;
mod cancellation;

pub use availability::*;
pub use booking::*;

use std::sync::Arc;

use crate::calendar::CalendarGateway;
use crate::models::ScheduleConfig;

/// Entry point for the scheduling operations
#[derive(Clone)]
pub struct Scheduler {
    gateway: Arc<dyn CalendarGateway>,
    config: Arc<ScheduleConfig>,
}

impl Scheduler {
    pub fn new(gateway: Arc<dyn CalendarGateway>, config: Arc<ScheduleConfig>) -> Self {
        Self { gateway, config }
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }
}
