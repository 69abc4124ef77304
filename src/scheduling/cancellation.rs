use super::Scheduler;

impl Scheduler {
    /// Delete a booked event and notify attendees. Any failure is logged and
    /// reported as `false`.
    ///
    /// The id is not checked against anything this service created.
    pub async fn cancel_booking(&self, event_id: &str) -> bool {
        let event_id = event_id.trim();
        if event_id.is_empty() {
            tracing::warn!("Refusing to cancel an empty event id");
            return false;
        }

        match self.gateway.delete_event(event_id).await {
            Ok(()) => {
                tracing::info!("Cancelled {}", event_id);
                true
            }
            Err(e) => {
                tracing::error!("Failed to cancel {}: {}", event_id, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::mock::MockCalendar;
    use crate::models::ScheduleConfig;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_cancel_success() {
        let mock = Arc::new(MockCalendar::new());
        let sched = Scheduler::new(mock.clone(), Arc::new(ScheduleConfig::default()));

        assert!(sched.cancel_booking("evt1").await);
        assert_eq!(mock.deleted(), vec!["evt1".to_string()]);
    }

    #[tokio::test]
    async fn test_cancel_failure_returns_false() {
        let mock = Arc::new(MockCalendar::failing());
        let sched = Scheduler::new(mock, Arc::new(ScheduleConfig::default()));

        assert!(!sched.cancel_booking("evt1").await);
    }

    #[tokio::test]
    async fn test_blank_id_is_rejected() {
        let mock = Arc::new(MockCalendar::new());
        let sched = Scheduler::new(mock.clone(), Arc::new(ScheduleConfig::default()));

        assert!(!sched.cancel_booking("  ").await);
        assert!(mock.deleted().is_empty());
    }
}
