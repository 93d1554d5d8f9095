use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::activity::{DailyActivity, WorkCommand, WorkEvent, WorkStatus};
use crate::calendar::DayRange;
use crate::error::ShiftlogError;
use crate::store::{SaveSummary, WorkEventStore};

/// Drives a worker's day through the load → add_event → save cycle.
pub struct ShiftTracker<S> {
    store: S,
}

impl<S: WorkEventStore> ShiftTracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record one command for `worker_id`, returning the resulting status.
    ///
    /// The day is loaded from the store, the event is validated against it
    /// and the whole day is saved back. Nothing is written when validation
    /// fails.
    pub async fn record(
        &self,
        worker_id: &str,
        command: WorkCommand,
        timestamp: NaiveDateTime,
    ) -> Result<WorkStatus, ShiftlogError> {
        let mut activity = self
            .store
            .get_daily_activity(worker_id, timestamp.date())
            .await?;
        let status = activity.add_event(WorkEvent::new(command, timestamp))?;
        self.store.save_daily_activity(worker_id, &activity).await?;

        debug!(worker_id, %command, %status, "recorded work event");
        Ok(status)
    }

    /// Replace a whole day with `events` after validating them.
    pub async fn replace_day(
        &self,
        worker_id: &str,
        day: NaiveDate,
        events: Vec<WorkEvent>,
    ) -> Result<SaveSummary, ShiftlogError> {
        let activity = DailyActivity::from_events(worker_id, day, events)?;
        if activity.is_empty() {
            self.store.clear_daily_activity(worker_id, day).await?;
            return Ok(SaveSummary::default());
        }
        Ok(self.store.save_daily_activity(worker_id, &activity).await?)
    }

    pub async fn day(&self, worker_id: &str, day: NaiveDate) -> Result<DailyActivity, ShiftlogError> {
        Ok(self.store.get_daily_activity(worker_id, day).await?)
    }

    pub async fn period(
        &self,
        worker_id: &str,
        period: &DayRange,
    ) -> Result<Vec<DailyActivity>, ShiftlogError> {
        Ok(self.store.list_daily_activities(worker_id, period).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ActivityError;
    use crate::store::InMemoryWorkEventStore;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
    }

    fn at(h: u32) -> NaiveDateTime {
        day().and_hms_opt(h, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn records_a_full_day() {
        let tracker = ShiftTracker::new(InMemoryWorkEventStore::new());
        let steps = [
            (WorkCommand::StartWork, 9, WorkStatus::Working),
            (WorkCommand::StartBreak, 12, WorkStatus::OnBreak),
            (WorkCommand::EndBreak, 13, WorkStatus::Working),
            (WorkCommand::EndWork, 18, WorkStatus::Finished),
        ];
        for (command, hour, expected) in steps {
            let status = tracker.record("w-1", command, at(hour)).await.unwrap();
            assert_eq!(status, expected);
        }

        let activity = tracker.day("w-1", day()).await.unwrap();
        assert!(activity.is_finished());
        assert_eq!(tracker.store().len().await, 4);
    }

    #[tokio::test]
    async fn rejected_event_is_not_persisted() {
        let tracker = ShiftTracker::new(InMemoryWorkEventStore::new());
        tracker
            .record("w-1", WorkCommand::StartWork, at(9))
            .await
            .unwrap();

        let err = tracker
            .record("w-1", WorkCommand::EndBreak, at(10))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ShiftlogError::Activity(ActivityError::InvalidCommand { .. })
        ));
        assert_eq!(tracker.store().len().await, 1);
    }

    #[tokio::test]
    async fn replace_day_with_nothing_clears_it() {
        let tracker = ShiftTracker::new(InMemoryWorkEventStore::new());
        tracker
            .record("w-1", WorkCommand::StartWork, at(9))
            .await
            .unwrap();

        tracker.replace_day("w-1", day(), Vec::new()).await.unwrap();
        assert!(tracker.store().is_empty().await);
    }

    #[tokio::test]
    async fn replace_day_swaps_only_changed_events() {
        let tracker = ShiftTracker::new(InMemoryWorkEventStore::new());
        tracker
            .record("w-1", WorkCommand::StartWork, at(9))
            .await
            .unwrap();
        tracker
            .record("w-1", WorkCommand::EndWork, at(17))
            .await
            .unwrap();

        let summary = tracker
            .replace_day(
                "w-1",
                day(),
                vec![
                    WorkEvent::new(WorkCommand::StartWork, at(9)),
                    WorkEvent::new(WorkCommand::EndWork, at(18)),
                ],
            )
            .await
            .unwrap();
        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.removed, 1);
        assert_eq!(summary.unchanged, 1);
    }
}
