use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::diff::diff_by;
use super::{SaveSummary, WorkEventStore};
use crate::activity::{DailyActivity, WorkEvent, is_same_event};
use crate::calendar::DayRange;
use crate::error::{StoreError, StoreResult};

/// A persisted event row.
///
/// `row_id` and `stored_at` stand in for the per-row metadata a durable
/// backend keeps (primary key, audit columns). A save leaves them alone for
/// every event that did not change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEvent {
    pub row_id: Uuid,
    pub worker_id: String,
    pub event: WorkEvent,
    pub stored_at: DateTime<Utc>,
}

impl StoredEvent {
    fn new(worker_id: &str, event: WorkEvent, stored_at: DateTime<Utc>) -> Self {
        Self {
            row_id: Uuid::new_v4(),
            worker_id: worker_id.to_string(),
            event,
            stored_at,
        }
    }

    fn belongs_to(&self, worker_id: &str, day: NaiveDate) -> bool {
        self.worker_id == worker_id && self.event.day() == day
    }
}

type DayKey = (String, NaiveDate);

#[derive(Debug, Default)]
struct Inner {
    rows: RwLock<Vec<StoredEvent>>,
    // Serializes read-diff-write per (worker, day).
    day_locks: DashMap<DayKey, Arc<Mutex<()>>>,
}

/// Reference [`WorkEventStore`] keeping rows in memory.
///
/// Cloning is cheap and every clone shares the same rows.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkEventStore {
    inner: Arc<Inner>,
}

impl InMemoryWorkEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored rows of the worker's day, sorted by timestamp.
    pub async fn rows(&self, worker_id: &str, day: NaiveDate) -> Vec<StoredEvent> {
        let rows = self.inner.rows.read().await;
        let mut selected: Vec<StoredEvent> = rows
            .iter()
            .filter(|r| r.belongs_to(worker_id, day))
            .cloned()
            .collect();
        selected.sort_by_key(|r| r.event.timestamp);
        selected
    }

    /// Total number of stored rows across all workers and days.
    pub async fn len(&self) -> usize {
        self.inner.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Append a row without any validation, the way an external writer or a
    /// bulk import would. Used to exercise load-time consistency checks.
    pub async fn insert_unchecked(&self, worker_id: &str, event: WorkEvent) -> Uuid {
        let row = StoredEvent::new(worker_id, event, Utc::now());
        let row_id = row.row_id;
        self.inner.rows.write().await.push(row);
        row_id
    }

    fn day_lock(&self, worker_id: &str, day: NaiveDate) -> Arc<Mutex<()>> {
        self.inner
            .day_locks
            .entry((worker_id.to_string(), day))
            .or_default()
            .clone()
    }

    async fn load_day(&self, worker_id: &str, day: NaiveDate) -> StoreResult<DailyActivity> {
        let rows = self.rows(worker_id, day).await;
        debug!(worker_id, %day, rows = rows.len(), "loading daily activity");

        DailyActivity::from_events(worker_id, day, rows.into_iter().map(|r| r.event)).map_err(
            |source| {
                warn!(worker_id, %day, error = %source, "stored events failed validation");
                StoreError::Consistency {
                    worker_id: worker_id.to_string(),
                    day,
                    source,
                }
            },
        )
    }

    async fn load_period(
        &self,
        worker_id: &str,
        period: &DayRange,
    ) -> StoreResult<Vec<DailyActivity>> {
        let mut tasks = JoinSet::new();
        for (index, day) in period.days().enumerate() {
            let store = self.clone();
            let worker_id = worker_id.to_string();
            tasks.spawn(async move { (index, store.load_day(&worker_id, day).await) });
        }

        let mut slots: Vec<Option<DailyActivity>> = vec![None; period.len()];
        while let Some(joined) = tasks.join_next().await {
            let (index, result) = joined.map_err(|e| StoreError::Join(e.to_string()))?;
            slots[index] = Some(result?);
        }
        Ok(slots.into_iter().flatten().collect())
    }

    async fn save_day(&self, worker_id: &str, activity: &DailyActivity) -> StoreResult<SaveSummary> {
        let Some(first) = activity.events().first() else {
            debug!(worker_id, day = %activity.day(), "empty activity, nothing to save");
            return Ok(SaveSummary::default());
        };
        if activity.worker_id() != worker_id {
            return Err(StoreError::WorkerMismatch {
                expected: worker_id.to_string(),
                found: activity.worker_id().to_string(),
            });
        }
        let day = first.day();

        let lock = self.day_lock(worker_id, day);
        let _guard = lock.lock().await;

        let stored = self.rows(worker_id, day).await;
        let diff = diff_by(&stored, activity.events(), |row, event| {
            is_same_event(&row.event, event)
        });
        let summary = SaveSummary {
            inserted: diff.insert.len(),
            removed: diff.remove.len(),
            unchanged: diff.unchanged,
        };
        if diff.is_empty() {
            debug!(worker_id, %day, unchanged = summary.unchanged, "activity already stored");
            return Ok(summary);
        }

        let lost: HashSet<Uuid> = diff.remove.iter().map(|&ix| stored[ix].row_id).collect();
        let now = Utc::now();
        let fresh: Vec<StoredEvent> = diff
            .insert
            .into_iter()
            .map(|event| StoredEvent::new(worker_id, *event, now))
            .collect();

        // Removals and insertions land under one write guard.
        {
            let mut rows = self.inner.rows.write().await;
            rows.retain(|r| !lost.contains(&r.row_id));
            rows.extend(fresh);
        }

        info!(
            worker_id,
            %day,
            inserted = summary.inserted,
            removed = summary.removed,
            unchanged = summary.unchanged,
            "saved daily activity"
        );
        Ok(summary)
    }

    async fn clear_day(&self, worker_id: &str, day: NaiveDate) -> StoreResult<usize> {
        let lock = self.day_lock(worker_id, day);
        let _guard = lock.lock().await;

        let mut rows = self.inner.rows.write().await;
        let before = rows.len();
        rows.retain(|r| !r.belongs_to(worker_id, day));
        let removed = before - rows.len();

        info!(worker_id, %day, removed, "cleared daily activity");
        Ok(removed)
    }
}

impl WorkEventStore for InMemoryWorkEventStore {
    async fn get_daily_activity(
        &self,
        worker_id: &str,
        day: NaiveDate,
    ) -> StoreResult<DailyActivity> {
        self.load_day(worker_id, day).await
    }

    async fn list_daily_activities(
        &self,
        worker_id: &str,
        period: &DayRange,
    ) -> StoreResult<Vec<DailyActivity>> {
        self.load_period(worker_id, period).await
    }

    async fn save_daily_activity(
        &self,
        worker_id: &str,
        activity: &DailyActivity,
    ) -> StoreResult<SaveSummary> {
        self.save_day(worker_id, activity).await
    }

    async fn clear_daily_activity(&self, worker_id: &str, day: NaiveDate) -> StoreResult<usize> {
        self.clear_day(worker_id, day).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{WorkCommand, WorkStatus};
    use chrono::NaiveDateTime;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        day().and_hms_opt(h, m, 0).unwrap()
    }

    fn ev(command: WorkCommand, h: u32) -> WorkEvent {
        WorkEvent::new(command, at(h, 0))
    }

    fn full_day() -> Vec<WorkEvent> {
        vec![
            ev(WorkCommand::StartWork, 9),
            ev(WorkCommand::StartBreak, 12),
            ev(WorkCommand::EndBreak, 13),
            ev(WorkCommand::EndWork, 18),
        ]
    }

    #[tokio::test]
    async fn unknown_day_loads_empty() {
        let store = InMemoryWorkEventStore::new();
        let activity = store.get_daily_activity("w-1", day()).await.unwrap();
        assert_eq!(activity.current_status(), WorkStatus::BeforeWork);
        assert_eq!(activity.worker_id(), "w-1");
        assert_eq!(activity.day(), day());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let store = InMemoryWorkEventStore::new();
        let activity = DailyActivity::from_events("w-1", day(), full_day()).unwrap();

        let summary = store.save_daily_activity("w-1", &activity).await.unwrap();
        assert_eq!(
            summary,
            SaveSummary {
                inserted: 4,
                removed: 0,
                unchanged: 0
            }
        );

        let loaded = store.get_daily_activity("w-1", day()).await.unwrap();
        assert_eq!(loaded, activity);
    }

    #[tokio::test]
    async fn saving_empty_activity_keeps_stored_rows() {
        let store = InMemoryWorkEventStore::new();
        let activity = DailyActivity::from_events("w-1", day(), full_day()).unwrap();
        store.save_daily_activity("w-1", &activity).await.unwrap();

        let empty = DailyActivity::new("w-1", day());
        let summary = store.save_daily_activity("w-1", &empty).await.unwrap();
        assert!(summary.is_noop());
        assert_eq!(store.rows("w-1", day()).await.len(), 4);
    }

    #[tokio::test]
    async fn unchanged_rows_keep_their_identity() {
        let store = InMemoryWorkEventStore::new();
        let mut activity =
            DailyActivity::from_events("w-1", day(), full_day()[..3].to_vec()).unwrap();
        store.save_daily_activity("w-1", &activity).await.unwrap();
        let before = store.rows("w-1", day()).await;

        activity.add_event(ev(WorkCommand::EndWork, 18)).unwrap();
        let summary = store.save_daily_activity("w-1", &activity).await.unwrap();
        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.removed, 0);
        assert_eq!(summary.unchanged, 3);

        let after = store.rows("w-1", day()).await;
        assert_eq!(&after[..3], before.as_slice());
    }

    #[tokio::test]
    async fn resaving_identical_activity_is_a_noop() {
        let store = InMemoryWorkEventStore::new();
        let activity = DailyActivity::from_events("w-1", day(), full_day()).unwrap();
        store.save_daily_activity("w-1", &activity).await.unwrap();
        let summary = store.save_daily_activity("w-1", &activity).await.unwrap();
        assert!(summary.is_noop());
        assert_eq!(summary.unchanged, 4);
    }

    #[tokio::test]
    async fn workers_do_not_see_each_other() {
        let store = InMemoryWorkEventStore::new();
        let a = DailyActivity::from_events("a", day(), full_day()).unwrap();
        let b = DailyActivity::from_events("b", day(), full_day()[..1].to_vec()).unwrap();
        store.save_daily_activity("a", &a).await.unwrap();
        store.save_daily_activity("b", &b).await.unwrap();

        assert_eq!(store.get_daily_activity("a", day()).await.unwrap().len(), 4);
        assert_eq!(store.get_daily_activity("b", day()).await.unwrap().len(), 1);
        assert_eq!(store.len().await, 5);
    }

    #[tokio::test]
    async fn worker_mismatch_writes_nothing() {
        let store = InMemoryWorkEventStore::new();
        let activity = DailyActivity::from_events("a", day(), full_day()).unwrap();
        let err = store.save_daily_activity("b", &activity).await.unwrap_err();
        assert!(matches!(err, StoreError::WorkerMismatch { .. }));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn unsorted_rows_are_sorted_before_replay() {
        let store = InMemoryWorkEventStore::new();
        for event in full_day().into_iter().rev() {
            store.insert_unchecked("w-1", event).await;
        }
        let loaded = store.get_daily_activity("w-1", day()).await.unwrap();
        assert_eq!(loaded.events(), full_day().as_slice());
    }

    #[tokio::test]
    async fn duplicated_rows_are_collapsed_on_save() {
        let store = InMemoryWorkEventStore::new();
        store.insert_unchecked("w-1", ev(WorkCommand::StartWork, 9)).await;
        store.insert_unchecked("w-1", ev(WorkCommand::StartWork, 9)).await;

        let activity = DailyActivity::from_events(
            "w-1",
            day(),
            vec![ev(WorkCommand::StartWork, 9), ev(WorkCommand::EndWork, 17)],
        )
        .unwrap();
        let summary = store.save_daily_activity("w-1", &activity).await.unwrap();
        assert_eq!(
            summary,
            SaveSummary {
                inserted: 1,
                removed: 1,
                unchanged: 1
            }
        );
        assert_eq!(store.rows("w-1", day()).await.len(), 2);

        let loaded = store.get_daily_activity("w-1", day()).await.unwrap();
        assert_eq!(loaded, activity);
    }

    #[tokio::test]
    async fn corrupted_rows_fail_to_load() {
        let store = InMemoryWorkEventStore::new();
        store
            .insert_unchecked("w-1", ev(WorkCommand::StartBreak, 12))
            .await;

        let err = store.get_daily_activity("w-1", day()).await.unwrap_err();
        match err {
            StoreError::Consistency {
                worker_id,
                day: failed_day,
                source,
            } => {
                assert_eq!(worker_id, "w-1");
                assert_eq!(failed_day, day());
                assert!(source.is_invalid_command());
            }
            other => panic!("expected consistency error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn clear_removes_only_that_day() {
        let store = InMemoryWorkEventStore::new();
        let today = DailyActivity::from_events("w-1", day(), full_day()).unwrap();
        let tomorrow_day = day().succ_opt().unwrap();
        let tomorrow = DailyActivity::from_events(
            "w-1",
            tomorrow_day,
            vec![WorkEvent::new(
                WorkCommand::StartWork,
                tomorrow_day.and_hms_opt(8, 0, 0).unwrap(),
            )],
        )
        .unwrap();
        store.save_daily_activity("w-1", &today).await.unwrap();
        store.save_daily_activity("w-1", &tomorrow).await.unwrap();

        assert_eq!(store.clear_daily_activity("w-1", day()).await.unwrap(), 4);
        assert!(store.rows("w-1", day()).await.is_empty());
        assert_eq!(store.rows("w-1", tomorrow_day).await.len(), 1);
    }

    #[tokio::test]
    async fn list_returns_days_in_order() {
        let store = InMemoryWorkEventStore::new();
        let second = day().succ_opt().unwrap();
        let activity = DailyActivity::from_events(
            "w-1",
            second,
            vec![WorkEvent::new(
                WorkCommand::StartWork,
                second.and_hms_opt(9, 0, 0).unwrap(),
            )],
        )
        .unwrap();
        store.save_daily_activity("w-1", &activity).await.unwrap();

        let period = DayRange::new(day(), day() + chrono::Duration::days(2)).unwrap();
        let days = store.list_daily_activities("w-1", &period).await.unwrap();
        let statuses: Vec<_> = days.iter().map(|a| a.current_status()).collect();
        assert_eq!(
            statuses,
            vec![
                WorkStatus::BeforeWork,
                WorkStatus::Working,
                WorkStatus::BeforeWork
            ]
        );
        let listed: Vec<_> = days.iter().map(|a| a.day()).collect();
        assert_eq!(listed, period.days().collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn list_fails_when_any_day_is_corrupted() {
        let store = InMemoryWorkEventStore::new();
        let second = day().succ_opt().unwrap();
        store
            .insert_unchecked(
                "w-1",
                WorkEvent::new(WorkCommand::EndWork, second.and_hms_opt(17, 0, 0).unwrap()),
            )
            .await;

        let period = DayRange::new(day(), second).unwrap();
        let err = store
            .list_daily_activities("w-1", &period)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Consistency { day, .. } if day == second));
    }
}
