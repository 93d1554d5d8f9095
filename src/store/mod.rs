//! Persistence contract for work events.
//!
//! A store keeps raw `(worker, event)` rows and hands out whole
//! [`DailyActivity`] aggregates. Loads always replay the rows through
//! [`DailyActivity::from_events`]; saves reconcile the aggregate against the
//! stored rows by event identity (see [`diff`]).

pub mod diff;
mod memory;

use chrono::NaiveDate;
use serde::Serialize;

use crate::activity::DailyActivity;
use crate::calendar::DayRange;
use crate::error::StoreResult;

pub use memory::{InMemoryWorkEventStore, StoredEvent};

/// What a save changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SaveSummary {
    pub inserted: usize,
    pub removed: usize,
    pub unchanged: usize,
}

impl SaveSummary {
    pub fn is_noop(&self) -> bool {
        self.inserted == 0 && self.removed == 0
    }
}

/// Storage of work events keyed by worker and calendar day.
pub trait WorkEventStore: Send + Sync {
    /// Load the worker's events on `day`, sorted, and rebuild the aggregate.
    ///
    /// Fails with [`StoreError::Consistency`](crate::error::StoreError::Consistency)
    /// when the stored rows do not form a legal shift.
    fn get_daily_activity(
        &self,
        worker_id: &str,
        day: NaiveDate,
    ) -> impl Future<Output = StoreResult<DailyActivity>> + Send;

    /// One aggregate per day of `period`, in day order.
    fn list_daily_activities(
        &self,
        worker_id: &str,
        period: &DayRange,
    ) -> impl Future<Output = StoreResult<Vec<DailyActivity>>> + Send;

    /// Make the stored rows for the activity's day equal to its events.
    ///
    /// Saving an empty activity is a no-op; it never clears a day. Rows whose
    /// event is unchanged are left in place.
    fn save_daily_activity(
        &self,
        worker_id: &str,
        activity: &DailyActivity,
    ) -> impl Future<Output = StoreResult<SaveSummary>> + Send;

    /// Delete every row of the worker's day. Returns how many were removed.
    fn clear_daily_activity(
        &self,
        worker_id: &str,
        day: NaiveDate,
    ) -> impl Future<Output = StoreResult<usize>> + Send;
}
