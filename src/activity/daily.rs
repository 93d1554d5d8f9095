use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::event::WorkEvent;
use super::status::{WorkCommand, WorkStatus};
use crate::error::ActivityError;

/// One worker's validated sequence of status changes for one calendar day.
///
/// The event list is private: the only ways in are [`DailyActivity::new`],
/// [`DailyActivity::from_events`] and [`DailyActivity::add_event`], all of
/// which run the same checks. It is `Serialize` for reporting but not
/// `Deserialize`, so it cannot be rebuilt around an unchecked list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyActivity {
    worker_id: String,
    day: NaiveDate,
    events: Vec<WorkEvent>,
}

impl DailyActivity {
    /// An empty day, still `BeforeWork`.
    pub fn new(worker_id: impl Into<String>, day: NaiveDate) -> Self {
        Self {
            worker_id: worker_id.into(),
            day,
            events: Vec::new(),
        }
    }

    /// Rebuild a day from raw events already sorted by timestamp.
    ///
    /// Every event is replayed through the same validation as
    /// [`add_event`](Self::add_event), starting from `BeforeWork`. On the
    /// first rejection the whole reconstruction fails; no partial aggregate
    /// is returned.
    pub fn from_events(
        worker_id: impl Into<String>,
        day: NaiveDate,
        events: impl IntoIterator<Item = WorkEvent>,
    ) -> Result<Self, ActivityError> {
        let mut events = events.into_iter().peekable();
        if let Some(first) = events.peek()
            && first.command != WorkCommand::START
        {
            return Err(ActivityError::FirstCommandNotStart {
                command: first.command,
            });
        }

        let mut activity = Self::new(worker_id, day);
        for event in events {
            activity.add_event(event)?;
        }
        Ok(activity)
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    /// Status implied by the last event, or `BeforeWork` for an empty day.
    pub fn current_status(&self) -> WorkStatus {
        self.events
            .last()
            .map_or(WorkStatus::INITIAL, |e| e.command.next_status())
    }

    pub fn is_finished(&self) -> bool {
        self.current_status().is_terminal()
    }

    /// Validate and append one event, returning the resulting status.
    ///
    /// The aggregate is left untouched when an error is returned.
    pub fn add_event(&mut self, event: WorkEvent) -> Result<WorkStatus, ActivityError> {
        let status = self.current_status();
        if !status.allows(event.command) {
            return Err(ActivityError::InvalidCommand {
                command: event.command,
                status,
            });
        }
        if let Some(last) = self.finished_at()
            && event.timestamp <= last
        {
            return Err(ActivityError::InvalidTimestamp {
                timestamp: event.timestamp,
                last,
            });
        }
        if event.day() != self.day {
            return Err(ActivityError::OutsideDay {
                timestamp: event.timestamp,
                day: self.day,
            });
        }

        self.events.push(event);
        Ok(event.command.next_status())
    }

    /// Read-only view of the events in chronological order.
    pub fn events(&self) -> &[WorkEvent] {
        &self.events
    }

    /// Owned copy of the events; changing it does not affect the aggregate.
    pub fn to_events(&self) -> Vec<WorkEvent> {
        self.events.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn started_at(&self) -> Option<NaiveDateTime> {
        self.events.first().map(|e| e.timestamp)
    }

    pub fn finished_at(&self) -> Option<NaiveDateTime> {
        self.events.last().map(|e| e.timestamp)
    }

    /// Time spent `Working` between recorded events. A shift that is still
    /// open only counts up to its last event.
    pub fn worked_duration(&self) -> Duration {
        self.time_in(WorkStatus::Working)
    }

    /// Time spent `OnBreak` between recorded events.
    pub fn break_duration(&self) -> Duration {
        self.time_in(WorkStatus::OnBreak)
    }

    fn time_in(&self, status: WorkStatus) -> Duration {
        self.events
            .windows(2)
            .filter(|pair| pair[0].command.next_status() == status)
            .map(|pair| pair[1].timestamp - pair[0].timestamp)
            .fold(Duration::zero(), |acc, d| acc + d)
    }
}
