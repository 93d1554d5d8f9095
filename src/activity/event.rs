use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::status::WorkCommand;

/// A single status change issued by a worker.
///
/// Two events are the same event when both the command and the timestamp
/// match; timestamps compare at full precision, not per minute or per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkEvent {
    pub command: WorkCommand,
    pub timestamp: NaiveDateTime,
}

impl WorkEvent {
    pub fn new(command: WorkCommand, timestamp: NaiveDateTime) -> Self {
        Self { command, timestamp }
    }

    /// Calendar day the event belongs to.
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Identity used when reconciling stored rows against an aggregate.
pub fn is_same_event(a: &WorkEvent, b: &WorkEvent) -> bool {
    a.command == b.command && a.timestamp == b.timestamp
}
