use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::activity::{WorkCommand, WorkStatus};

#[derive(Debug, Error)]
pub enum ShiftlogError {
    #[error("Activity error: {0}")]
    Activity(#[from] ActivityError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rejections produced while validating a worker's day against the
/// shift state machine.
///
/// `FirstCommandNotStart` is the replay-time form of `InvalidCommand`:
/// a day that does not open with `StartWork`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActivityError {
    #[error("invalid command: {command} is not available while {status}")]
    InvalidCommand {
        command: WorkCommand,
        status: WorkStatus,
    },

    #[error("first command must be \"{}\", got \"{command}\"", WorkCommand::START)]
    FirstCommandNotStart { command: WorkCommand },

    #[error("invalid timestamp: {timestamp} is not after {last}")]
    InvalidTimestamp {
        timestamp: NaiveDateTime,
        last: NaiveDateTime,
    },

    #[error("timestamp {timestamp} is outside of day {day}")]
    OutsideDay {
        timestamp: NaiveDateTime,
        day: NaiveDate,
    },

    #[error("unknown work command: {0}")]
    UnknownCommand(String),
}

impl ActivityError {
    /// True for every rejection caused by an illegal command, including the
    /// first-event rule.
    pub fn is_invalid_command(&self) -> bool {
        matches!(
            self,
            ActivityError::InvalidCommand { .. } | ActivityError::FirstCommandNotStart { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// Stored rows for a day no longer replay into a legal shift. Only
    /// validated aggregates are ever saved, so this means the rows were
    /// corrupted or written by someone else.
    #[error("stored events for worker {worker_id} on {day} are inconsistent: {source}")]
    Consistency {
        worker_id: String,
        day: NaiveDate,
        #[source]
        source: ActivityError,
    },

    #[error("activity belongs to worker {found}, not {expected}")]
    WorkerMismatch { expected: String, found: String },

    #[error("day load task failed: {0}")]
    Join(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn first_command_display() {
        let err = ActivityError::FirstCommandNotStart {
            command: WorkCommand::StartBreak,
        };
        assert_eq!(
            err.to_string(),
            "first command must be \"start_work\", got \"start_break\""
        );
        assert!(err.is_invalid_command());
    }

    #[test]
    fn invalid_timestamp_display() {
        let err = ActivityError::InvalidTimestamp {
            timestamp: at(8, 0),
            last: at(18, 0),
        };
        assert_eq!(
            err.to_string(),
            "invalid timestamp: 2024-05-06 08:00:00 is not after 2024-05-06 18:00:00"
        );
        assert!(!err.is_invalid_command());
    }

    #[test]
    fn consistency_error_carries_worker_context() {
        let err = StoreError::Consistency {
            worker_id: "w-1".into(),
            day: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            source: ActivityError::InvalidCommand {
                command: WorkCommand::EndBreak,
                status: WorkStatus::Working,
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("w-1"));
        assert!(msg.contains("2024-05-06"));
        assert!(msg.contains("end_break"));
    }

    #[test]
    fn errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ActivityError>();
        assert_send_sync::<StoreError>();
        assert_send_sync::<ShiftlogError>();
    }
}
