use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ActivityError;

/// The statuses a worker moves through during one shift.
///
/// Each day flows through: BEFORE_WORK → WORKING ⇄ ON_BREAK → FINISHED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    BeforeWork,
    Working,
    OnBreak,
    Finished,
}

/// Actions a worker issues to change status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkCommand {
    StartWork,
    StartBreak,
    EndBreak,
    EndWork,
}

impl WorkStatus {
    pub const ALL: [WorkStatus; 4] = [
        WorkStatus::BeforeWork,
        WorkStatus::Working,
        WorkStatus::OnBreak,
        WorkStatus::Finished,
    ];

    /// Status of a day with no recorded events.
    pub const INITIAL: WorkStatus = WorkStatus::BeforeWork;

    /// Commands that are legal while in this status.
    pub fn available_commands(self) -> &'static [WorkCommand] {
        available_commands(self)
    }

    pub fn allows(self, command: WorkCommand) -> bool {
        available_commands(self).contains(&command)
    }

    /// A terminal status has no outgoing commands.
    pub fn is_terminal(self) -> bool {
        available_commands(self).is_empty()
    }
}

impl WorkCommand {
    pub const ALL: [WorkCommand; 4] = [
        WorkCommand::StartWork,
        WorkCommand::StartBreak,
        WorkCommand::EndBreak,
        WorkCommand::EndWork,
    ];

    /// The only command accepted from [`WorkStatus::INITIAL`].
    pub const START: WorkCommand = WorkCommand::StartWork;

    pub fn next_status(self) -> WorkStatus {
        next_status(self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WorkCommand::StartWork => "start_work",
            WorkCommand::StartBreak => "start_break",
            WorkCommand::EndBreak => "end_break",
            WorkCommand::EndWork => "end_work",
        }
    }
}

/// Status produced by executing `command`.
pub fn next_status(command: WorkCommand) -> WorkStatus {
    match command {
        WorkCommand::StartWork => WorkStatus::Working,
        WorkCommand::StartBreak => WorkStatus::OnBreak,
        WorkCommand::EndBreak => WorkStatus::Working,
        WorkCommand::EndWork => WorkStatus::Finished,
    }
}

/// Commands legal while in `status`. Empty for terminal statuses.
pub fn available_commands(status: WorkStatus) -> &'static [WorkCommand] {
    match status {
        WorkStatus::BeforeWork => &[WorkCommand::StartWork],
        WorkStatus::Working => &[WorkCommand::StartBreak, WorkCommand::EndWork],
        WorkStatus::OnBreak => &[WorkCommand::EndBreak],
        WorkStatus::Finished => &[],
    }
}

impl fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkStatus::BeforeWork => write!(f, "before work"),
            WorkStatus::Working => write!(f, "working"),
            WorkStatus::OnBreak => write!(f, "on break"),
            WorkStatus::Finished => write!(f, "finished"),
        }
    }
}

impl fmt::Display for WorkCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for WorkCommand {
    type Err = ActivityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        WorkCommand::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| ActivityError::UnknownCommand(s.to_string()))
    }
}
