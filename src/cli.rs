//! Command line interface built on clap.
//!
//! [`Cli`] carries the subcommands ([`Command::Replay`], [`Command::Add`],
//! [`Command::Demo`])
//! and the global `--worker` / `--verbose` flags.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};

use crate::activity::{WorkCommand, WorkEvent};
use crate::error::ShiftlogError;

/// shiftlog — validate and store a worker's daily shift events.
#[derive(Debug, Parser)]
#[command(name = "shiftlog", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Worker id, overriding the configured one.
    #[arg(long, short, global = true)]
    pub worker: Option<String>,

    /// Enable debug logging.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate a day of events from a JSON file and print its summary.
    Replay {
        /// JSON array of `{"command": ..., "timestamp": ...}` objects.
        #[arg(long, short)]
        file: PathBuf,
    },

    /// Append one command to a day file, creating the file if needed.
    Add {
        /// JSON day file, in the format read by `replay`.
        #[arg(long, short)]
        file: PathBuf,

        /// start_work, start_break, end_break or end_work.
        command: WorkCommand,

        /// Wall-clock time of the command, e.g. 09:00.
        #[arg(long)]
        at: NaiveTime,

        /// Day of a new file. Defaults to the file's day, then today.
        #[arg(long)]
        day: Option<NaiveDate>,
    },

    /// Run a sample shift through the in-memory store.
    Demo,
}

/// Read a JSON array of events, as accepted by `replay`.
pub fn read_events(path: &Path) -> Result<Vec<WorkEvent>, ShiftlogError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Write events as the JSON array read by [`read_events`].
pub fn write_events(path: &Path, events: &[WorkEvent]) -> Result<(), ShiftlogError> {
    let contents = serde_json::to_string_pretty(events)?;
    std::fs::write(path, contents)?;
    Ok(())
}
