//! shiftlog: a worker's daily status changes, validated against the shift
//! state machine and persisted by identity diff.
//!
//! - [`activity`]: transition table, [`WorkEvent`](activity::WorkEvent) and
//!   the [`DailyActivity`](activity::DailyActivity) aggregate.
//! - [`store`]: the [`WorkEventStore`](store::WorkEventStore) contract and an
//!   in-memory implementation.
//! - [`tracker`]: load → add → save helper on top of a store.

pub mod activity;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod error;
pub mod store;
pub mod tracker;

pub use activity::{DailyActivity, WorkCommand, WorkEvent, WorkStatus};
pub use calendar::DayRange;
pub use error::{ActivityError, ShiftlogError, StoreError, StoreResult};
pub use store::{InMemoryWorkEventStore, SaveSummary, WorkEventStore};
pub use tracker::ShiftTracker;
