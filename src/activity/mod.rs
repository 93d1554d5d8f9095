mod daily;
mod event;
mod status;

pub use daily::DailyActivity;
pub use event::{WorkEvent, is_same_event};
pub use status::{WorkCommand, WorkStatus, available_commands, next_status};
