use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionState;

/// Every session state change produces an Event.
/// The CLI prints them; nothing else depends on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    ScheduleLoaded {
        blocks: usize,
        at: DateTime<Utc>,
    },
    BlockStarted {
        index: usize,
        task_id: String,
        name: String,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    BlockPaused {
        index: usize,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    BlockResumed {
        index: usize,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero; the block waits for complete or skip.
    BlockElapsed {
        index: usize,
        at: DateTime<Utc>,
    },
    BlockCompleted {
        index: usize,
        at: DateTime<Utc>,
    },
    BlockSkipped {
        index: usize,
        at: DateTime<Utc>,
    },
    BlockMoved {
        from: usize,
        to: usize,
        at: DateTime<Utc>,
    },
    /// No block left to run.
    SessionFinished {
        completed: usize,
        total: usize,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: SessionState,
        current_index: Option<usize>,
        block_name: Option<String>,
        remaining_secs: u64,
        running: bool,
        completed: usize,
        total: usize,
        at: DateTime<Utc>,
    },
}
