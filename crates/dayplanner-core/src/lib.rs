//! # Dayplanner Core Library
//!
//! Core logic for the day planner: packing a day's tasks around fixed-time
//! anchors and running through the result one countdown at a time. The
//! `dayplanner` CLI is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Scheduler**: pure, deterministic packing of flexible tasks around
//!   anchors, plus re-packing after a manual reorder
//! - **Session Runner**: a deadline-based countdown state machine that the
//!   caller drives with `tick()`
//! - **Storage**: SQLite task store, kv state and TOML configuration
//! - **Export**: iCalendar output for generated schedules
//!
//! ## Key Components
//!
//! - [`DayScheduler`]: schedule generation and `move_block`
//! - [`SessionRunner`]: start/pause/resume/complete/skip over a [`Schedule`]
//! - [`TaskStore`] / [`TaskBoard`]: persistence seam and its local mirror
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod export;
pub mod schedule;
pub mod scheduler;
pub mod session;
pub mod storage;
pub mod task;
pub mod workspace;

pub use error::{ConfigError, CoreError, DatabaseError, StoreError, ValidationError};
pub use events::Event;
pub use export::to_ics;
pub use schedule::{Schedule, ScheduleBlock};
pub use scheduler::{DayScheduler, SchedulerConfig};
pub use session::{
    AlertPattern, CadenceToken, Clock, ManualClock, Notifier, NullNotifier, SessionRunner,
    SessionState, SystemClock,
};
pub use storage::{Config, Database, TaskBoard, TaskDb, TaskStore};
pub use task::{tasks_due_on, NewTask, Task, TaskCategory, TaskPatch};
pub use workspace::WorkspaceGate;
