//! Task types for day planning.
//!
//! A [`Task`] is either an *anchor* (it carries a `fixed_time` and must start
//! exactly then, e.g. a meeting) or *flexible* (the scheduler packs it around
//! the anchors). Tasks are the source of truth; schedules are derived from
//! them and thrown away.

mod time_format;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Longest accepted task, in minutes. Tasks never span more than a day.
pub const MAX_DURATION_MINUTES: u32 = 24 * 60;

pub use time_format::{format_fixed_time, parse_due_date, parse_fixed_time};

/// Display category for a task.
///
/// Categories only drive grouping in the UI and the tie-break order of
/// flexible tasks; they never express priority.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum TaskCategory {
    Admin,
    Errand,
    Health,
    Learning,
    Meeting,
    Personal,
    Work,
    #[default]
    Uncategorized,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 8] = [
        TaskCategory::Admin,
        TaskCategory::Errand,
        TaskCategory::Health,
        TaskCategory::Learning,
        TaskCategory::Meeting,
        TaskCategory::Personal,
        TaskCategory::Work,
        TaskCategory::Uncategorized,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::Admin => "Admin",
            TaskCategory::Errand => "Errand",
            TaskCategory::Health => "Health",
            TaskCategory::Learning => "Learning",
            TaskCategory::Meeting => "Meeting",
            TaskCategory::Personal => "Personal",
            TaskCategory::Work => "Work",
            TaskCategory::Uncategorized => "Uncategorized",
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskCategory {
    type Err = ValidationError;

    /// Case-insensitive. Unknown labels are rejected rather than silently
    /// mapped to `Uncategorized`, so typos surface at the CLI.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::invalid("category", format!("unknown category '{s}'")))
    }
}

/// A unit of work to plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    /// Partition key resolved by the workspace gate.
    pub workspace: String,
    pub name: String,
    /// Duration in minutes. Always positive for stored tasks.
    pub duration: u32,
    #[serde(default)]
    pub category: TaskCategory,
    pub due_date: NaiveDate,
    /// Anchor start time. `None` means the task is flexible.
    #[serde(default, with = "time_format::hhmm_opt")]
    pub fixed_time: Option<NaiveTime>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn is_anchor(&self) -> bool {
        self.fixed_time.is_some()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.name, self.duration)
    }
}

/// Fields for a task that has not been stored yet.
///
/// The store assigns `id` and `created_at` on insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTask {
    pub workspace: String,
    pub name: String,
    pub duration: u32,
    #[serde(default)]
    pub category: TaskCategory,
    pub due_date: NaiveDate,
    #[serde(default, with = "time_format::hhmm_opt")]
    pub fixed_time: Option<NaiveTime>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewTask {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.workspace.trim().is_empty() {
            return Err(ValidationError::Empty("workspace".into()));
        }
        validate_fields(&self.name, self.duration)
    }

    /// Materialize with store-assigned identity.
    pub fn into_task(self, id: String, created_at: DateTime<Utc>) -> Task {
        Task {
            id,
            workspace: self.workspace,
            name: self.name,
            duration: self.duration,
            category: self.category,
            due_date: self.due_date,
            fixed_time: self.fixed_time,
            notes: self.notes,
            created_at,
        }
    }
}

/// Partial update for a stored task. `None` leaves a field untouched.
///
/// `fixed_time` and `notes` are doubly optional so they can be cleared:
/// `Some(None)` removes the anchor time or the notes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub duration: Option<u32>,
    pub category: Option<TaskCategory>,
    pub due_date: Option<NaiveDate>,
    pub fixed_time: Option<Option<NaiveTime>>,
    pub notes: Option<Option<String>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }

    /// Apply to a copy of `task`, validating the result.
    pub fn apply(&self, task: &Task) -> Result<Task, ValidationError> {
        let mut updated = task.clone();
        if let Some(name) = &self.name {
            updated.name = name.clone();
        }
        if let Some(duration) = self.duration {
            updated.duration = duration;
        }
        if let Some(category) = self.category {
            updated.category = category;
        }
        if let Some(due_date) = self.due_date {
            updated.due_date = due_date;
        }
        if let Some(fixed_time) = self.fixed_time {
            updated.fixed_time = fixed_time;
        }
        if let Some(notes) = &self.notes {
            updated.notes = notes.clone();
        }
        updated.validate()?;
        Ok(updated)
    }
}

fn validate_fields(name: &str, duration: u32) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::Empty("name".into()));
    }
    if duration == 0 {
        return Err(ValidationError::invalid("duration", "must be a positive number of minutes"));
    }
    if duration > MAX_DURATION_MINUTES {
        return Err(ValidationError::invalid(
            "duration",
            format!("must be at most {MAX_DURATION_MINUTES} minutes"),
        ));
    }
    Ok(())
}

/// Tasks intended for `day`, in their original order.
pub fn tasks_due_on(tasks: &[Task], day: NaiveDate) -> Vec<Task> {
    tasks.iter().filter(|t| t.due_date == day).cloned().collect()
}
