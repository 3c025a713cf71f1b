//! Schedule types: the derived, ephemeral timetable for one day.
//!
//! A [`Schedule`] is recomputed from tasks whenever it is generated or
//! reordered. It is never the source of truth.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskCategory};

/// `at + by`, saturating at the end of chrono's representable range.
pub(crate) fn offset(at: NaiveDateTime, by: Duration) -> NaiveDateTime {
    at.checked_add_signed(by).unwrap_or(NaiveDateTime::MAX)
}

/// One task placed on the timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleBlock {
    pub task_id: String,
    pub name: String,
    pub category: TaskCategory,
    /// Minutes.
    pub duration: u32,
    #[serde(default)]
    pub notes: Option<String>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub is_fixed: bool,
    /// Anchor time-of-day, kept so fixed blocks can be re-sorted after a
    /// reorder. Always `Some` when `is_fixed`.
    #[serde(default)]
    pub original_fixed_time: Option<NaiveTime>,
    #[serde(default)]
    pub completed: bool,
}

impl ScheduleBlock {
    /// Unplaced block for `task`, parked at `at` until the scheduler places it.
    pub(crate) fn from_task(task: &Task, at: NaiveDateTime) -> Self {
        Self {
            task_id: task.id.clone(),
            name: task.name.clone(),
            category: task.category,
            duration: task.duration,
            notes: task.notes.clone(),
            start: at,
            end: at,
            is_fixed: task.fixed_time.is_some(),
            original_fixed_time: task.fixed_time,
            completed: false,
        }
    }

    pub(crate) fn place_at(&mut self, start: NaiveDateTime) {
        self.start = start;
        self.end = offset(start, self.length());
    }

    pub fn length(&self) -> Duration {
        Duration::minutes(i64::from(self.duration))
    }

    pub fn overlaps(&self, other: &ScheduleBlock) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// An ordered, packed timetable for one day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Schedule {
    pub day: NaiveDate,
    /// Workday start the packing was computed from; reused on reorder.
    pub start_time: NaiveTime,
    pub blocks: Vec<ScheduleBlock>,
}

impl Schedule {
    pub fn empty(day: NaiveDate, start_time: NaiveTime) -> Self {
        Self {
            day,
            start_time,
            blocks: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ScheduleBlock> {
        self.blocks.get(index)
    }

    /// Sum of block durations in minutes. Buffers are not task time.
    pub fn total_minutes(&self) -> u64 {
        self.blocks.iter().map(|b| u64::from(b.duration)).sum()
    }

    pub fn completed_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.completed).count()
    }

    /// Index of the first block not yet marked completed.
    pub fn first_pending(&self) -> Option<usize> {
        self.blocks.iter().position(|b| !b.completed)
    }

    /// Index pairs of blocks whose time ranges intersect.
    ///
    /// Packing never produces these on its own; they only appear when two
    /// anchors overlap each other, since anchors are never moved.
    pub fn conflicts(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for (i, a) in self.blocks.iter().enumerate() {
            for (j, b) in self.blocks.iter().enumerate().skip(i + 1) {
                if b.start >= a.end {
                    break;
                }
                if a.overlaps(b) {
                    out.push((i, j));
                }
            }
        }
        out
    }
}
