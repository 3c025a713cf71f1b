//! Anchor-aware day scheduler.
//!
//! Packs flexible tasks around fixed-time anchors:
//! - Anchors start exactly at their fixed time and are never moved or shortened
//! - Flexible tasks fill the slack before each anchor, in order, as long as
//!   they fit with a buffer to spare
//! - Whatever does not fit is deferred past the anchor, never dropped
//! - Reordering a schedule re-runs the same packing on the new sequence

use std::collections::VecDeque;

use chrono::{Duration, NaiveDate, NaiveTime};

use crate::schedule::{offset, Schedule, ScheduleBlock};
use crate::task::Task;

/// Scheduler configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Gap left after every placed block (minutes)
    pub buffer_minutes: i64,
    /// Slack before an anchor smaller than this is left empty (minutes)
    pub min_gap_minutes: i64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            buffer_minutes: 5,
            min_gap_minutes: 10,
        }
    }
}

/// Builds and re-packs day schedules. Stateless apart from its config.
#[derive(Debug, Clone, Default)]
pub struct DayScheduler {
    config: SchedulerConfig,
}

impl DayScheduler {
    /// Create a new scheduler with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> SchedulerConfig {
        self.config
    }

    /// Generate a schedule for `day` starting at `start_time`.
    ///
    /// Deterministic and total: every task yields exactly one block, and the
    /// same input always produces the same blocks. Tasks are assumed to be
    /// validated (positive duration).
    pub fn generate(&self, tasks: &[Task], day: NaiveDate, start_time: NaiveTime) -> Schedule {
        let parked = day.and_time(start_time);
        let (mut anchors, mut flexible): (Vec<_>, Vec<_>) = tasks
            .iter()
            .map(|t| ScheduleBlock::from_task(t, parked))
            .partition(|b| b.is_fixed);

        anchors.sort_by_key(|b| b.original_fixed_time);
        // Simple stable tie-break, not a priority.
        flexible.sort_by_key(|b| b.category.as_str());

        let blocks = self.pack(day, start_time, anchors, flexible);
        let schedule = Schedule {
            day,
            start_time,
            blocks,
        };

        tracing::debug!(
            day = %day,
            blocks = schedule.len(),
            minutes = schedule.total_minutes(),
            "schedule generated"
        );
        let conflicts = schedule.conflicts();
        if !conflicts.is_empty() {
            tracing::warn!(?conflicts, "overlapping anchors kept at their fixed times");
        }
        schedule
    }

    /// Move the block at `from` to position `to` and re-pack.
    ///
    /// Returns `false` and leaves the schedule untouched when the move is
    /// rejected: `from` out of range, the block is fixed, or the target is
    /// its current position. `to` past the end means "last".
    pub fn move_block(&self, schedule: &mut Schedule, from: usize, to: usize) -> bool {
        let len = schedule.blocks.len();
        if from >= len || schedule.blocks[from].is_fixed {
            return false;
        }
        let to = to.min(len - 1);
        if from == to {
            return false;
        }

        let mut sequence = std::mem::take(&mut schedule.blocks);
        let dragged = sequence.remove(from);
        sequence.insert(to, dragged);

        let (mut anchors, flexible): (Vec<_>, Vec<_>) =
            sequence.into_iter().partition(|b| b.is_fixed);
        anchors.sort_by_key(|b| b.original_fixed_time);

        schedule.blocks = self.pack(schedule.day, schedule.start_time, anchors, flexible);
        tracing::debug!(from, to, "block moved and schedule re-packed");
        true
    }

    /// Merge-walk placement shared by generation and reorder.
    ///
    /// `anchors` must be sorted by fixed time; `flexible` is placed in the
    /// given order.
    fn pack(
        &self,
        day: NaiveDate,
        start_time: NaiveTime,
        anchors: Vec<ScheduleBlock>,
        flexible: Vec<ScheduleBlock>,
    ) -> Vec<ScheduleBlock> {
        let buffer = Duration::minutes(self.config.buffer_minutes);
        let min_gap = Duration::minutes(self.config.min_gap_minutes);

        let mut cursor = day.and_time(start_time);
        let mut placed = Vec::with_capacity(anchors.len() + flexible.len());
        let mut pending: VecDeque<ScheduleBlock> = flexible.into();

        for mut anchor in anchors {
            let fixed_at = anchor
                .original_fixed_time
                .map(|t| day.and_time(t))
                .unwrap_or(cursor);

            // Fill the slack in order; the first task that does not fit
            // holds back everything behind it.
            while let Some(next) = pending.front() {
                if fixed_at - cursor < min_gap
                    || offset(offset(cursor, next.length()), buffer) > fixed_at
                {
                    break;
                }
                if let Some(mut block) = pending.pop_front() {
                    block.place_at(cursor);
                    cursor = offset(block.end, buffer);
                    placed.push(block);
                }
            }

            if fixed_at < cursor {
                tracing::debug!(
                    task = %anchor.name,
                    fixed_at = %fixed_at,
                    cursor = %cursor,
                    "anchor precedes cursor"
                );
            }
            anchor.place_at(fixed_at);
            cursor = cursor.max(offset(anchor.end, buffer));
            placed.push(anchor);
        }

        for mut block in pending {
            block.place_at(cursor);
            cursor = offset(block.end, buffer);
            placed.push(block);
        }

        placed.sort_by_key(|b| b.start);
        placed
    }
}
