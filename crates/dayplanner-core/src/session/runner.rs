//! Session runner: walks a generated schedule block by block.
//!
//! Like the rest of the core it has no internal threads. A driver arms a
//! cadence (e.g. a 100 ms interval) while [`SessionRunner::cadence`] returns a
//! token and calls [`SessionRunner::tick`] on every beat.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Active(i) -> Paused(i) -> Active(i) -> Active(i+1) ... -> Idle
//!              \-> Elapsed(i) -> (complete | skip)
//! ```
//!
//! Remaining time is always derived from an absolute deadline, never
//! decremented, so late or missed ticks cannot accumulate drift.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::clock::{Clock, SystemClock};
use super::notifier::{AlertPattern, Notifier, NullNotifier};
use crate::events::Event;
use crate::schedule::Schedule;
use crate::scheduler::DayScheduler;

/// Observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "index", rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Active(usize),
    Paused(usize),
    /// Countdown hit zero; waiting for `complete` or `skip`.
    Elapsed(usize),
}

/// Identifies one armed countdown cadence.
///
/// Arming a new cadence supersedes the previous token, so a driver holding a
/// stale token knows it must stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CadenceToken(u64);

#[derive(Debug, Default)]
struct Cadence {
    generation: u64,
    armed: bool,
}

impl Cadence {
    fn arm(&mut self) -> CadenceToken {
        self.generation += 1;
        self.armed = true;
        CadenceToken(self.generation)
    }

    fn cancel(&mut self) {
        self.armed = false;
    }

    fn token(&self) -> Option<CadenceToken> {
        self.armed.then_some(CadenceToken(self.generation))
    }
}

pub struct SessionRunner<C: Clock = SystemClock> {
    schedule: Schedule,
    clock: C,
    notifier: Box<dyn Notifier + Send>,
    alert: AlertPattern,
    current_index: Option<usize>,
    remaining_secs: u64,
    running: bool,
    /// Absolute deadline (ms since epoch) of the running countdown.
    planned_end_ms: Option<u64>,
    cadence: Cadence,
}

impl SessionRunner<SystemClock> {
    pub fn new(schedule: Schedule) -> Self {
        Self::with_clock(schedule, SystemClock)
    }
}

impl<C: Clock> SessionRunner<C> {
    pub fn with_clock(schedule: Schedule, clock: C) -> Self {
        Self {
            schedule,
            clock,
            notifier: Box::new(NullNotifier),
            alert: AlertPattern::default(),
            current_index: None,
            remaining_secs: 0,
            running: false,
            planned_end_ms: None,
            cadence: Cadence::default(),
        }
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + Send + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn with_alert(mut self, alert: AlertPattern) -> Self {
        self.alert = alert;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn planned_end_ms(&self) -> Option<u64> {
        self.planned_end_ms
    }

    /// The armed countdown cadence, if any. At most one exists at a time.
    pub fn cadence(&self) -> Option<CadenceToken> {
        self.cadence.token()
    }

    pub fn state(&self) -> SessionState {
        match self.current_index {
            None => SessionState::Idle,
            Some(i) if self.running => SessionState::Active(i),
            Some(i) if self.remaining_secs == 0 => SessionState::Elapsed(i),
            Some(i) => SessionState::Paused(i),
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state(),
            current_index: self.current_index,
            block_name: self
                .current_index
                .and_then(|i| self.schedule.get(i))
                .map(|b| b.name.clone()),
            remaining_secs: self.remaining_secs,
            running: self.running,
            completed: self.schedule.completed_count(),
            total: self.schedule.len(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace the schedule and reset all session state.
    pub fn load(&mut self, schedule: Schedule) -> Event {
        self.schedule = schedule;
        self.go_idle();
        Event::ScheduleLoaded {
            blocks: self.schedule.len(),
            at: Utc::now(),
        }
    }

    /// Start the countdown for block `index`. Out-of-range indices are ignored.
    pub fn start(&mut self, index: usize) -> Option<Event> {
        let block = self.schedule.get(index)?;
        let duration_secs = u64::from(block.duration) * 60;
        let event = Event::BlockStarted {
            index,
            task_id: block.task_id.clone(),
            name: block.name.clone(),
            duration_secs,
            at: Utc::now(),
        };

        self.cadence.cancel();
        self.current_index = Some(index);
        self.planned_end_ms = Some(self.clock.now_ms() + duration_secs * 1000);
        self.remaining_secs = duration_secs;
        self.running = true;
        self.cadence.arm();
        tracing::debug!(index, duration_secs, "block started");
        Some(event)
    }

    /// Call on every cadence beat. Returns `Some(Event::BlockElapsed)` when
    /// the countdown reaches zero.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.remaining_secs = self.compute_remaining();
        if self.remaining_secs > 0 {
            return None;
        }

        let index = self.current_index?;
        self.notifier.alert(&self.alert);
        self.stop_countdown();
        tracing::debug!(index, "block countdown elapsed");
        Some(Event::BlockElapsed {
            index,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        let index = self.current_index?;
        self.remaining_secs = self.compute_remaining();
        self.stop_countdown();
        Some(Event::BlockPaused {
            index,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if self.running || self.remaining_secs == 0 {
            return None;
        }
        let index = self.current_index?;
        self.cadence.cancel();
        self.planned_end_ms = Some(self.clock.now_ms() + self.remaining_secs * 1000);
        self.running = true;
        self.cadence.arm();
        Some(Event::BlockResumed {
            index,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Mark the current block done and move on.
    pub fn complete(&mut self) -> Vec<Event> {
        let Some(index) = self.current_index else {
            return Vec::new();
        };
        if let Some(block) = self.schedule.blocks.get_mut(index) {
            block.completed = true;
        }
        let event = Event::BlockCompleted {
            index,
            at: Utc::now(),
        };
        self.advance_from(index, event)
    }

    /// Abandon the current block without marking it and move on.
    pub fn skip(&mut self) -> Vec<Event> {
        let Some(index) = self.current_index else {
            return Vec::new();
        };
        let event = Event::BlockSkipped {
            index,
            at: Utc::now(),
        };
        self.advance_from(index, event)
    }

    /// Reorder the schedule. Only allowed while idle; a running session
    /// keeps the block indices it was started with.
    pub fn reorder(&mut self, scheduler: &DayScheduler, from: usize, to: usize) -> Option<Event> {
        if self.current_index.is_some() {
            return None;
        }
        scheduler
            .move_block(&mut self.schedule, from, to)
            .then(|| Event::BlockMoved {
                from,
                to,
                at: Utc::now(),
            })
    }

    /// Cancel any armed cadence. Called on drop as well.
    pub fn teardown(&mut self) {
        self.cadence.cancel();
        self.running = false;
        self.planned_end_ms = None;
    }

    /// Give the schedule back, e.g. to persist completion flags.
    pub fn into_schedule(mut self) -> Schedule {
        self.teardown();
        let empty = Schedule::empty(self.schedule.day, self.schedule.start_time);
        std::mem::replace(&mut self.schedule, empty)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn compute_remaining(&self) -> u64 {
        let Some(end) = self.planned_end_ms else {
            return self.remaining_secs;
        };
        let left_ms = end.saturating_sub(self.clock.now_ms());
        left_ms.div_ceil(1000)
    }

    fn stop_countdown(&mut self) {
        self.running = false;
        self.planned_end_ms = None;
        self.cadence.cancel();
    }

    fn advance_from(&mut self, index: usize, first: Event) -> Vec<Event> {
        self.stop_countdown();
        let mut events = vec![first];
        match self.start(index + 1) {
            Some(started) => events.push(started),
            None => {
                self.go_idle();
                events.push(Event::SessionFinished {
                    completed: self.schedule.completed_count(),
                    total: self.schedule.len(),
                    at: Utc::now(),
                });
            }
        }
        events
    }

    fn go_idle(&mut self) {
        self.stop_countdown();
        self.current_index = None;
        self.remaining_secs = 0;
    }
}

impl<C: Clock> Drop for SessionRunner<C> {
    fn drop(&mut self) {
        self.teardown();
    }
}
