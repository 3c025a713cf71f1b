//! Property tests for schedule generation and reorder.
//!
//! Anchors are generated non-overlapping, at or after the start time and at
//! least one buffer apart, which is the input range the packing guarantees
//! its spacing invariants for.

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use dayplanner_core::{DayScheduler, Schedule, Task, TaskCategory};
use proptest::prelude::*;

const BUFFER: i64 = 5;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn start_time() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).unwrap()
}

fn task(id: usize, duration: u32, category: TaskCategory, fixed: Option<NaiveTime>) -> Task {
    Task {
        id: format!("task-{id}"),
        workspace: "home".into(),
        name: format!("Task {id}"),
        duration,
        category,
        due_date: day(),
        fixed_time: fixed,
        notes: None,
        created_at: Utc::now(),
    }
}

/// (duration, offset-from-previous-anchor-end) pairs turned into fixed times.
fn anchors_strategy() -> impl Strategy<Value = Vec<(u32, u32)>> {
    prop::collection::vec((5u32..90, 5u32..120), 0..4)
}

fn flexible_strategy() -> impl Strategy<Value = Vec<(u32, usize)>> {
    prop::collection::vec((1u32..120, 0usize..TaskCategory::ALL.len()), 0..8)
}

fn build_tasks(anchors: &[(u32, u32)], flexible: &[(u32, usize)]) -> Vec<Task> {
    let mut tasks = Vec::new();
    let mut next_free = start_time();
    for (duration, offset) in anchors {
        let at = next_free + Duration::minutes(i64::from(*offset));
        tasks.push(task(tasks.len(), *duration, TaskCategory::Meeting, Some(at)));
        next_free = at + Duration::minutes(i64::from(*duration));
    }
    for (duration, category) in flexible {
        tasks.push(task(tasks.len(), *duration, TaskCategory::ALL[*category], None));
    }
    // Interleave so input order does not give the answer away.
    tasks.reverse();
    tasks
}

fn check_invariants(schedule: &Schedule, tasks: &[Task]) -> Result<(), TestCaseError> {
    let blocks = &schedule.blocks;

    let mut scheduled: Vec<&str> = blocks.iter().map(|b| b.task_id.as_str()).collect();
    let mut expected: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    scheduled.sort_unstable();
    expected.sort_unstable();
    prop_assert_eq!(scheduled, expected);

    let minutes: u64 = tasks.iter().map(|t| u64::from(t.duration)).sum();
    prop_assert_eq!(schedule.total_minutes(), minutes);

    for block in blocks {
        prop_assert_eq!(block.end - block.start, Duration::minutes(i64::from(block.duration)));
        if let Some(fixed) = block.original_fixed_time {
            prop_assert!(block.is_fixed);
            prop_assert_eq!(block.start, schedule.day.and_time(fixed));
        }
    }

    for pair in blocks.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        prop_assert!(a.start <= b.start, "not sorted: {} then {}", a.start, b.start);
        prop_assert!(a.end <= b.start, "overlap: {} ends after {} starts", a.name, b.name);
        let gap = b.start - a.end;
        if a.is_fixed || b.is_fixed {
            prop_assert!(gap >= Duration::minutes(BUFFER), "gap {gap} next to an anchor");
        } else {
            prop_assert_eq!(gap, Duration::minutes(BUFFER));
        }
    }

    prop_assert!(schedule.conflicts().is_empty());
    Ok(())
}

proptest! {
    #[test]
    fn generated_schedules_hold_packing_invariants(
        anchors in anchors_strategy(),
        flexible in flexible_strategy(),
    ) {
        let tasks = build_tasks(&anchors, &flexible);
        let schedule = DayScheduler::new().generate(&tasks, day(), start_time());
        check_invariants(&schedule, &tasks)?;
        prop_assert!(schedule.blocks.iter().all(|b| !b.completed));
    }

    #[test]
    fn generation_is_idempotent(
        anchors in anchors_strategy(),
        flexible in flexible_strategy(),
    ) {
        let tasks = build_tasks(&anchors, &flexible);
        let scheduler = DayScheduler::new();
        let first = scheduler.generate(&tasks, day(), start_time());
        let second = scheduler.generate(&tasks, day(), start_time());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn reorder_keeps_invariants_or_leaves_schedule_alone(
        anchors in anchors_strategy(),
        flexible in flexible_strategy(),
        from in 0usize..12,
        to in 0usize..14,
    ) {
        let tasks = build_tasks(&anchors, &flexible);
        let scheduler = DayScheduler::new();
        let mut schedule = scheduler.generate(&tasks, day(), start_time());
        let before = schedule.clone();

        let len = schedule.len();
        let accepted = scheduler.move_block(&mut schedule, from, to);
        let expect_accept = from < len
            && !before.blocks[from].is_fixed
            && from != to.min(len.saturating_sub(1));
        prop_assert_eq!(accepted, expect_accept);

        if accepted {
            check_invariants(&schedule, &tasks)?;
        } else {
            prop_assert_eq!(schedule, before);
        }
    }
}

#[test]
fn fixed_block_reorder_is_rejected() {
    let tasks = vec![
        task(0, 15, TaskCategory::Meeting, NaiveTime::from_hms_opt(9, 30, 0)),
        task(1, 45, TaskCategory::Work, None),
    ];
    let scheduler = DayScheduler::new();
    let mut schedule = scheduler.generate(&tasks, day(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    let before = schedule.clone();

    let fixed = schedule.blocks.iter().position(|b| b.is_fixed).unwrap();
    assert!(!scheduler.move_block(&mut schedule, fixed, 0));
    assert!(!scheduler.move_block(&mut schedule, fixed, 1));
    assert_eq!(schedule, before);
}

#[test]
fn flexible_order_follows_manual_reorder_not_category() {
    let tasks = vec![
        task(0, 30, TaskCategory::Admin, None),
        task(1, 20, TaskCategory::Work, None),
    ];
    let scheduler = DayScheduler::new();
    let mut schedule = scheduler.generate(&tasks, day(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    assert_eq!(schedule.blocks[0].task_id, "task-0");

    assert!(scheduler.move_block(&mut schedule, 1, 0));
    let at = |h, m| day().and_hms_opt(h, m, 0).unwrap();
    assert_eq!(schedule.blocks[0].task_id, "task-1");
    assert_eq!((schedule.blocks[0].start, schedule.blocks[0].end), (at(9, 0), at(9, 20)));
    assert_eq!((schedule.blocks[1].start, schedule.blocks[1].end), (at(9, 25), at(9, 55)));
}
