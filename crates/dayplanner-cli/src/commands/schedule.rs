use std::path::PathBuf;

use chrono::{Local, Utc};
use clap::Subcommand;
use dayplanner_core::storage::Database;
use dayplanner_core::{to_ics, Config, DayScheduler, TaskBoard, TaskDb};

use crate::common::{
    current_workspace, day_or_today, load_schedule, parse_time_arg, print_json, CliResult,
};

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Pack the tasks due on a day into a schedule
    Generate {
        /// Day to plan, YYYY-MM-DD (default: today)
        #[arg(long)]
        day: Option<String>,
        /// Start of the day, HH:MM (default: planner.start_time)
        #[arg(long)]
        start: Option<String>,
    },
    /// Show the last generated schedule
    Show,
    /// Move a flexible block to another position and re-pack
    Move {
        /// Current position (0-based)
        from: usize,
        /// New position (0-based); past the end means last
        to: usize,
    },
    /// Export the schedule as iCalendar
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn run(action: ScheduleAction) -> CliResult {
    let config = Config::load_or_default();
    let state = Database::open()?;
    let workspace = current_workspace(&state, &config)?;
    let scheduler = DayScheduler::with_config(config.scheduler_config());

    match action {
        ScheduleAction::Generate { day, start } => {
            let day = day_or_today(day.as_deref())?;
            let start_time = match parse_time_arg(start.as_deref())? {
                Some(start) => start,
                None => config.start_time()?,
            };
            let store = TaskDb::open()?;
            let board = TaskBoard::load(&store, workspace.as_str())?;
            let schedule = scheduler.generate(&board.due_on(day), day, start_time);
            state.save_schedule(&workspace, &schedule)?;
            print_json(&schedule)?;
        }
        ScheduleAction::Show => {
            let schedule = load_schedule(&state, &workspace)?;
            for (a, b) in schedule.conflicts() {
                eprintln!(
                    "warning: '{}' overlaps '{}'",
                    schedule.blocks[a].name, schedule.blocks[b].name
                );
            }
            print_json(&schedule)?;
        }
        ScheduleAction::Move { from, to } => {
            let mut schedule = load_schedule(&state, &workspace)?;
            if scheduler.move_block(&mut schedule, from, to) {
                state.save_schedule(&workspace, &schedule)?;
            } else {
                tracing::debug!(from, to, "move rejected; schedule unchanged");
                eprintln!("block {from} not moved: out of range, fixed, or already at {to}");
            }
            print_json(&schedule)?;
        }
        ScheduleAction::Export { output } => {
            let schedule = load_schedule(&state, &workspace)?;
            let ics = to_ics(&schedule.blocks, &Local, Utc::now());
            match output {
                Some(path) => {
                    std::fs::write(&path, ics)?;
                    println!("exported {} blocks to {}", schedule.len(), path.display());
                }
                None => print!("{ics}"),
            }
        }
    }
    Ok(())
}
