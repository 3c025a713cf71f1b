//! Helpers shared by the command modules.

use chrono::{Local, NaiveDate, NaiveTime};
use dayplanner_core::storage::Database;
use dayplanner_core::task::{parse_due_date, parse_fixed_time};
use dayplanner_core::{Config, Schedule};
use serde::Serialize;

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

pub fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// The unlocked workspace, else `workspace.default` from the config.
pub fn current_workspace(db: &Database, config: &Config) -> CliResult<String> {
    if let Some(workspace) = db.active_workspace()? {
        return Ok(workspace);
    }
    if !config.workspace.default.trim().is_empty() {
        return Ok(config.workspace.default.trim().to_string());
    }
    Err("no workspace selected: run `dayplanner workspace resolve <passcode>` \
         or set workspace.default"
        .into())
}

/// `--day` if given, today otherwise.
pub fn day_or_today(day: Option<&str>) -> CliResult<NaiveDate> {
    match day {
        Some(day) => Ok(parse_due_date(day)?),
        None => Ok(Local::now().date_naive()),
    }
}

pub fn parse_time_arg(value: Option<&str>) -> CliResult<Option<NaiveTime>> {
    Ok(value.map(parse_fixed_time).transpose()?)
}

pub fn load_schedule(db: &Database, workspace: &str) -> CliResult<Schedule> {
    db.load_schedule(workspace)?
        .ok_or_else(|| "no schedule yet: run `dayplanner schedule generate` first".into())
}
