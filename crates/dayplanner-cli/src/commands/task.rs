//! Task management commands for CLI.

use clap::Subcommand;
use dayplanner_core::storage::Database;
use dayplanner_core::task::parse_due_date;
use dayplanner_core::{Config, NewTask, TaskBoard, TaskCategory, TaskDb, TaskPatch};

use crate::common::{current_workspace, day_or_today, parse_time_arg, print_json, CliResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task to the current workspace
    Add {
        /// Task name
        name: String,
        /// Duration in minutes
        #[arg(short, long)]
        duration: u32,
        /// Category (admin, errand, health, learning, meeting, personal, work)
        #[arg(short, long, default_value = "uncategorized")]
        category: TaskCategory,
        /// Due date, YYYY-MM-DD (default: today)
        #[arg(long)]
        due: Option<String>,
        /// Fixed start time, HH:MM; makes the task an anchor
        #[arg(long)]
        at: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List tasks
    List {
        /// Only tasks due on this date, YYYY-MM-DD
        #[arg(long, conflicts_with = "today")]
        day: Option<String>,
        /// Only tasks due today
        #[arg(long)]
        today: bool,
    },
    /// Update a task
    Update {
        /// Task ID
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long)]
        duration: Option<u32>,
        #[arg(short, long)]
        category: Option<TaskCategory>,
        #[arg(long)]
        due: Option<String>,
        /// New fixed start time, HH:MM
        #[arg(long, conflicts_with = "flexible")]
        at: Option<String>,
        /// Drop the fixed start time
        #[arg(long)]
        flexible: bool,
        #[arg(long, conflicts_with = "clear_notes")]
        notes: Option<String>,
        #[arg(long)]
        clear_notes: bool,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

pub fn run(action: TaskAction) -> CliResult {
    let config = Config::load_or_default();
    let state = Database::open()?;
    let workspace = current_workspace(&state, &config)?;
    let store = TaskDb::open()?;
    let mut board = TaskBoard::load(&store, workspace)?;

    match action {
        TaskAction::Add {
            name,
            duration,
            category,
            due,
            at,
            notes,
        } => {
            let new = NewTask {
                workspace: board.workspace().to_string(),
                name,
                duration,
                category,
                due_date: day_or_today(due.as_deref())?,
                fixed_time: parse_time_arg(at.as_deref())?,
                notes,
            };
            new.validate()?;
            let task = board.add(new)?;
            print_json(task)?;
        }
        TaskAction::List { day, today } => {
            let filter = if today {
                Some(day_or_today(None)?)
            } else {
                day.as_deref().map(parse_due_date).transpose()?
            };
            match filter {
                Some(day) => print_json(&board.due_on(day))?,
                None => print_json(&board.tasks())?,
            }
        }
        TaskAction::Update {
            id,
            name,
            duration,
            category,
            due,
            at,
            flexible,
            notes,
            clear_notes,
        } => {
            let patch = TaskPatch {
                name,
                duration,
                category,
                due_date: due.as_deref().map(parse_due_date).transpose()?,
                fixed_time: if flexible {
                    Some(None)
                } else {
                    parse_time_arg(at.as_deref())?.map(Some)
                },
                notes: if clear_notes { Some(None) } else { notes.map(Some) },
            };
            if patch.is_empty() {
                return Err("nothing to update".into());
            }
            let task = board.update(&id, &patch)?;
            print_json(task)?;
        }
        TaskAction::Delete { id } => {
            let task = board.remove(&id)?;
            tracing::info!(id = %task.id, name = %task.name, "task deleted");
            println!("Task deleted: {id}");
        }
    }
    Ok(())
}
