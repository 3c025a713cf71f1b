mod board;
mod config;
pub mod database;
pub mod migrations;
pub mod task_db;

pub use board::{TaskBoard, TaskStore};
pub use config::{Config, PlannerConfig, SessionConfig, WorkspaceConfig};
pub use database::Database;
pub use task_db::TaskDb;

use std::path::PathBuf;

use crate::error::ConfigError;

/// File name of the SQLite database inside [`data_dir`].
pub const DB_FILE: &str = "dayplanner.db";

/// Returns the data directory, creating it if needed.
///
/// `DAYPLANNER_DATA_DIR` overrides the location outright. Otherwise it is
/// `~/.config/dayplanner[-dev]/`, with `DAYPLANNER_ENV=dev` selecting the
/// development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("DAYPLANNER_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("DAYPLANNER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("dayplanner-dev")
            } else {
                base_dir.join("dayplanner")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
