//! SQLite key-value storage for application state.
//!
//! Holds what the CLI needs between invocations:
//! - the last generated schedule per workspace
//! - the workspace unlocked through the passcode gate

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::{data_dir, migrations, DB_FILE};
use crate::error::{CoreError, DatabaseError};
use crate::schedule::Schedule;

const ACTIVE_WORKSPACE_KEY: &str = "active_workspace";

fn schedule_key(workspace: &str) -> String {
    format!("schedule:{workspace}")
}

/// SQLite database for application state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data_dir>/dayplanner.db`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        Self::open_at(&data_dir()?.join(DB_FILE))
    }

    pub fn open_at(path: &Path) -> Result<Self, CoreError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        migrations::migrate(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory()?;
        migrations::migrate(&conn)?;
        Ok(Self { conn })
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    pub fn save_schedule(&self, workspace: &str, schedule: &Schedule) -> Result<(), CoreError> {
        let json = serde_json::to_string(schedule)?;
        self.kv_set(&schedule_key(workspace), &json)?;
        Ok(())
    }

    /// The last saved schedule for `workspace`. A stored value that no longer
    /// parses is treated as absent.
    pub fn load_schedule(&self, workspace: &str) -> Result<Option<Schedule>, CoreError> {
        let Some(json) = self.kv_get(&schedule_key(workspace))? else {
            return Ok(None);
        };
        match serde_json::from_str(&json) {
            Ok(schedule) => Ok(Some(schedule)),
            Err(e) => {
                tracing::warn!(workspace, error = %e, "discarding unreadable saved schedule");
                Ok(None)
            }
        }
    }

    pub fn active_workspace(&self) -> Result<Option<String>, rusqlite::Error> {
        self.kv_get(ACTIVE_WORKSPACE_KEY)
    }

    pub fn set_active_workspace(&self, workspace: &str) -> Result<(), rusqlite::Error> {
        self.kv_set(ACTIVE_WORKSPACE_KEY, workspace)
    }

    pub fn clear_active_workspace(&self) -> Result<(), rusqlite::Error> {
        self.kv_delete(ACTIVE_WORKSPACE_KEY)
    }
}
