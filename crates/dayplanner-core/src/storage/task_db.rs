//! SQLite-based task store.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use uuid::Uuid;

use super::board::TaskStore;
use super::{data_dir, migrations, DB_FILE};
use crate::error::{CoreError, DatabaseError, StoreError};
use crate::task::{format_fixed_time, parse_due_date, parse_fixed_time, NewTask, Task, TaskPatch};

const TASK_COLUMNS: &str =
    "id, workspace, name, duration, category, due_date, fixed_time, notes, created_at";

/// Parse datetime from RFC3339 string with fallback to current time
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn conversion_error(column: usize, err: crate::error::ValidationError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(err))
}

/// Build a Task from a row selected with [`TASK_COLUMNS`].
fn row_to_task(row: &rusqlite::Row) -> Result<Task, rusqlite::Error> {
    let category_str: String = row.get(4)?;
    // Unknown labels from older data fall back rather than failing the list.
    let category = category_str.parse().unwrap_or_default();

    let due_date_str: String = row.get(5)?;
    let due_date: NaiveDate = parse_due_date(&due_date_str).map_err(|e| conversion_error(5, e))?;

    let fixed_time_str: Option<String> = row.get(6)?;
    let fixed_time: Option<NaiveTime> = fixed_time_str
        .as_deref()
        .map(parse_fixed_time)
        .transpose()
        .map_err(|e| conversion_error(6, e))?;

    let created_at_str: String = row.get(8)?;

    Ok(Task {
        id: row.get(0)?,
        workspace: row.get(1)?,
        name: row.get(2)?,
        duration: row.get(3)?,
        category,
        due_date,
        fixed_time,
        notes: row.get(7)?,
        created_at: parse_datetime_fallback(&created_at_str),
    })
}

/// SQLite task store, partitioned by workspace.
pub struct TaskDb {
    conn: Connection,
}

impl TaskDb {
    /// Open the task database at `<data_dir>/dayplanner.db`.
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

    /// Get a task by ID.
    pub fn get_task(&self, id: &str) -> Result<Option<Task>, rusqlite::Error> {
        self.conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                row_to_task,
            )
            .optional()
    }

    fn write_task(&self, task: &Task) -> Result<usize, rusqlite::Error> {
        self.conn.execute(
            "UPDATE tasks
             SET name = ?2, duration = ?3, category = ?4, due_date = ?5,
                 fixed_time = ?6, notes = ?7
             WHERE id = ?1",
            params![
                task.id,
                task.name,
                task.duration,
                task.category.as_str(),
                task.due_date.format("%Y-%m-%d").to_string(),
                task.fixed_time.map(format_fixed_time),
                task.notes,
            ],
        )
    }
}

impl TaskStore for TaskDb {
    fn list_by_workspace(&self, workspace: &str) -> Result<Vec<Task>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE workspace = ?1
             ORDER BY created_at ASC, rowid ASC"
        ))?;
        let tasks = stmt
            .query_map(params![workspace], row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    fn insert(&self, new: NewTask) -> Result<Task, StoreError> {
        new.validate()?;
        let task = new.into_task(Uuid::new_v4().to_string(), Utc::now());
        self.conn.execute(
            &format!("INSERT INTO tasks ({TASK_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"),
            params![
                task.id,
                task.workspace,
                task.name,
                task.duration,
                task.category.as_str(),
                task.due_date.format("%Y-%m-%d").to_string(),
                task.fixed_time.map(format_fixed_time),
                task.notes,
                task.created_at.to_rfc3339(),
            ],
        )?;
        tracing::debug!(id = %task.id, workspace = %task.workspace, "task inserted");
        Ok(task)
    }

    fn update(&self, id: &str, patch: &TaskPatch) -> Result<Task, StoreError> {
        let current = self
            .get_task(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let updated = patch.apply(&current)?;
        if self.write_task(&updated)? == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(updated)
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        let deleted = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskCategory;

    fn new_task(workspace: &str, name: &str) -> NewTask {
        NewTask {
            workspace: workspace.into(),
            name: name.into(),
            duration: 30,
            category: TaskCategory::Work,
            due_date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            fixed_time: None,
            notes: Some("bring laptop".into()),
        }
    }

    #[test]
    fn insert_assigns_identity_and_lists_per_workspace() {
        let db = TaskDb::open_memory().unwrap();
        let a = db.insert(new_task("home", "A")).unwrap();
        db.insert(new_task("office", "B")).unwrap();

        assert!(!a.id.is_empty());
        let listed = db.list_by_workspace("home").unwrap();
        assert_eq!(listed, vec![a]);
    }

    #[test]
    fn fixed_time_roundtrips_through_sqlite() {
        let db = TaskDb::open_memory().unwrap();
        let mut new = new_task("home", "Standup");
        new.fixed_time = NaiveTime::from_hms_opt(9, 30, 0);
        let task = db.insert(new).unwrap();
        let loaded = db.get_task(&task.id).unwrap().unwrap();
        assert_eq!(loaded.fixed_time, NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(loaded.notes.as_deref(), Some("bring laptop"));
    }

    #[test]
    fn insert_rejects_invalid_task() {
        let db = TaskDb::open_memory().unwrap();
        let new = new_task("home", "   ");
        assert!(matches!(db.insert(new), Err(StoreError::Invalid(_))));
        assert!(db.list_by_workspace("home").unwrap().is_empty());
    }

    #[test]
    fn update_applies_patch() {
        let db = TaskDb::open_memory().unwrap();
        let task = db.insert(new_task("home", "A")).unwrap();
        let patch = TaskPatch {
            duration: Some(50),
            fixed_time: Some(NaiveTime::from_hms_opt(14, 0, 0)),
            ..Default::default()
        };
        let updated = db.update(&task.id, &patch).unwrap();
        assert_eq!(updated.duration, 50);
        assert_eq!(db.get_task(&task.id).unwrap().unwrap(), updated);
    }

    #[test]
    fn update_and_delete_missing_task_report_not_found() {
        let db = TaskDb::open_memory().unwrap();
        assert!(matches!(
            db.update("nope", &TaskPatch::default()),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(db.delete("nope"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn delete_removes_task() {
        let db = TaskDb::open_memory().unwrap();
        let task = db.insert(new_task("home", "A")).unwrap();
        db.delete(&task.id).unwrap();
        assert!(db.get_task(&task.id).unwrap().is_none());
    }
}
