//! Persistence seam and the local task cache that mirrors it.

use chrono::NaiveDate;

use crate::error::StoreError;
use crate::task::{NewTask, Task, TaskPatch};

/// The remote (or local) store tasks live in, partitioned by workspace.
///
/// Implementations assign `id` and `created_at` on insert.
pub trait TaskStore {
    fn list_by_workspace(&self, workspace: &str) -> Result<Vec<Task>, StoreError>;

    fn insert(&self, task: NewTask) -> Result<Task, StoreError>;

    fn update(&self, id: &str, patch: &TaskPatch) -> Result<Task, StoreError>;

    fn delete(&self, id: &str) -> Result<(), StoreError>;
}

impl<S: TaskStore + ?Sized> TaskStore for &S {
    fn list_by_workspace(&self, workspace: &str) -> Result<Vec<Task>, StoreError> {
        (**self).list_by_workspace(workspace)
    }

    fn insert(&self, task: NewTask) -> Result<Task, StoreError> {
        (**self).insert(task)
    }

    fn update(&self, id: &str, patch: &TaskPatch) -> Result<Task, StoreError> {
        (**self).update(id, patch)
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        (**self).delete(id)
    }
}

/// In-memory task list for one workspace.
///
/// Every mutation goes to the store first and is applied locally only once
/// the store confirms it. A failed call returns the error and leaves the
/// local list exactly as it was.
pub struct TaskBoard<S> {
    store: S,
    workspace: String,
    tasks: Vec<Task>,
}

impl<S: TaskStore> TaskBoard<S> {
    /// Load the workspace's tasks from `store`.
    pub fn load(store: S, workspace: impl Into<String>) -> Result<Self, StoreError> {
        let workspace = workspace.into();
        let tasks = store.list_by_workspace(&workspace)?;
        Ok(Self {
            store,
            workspace,
            tasks,
        })
    }

    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Tasks due on `day`, in store order.
    pub fn due_on(&self, day: NaiveDate) -> Vec<Task> {
        crate::task::tasks_due_on(&self.tasks, day)
    }

    /// Re-read the workspace from the store.
    pub fn refresh(&mut self) -> Result<(), StoreError> {
        self.tasks = self.store.list_by_workspace(&self.workspace)?;
        Ok(())
    }

    /// Insert into this board's workspace, whatever `new.workspace` says.
    pub fn add(&mut self, mut new: NewTask) -> Result<&Task, StoreError> {
        new.workspace = self.workspace.clone();
        let task = self.store.insert(new).inspect_err(|e| {
            tracing::warn!(error = %e, "task insert failed; board unchanged");
        })?;
        self.tasks.push(task);
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    pub fn update(&mut self, id: &str, patch: &TaskPatch) -> Result<&Task, StoreError> {
        let position = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let task = self.store.update(id, patch).inspect_err(|e| {
            tracing::warn!(id, error = %e, "task update failed; board unchanged");
        })?;
        self.tasks[position] = task;
        Ok(&self.tasks[position])
    }

    pub fn remove(&mut self, id: &str) -> Result<Task, StoreError> {
        let position = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        self.store.delete(id).inspect_err(|e| {
            tracing::warn!(id, error = %e, "task delete failed; board unchanged");
        })?;
        Ok(self.tasks.remove(position))
    }
}
