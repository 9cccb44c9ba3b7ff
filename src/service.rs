//! Task operations over the active and deleted collections
//!
//! [`TaskService`] is the one entry point the HTTP handlers and the CLI
//! use. Every call runs under an in-process mutex and, for file-backed
//! services, an advisory lock on the data directory, so the read-modify-write
//! sequences of different requests and processes never interleave.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::archive;
use crate::error::{Error, Result};
use crate::ids::{IdAllocator, IdCounter};
use crate::lock::FileLock;
use crate::storage::{JsonFileStore, MemoryStore, Storage, Store};
use crate::task::{find_by_id, insert_sorted, take_by_id, DeletedTask, NewTask, Task, TaskPatch};

pub struct TaskService {
    active: Arc<dyn Store<Vec<Task>>>,
    deleted: Arc<dyn Store<Vec<DeletedTask>>>,
    ids: IdAllocator,
    guard: Mutex<()>,
    file_lock: Option<(PathBuf, u64)>,
}

impl TaskService {
    /// Service over the JSON files of a data directory
    pub fn open(storage: &Storage, lock_timeout_ms: u64) -> Self {
        let mode = storage.write_mode();
        let mut service = Self::with_stores(
            Arc::new(JsonFileStore::new(storage.tasks_file(), mode)),
            Arc::new(JsonFileStore::new(storage.deleted_file(), mode)),
            Arc::new(JsonFileStore::new(storage.counter_file(), mode)),
        );
        service.file_lock = Some((storage.lock_file(), lock_timeout_ms));
        service
    }

    /// Service whose state lives only in memory
    pub fn in_memory() -> Self {
        Self::with_stores(
            Arc::new(MemoryStore::<Vec<Task>>::default()),
            Arc::new(MemoryStore::<Vec<DeletedTask>>::default()),
            Arc::new(MemoryStore::<IdCounter>::default()),
        )
    }

    pub fn with_stores(
        active: Arc<dyn Store<Vec<Task>>>,
        deleted: Arc<dyn Store<Vec<DeletedTask>>>,
        counter: Arc<dyn Store<IdCounter>>,
    ) -> Self {
        Self {
            active,
            deleted,
            ids: IdAllocator::new(counter),
            guard: Mutex::new(()),
            file_lock: None,
        }
    }

    fn locked<T>(&self, op: impl FnOnce() -> Result<T>) -> Result<T> {
        let _guard = self
            .guard
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let _file_lock = match &self.file_lock {
            Some((path, timeout_ms)) => Some(FileLock::acquire(path, *timeout_ms)?),
            None => None,
        };
        op()
    }

    /// All active tasks, ascending by id
    pub fn list(&self) -> Result<Vec<Task>> {
        self.locked(|| {
            let tasks = self.active.load();
            tracing::debug!(count = tasks.len(), "listed tasks");
            Ok(tasks)
        })
    }

    /// Fetch an active task
    ///
    /// An id that only exists in the deleted collection yields
    /// [`Error::Gone`] with the deletion date.
    pub fn get(&self, id: u64) -> Result<Task> {
        check_id(id)?;
        self.locked(|| {
            if let Some(task) = find_by_id(&self.active.load(), id) {
                return Ok(task.clone());
            }
            match find_by_id(&self.deleted.load(), id) {
                Some(record) => {
                    let deleted_on = record.deleted_on();
                    tracing::warn!(id, %deleted_on, "requested task was deleted");
                    Err(Error::Gone { id, deleted_on })
                }
                None => Err(Error::not_found(id)),
            }
        })
    }

    pub fn create(&self, new_task: NewTask) -> Result<Task> {
        new_task.validate()?;
        self.locked(|| {
            let mut tasks = self.active.load();
            let deleted = self.deleted.load();

            let stored = tasks
                .iter()
                .map(|t| t.id)
                .chain(deleted.iter().map(|r| r.task.id));
            let id = self.ids.allocate(stored)?;

            let task = new_task.into_task(id);
            insert_sorted(&mut tasks, task.clone());
            self.active.save(&tasks)?;

            tracing::info!(id, "task created");
            Ok(task)
        })
    }

    /// Replace every field except the id
    pub fn replace(&self, id: u64, new_task: NewTask) -> Result<Task> {
        check_id(id)?;
        new_task.validate()?;
        self.locked(|| {
            let mut tasks = self.active.load();
            let slot = tasks
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| Error::not_found(id))?;
            *slot = new_task.into_task(id);
            let task = slot.clone();
            self.active.save(&tasks)?;

            tracing::info!(id, "task replaced");
            Ok(task)
        })
    }

    /// Update only the fields present in `patch`
    pub fn patch(&self, id: u64, patch: TaskPatch) -> Result<Task> {
        check_id(id)?;
        patch.validate()?;
        self.locked(|| {
            let mut tasks = self.active.load();
            let slot = tasks
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| Error::not_found(id))?;
            if patch.is_empty() {
                return Ok(slot.clone());
            }
            patch.apply(slot);
            let task = slot.clone();
            self.active.save(&tasks)?;

            tracing::info!(id, "task patched");
            Ok(task)
        })
    }

    /// Soft delete: move the task into the deleted collection
    ///
    /// The deleted collection is written first. If the active collection
    /// then fails to save, the task is left in both and the error returned.
    pub fn delete(&self, id: u64) -> Result<DeletedTask> {
        check_id(id)?;
        self.locked(|| {
            let mut tasks = self.active.load();
            let task = take_by_id(&mut tasks, id).ok_or_else(|| Error::not_found(id))?;

            let record = archive::archive(self.deleted.as_ref(), task)?;
            if let Err(err) = self.active.save(&tasks) {
                tracing::error!(
                    id,
                    error = %err,
                    "archived task but could not remove it from the active collection"
                );
                return Err(err);
            }

            tracing::info!(id, "task deleted");
            Ok(record)
        })
    }

    /// All deleted tasks, ascending by id
    pub fn list_deleted(&self) -> Result<Vec<DeletedTask>> {
        self.locked(|| {
            let records = self.deleted.load();
            tracing::debug!(count = records.len(), "listed deleted tasks");
            Ok(records)
        })
    }

    pub fn get_deleted(&self, id: u64) -> Result<DeletedTask> {
        check_id(id)?;
        self.locked(|| {
            find_by_id(&self.deleted.load(), id)
                .cloned()
                .ok_or_else(|| Error::deleted_not_found(id))
        })
    }

    /// Move a deleted task back into the active collection
    pub fn restore(&self, id: u64) -> Result<Task> {
        check_id(id)?;
        self.locked(|| {
            let task = archive::restore(self.active.as_ref(), self.deleted.as_ref(), id)?;
            tracing::info!(id, "task restored");
            Ok(task)
        })
    }

    /// Permanently remove a deleted task; its id is never reissued
    pub fn purge(&self, id: u64) -> Result<DeletedTask> {
        check_id(id)?;
        self.locked(|| {
            if find_by_id(&self.deleted.load(), id).is_none() {
                return Err(Error::deleted_not_found(id));
            }
            self.ids.retire(id)?;
            let record = archive::purge(self.deleted.as_ref(), id)?;
            tracing::warn!(id, "task purged permanently");
            Ok(record)
        })
    }
}

fn check_id(id: u64) -> Result<()> {
    if id == 0 {
        return Err(Error::InvalidArgument(
            "task id must be a positive integer".to_string(),
        ));
    }
    Ok(())
}
