//! Moving tasks between the active and deleted collections
//!
//! Soft delete stamps the task and files it in the deleted collection;
//! restore strips the stamp and files it back; purge drops it for good.
//! Each move is two separate saves with no rollback. Callers hold the
//! data lock for the whole sequence.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::storage::Store;
use crate::task::{insert_sorted, take_by_id, DeletedTask, Task};

/// Stamp `task` with the current time and file it in the deleted collection
pub fn archive(deleted: &dyn Store<Vec<DeletedTask>>, task: Task) -> Result<DeletedTask> {
    archive_at(deleted, task, Utc::now())
}

/// Same as [`archive`], with an explicit deletion time
pub fn archive_at(
    deleted: &dyn Store<Vec<DeletedTask>>,
    task: Task,
    at: DateTime<Utc>,
) -> Result<DeletedTask> {
    let record = DeletedTask::new(task, at);

    let mut records = deleted.load();
    insert_sorted(&mut records, record.clone());
    deleted.save(&records)?;

    tracing::debug!(id = record.task.id, at = %record.deletion_timestamp, "task archived");
    Ok(record)
}

/// Move a deleted task back into the active collection
///
/// Writes the active collection first, then the deleted one. If the second
/// write fails the task is present in both.
pub fn restore(
    active: &dyn Store<Vec<Task>>,
    deleted: &dyn Store<Vec<DeletedTask>>,
    id: u64,
) -> Result<Task> {
    let mut records = deleted.load();
    let record = take_by_id(&mut records, id).ok_or_else(|| Error::deleted_not_found(id))?;
    let task = record.into_task();

    let mut tasks = active.load();
    insert_sorted(&mut tasks, task.clone());
    active.save(&tasks)?;

    if let Err(err) = deleted.save(&records) {
        tracing::error!(id, error = %err, "restored task but could not remove it from the deleted collection");
        return Err(err);
    }

    Ok(task)
}

/// Remove a deleted task permanently, returning what was removed
pub fn purge(deleted: &dyn Store<Vec<DeletedTask>>, id: u64) -> Result<DeletedTask> {
    let mut records = deleted.load();
    let record = take_by_id(&mut records, id).ok_or_else(|| Error::deleted_not_found(id))?;
    deleted.save(&records)?;
    Ok(record)
}
