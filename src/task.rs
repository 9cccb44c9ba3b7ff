//! Task records and the order-preserving insert shared by both collections
//!
//! Active tasks and deleted tasks are both kept sorted ascending by id.
//! A deleted task is a task plus the moment it was archived; it serializes
//! flat so the deleted file reads like the active one with one extra field.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, FieldViolation, Result};

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// An active task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

/// A task held in the deleted collection
///
/// The timestamp is kept as the ISO-8601 text found on disk. Records
/// written by other tools may lack an offset, and one unparsable stamp
/// must not make the whole collection unreadable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedTask {
    #[serde(flatten)]
    pub task: Task,
    pub deletion_timestamp: String,
}

impl DeletedTask {
    pub fn new(task: Task, deleted_at: DateTime<Utc>) -> Self {
        Self {
            task,
            deletion_timestamp: deleted_at.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        }
    }

    /// Date portion (`YYYY-MM-DD`) of the deletion timestamp
    pub fn deleted_on(&self) -> String {
        self.deletion_timestamp.chars().take(10).collect()
    }

    /// Parsed deletion time; a stamp without an offset is read as UTC
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.deletion_timestamp.as_str();
        DateTime::parse_from_rfc3339(raw)
            .map(|at| at.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                raw.parse::<NaiveDateTime>()
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }

    /// Drop the deletion stamp, giving back the task as it was archived
    pub fn into_task(self) -> Task {
        self.task
    }
}

/// Payload for creating or fully replacing a task
///
/// A client-supplied `id` is accepted so that echoing a task back works,
/// but it is never used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

impl NewTask {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: description.into(),
            completed: false,
        }
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let mut violations = Vec::new();
        check_title(&self.title, &mut violations);
        check_description(&self.description, &mut violations);
        finish(violations)
    }

    /// Build the stored task under the given id
    pub fn into_task(self, id: u64) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            completed: self.completed,
        }
    }
}

/// Payload for a partial update; `None` (absent or null) leaves a field as is
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        let mut violations = Vec::new();
        if let Some(title) = &self.title {
            check_title(title, &mut violations);
        }
        if let Some(description) = &self.description {
            check_description(description, &mut violations);
        }
        finish(violations)
    }

    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}

fn check_title(title: &str, violations: &mut Vec<FieldViolation>) {
    check_length("title", title, TITLE_MAX_CHARS, violations);
}

fn check_description(description: &str, violations: &mut Vec<FieldViolation>) {
    check_length("description", description, DESCRIPTION_MAX_CHARS, violations);
}

fn check_length(field: &str, value: &str, max: usize, violations: &mut Vec<FieldViolation>) {
    let len = value.chars().count();
    if len == 0 {
        violations.push(FieldViolation::new(field, "must not be empty"));
    } else if len > max {
        violations.push(FieldViolation::new(
            field,
            format!("must be at most {max} characters (got {len})"),
        ));
    }
}

fn finish(violations: Vec<FieldViolation>) -> Result<()> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(violations))
    }
}

/// Records that live in an id-ordered collection
pub trait Identified {
    fn id(&self) -> u64;
}

impl Identified for Task {
    fn id(&self) -> u64 {
        self.id
    }
}

impl Identified for DeletedTask {
    fn id(&self) -> u64 {
        self.task.id
    }
}

/// Insert before the first record with a greater id (append if none)
///
/// Returns the position the record landed at. Keeps a sorted collection
/// sorted; an unsorted one is not repaired.
pub fn insert_sorted<R: Identified>(records: &mut Vec<R>, record: R) -> usize {
    let id = record.id();
    let position = records
        .iter()
        .position(|existing| existing.id() > id)
        .unwrap_or(records.len());
    records.insert(position, record);
    position
}

/// Remove the record with `id`, if present
pub fn take_by_id<R: Identified>(records: &mut Vec<R>, id: u64) -> Option<R> {
    let idx = records.iter().position(|record| record.id() == id)?;
    Some(records.remove(idx))
}

pub fn find_by_id<R: Identified>(records: &[R], id: u64) -> Option<&R> {
    records.iter().find(|record| record.id() == id)
}
