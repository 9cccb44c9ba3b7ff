//! taskd task command implementations

use serde::Serialize;

use super::Context;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};
use crate::task::{NewTask, Task, TaskPatch};

/// Fields for `task add` and `task replace`
pub struct WriteOptions {
    pub title: String,
    pub description: String,
    pub completed: bool,
}

impl WriteOptions {
    fn into_new_task(self) -> NewTask {
        NewTask::new(self.title, self.description).completed(self.completed)
    }
}

/// Fields for `task edit`; `None` leaves a field unchanged
pub struct EditOptions {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Serialize)]
struct TaskListOutput {
    total: usize,
    tasks: Vec<Task>,
}

fn task_line(task: &Task) -> String {
    let mark = if task.completed { "x" } else { " " };
    format!("[{mark}] {} {}", task.id, task.title)
}

fn task_summary(header: impl Into<String>, task: &Task) -> HumanOutput {
    let mut human = HumanOutput::new(header);
    human.push_summary("id", task.id.to_string());
    human.push_summary("title", task.title.clone());
    human.push_summary("description", task.description.clone());
    human.push_summary("completed", task.completed.to_string());
    human
}

pub fn run_list(ctx: &Context) -> Result<()> {
    let tasks = ctx.service().list()?;

    let mut human = HumanOutput::new("Tasks");
    human.push_summary("Total", tasks.len().to_string());
    for task in &tasks {
        human.push_detail(task_line(task));
    }

    let output = TaskListOutput {
        total: tasks.len(),
        tasks,
    };
    emit_success(ctx.output, "task list", &output, Some(&human))
}

pub fn run_show(ctx: &Context, id: u64) -> Result<()> {
    let task = ctx.service().get(id)?;
    let human = task_summary(format!("Task {}", task.id), &task);
    emit_success(ctx.output, "task show", &task, Some(&human))
}

pub fn run_add(ctx: &Context, options: WriteOptions) -> Result<()> {
    let task = ctx.service().create(options.into_new_task())?;
    let mut human = task_summary(format!("task added: {}", task.id), &task);
    human.push_next_step(format!("taskd task show {}", task.id));
    emit_success(ctx.output, "task add", &task, Some(&human))
}

pub fn run_replace(ctx: &Context, id: u64, options: WriteOptions) -> Result<()> {
    let task = ctx.service().replace(id, options.into_new_task())?;
    let human = task_summary(format!("task replaced: {}", task.id), &task);
    emit_success(ctx.output, "task replace", &task, Some(&human))
}

pub fn run_edit(ctx: &Context, id: u64, options: EditOptions) -> Result<()> {
    let patch = TaskPatch {
        title: options.title,
        description: options.description,
        completed: options.completed,
    };
    if patch.is_empty() {
        return Err(Error::InvalidArgument(
            "nothing to change: pass --title, --description or --completed".to_string(),
        ));
    }

    let task = ctx.service().patch(id, patch)?;
    let human = task_summary(format!("task updated: {}", task.id), &task);
    emit_success(ctx.output, "task edit", &task, Some(&human))
}

pub fn run_delete(ctx: &Context, id: u64) -> Result<()> {
    let record = ctx.service().delete(id)?;

    let mut human = HumanOutput::new(format!("task deleted: {id}"));
    human.push_summary("title", record.task.title.clone());
    human.push_summary("deleted at", record.deletion_timestamp.clone());
    human.push_next_step(format!("taskd trash restore {id}"));
    emit_success(ctx.output, "task delete", &record, Some(&human))
}
