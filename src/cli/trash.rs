//! taskd trash command implementations

use serde::Serialize;

use super::Context;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::task::DeletedTask;

#[derive(Serialize)]
struct TrashListOutput {
    total: usize,
    tasks: Vec<DeletedTask>,
}

pub fn run_list(ctx: &Context) -> Result<()> {
    let records = ctx.service().list_deleted()?;

    let mut human = HumanOutput::new("Deleted tasks");
    human.push_summary("Total", records.len().to_string());
    for record in &records {
        human.push_detail(format!(
            "{} {} (deleted {})",
            record.task.id,
            record.task.title,
            record.deleted_on()
        ));
    }

    let output = TrashListOutput {
        total: records.len(),
        tasks: records,
    };
    emit_success(ctx.output, "trash list", &output, Some(&human))
}

pub fn run_show(ctx: &Context, id: u64) -> Result<()> {
    let record = ctx.service().get_deleted(id)?;

    let mut human = HumanOutput::new(format!("Deleted task {id}"));
    human.push_summary("title", record.task.title.clone());
    human.push_summary("description", record.task.description.clone());
    human.push_summary("completed", record.task.completed.to_string());
    let deleted_at = record
        .deleted_at()
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| record.deletion_timestamp.clone());
    human.push_summary("deleted at", deleted_at);
    human.push_next_step(format!("taskd trash restore {id}"));
    emit_success(ctx.output, "trash show", &record, Some(&human))
}

pub fn run_restore(ctx: &Context, id: u64) -> Result<()> {
    let task = ctx.service().restore(id)?;

    let mut human = HumanOutput::new(format!("task restored: {id}"));
    human.push_summary("title", task.title.clone());
    emit_success(ctx.output, "trash restore", &task, Some(&human))
}

pub fn run_purge(ctx: &Context, id: u64) -> Result<()> {
    let record = ctx.service().purge(id)?;

    let mut human = HumanOutput::new(format!("task purged: {id}"));
    human.push_summary("title", record.task.title.clone());
    human.push_warning("This action cannot be undone");
    emit_success(ctx.output, "trash purge", &record, Some(&human))
}
