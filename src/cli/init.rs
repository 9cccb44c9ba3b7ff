//! taskd init command implementation
//!
//! Creates the data directory with empty stores and a default config file.

use std::path::{Path, PathBuf};

use super::Context;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};

#[derive(serde::Serialize)]
struct InitReport {
    data_dir: PathBuf,
    config: PathBuf,
    created: InitCreated,
}

#[derive(serde::Serialize)]
struct InitCreated {
    config: bool,
    files: Vec<PathBuf>,
}

pub fn run(ctx: &Context) -> Result<()> {
    let storage = ctx.storage();
    let created_files = storage.init()?;
    let created_config = ensure_config(ctx, &ctx.config_path)?;

    let report = InitReport {
        data_dir: storage.data_dir().to_path_buf(),
        config: ctx.config_path.clone(),
        created: InitCreated {
            config: created_config,
            files: created_files.clone(),
        },
    };

    let mut created_items: Vec<String> = created_files
        .iter()
        .map(|path| path.display().to_string())
        .collect();
    if created_config {
        created_items.push(ctx.config_path.display().to_string());
    }

    let header = if created_items.is_empty() {
        "taskd init: nothing to do"
    } else {
        "taskd init: initialized data directory"
    };

    let mut human = HumanOutput::new(header);
    human.push_summary("data dir", storage.data_dir().display().to_string());
    human.push_summary(
        "created",
        if created_items.is_empty() {
            "none".to_string()
        } else {
            created_items.join(", ")
        },
    );
    human.push_next_step("taskd task add --title <title> --description <text>");
    human.push_next_step("taskd serve");

    emit_success(ctx.output, "init", &report, Some(&human))
}

fn ensure_config(ctx: &Context, path: &Path) -> Result<bool> {
    if path.exists() {
        if !path.is_file() {
            return Err(Error::OperationFailed(format!(
                "config path exists but is not a file: {}",
                path.display()
            )));
        }
        return Ok(false);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    ctx.config.save(path)?;
    Ok(true)
}
