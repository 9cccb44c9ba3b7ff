//! Command-line interface for taskd
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is defined in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;
use crate::logging;
use crate::output::OutputOptions;
use crate::service::TaskService;
use crate::storage::Storage;

mod init;
mod serve;
mod task;
mod trash;

/// taskd - task tracking service
///
/// Serves a REST API over tasks stored as JSON files, and edits the same
/// files from the command line. Deleted tasks are kept until purged.
#[derive(Parser, Debug)]
#[command(name = "taskd")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file (defaults to ./taskd.toml)
    #[arg(long, global = true, env = "TASKD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Data directory, overriding storage.data_dir
    #[arg(long, global = true, env = "TASKD_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the data directory, empty stores and a default taskd.toml
    Init,

    /// Run the HTTP server
    Serve {
        /// Address to bind
        #[arg(long, env = "TASKD_HOST")]
        host: Option<String>,

        /// Port to bind
        #[arg(long, env = "TASKD_PORT")]
        port: Option<u16>,

        /// Directory with the static front-end
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Active task commands
    #[command(subcommand)]
    Task(TaskCommands),

    /// Deleted task commands
    #[command(subcommand)]
    Trash(TrashCommands),
}

/// Active task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// List active tasks
    List,

    /// Show one task
    Show {
        /// Task id
        id: u64,
    },

    /// Create a task
    Add {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,

        /// Mark the task completed
        #[arg(long)]
        completed: bool,
    },

    /// Replace every field of a task
    Replace {
        /// Task id
        id: u64,

        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,

        /// Mark the task completed
        #[arg(long)]
        completed: bool,
    },

    /// Change some fields of a task
    Edit {
        /// Task id
        id: u64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// true or false
        #[arg(long)]
        completed: Option<bool>,
    },

    /// Move a task to the trash
    Delete {
        /// Task id
        id: u64,
    },
}

/// Deleted task subcommands
#[derive(Subcommand, Debug)]
pub enum TrashCommands {
    /// List deleted tasks
    List,

    /// Show one deleted task
    Show {
        /// Task id
        id: u64,
    },

    /// Move a deleted task back to the active tasks
    Restore {
        /// Task id
        id: u64,
    },

    /// Delete a task permanently
    Purge {
        /// Task id
        id: u64,
    },
}

/// Resolved configuration and output settings shared by every command
pub(crate) struct Context {
    pub config: Config,
    pub config_path: PathBuf,
    pub output: OutputOptions,
}

impl Context {
    pub fn storage(&self) -> Storage {
        Storage::from_config(&self.config.storage)
    }

    pub fn service(&self) -> TaskService {
        TaskService::open(&self.storage(), self.config.storage.lock_timeout_ms)
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let (mut config, config_path) = match self.config {
            Some(path) => (Config::load(&path)?, path),
            None => {
                let dir = std::env::current_dir()?;
                (Config::load_from_dir(&dir), dir.join(crate::config::CONFIG_FILE))
            }
        };
        if let Some(dir) = self.data_dir {
            config.storage.data_dir = dir;
        }
        logging::init(&config.log)?;

        let ctx = Context {
            config,
            config_path,
            output: OutputOptions {
                json: self.json,
                quiet: self.quiet,
            },
        };

        match self.command {
            Commands::Init => init::run(&ctx),
            Commands::Serve {
                host,
                port,
                static_dir,
            } => serve::run(
                &ctx,
                serve::ServeOptions {
                    host,
                    port,
                    static_dir,
                },
            ),
            Commands::Task(cmd) => match cmd {
                TaskCommands::List => task::run_list(&ctx),
                TaskCommands::Show { id } => task::run_show(&ctx, id),
                TaskCommands::Add {
                    title,
                    description,
                    completed,
                } => task::run_add(
                    &ctx,
                    task::WriteOptions {
                        title,
                        description,
                        completed,
                    },
                ),
                TaskCommands::Replace {
                    id,
                    title,
                    description,
                    completed,
                } => task::run_replace(
                    &ctx,
                    id,
                    task::WriteOptions {
                        title,
                        description,
                        completed,
                    },
                ),
                TaskCommands::Edit {
                    id,
                    title,
                    description,
                    completed,
                } => task::run_edit(
                    &ctx,
                    id,
                    task::EditOptions {
                        title,
                        description,
                        completed,
                    },
                ),
                TaskCommands::Delete { id } => task::run_delete(&ctx, id),
            },
            Commands::Trash(cmd) => match cmd {
                TrashCommands::List => trash::run_list(&ctx),
                TrashCommands::Show { id } => trash::run_show(&ctx, id),
                TrashCommands::Restore { id } => trash::run_restore(&ctx, id),
                TrashCommands::Purge { id } => trash::run_purge(&ctx, id),
            },
        }
    }
}
