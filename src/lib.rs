//! taskd - task tracking library
//!
//! Core of the taskd service: task records kept in JSON files, with deleted
//! tasks moved to a separate collection until restored or purged.
//!
//! # Core Concepts
//!
//! - **Active collection**: tasks sorted by id in `tasks.json`
//! - **Deleted collection**: archived tasks with their deletion timestamp
//! - **Id counter**: ids are never reissued, even after a purge
//!
//! # Module Organization
//!
//! - `task`: Task records, payloads and validation
//! - `storage`: JSON file stores and the data directory layout
//! - `ids`: Persistent id allocation
//! - `archive`: Moves between the active and deleted collections
//! - `service`: The operations exposed over HTTP and the CLI
//! - `lock`: File locking and atomic writes
//! - `api`: axum router and handlers
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `taskd.toml`
//! - `logging`: tracing subscriber setup
//! - `error`: Error types and result aliases

pub mod api;
pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod ids;
pub mod lock;
pub mod logging;
pub mod output;
pub mod service;
pub mod storage;
pub mod task;

pub use error::{Error, Result};
pub use service::TaskService;
