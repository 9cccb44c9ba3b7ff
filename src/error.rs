//! Error types for taskd
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (unknown id, deleted task, invalid input or config)
//! - 4: Operation failed (I/O, serialization, lock contention)

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Exit codes for the taskd CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Which collection a lookup was made against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Active,
    Deleted,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collection::Active => f.write_str("Task"),
            Collection::Deleted => f.write_str("Deleted task"),
        }
    }
}

/// A single broken field constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn describe_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Main error type for taskd operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("{collection} {id} not found")]
    NotFound { collection: Collection, id: u64 },

    #[error("Task {id} was deleted on {deleted_on}")]
    Gone { id: u64, deleted_on: String },

    #[error("Validation failed: {}", describe_violations(.0))]
    Validation(Vec<FieldViolation>),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    pub fn not_found(id: u64) -> Self {
        Error::NotFound {
            collection: Collection::Active,
            id,
        }
    }

    pub fn deleted_not_found(id: u64) -> Self {
        Error::NotFound {
            collection: Collection::Deleted,
            id,
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::NotFound { .. }
            | Error::Gone { .. }
            | Error::Validation(_)
            | Error::InvalidConfig(_)
            | Error::InvalidArgument(_) => exit_codes::USER_ERROR,

            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for machine-readable error output
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::NotFound { collection, id } => Some(json!({
                "collection": collection,
                "id": id,
            })),
            Error::Gone { id, deleted_on } => Some(json!({
                "id": id,
                "deleted_on": deleted_on,
            })),
            Error::Validation(violations) => Some(json!({ "violations": violations })),
            Error::InvalidConfig(message) | Error::InvalidArgument(message) => {
                Some(json!({ "message": message }))
            }
            Error::LockFailed(path) => Some(json!({ "lock": path })),
            _ => None,
        }
    }
}

/// Result type alias for taskd operations
pub type Result<T> = std::result::Result<T, Error>;
