//! Error types for agesched
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad input, bad config, no history to step through)
//! - 3: Target task not found
//! - 4: Operation failed (IO, serialization)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the agesched CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const NOT_FOUND: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for scheduler operations
#[derive(Error, Debug)]
pub enum Error {
    // Not found (exit code 3)
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    // History (exit code 2)
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("History is disabled")]
    HistoryDisabled,

    // User errors (exit code 2)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Task already exists: {0}")]
    DuplicateTask(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // Inherits code and kind from the failing command
    #[error("line {line}: {source}")]
    ScriptFailed { line: usize, source: Box<Error> },
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ScriptFailed { source, .. } => source.exit_code(),

            Error::TaskNotFound(_) => exit_codes::NOT_FOUND,

            Error::NothingToUndo
            | Error::NothingToRedo
            | Error::HistoryDisabled
            | Error::InvalidInput(_)
            | Error::DuplicateTask(_)
            | Error::InvalidConfig(_)
            | Error::ConfigNotFound(_) => exit_codes::USER_ERROR,

            Error::Io(_) | Error::Json(_) | Error::TomlParse(_) | Error::TomlSerialize(_) => {
                exit_codes::OPERATION_FAILED
            }
        }
    }

    /// Stable machine-readable name of the error category.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::ScriptFailed { source, .. } => source.kind(),
            Error::TaskNotFound(_) => "not_found",
            Error::NothingToUndo | Error::NothingToRedo | Error::HistoryDisabled => "no_history",
            Error::InvalidInput(_) | Error::DuplicateTask(_) => "invalid_input",
            Error::InvalidConfig(_) | Error::ConfigNotFound(_) => "invalid_config",
            Error::Io(_) | Error::Json(_) | Error::TomlParse(_) | Error::TomlSerialize(_) => {
                "operation_failed"
            }
        }
    }

    /// Structured fields for JSON error output, when the variant carries any.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::TaskNotFound(name) | Error::DuplicateTask(name) => {
                Some(serde_json::json!({ "name": name }))
            }
            Error::InvalidInput(message) | Error::InvalidConfig(message) => {
                Some(serde_json::json!({ "message": message }))
            }
            Error::ConfigNotFound(path) => {
                Some(serde_json::json!({ "path": path.to_string_lossy() }))
            }
            Error::ScriptFailed { line, source } => Some(serde_json::json!({
                "line": line,
                "cause": source.details(),
            })),
            _ => None,
        }
    }

    /// True for outcomes a script may report and move past.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            "not_found" | "no_history" | "invalid_input"
        )
    }
}

/// Result type alias for scheduler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub message: String,
    pub code: i32,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            message: err.to_string(),
            code: err.exit_code(),
            kind: err.kind(),
            details: err.details(),
        }
    }
}
