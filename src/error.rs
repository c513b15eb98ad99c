//! Error types for repcheck
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, missing input, invalid config)
//! - 3: Report not clean (unmatched lines, invalid or unlookupable records)
//! - 4: Operation failed (IO, config parse, HTTP client setup)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the repcheck CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const REPORT_NOT_CLEAN: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for repcheck operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Input not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Missing session credential: set {0} or pass --cookie")]
    MissingCredential(String),

    // Report verdict (exit code 3)
    #[error("Report not clean: {invalid} invalid, {unmatched} unmatched, {failed} lookup failures")]
    ReportNotClean {
        invalid: usize,
        unmatched: usize,
        failed: usize,
    },

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::InputNotFound(_)
            | Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::MissingCredential(_) => exit_codes::USER_ERROR,

            // Report verdict
            Error::ReportNotClean { .. } => exit_codes::REPORT_NOT_CLEAN,

            // Operation failures
            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::Http(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }
}

/// Result type alias for repcheck operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: None,
        }
    }
}
