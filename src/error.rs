//! Error type shared by the runner, the az operation wrappers and the SQL
//! connection assembler.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AzError {
    /// An enumerated parameter was outside its allowed set. Raised before any
    /// process is spawned.
    #[error("invalid {parameter} '{value}': expected one of {expected}")]
    Validation {
        parameter: &'static str,
        value: String,
        expected: String,
    },

    /// The external tool exited with a non-zero status
    #[error("`{command}` exited with code {exit_code}: {stderr}")]
    Process {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    /// stdout was not the JSON shape the operation expects
    #[error("failed to decode output of `{command}`: {reason}")]
    Decode { command: String, reason: String },

    /// A connection string was missing a key or had a malformed entry
    #[error("connection string parse error: {0}")]
    Parse(String),

    #[error("database connection failed: {0}")]
    Connection(String),

    #[error("'{program}' is not installed or not on PATH")]
    ToolMissing { program: String },

    #[error("`{command}` timed out after {after:?}")]
    Timeout { command: String, after: Duration },

    #[error("failed to run `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, AzError>;

impl AzError {
    pub(crate) fn decode(command: impl ToString, reason: impl Into<String>) -> Self {
        AzError::Decode {
            command: command.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn validation(parameter: &'static str, value: &str, allowed: &[&str]) -> Self {
        AzError::Validation {
            parameter,
            value: value.to_string(),
            expected: allowed.join(", "),
        }
    }
}
