//! Error types for Rinku.
//!
//! Library crates use [`RinkuError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! A link returning a failure signal is *not* an error in this sense: it is
//! an ordinary chain outcome. Only faults that abort a run or a lookup land
//! here.

use std::path::PathBuf;

/// Top-level error type for all Rinku operations.
#[derive(Debug, thiserror::Error)]
pub enum RinkuError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Pipeline definition parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (empty names, duplicate step names, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// No resolved step carries the requested name.
    #[error("no resolved step named '{name}'")]
    StepNotFound { name: String },

    /// Dispatch target is not registered.
    #[error("unknown target '{target}'")]
    UnknownTarget { target: String },

    /// Target exists but has no operation with that name.
    #[error("unknown operation '{target}.{operation}'")]
    UnknownOperation { target: String, operation: String },

    /// Operation was invoked with the wrong number of arguments.
    #[error("'{target}.{operation}' expects {expected} argument(s), got {got}")]
    ArityMismatch {
        target: String,
        operation: String,
        expected: usize,
        got: usize,
    },

    /// An operation faulted while running (bad operand types, etc.).
    #[error("'{target}.{operation}' failed: {message}")]
    Operation {
        target: String,
        operation: String,
        message: String,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, RinkuError>;

impl RinkuError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Lookup miss for a named step.
    pub fn step_not_found(name: impl Into<String>) -> Self {
        Self::StepNotFound { name: name.into() }
    }

    /// Fault raised from inside an operation body.
    pub fn operation(
        target: impl Into<String>,
        operation: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Operation {
            target: target.into(),
            operation: operation.into(),
            message: msg.into(),
        }
    }
}
