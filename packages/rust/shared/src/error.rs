//! Error types for nbpress.
//!
//! Library crates use [`NbpressError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all nbpress operations.
#[derive(Debug, thiserror::Error)]
pub enum NbpressError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// A required input file does not exist.
    #[error("{} not found", path.display())]
    NotFound { path: PathBuf },

    /// Notebook JSON could not be parsed or serialized.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Notebook is well-formed JSON but not a notebook we can handle.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An external tool could not be started at all.
    #[error("{tool} not found. {hint}")]
    ToolNotFound { tool: String, hint: String },

    /// An external tool ran and exited unsuccessfully.
    #[error("{tool} failed ({status}): {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    /// Installing the browser-automation dependency failed.
    #[error("install error: {0}")]
    Install(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, NbpressError>;

impl NbpressError {
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

    /// Report a missing input file.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }
}
