//! Error types for Chronicle.
//!
//! Library crates use [`ChronicleError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Chronicle operations.
#[derive(Debug, thiserror::Error)]
pub enum ChronicleError {
    /// No article matches the query, or the resolved page does not exist.
    #[error("not found: {reason}")]
    NotFound { reason: String },

    /// Network/API failure that survived every retry.
    #[error("fetch failed: {reason}")]
    Fetch { reason: String },

    /// Unexpected internal failure while assembling a record.
    #[error("pipeline error: {reason}")]
    Pipeline { reason: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ChronicleError>;

impl ChronicleError {
    pub fn not_found(reason: impl Into<String>) -> Self {
        Self::NotFound {
            reason: reason.into(),
        }
    }

    pub fn fetch(reason: impl Into<String>) -> Self {
        Self::Fetch {
            reason: reason.into(),
        }
    }

    pub fn pipeline(reason: impl Into<String>) -> Self {
        Self::Pipeline {
            reason: reason.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
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

    /// True for failures a user can act on (bad query, flaky network),
    /// false for internal faults that should be reported as a generic failure.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Fetch { .. })
    }

    /// The bare reason string, without the category prefix.
    pub fn reason(&self) -> String {
        match self {
            Self::NotFound { reason } | Self::Fetch { reason } | Self::Pipeline { reason } => {
                reason.clone()
            }
            Self::Config { message } => message.clone(),
            Self::Io { path, source } => format!("{}: {source}", path.display()),
        }
    }
}
