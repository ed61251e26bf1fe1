//! Error types shared across the crate.

use std::path::PathBuf;

/// Result alias using the crate [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by configuration, persistence, parsing and serving.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Filesystem access failed.
    #[error("io error on {path}: {message}")]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error message.
        message: String,
    },

    /// JSON (de)serialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML (de)serialization failed.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A class-name pattern is not a valid regular expression.
    #[error("invalid class pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The filesystem watcher could not be set up.
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),

    /// Source text could not be parsed by the frontend.
    #[error("parse error: {0}")]
    Parse(String),

    /// Configuration is inconsistent or unreadable.
    #[error("config error: {0}")]
    Config(String),

    /// The HTTP server failed to bind or run.
    #[error("server error: {0}")]
    Server(String),
}

impl Error {
    /// Wraps a port-level error that occurred while touching `path`.
    pub fn io(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Io { path: path.into(), message: err.to_string() }
    }
}
