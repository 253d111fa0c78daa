//! Error types for photo triage

use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for photo triage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for photo triage
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid arguments: {0}")]
    Validation(String),

    #[error("Too many destinations: {count} given, at most 35 are supported")]
    TooManyDestinations { count: usize },

    #[error("Unknown sort mode '{0}'")]
    UnknownSortMode(String),

    #[error("{path} is not inside the source directory {root}")]
    OutsideSourceRoot { path: PathBuf, root: PathBuf },

    #[error("Failed to transfer {path}: {source}")]
    Transfer {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load preview for {path}: {message}")]
    PreviewLoad { path: PathBuf, message: String },

    #[error("Failed to open video {path}: {message}")]
    PlaybackOpen { path: PathBuf, message: String },

    #[error("Playback control failed: {0}")]
    Playback(String),

    #[error("No video backend available")]
    BackendUnavailable,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
