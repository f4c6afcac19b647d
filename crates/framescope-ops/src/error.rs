//! Error types for the operations layer.

use std::path::PathBuf;

use framescope_core::{CoreError, FrameIndex, SegmentId};
use thiserror::Error;

/// Result type for operations.
pub type OpsResult<T> = Result<T, OpsError>;

/// Errors that can occur during operations.
#[derive(Debug, Error)]
pub enum OpsError {
    /// Corpus assembly or query failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Snapshot could not be written, read, or trusted.
    #[error("Snapshot error at {path}: {message}")]
    Persistence { path: PathBuf, message: String },

    /// A source file or directory is malformed.
    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// A source file or directory does not exist.
    #[error("Source not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// The segment has no feature row for the requested frame.
    #[error("No feature row for segment {segment}, frame {frame}")]
    FrameNotFound { segment: SegmentId, frame: FrameIndex },

    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl OpsError {
    pub fn persistence(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Persistence {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}
