//! Error types for corpus construction and querying.

use thiserror::Error;

use crate::segment::{FrameIndex, SegmentId};

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while assembling or querying the feature corpus.
///
/// Lookup failures mean the stores disagree with each other; they are never
/// skipped silently.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The segment's (video, index) pair has no caption.
    #[error("no caption for segment {segment}")]
    MissingCaption { segment: SegmentId },

    /// A key frame has no entry in the frame path store.
    #[error("no frame path for segment {segment}, frame {frame}")]
    MissingFramePath { segment: SegmentId, frame: FrameIndex },

    /// The segment has no key-frame set or no feature source.
    #[error("segment not found: {segment}")]
    SegmentNotFound { segment: SegmentId },

    /// Query rejected before scanning.
    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    /// A cosine similarity fell outside the tolerated unit interval.
    #[error("similarity {score} at corpus index {index} is outside [-1.01, 1.01]; corpus not normalized?")]
    NumericInvariantViolation { index: usize, score: f32 },

    /// A feature row does not match the corpus dimensionality.
    #[error("feature for segment {segment}, frame {frame} has dimension {actual}, expected {expected}")]
    DimensionMismatch {
        segment: SegmentId,
        frame: FrameIndex,
        expected: usize,
        actual: usize,
    },

    /// Parallel corpus sequences disagree in length or dimensionality.
    #[error("invalid corpus: {reason}")]
    InvalidCorpus { reason: String },

    /// A segment name does not follow the `<video id><index>` rule.
    #[error("invalid segment name `{name}`: {reason}")]
    InvalidSegmentName { name: String, reason: String },

    /// A raw feature row could not be read.
    #[error("failed to read features for segment {segment}: {message}")]
    FeatureRead { segment: SegmentId, message: String },
}

impl CoreError {
    pub fn invalid_query(reason: impl Into<String>) -> Self {
        Self::InvalidQuery {
            reason: reason.into(),
        }
    }

    pub fn feature_read(segment: &SegmentId, message: impl Into<String>) -> Self {
        Self::FeatureRead {
            segment: segment.clone(),
            message: message.into(),
        }
    }
}
