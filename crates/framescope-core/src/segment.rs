//! Segment identifiers.
//!
//! A segment name such as `v_QOlSCBRmfWY12` is a fixed-length video id prefix
//! (`v_QOlSCBRmfWY`) followed by a numeric segment index (`12`). Names are
//! parsed once at load time; every store is keyed by the parsed [`SegmentId`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Length of the video id prefix in segment names.
pub const DEFAULT_VIDEO_ID_LEN: usize = 13;

/// 0-based frame index within a segment.
pub type FrameIndex = usize;

/// Composite segment key: (video id, segment index).
///
/// Ordering is by video id, then numeric segment index, so `v_x2` sorts
/// before `v_x10`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SegmentId {
    pub video: String,
    pub index: usize,
}

impl SegmentId {
    pub fn new(video: impl Into<String>, index: usize) -> Self {
        Self {
            video: video.into(),
            index,
        }
    }

    /// Split a segment name into (video id, segment index) using a
    /// `video_id_len`-byte prefix.
    pub fn parse(name: &str, video_id_len: usize) -> CoreResult<Self> {
        if name.len() <= video_id_len || !name.is_char_boundary(video_id_len) {
            return Err(CoreError::InvalidSegmentName {
                name: name.to_string(),
                reason: format!("expected a {video_id_len}-character video id followed by a segment index"),
            });
        }
        let (video, suffix) = name.split_at(video_id_len);
        let canonical = suffix.bytes().all(|b| b.is_ascii_digit())
            && (suffix == "0" || !suffix.starts_with('0'));
        let index = suffix
            .parse::<usize>()
            .ok()
            .filter(|_| canonical)
            .ok_or_else(|| CoreError::InvalidSegmentName {
                name: name.to_string(),
                reason: format!(
                    "segment index `{suffix}` is not a non-negative integer without sign or leading zeros"
                ),
            })?;
        Ok(Self::new(video, index))
    }

    /// Canonical segment name (`<video><index>`).
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.video, self.index)
    }
}
