//! Key-frame list loader.
//!
//! One `<segment name>.txt` per segment holding whitespace-separated frame
//! indices. Values may be written as floats (`1.200000e+01`); they are
//! truncated to integers. `#` starts a comment.

use std::path::Path;

use framescope_core::{FrameIndex, KeyFrameSelector, SegmentId};
use tracing::{debug, info};

use crate::error::{OpsError, OpsResult};
use crate::scan::{file_stem, files_with_extension};

const KEY_FRAME_EXT: &str = "txt";

/// Load every key-frame list under `root`.
pub fn load_key_frames(root: &Path, video_id_len: usize) -> OpsResult<KeyFrameSelector> {
    info!(root = %root.display(), "loading key frame information");

    let mut selector = KeyFrameSelector::new();
    for path in files_with_extension(root, KEY_FRAME_EXT)? {
        let segment = SegmentId::parse(file_stem(&path)?, video_id_len)?;
        if selector.get(&segment).is_some() {
            return Err(OpsError::parse(
                &path,
                format!("duplicate key-frame list for segment {segment}"),
            ));
        }
        let contents = std::fs::read_to_string(&path)?;
        let frames = parse_key_frames(&contents).map_err(|e| OpsError::parse(&path, e))?;
        debug!(segment = %segment, key_frames = frames.len(), "key frames");
        selector.insert(segment, frames);
    }

    info!(
        segments = selector.len(),
        key_frames = selector.key_frame_count(),
        "key frames loaded"
    );
    Ok(selector)
}

/// Parse a whitespace-separated list of frame indices.
pub fn parse_key_frames(contents: &str) -> Result<Vec<FrameIndex>, String> {
    contents
        .lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .flat_map(str::split_whitespace)
        .map(parse_frame_index)
        .collect()
}

fn parse_frame_index(token: &str) -> Result<FrameIndex, String> {
    if let Ok(frame) = token.parse::<FrameIndex>() {
        return Ok(frame);
    }
    let value: f64 = token
        .parse()
        .map_err(|_| format!("`{token}` is not a frame index"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("`{token}` is not a non-negative frame index"));
    }
    Ok(value.trunc() as FrameIndex)
}
