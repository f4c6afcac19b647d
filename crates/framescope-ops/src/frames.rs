//! Frame image crawl.
//!
//! Layout: `<root>/.../<segment name>/<NNNN>.<ext>`, where `NNNN` is the
//! 1-based frame number. The stored frame index is `NNNN - 1`.

use std::path::Path;

use framescope_core::{FramePathStore, SegmentId};
use tracing::{debug, info};

use crate::error::{OpsError, OpsResult};
use crate::scan::{file_stem, files_with_extension};

/// Crawl `root` for frame images with extension `ext`.
pub fn load_frame_paths(root: &Path, ext: &str, video_id_len: usize) -> OpsResult<FramePathStore> {
    info!(root = %root.display(), "loading frame path info");

    let mut store = FramePathStore::new();
    for path in files_with_extension(root, ext)? {
        let segment_name = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .ok_or_else(|| OpsError::parse(&path, "frame has no segment directory"))?;
        let segment = SegmentId::parse(segment_name, video_id_len)?;
        let frame = frame_index(&path)?;
        if let Some(existing) = store.get(&segment, frame) {
            return Err(OpsError::parse(
                &path,
                format!(
                    "frame {frame} of segment {segment} already crawled at {}",
                    existing.display()
                ),
            ));
        }
        debug!(segment = %segment, frame, "frame");
        store.insert(segment, frame, path);
    }

    info!(frames = store.len(), "frame paths loaded");
    Ok(store)
}

/// 0-based frame index from a 1-based numeric file stem.
fn frame_index(path: &Path) -> OpsResult<usize> {
    let stem = file_stem(path)?;
    let number: usize = stem
        .parse()
        .map_err(|_| OpsError::parse(path, format!("frame number `{stem}` is not an integer")))?;
    number
        .checked_sub(1)
        .ok_or_else(|| OpsError::parse(path, "frame numbers start at 1"))
}
