//! Caption database loader.
//!
//! The database is a JSON object keyed by video id; each value carries a
//! `sentences` array with one caption per segment. Other fields (durations,
//! timestamps) are ignored.

use std::collections::BTreeMap;
use std::path::Path;

use framescope_core::CaptionStore;
use serde::Deserialize;
use tracing::info;

use crate::error::{OpsError, OpsResult};

#[derive(Debug, Deserialize)]
struct VideoEntry {
    sentences: Vec<String>,
}

/// Parse the caption database at `path`.
///
/// Videos are registered in ascending id order, which is also the order of
/// the raw caption list.
pub fn load_captions(path: &Path) -> OpsResult<CaptionStore> {
    info!(path = %path.display(), "loading captions");
    if !path.is_file() {
        return Err(OpsError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }

    let json = std::fs::read_to_string(path)?;
    let database: BTreeMap<String, VideoEntry> =
        serde_json::from_str(&json).map_err(|e| OpsError::parse(path, e.to_string()))?;

    let mut store = CaptionStore::new();
    for (video, entry) in database {
        store.insert_video(&video, entry.sentences);
    }

    info!(
        videos = store.video_count(),
        segments = store.len(),
        "captions loaded"
    );
    Ok(store)
}
