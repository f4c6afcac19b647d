//! Lookup stores populated during the load phase.
//!
//! Each store is filled once by its loader and is read-only afterwards; the
//! [`CorpusBuilder`](crate::CorpusBuilder) joins them into the feature corpus.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::segment::{FrameIndex, SegmentId};

/// Frame indices selected as key frames for one segment.
pub type KeyFrameSet = BTreeSet<FrameIndex>;

// ---------------------------------------------------------------------------
// Caption store
// ---------------------------------------------------------------------------

/// (video id, segment index) → caption, plus every caption seen in load order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptionStore {
    #[serde(with = "crate::entries")]
    captions: BTreeMap<SegmentId, String>,
    raw: Vec<String>,
}

impl CaptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a video's per-segment captions. Segment index = position.
    pub fn insert_video<I, S>(&mut self, video: &str, sentences: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for (index, sentence) in sentences.into_iter().enumerate() {
            let sentence = sentence.into();
            self.raw.push(sentence.clone());
            self.captions.insert(SegmentId::new(video, index), sentence);
        }
    }

    pub fn get(&self, segment: &SegmentId) -> Option<&str> {
        self.captions.get(segment).map(String::as_str)
    }

    /// Caption for `segment`, or [`CoreError::MissingCaption`].
    pub fn caption_of(&self, segment: &SegmentId) -> CoreResult<&str> {
        self.get(segment).ok_or_else(|| CoreError::MissingCaption {
            segment: segment.clone(),
        })
    }

    /// Every caption ever loaded, in load order.
    pub fn raw_captions(&self) -> &[String] {
        &self.raw
    }

    /// Number of (video, segment) entries.
    pub fn len(&self) -> usize {
        self.captions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captions.is_empty()
    }

    /// Distinct video ids with at least one caption.
    pub fn video_count(&self) -> usize {
        self.captions
            .keys()
            .map(|id| id.video.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }
}

// ---------------------------------------------------------------------------
// Frame path store
// ---------------------------------------------------------------------------

/// (segment, frame index) → frame image path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FramePathStore {
    #[serde(with = "crate::entries")]
    paths: BTreeMap<(SegmentId, FrameIndex), PathBuf>,
}

impl FramePathStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, segment: SegmentId, frame: FrameIndex, path: impl Into<PathBuf>) {
        self.paths.insert((segment, frame), path.into());
    }

    pub fn get(&self, segment: &SegmentId, frame: FrameIndex) -> Option<&Path> {
        // BTreeMap lookups on a tuple key need an owned key.
        self.paths
            .get(&(segment.clone(), frame))
            .map(PathBuf::as_path)
    }

    /// Path for a key frame, or [`CoreError::MissingFramePath`].
    pub fn path_of(&self, segment: &SegmentId, frame: FrameIndex) -> CoreResult<&Path> {
        self.get(segment, frame)
            .ok_or_else(|| CoreError::MissingFramePath {
                segment: segment.clone(),
                frame,
            })
    }

    /// All crawled frames of one segment, ascending by frame index.
    pub fn frames(&self, segment: &SegmentId) -> impl Iterator<Item = (FrameIndex, &Path)> + '_ {
        let lo = (segment.clone(), FrameIndex::MIN);
        let hi = (segment.clone(), FrameIndex::MAX);
        self.paths
            .range(lo..=hi)
            .map(|((_, frame), path)| (*frame, path.as_path()))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Key-frame selector
// ---------------------------------------------------------------------------

/// Segment → key-frame set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyFrameSelector {
    #[serde(with = "crate::entries")]
    sets: BTreeMap<SegmentId, KeyFrameSet>,
}

impl KeyFrameSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, segment: SegmentId, frames: impl IntoIterator<Item = FrameIndex>) {
        self.sets.insert(segment, frames.into_iter().collect());
    }

    pub fn get(&self, segment: &SegmentId) -> Option<&KeyFrameSet> {
        self.sets.get(segment)
    }

    /// Key frames of `segment`, or [`CoreError::SegmentNotFound`].
    pub fn key_frames_of(&self, segment: &SegmentId) -> CoreResult<&KeyFrameSet> {
        self.get(segment).ok_or_else(|| CoreError::SegmentNotFound {
            segment: segment.clone(),
        })
    }

    /// Segments in ascending id order, with their key frames.
    pub fn iter(&self) -> impl Iterator<Item = (&SegmentId, &KeyFrameSet)> {
        self.sets.iter()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Total key frames across all segments.
    pub fn key_frame_count(&self) -> usize {
        self.sets.values().map(BTreeSet::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caption_store_positions_and_raw() {
        let mut store = CaptionStore::new();
        store.insert_video("v_aaaaaaaaaaa", ["first", "second"]);
        store.insert_video("v_bbbbbbbbbbb", ["third"]);

        assert_eq!(store.len(), 3);
        assert_eq!(store.video_count(), 2);
        assert_eq!(
            store.get(&SegmentId::new("v_aaaaaaaaaaa", 1)),
            Some("second")
        );
        assert_eq!(store.raw_captions(), &["first", "second", "third"]);
        assert!(matches!(
            store.caption_of(&SegmentId::new("v_aaaaaaaaaaa", 2)),
            Err(CoreError::MissingCaption { .. })
        ));
    }

    #[test]
    fn test_frame_paths_range_per_segment() {
        let a = SegmentId::new("vid", 1);
        let b = SegmentId::new("vid", 2);
        let mut store = FramePathStore::new();
        store.insert(b.clone(), 0, "b/0001.jpg");
        store.insert(a.clone(), 3, "a/0004.jpg");
        store.insert(a.clone(), 0, "a/0001.jpg");

        let frames: Vec<_> = store.frames(&a).map(|(f, _)| f).collect();
        assert_eq!(frames, vec![0, 3]);
        assert_eq!(store.path_of(&b, 0).unwrap(), Path::new("b/0001.jpg"));
        assert!(matches!(
            store.path_of(&b, 1),
            Err(CoreError::MissingFramePath { frame: 1, .. })
        ));
    }

    #[test]
    fn test_key_frame_selector_lookup() {
        let seg = SegmentId::new("vid", 0);
        let mut selector = KeyFrameSelector::new();
        selector.insert(seg.clone(), [4, 0, 2, 2]);

        let frames: Vec<_> = selector.key_frames_of(&seg).unwrap().iter().copied().collect();
        assert_eq!(frames, vec![0, 2, 4]);
        assert_eq!(selector.key_frame_count(), 3);
        assert!(matches!(
            selector.key_frames_of(&SegmentId::new("vid", 9)),
            Err(CoreError::SegmentNotFound { .. })
        ));
    }

    #[test]
    fn test_stores_json_round_trip() {
        let seg = SegmentId::new("vid", 0);
        let mut paths = FramePathStore::new();
        paths.insert(seg.clone(), 0, "vid0/0001.jpg");
        let mut keys = KeyFrameSelector::new();
        keys.insert(seg, [0]);

        let paths_back: FramePathStore =
            serde_json::from_str(&serde_json::to_string(&paths).unwrap()).unwrap();
        let keys_back: KeyFrameSelector =
            serde_json::from_str(&serde_json::to_string(&keys).unwrap()).unwrap();
        assert_eq!(paths_back, paths);
        assert_eq!(keys_back, keys);
    }
}
