//! Feature corpus assembly.
//!
//! Joins the caption, frame-path and key-frame stores with a
//! [`FeatureSource`] into an aligned [`FeatureCorpus`]. Segments are visited
//! in ascending [`SegmentId`] order and frames in file (= frame index) order,
//! so the same inputs always produce the same corpus ordering.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::corpus::FeatureCorpus;
use crate::error::{CoreError, CoreResult};
use crate::segment::{FrameIndex, SegmentId};
use crate::stores::{CaptionStore, FramePathStore, KeyFrameSelector, KeyFrameSet};
use crate::vector::FeatureVector;

/// Per-segment raw feature rows.
///
/// Row position in a segment's source is its frame index.
pub trait FeatureSource {
    /// Rows of `segment` whose frame index is in `frames`, in row order.
    ///
    /// Returns `Ok(None)` when no source is registered for `segment`. Frames
    /// past the end of the source are simply absent from the result.
    fn select_rows(
        &self,
        segment: &SegmentId,
        frames: &KeyFrameSet,
    ) -> CoreResult<Option<Vec<(FrameIndex, FeatureVector)>>>;
}

/// Feature rows held in memory. Useful for tests and pre-extracted batches.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFeatures {
    rows: BTreeMap<SegmentId, Vec<FeatureVector>>,
}

impl InMemoryFeatures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register all rows of one segment; row `i` is frame `i`.
    pub fn insert(&mut self, segment: SegmentId, rows: Vec<FeatureVector>) {
        self.rows.insert(segment, rows);
    }
}

impl FeatureSource for InMemoryFeatures {
    fn select_rows(
        &self,
        segment: &SegmentId,
        frames: &KeyFrameSet,
    ) -> CoreResult<Option<Vec<(FrameIndex, FeatureVector)>>> {
        Ok(self.rows.get(segment).map(|rows| {
            rows.iter()
                .enumerate()
                .filter(|(frame, _)| frames.contains(frame))
                .map(|(frame, row)| (frame, row.clone()))
                .collect()
        }))
    }
}

/// Joins populated stores into a [`FeatureCorpus`].
#[derive(Debug, Clone, Copy)]
pub struct CorpusBuilder<'a> {
    captions: &'a CaptionStore,
    frame_paths: &'a FramePathStore,
    key_frames: &'a KeyFrameSelector,
}

impl<'a> CorpusBuilder<'a> {
    pub fn new(
        captions: &'a CaptionStore,
        frame_paths: &'a FramePathStore,
        key_frames: &'a KeyFrameSelector,
    ) -> Self {
        Self {
            captions,
            frame_paths,
            key_frames,
        }
    }

    /// Assemble the corpus.
    ///
    /// For every segment in the key-frame selector, every key frame that has
    /// a feature row becomes one record. Fails with
    /// [`CoreError::MissingCaption`] when a segment has no caption and
    /// [`CoreError::MissingFramePath`] when a selected frame was never
    /// crawled. Segments without any feature source contribute nothing.
    pub fn build(&self, source: &dyn FeatureSource) -> CoreResult<FeatureCorpus> {
        let mut corpus = FeatureCorpus::default();
        let mut without_features = 0usize;

        for (segment, frames) in self.key_frames.iter() {
            let caption = self.captions.caption_of(segment)?;

            let Some(rows) = source.select_rows(segment, frames)? else {
                debug!(segment = %segment, "no feature source; skipping segment");
                without_features += 1;
                continue;
            };

            let before = corpus.len();
            for (frame, feature) in rows {
                let path = self.frame_paths.path_of(segment, frame)?;
                if !corpus.is_empty() && feature.len() != corpus.dimension() {
                    return Err(CoreError::DimensionMismatch {
                        segment: segment.clone(),
                        frame,
                        expected: corpus.dimension(),
                        actual: feature.len(),
                    });
                }
                corpus.push(feature, caption.to_owned(), path.to_path_buf());
            }
            debug!(
                segment = %segment,
                key_frames = frames.len(),
                records = corpus.len() - before,
                "assembled segment"
            );
        }

        info!(
            records = corpus.len(),
            dimension = corpus.dimension(),
            segments = self.key_frames.len(),
            without_features,
            "assembled feature corpus"
        );
        Ok(corpus)
    }
}
