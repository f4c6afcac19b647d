//! The loaded catalog: every store plus the assembled feature corpus.
//!
//! A [`Catalog`] is built once, either from source files via
//! [`Catalog::load`] or from a snapshot, and is read-only afterwards except
//! for the explicit [`Catalog::normalize`] step.

use std::path::PathBuf;

use framescope_core::{
    CaptionStore, CoreError, CorpusBuilder, FeatureCorpus, FeatureSource, FeatureVector,
    FrameIndex, FramePathStore, KeyFrameSelector, KeyFrameSet, SegmentId,
};
use framescope_knn::{Accumulator, KnnEngine, Metric, Neighbor};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::captions::load_captions;
use crate::config::Config;
use crate::error::{OpsError, OpsResult};
use crate::features::FeatureFiles;
use crate::frames::load_frame_paths;
use crate::keyframes::load_key_frames;

/// Locations of the four raw inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sources {
    /// Root of the `<segment>/<NNNN>.<ext>` frame tree.
    pub frames_dir: PathBuf,
    /// Caption database (JSON).
    pub captions_file: PathBuf,
    /// Directory of `<segment>.txt` key-frame lists.
    pub key_frames_dir: PathBuf,
    /// Directory of `<segment>.txt` feature files.
    pub features_dir: PathBuf,
}

/// Summary counts for status output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub records: usize,
    pub dimension: usize,
    pub normalized: bool,
    pub videos: usize,
    pub captioned_segments: usize,
    pub raw_captions: usize,
    pub key_frame_segments: usize,
    pub key_frames: usize,
    pub frame_paths: usize,
    pub feature_files: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    video_id_len: usize,
    captions: CaptionStore,
    frame_paths: FramePathStore,
    key_frames: KeyFrameSelector,
    feature_files: FeatureFiles,
    corpus: FeatureCorpus,
    #[serde(skip)]
    accumulator: Accumulator,
}

impl Catalog {
    /// Load all sources and assemble the corpus.
    pub fn load(sources: &Sources, config: &Config) -> OpsResult<Self> {
        let video_id_len = config.video_id_len;
        let frame_paths =
            load_frame_paths(&sources.frames_dir, &config.frame_extension, video_id_len)?;
        let captions = load_captions(&sources.captions_file)?;
        let key_frames = load_key_frames(&sources.key_frames_dir, video_id_len)?;
        let feature_files = FeatureFiles::scan(&sources.features_dir, video_id_len)?;

        let mut catalog =
            Self::assemble(video_id_len, captions, frame_paths, key_frames, feature_files)?;
        catalog.accumulator = config.accumulator;
        Ok(catalog)
    }

    /// Join already-populated stores into a catalog.
    pub fn assemble(
        video_id_len: usize,
        captions: CaptionStore,
        frame_paths: FramePathStore,
        key_frames: KeyFrameSelector,
        feature_files: FeatureFiles,
    ) -> OpsResult<Self> {
        let corpus =
            CorpusBuilder::new(&captions, &frame_paths, &key_frames).build(&feature_files)?;
        info!(
            records = corpus.len(),
            segments = key_frames.len(),
            "catalog assembled"
        );
        Ok(Self {
            video_id_len,
            captions,
            frame_paths,
            key_frames,
            feature_files,
            corpus,
            accumulator: Accumulator::default(),
        })
    }

    /// Choose the top-k accumulator used by queries.
    pub fn set_accumulator(&mut self, accumulator: Accumulator) {
        self.accumulator = accumulator;
    }

    /// Unit-normalize every corpus vector. Required before cosine queries.
    pub fn normalize(&mut self) {
        self.corpus.normalize();
    }

    pub fn engine(&self) -> KnnEngine<'_> {
        KnnEngine::new(&self.corpus).with_accumulator(self.accumulator)
    }

    pub fn query(&self, metric: Metric, query: &[f32], k: usize) -> OpsResult<Vec<Neighbor>> {
        Ok(self.engine().query(metric, query, k)?)
    }

    pub fn query_cosine(&self, query: &[f32], k: usize) -> OpsResult<Vec<Neighbor>> {
        Ok(self.engine().query_cosine(query, k)?)
    }

    pub fn query_euclidean(&self, query: &[f32], k: usize) -> OpsResult<Vec<Neighbor>> {
        Ok(self.engine().query_euclidean(query, k)?)
    }

    /// Parse a segment name with this catalog's video id prefix length.
    pub fn segment(&self, name: &str) -> OpsResult<SegmentId> {
        Ok(SegmentId::parse(name, self.video_id_len)?)
    }

    /// Frame paths of the segment's key frames, ascending by frame index.
    pub fn frames_of(&self, segment: &SegmentId) -> OpsResult<Vec<PathBuf>> {
        let frames = self.key_frames.key_frames_of(segment)?;
        frames
            .iter()
            .map(|&frame| -> OpsResult<PathBuf> {
                Ok(self.frame_paths.path_of(segment, frame)?.to_path_buf())
            })
            .collect()
    }

    /// Feature vectors of the segment's key frames, re-read from its feature
    /// file in file order.
    pub fn features_of(&self, segment: &SegmentId) -> OpsResult<Vec<FeatureVector>> {
        let frames = self.key_frames.key_frames_of(segment)?;
        let rows = self
            .feature_files
            .select_rows(segment, frames)?
            .ok_or_else(|| CoreError::SegmentNotFound {
                segment: segment.clone(),
            })?;
        Ok(rows.into_iter().map(|(_, row)| row).collect())
    }

    /// Feature vector of one frame of a segment, key frame or not.
    pub fn feature_of(&self, segment: &SegmentId, frame: FrameIndex) -> OpsResult<FeatureVector> {
        let wanted: KeyFrameSet = [frame].into_iter().collect();
        let rows = self
            .feature_files
            .select_rows(segment, &wanted)?
            .ok_or_else(|| CoreError::SegmentNotFound {
                segment: segment.clone(),
            })?;
        rows.into_iter()
            .next()
            .map(|(_, row)| row)
            .ok_or_else(|| OpsError::FrameNotFound {
                segment: segment.clone(),
                frame,
            })
    }

    pub fn caption_of(&self, segment: &SegmentId) -> OpsResult<&str> {
        Ok(self.captions.caption_of(segment)?)
    }

    /// Every caption seen while loading, in load order.
    pub fn raw_captions(&self) -> &[String] {
        self.captions.raw_captions()
    }

    pub fn corpus(&self) -> &FeatureCorpus {
        &self.corpus
    }

    #[cfg(test)]
    pub(crate) fn replace_corpus(&mut self, corpus: FeatureCorpus) {
        self.corpus = corpus;
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            records: self.corpus.len(),
            dimension: self.corpus.dimension(),
            normalized: self.corpus.is_normalized(),
            videos: self.captions.video_count(),
            captioned_segments: self.captions.len(),
            raw_captions: self.captions.raw_captions().len(),
            key_frame_segments: self.key_frames.len(),
            key_frames: self.key_frames.key_frame_count(),
            frame_paths: self.frame_paths.len(),
            feature_files: self.feature_files.len(),
        }
    }
}
