//! The aligned feature corpus searched by the KNN engine.
//!
//! Three parallel sequences share one index: `features[i]`, `captions[i]` and
//! `frame_paths[i]` describe the same key frame. The fields are private and
//! every constructor (including deserialization) re-checks that the lengths
//! agree, so a misaligned corpus cannot be observed.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CoreError, CoreResult};
use crate::vector::{l2_norm, normalize_in_place, FeatureVector};

/// Tolerance for "already unit length" checks.
pub const UNIT_NORM_TOLERANCE: f32 = 1e-4;

/// One corpus record, borrowed by position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorpusRecord<'a> {
    pub index: usize,
    pub feature: &'a [f32],
    pub caption: &'a str,
    pub frame_path: &'a Path,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCorpus")]
pub struct FeatureCorpus {
    features: Vec<FeatureVector>,
    captions: Vec<String>,
    frame_paths: Vec<PathBuf>,
    dimension: usize,
    normalized: bool,
}

/// Unchecked wire form of [`FeatureCorpus`].
#[derive(Deserialize)]
struct RawCorpus {
    features: Vec<FeatureVector>,
    captions: Vec<String>,
    frame_paths: Vec<PathBuf>,
    dimension: usize,
    normalized: bool,
}

impl TryFrom<RawCorpus> for FeatureCorpus {
    type Error = CoreError;

    fn try_from(raw: RawCorpus) -> CoreResult<Self> {
        if raw.features.len() != raw.captions.len() || raw.features.len() != raw.frame_paths.len() {
            return Err(CoreError::InvalidCorpus {
                reason: format!(
                    "sequence lengths differ: {} features, {} captions, {} frame paths",
                    raw.features.len(),
                    raw.captions.len(),
                    raw.frame_paths.len()
                ),
            });
        }
        if let Some(bad) = raw.features.iter().position(|f| f.len() != raw.dimension) {
            return Err(CoreError::InvalidCorpus {
                reason: format!(
                    "feature {bad} has dimension {}, expected {}",
                    raw.features[bad].len(),
                    raw.dimension
                ),
            });
        }
        Ok(Self {
            features: raw.features,
            captions: raw.captions,
            frame_paths: raw.frame_paths,
            dimension: raw.dimension,
            normalized: raw.normalized,
        })
    }
}

impl FeatureCorpus {
    /// Build a corpus directly from `(feature, caption, frame path)` records.
    ///
    /// All features must share one dimensionality.
    pub fn from_records<I, C, P>(records: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (FeatureVector, C, P)>,
        C: Into<String>,
        P: Into<PathBuf>,
    {
        let mut corpus = Self::default();
        for (feature, caption, path) in records {
            if !corpus.is_empty() && feature.len() != corpus.dimension {
                return Err(CoreError::InvalidCorpus {
                    reason: format!(
                        "feature {} has dimension {}, expected {}",
                        corpus.len(),
                        feature.len(),
                        corpus.dimension
                    ),
                });
            }
            corpus.push(feature, caption.into(), path.into());
        }
        Ok(corpus)
    }

    /// Append one aligned record. Callers check dimensionality first.
    pub(crate) fn push(&mut self, feature: FeatureVector, caption: String, frame_path: PathBuf) {
        if self.features.is_empty() {
            self.dimension = feature.len();
        }
        self.features.push(feature);
        self.captions.push(caption);
        self.frame_paths.push(frame_path);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Shared dimensionality `D`; 0 for an empty corpus.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Whether [`normalize`](Self::normalize) has been applied.
    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    pub fn features(&self) -> &[FeatureVector] {
        &self.features
    }

    pub fn captions(&self) -> &[String] {
        &self.captions
    }

    pub fn frame_paths(&self) -> &[PathBuf] {
        &self.frame_paths
    }

    pub fn record(&self, index: usize) -> Option<CorpusRecord<'_>> {
        Some(CorpusRecord {
            index,
            feature: self.features.get(index)?,
            caption: self.captions.get(index)?,
            frame_path: self.frame_paths.get(index)?,
        })
    }

    /// Records in index order.
    pub fn records(&self) -> impl Iterator<Item = CorpusRecord<'_>> {
        self.features
            .iter()
            .zip(&self.captions)
            .zip(&self.frame_paths)
            .enumerate()
            .map(|(index, ((feature, caption), frame_path))| CorpusRecord {
                index,
                feature,
                caption,
                frame_path,
            })
    }

    /// Replace every stored vector with its unit-norm form.
    ///
    /// Idempotent. Zero vectors stay zero. Cosine queries assume this has run.
    pub fn normalize(&mut self) {
        self.features.iter_mut().for_each(|f| normalize_in_place(f));
        self.normalized = true;
        info!(records = self.len(), "normalized feature corpus");
    }

    /// Position of the first record holding a NaN or infinite component.
    pub fn first_non_finite(&self) -> Option<usize> {
        self.features
            .iter()
            .position(|f| f.iter().any(|x| !x.is_finite()))
    }

    /// Whether every non-zero vector has unit length within
    /// [`UNIT_NORM_TOLERANCE`].
    pub fn has_unit_vectors(&self) -> bool {
        self.features.iter().all(|f| {
            let norm = l2_norm(f);
            norm == 0.0 || (norm - 1.0).abs() <= UNIT_NORM_TOLERANCE
        })
    }
}
