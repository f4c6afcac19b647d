//! Per-segment feature files.
//!
//! One `<segment name>.txt` per segment; line `i` holds the comma-separated
//! feature vector of frame `i`. Files are registered at load time and read on
//! demand, and only the requested rows are parsed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use framescope_core::{
    CoreError, CoreResult, FeatureSource, FeatureVector, FrameIndex, KeyFrameSet, SegmentId,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{OpsError, OpsResult};
use crate::scan::{file_stem, files_with_extension};

const FEATURE_EXT: &str = "txt";

/// Segment → feature file path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureFiles {
    #[serde(with = "framescope_core::entries")]
    files: BTreeMap<SegmentId, PathBuf>,
}

impl FeatureFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every feature file under `root`.
    pub fn scan(root: &Path, video_id_len: usize) -> OpsResult<Self> {
        info!(root = %root.display(), "registering feature files");
        let mut files = Self::new();
        for path in files_with_extension(root, FEATURE_EXT)? {
            let segment = SegmentId::parse(file_stem(&path)?, video_id_len)?;
            if files.get(&segment).is_some() {
                return Err(OpsError::parse(
                    &path,
                    format!("duplicate feature file for segment {segment}"),
                ));
            }
            debug!(segment = %segment, path = %path.display(), "feature file");
            files.insert(segment, path);
        }
        info!(files = files.len(), "feature files registered");
        Ok(files)
    }

    pub fn insert(&mut self, segment: SegmentId, path: impl Into<PathBuf>) {
        self.files.insert(segment, path.into());
    }

    pub fn get(&self, segment: &SegmentId) -> Option<&Path> {
        self.files.get(segment).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FeatureSource for FeatureFiles {
    fn select_rows(
        &self,
        segment: &SegmentId,
        frames: &KeyFrameSet,
    ) -> CoreResult<Option<Vec<(FrameIndex, FeatureVector)>>> {
        let Some(path) = self.get(segment) else {
            return Ok(None);
        };
        let Some(&last) = frames.last() else {
            return Ok(Some(Vec::new()));
        };

        let contents = std::fs::read_to_string(path)
            .map_err(|e| CoreError::feature_read(segment, format!("{}: {e}", path.display())))?;

        let mut rows = Vec::with_capacity(frames.len());
        for (frame, line) in contents.lines().enumerate().take(last.saturating_add(1)) {
            if !frames.contains(&frame) {
                continue;
            }
            let row = parse_row(line).map_err(|e| {
                CoreError::feature_read(
                    segment,
                    format!("{} line {}: {e}", path.display(), frame + 1),
                )
            })?;
            rows.push((frame, row));
        }
        Ok(Some(rows))
    }
}

/// Parse one comma-separated feature row. Every component must be a finite
/// `f32`; `inf`, `NaN` and out-of-range literals such as `1e39` are rejected.
pub fn parse_row(line: &str) -> Result<FeatureVector, String> {
    line.trim()
        .split(',')
        .map(|field| {
            let field = field.trim();
            match field.parse::<f32>() {
                Ok(value) if value.is_finite() => Ok(value),
                Ok(_) => Err(format!("`{field}` is not a finite f32")),
                Err(_) => Err(format!("`{field}` is not a number")),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_row() {
        assert_eq!(parse_row("0.5, -1,2e-1\n").unwrap(), vec![0.5, -1.0, 0.2]);
        assert!(parse_row("").is_err());
        assert!(parse_row("1,,2").is_err());
    }

    #[test]
    fn test_parse_row_rejects_non_finite() {
        for line in ["inf,1", "1,-inf", "NaN,0", "1e39,0"] {
            let err = parse_row(line).unwrap_err();
            assert!(err.contains("finite"), "{line}: {err}");
        }
        assert_eq!(parse_row("3.4e38,0").unwrap(), vec![3.4e38, 0.0]);
    }

    #[test]
    fn test_select_rows_rejects_infinite_component() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("v_aaaaaaaaaaa0.txt"), "inf,1\n").unwrap();

        let files = FeatureFiles::scan(tmp.path(), 13).unwrap();
        let frames: KeyFrameSet = [0].into_iter().collect();
        assert!(matches!(
            files.select_rows(&SegmentId::new("v_aaaaaaaaaaa", 0), &frames),
            Err(CoreError::FeatureRead { .. })
        ));
    }

    #[test]
    fn test_select_rows_parses_only_key_frames() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("v_aaaaaaaaaaa0.txt");
        // Row 1 is garbage but never selected.
        std::fs::write(&path, "1,0\nnot,a,row\n0,1\n").unwrap();

        let files = FeatureFiles::scan(tmp.path(), 13).unwrap();
        let segment = SegmentId::new("v_aaaaaaaaaaa", 0);
        assert!(files.get(&segment).is_some());

        let frames: KeyFrameSet = [0, 2, 5].into_iter().collect();
        let rows = files.select_rows(&segment, &frames).unwrap().unwrap();
        assert_eq!(rows, vec![(0, vec![1.0, 0.0]), (2, vec![0.0, 1.0])]);

        let bad: KeyFrameSet = [1].into_iter().collect();
        assert!(matches!(
            files.select_rows(&segment, &bad),
            Err(CoreError::FeatureRead { .. })
        ));
    }

    #[test]
    fn test_unknown_segment_has_no_rows() {
        let files = FeatureFiles::new();
        let frames: KeyFrameSet = [0].into_iter().collect();
        assert!(files
            .select_rows(&SegmentId::new("vid", 0), &frames)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_same_segment_twice_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        for dir in ["a", "b"] {
            std::fs::create_dir_all(tmp.path().join(dir)).unwrap();
            std::fs::write(tmp.path().join(dir).join("v_aaaaaaaaaaa0.txt"), "1,0\n").unwrap();
        }
        assert!(matches!(
            FeatureFiles::scan(tmp.path(), 13),
            Err(OpsError::Parse { .. })
        ));
    }
}
