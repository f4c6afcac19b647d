//! Configuration for the operations layer.

use std::path::PathBuf;

use directories::ProjectDirs;
use framescope_core::DEFAULT_VIDEO_ID_LEN;
use framescope_knn::{Accumulator, Metric};
use serde::{Deserialize, Serialize};

use crate::error::{OpsError, OpsResult};

/// Keys accepted by [`Config::get`] / [`Config::set`].
pub const CONFIG_KEYS: &[&str] = &[
    "snapshot_path",
    "video_id_len",
    "frame_extension",
    "default_top_k",
    "default_metric",
    "accumulator",
];

/// Configuration for framescope operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Where `build` writes and queries read the snapshot.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// Length of the video id prefix in segment names.
    #[serde(default = "default_video_id_len")]
    pub video_id_len: usize,

    /// Extension of frame image files.
    #[serde(default = "default_frame_extension")]
    pub frame_extension: String,

    /// Neighbours returned when `-k` is not given.
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,

    #[serde(default)]
    pub default_metric: Metric,

    #[serde(default)]
    pub accumulator: Accumulator,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "framescope", "framescope")
}

fn default_snapshot_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("snapshot.json"))
        .unwrap_or_else(|| PathBuf::from(".framescope/snapshot.json"))
}

fn default_video_id_len() -> usize {
    DEFAULT_VIDEO_ID_LEN
}

fn default_frame_extension() -> String {
    "jpg".to_string()
}

fn default_top_k() -> usize {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            video_id_len: default_video_id_len(),
            frame_extension: default_frame_extension(),
            default_top_k: default_top_k(),
            default_metric: Metric::default(),
            accumulator: Accumulator::default(),
        }
    }
}

impl Config {
    /// Load configuration from disk with environment overrides.
    pub fn load() -> OpsResult<Self> {
        // Try to load from config file
        let mut config = match Self::config_file_path() {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(&path)?;
                serde_json::from_str(&contents)?
            }
            _ => Self::default(),
        };

        // Override with environment variables
        for (var, key) in [
            ("FRAMESCOPE_SNAPSHOT", "snapshot_path"),
            ("FRAMESCOPE_VIDEO_ID_LEN", "video_id_len"),
            ("FRAMESCOPE_FRAME_EXT", "frame_extension"),
            ("FRAMESCOPE_TOP_K", "default_top_k"),
            ("FRAMESCOPE_METRIC", "default_metric"),
            ("FRAMESCOPE_ACCUMULATOR", "accumulator"),
        ] {
            if let Ok(value) = std::env::var(var) {
                config
                    .set(key, &value)
                    .map_err(|e| OpsError::Config(format!("{var}: {e}")))?;
            }
        }

        Ok(config)
    }

    /// Save configuration to disk.
    pub fn save(&self) -> OpsResult<()> {
        if let Some(path) = Self::config_file_path() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let contents = serde_json::to_string_pretty(self)?;
            std::fs::write(&path, contents)?;
        }
        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_file_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Get a configuration value by key.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "snapshot_path" => Some(self.snapshot_path.display().to_string()),
            "video_id_len" => Some(self.video_id_len.to_string()),
            "frame_extension" => Some(self.frame_extension.clone()),
            "default_top_k" => Some(self.default_top_k.to_string()),
            "default_metric" => Some(self.default_metric.to_string()),
            "accumulator" => Some(self.accumulator.to_string()),
            _ => None,
        }
    }

    /// Set a configuration value by key.
    pub fn set(&mut self, key: &str, value: &str) -> OpsResult<()> {
        match key {
            "snapshot_path" => {
                self.snapshot_path = PathBuf::from(value);
            }
            "video_id_len" => {
                self.video_id_len = parse_positive(value)?;
            }
            "frame_extension" => {
                let ext = value.trim_start_matches('.');
                if ext.is_empty() {
                    return Err(OpsError::Config("Frame extension cannot be empty".into()));
                }
                self.frame_extension = ext.to_string();
            }
            "default_top_k" => {
                self.default_top_k = parse_positive(value)?;
            }
            "default_metric" => {
                self.default_metric = value.parse().map_err(OpsError::Config)?;
            }
            "accumulator" => {
                self.accumulator = value.parse().map_err(OpsError::Config)?;
            }
            _ => {
                return Err(OpsError::Config(format!(
                    "Unknown config key: {}. Valid keys: {}",
                    key,
                    CONFIG_KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }
}

fn parse_positive(value: &str) -> OpsResult<usize> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(OpsError::Config(format!(
            "Expected a positive integer, got: {}",
            value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.video_id_len, 13);
        assert_eq!(config.frame_extension, "jpg");
        assert_eq!(config.default_top_k, 10);
        assert_eq!(config.default_metric, Metric::Cosine);
        assert_eq!(config.accumulator, Accumulator::Linear);
    }

    #[test]
    fn test_set_and_get() {
        let mut config = Config::default();
        config.set("default_metric", "euclidean").unwrap();
        config.set("frame_extension", ".png").unwrap();
        config.set("accumulator", "heap").unwrap();
        config.set("default_top_k", "5").unwrap();

        assert_eq!(config.get("default_metric").as_deref(), Some("euclidean"));
        assert_eq!(config.get("frame_extension").as_deref(), Some("png"));
        assert_eq!(config.get("accumulator").as_deref(), Some("heap"));
        assert_eq!(config.get("default_top_k").as_deref(), Some("5"));
        assert!(config.get("nope").is_none());
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(matches!(config.set("default_top_k", "0"), Err(OpsError::Config(_))));
        assert!(matches!(config.set("default_metric", "hamming"), Err(OpsError::Config(_))));
        assert!(matches!(config.set("colour", "blue"), Err(OpsError::Config(_))));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"default_top_k": 3}"#).unwrap();
        assert_eq!(config.default_top_k, 3);
        assert_eq!(config.video_id_len, 13);
    }
}
