//! Ranking metrics and their optimisation direction.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::topk::Candidate;

/// Similarity / distance used to rank corpus records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Dot product of unit vectors; higher is closer.
    #[default]
    Cosine,
    /// L2 distance in raw feature space; lower is closer.
    Euclidean,
}

impl Metric {
    pub fn objective(self) -> Objective {
        match self {
            Metric::Cosine => Objective::Maximize,
            Metric::Euclidean => Objective::Minimize,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Cosine => "cosine",
            Metric::Euclidean => "euclidean",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cosine" | "cos" => Ok(Metric::Cosine),
            "euclidean" | "l2" => Ok(Metric::Euclidean),
            other => Err(format!(
                "unknown metric `{other}` (expected `cosine` or `euclidean`)"
            )),
        }
    }
}

/// Whether higher or lower scores rank first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    Maximize,
    Minimize,
}

impl Objective {
    /// Whether `score` may enter a top-k working set. Any ordered value
    /// qualifies, infinities included; NaN never does.
    pub fn admits(self, score: f32) -> bool {
        !score.is_nan()
    }

    /// Total rank order: better score first, then lower corpus index.
    ///
    /// `Less` means `a` ranks ahead of `b`.
    pub fn rank(self, a: &Candidate, b: &Candidate) -> Ordering {
        let by_score = match self {
            Objective::Maximize => b.score.partial_cmp(&a.score),
            Objective::Minimize => a.score.partial_cmp(&b.score),
        };
        by_score
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.index.cmp(&b.index))
    }
}
