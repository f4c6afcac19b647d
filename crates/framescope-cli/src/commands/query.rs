//! Query command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use framescope_knn::{Metric, Neighbor};
use framescope_ops::{parse_row, Catalog, Config};

use super::open_catalog;

/// Where the query vector comes from.
#[derive(Debug, Clone)]
pub enum QuerySource {
    /// Comma-separated numbers given on the command line.
    Inline(String),
    /// First non-empty line of a file.
    File(PathBuf),
    /// Stored feature of one frame of a segment.
    Stored { segment: String, frame: usize },
}

impl QuerySource {
    fn resolve(&self, catalog: &Catalog) -> Result<Vec<f32>> {
        match self {
            QuerySource::Inline(text) => {
                parse_row(text).map_err(|e| anyhow::anyhow!("invalid --vector: {e}"))
            }
            QuerySource::File(path) => {
                let contents = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let line = contents
                    .lines()
                    .find(|line| !line.trim().is_empty())
                    .with_context(|| format!("{} contains no vector", path.display()))?;
                parse_row(line).map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))
            }
            QuerySource::Stored { segment, frame } => {
                let segment = catalog.segment(segment)?;
                Ok(catalog.feature_of(&segment, *frame)?)
            }
        }
    }
}

/// Run a k-nearest-neighbour query and print the hits.
pub fn execute(
    config: &Config,
    source: &QuerySource,
    metric: Metric,
    k: usize,
    json: bool,
) -> Result<()> {
    let (catalog, _) = open_catalog(config)?;
    let vector = source.resolve(&catalog)?;
    let hits = catalog.query(metric, &vector, k)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
    } else {
        print_hits(metric, &hits);
    }
    Ok(())
}

fn print_hits(metric: Metric, hits: &[Neighbor]) {
    let label = match metric {
        Metric::Cosine => "similarity",
        Metric::Euclidean => "distance",
    };
    eprintln!("🔍 {} nearest by {} ({})", hits.len(), metric, label);
    for (rank, hit) in hits.iter().enumerate() {
        println!(
            "{:>3}. [{:.4}] #{} {}",
            rank + 1,
            hit.score,
            hit.index,
            hit.caption
        );
        println!("      {}", hit.frame_path.display());
    }
}
