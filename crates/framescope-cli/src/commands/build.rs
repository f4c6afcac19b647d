//! Build command implementation.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use framescope_ops::{Catalog, Config, SnapshotStore, Sources};
use humansize::{format_size, DECIMAL};
use tracing::info;

/// Load every source, assemble the corpus and write the snapshot.
pub fn execute(config: &Config, sources: &Sources, snapshot: &Path, normalize: bool) -> Result<()> {
    let start = Instant::now();
    info!(
        frames = %sources.frames_dir.display(),
        captions = %sources.captions_file.display(),
        key_frames = %sources.key_frames_dir.display(),
        features = %sources.features_dir.display(),
        "building catalog"
    );

    let mut catalog = Catalog::load(sources, config).context("failed to load sources")?;
    if normalize {
        catalog.normalize();
    }

    let store = SnapshotStore::new(snapshot);
    let header = store.save(&catalog)?;
    let size = std::fs::metadata(store.path())
        .map(|m| m.len())
        .unwrap_or(0);

    let stats = catalog.stats();
    eprintln!("✅ Built catalog in {:.2?}", start.elapsed());
    eprintln!("   Records:    {}", header.records);
    eprintln!("   Dimension:  {}", header.dimension);
    eprintln!("   Normalized: {}", header.normalized);
    eprintln!("   Videos:     {}", stats.videos);
    eprintln!(
        "   Key frames: {} across {} segments",
        stats.key_frames, stats.key_frame_segments
    );
    eprintln!(
        "💾 Snapshot:   {} ({})",
        store.path().display(),
        format_size(size, DECIMAL)
    );
    if !normalize {
        eprintln!("⚠️  Corpus not normalized; cosine scores will not be bounded.");
    }

    Ok(())
}
