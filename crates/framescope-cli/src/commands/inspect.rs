//! Read-only commands over the snapshot: status, per-segment lookups and
//! caption export.

use std::path::Path;
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use framescope_ops::{Config, SnapshotStore};
use humansize::{format_size, DECIMAL};

use super::open_catalog;

/// Show snapshot status and catalog counts.
pub fn status(config: &Config) -> Result<()> {
    let store = SnapshotStore::new(&config.snapshot_path);

    println!("📊 Framescope Status");
    println!("{:─<50}", "");
    println!();
    println!("💾 Snapshot:   {}", store.path().display());

    let Some((catalog, header)) = store.load()? else {
        println!("   (not built; run `fsc build`)");
        return Ok(());
    };

    let size = std::fs::metadata(store.path())
        .map(|m| m.len())
        .unwrap_or(0);
    let saved = header
        .saved_at
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let stats = catalog.stats();

    println!("📦 Size:       {}", format_size(size, DECIMAL));
    println!("🕒 Saved at:   {} (unix)", saved);
    println!("🔢 Version:    {}", header.version);
    println!();
    println!("Records:            {}", stats.records);
    println!("Dimension:          {}", stats.dimension);
    println!("Normalized:         {}", stats.normalized);
    println!("Videos:             {}", stats.videos);
    println!("Captioned segments: {}", stats.captioned_segments);
    println!("Raw captions:       {}", stats.raw_captions);
    println!("Key-frame segments: {}", stats.key_frame_segments);
    println!("Key frames:         {}", stats.key_frames);
    println!("Frame paths:        {}", stats.frame_paths);
    println!("Feature files:      {}", stats.feature_files);
    println!();
    println!(
        "⚙️  Config:     {}",
        Config::config_file_path()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    );
    Ok(())
}

/// List the key-frame paths of a segment.
pub fn frames(config: &Config, segment: &str) -> Result<()> {
    let (catalog, _) = open_catalog(config)?;
    let segment = catalog.segment(segment)?;
    for path in catalog.frames_of(&segment)? {
        println!("{}", path.display());
    }
    Ok(())
}

/// Print the key-frame feature vectors of a segment, one per line.
pub fn features(config: &Config, segment: &str) -> Result<()> {
    let (catalog, _) = open_catalog(config)?;
    let segment = catalog.segment(segment)?;
    for row in catalog.features_of(&segment)? {
        let line: Vec<String> = row.iter().map(|x| x.to_string()).collect();
        println!("{}", line.join(","));
    }
    Ok(())
}

pub fn caption(config: &Config, segment: &str) -> Result<()> {
    let (catalog, _) = open_catalog(config)?;
    let segment = catalog.segment(segment)?;
    println!("{}", catalog.caption_of(&segment)?);
    Ok(())
}

/// Export every loaded caption, in load order, as a JSON array.
pub fn captions(config: &Config, output: Option<&Path>) -> Result<()> {
    let (catalog, _) = open_catalog(config)?;
    let json = serde_json::to_string_pretty(catalog.raw_captions())?;

    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!(
                "✅ Wrote {} captions to {}",
                catalog.raw_captions().len(),
                path.display()
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Remove the snapshot.
pub fn clean(config: &Config) -> Result<()> {
    let store = SnapshotStore::new(&config.snapshot_path);
    if store.exists() {
        store.clean()?;
        println!("🧹 Removed {}", store.path().display());
    } else {
        println!("Nothing to clean");
    }
    Ok(())
}
