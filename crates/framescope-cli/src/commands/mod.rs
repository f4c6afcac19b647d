//! Command implementations.

pub mod build;
pub mod config;
pub mod inspect;
pub mod query;

use anyhow::Result;
use framescope_ops::{Catalog, Config, SnapshotHeader, SnapshotStore};

/// Open the configured snapshot, failing if it has not been built.
pub fn open_catalog(config: &Config) -> Result<(Catalog, SnapshotHeader)> {
    let store = SnapshotStore::new(&config.snapshot_path);
    let (mut catalog, header) = store.load_required()?;
    catalog.set_accumulator(config.accumulator);
    Ok((catalog, header))
}
