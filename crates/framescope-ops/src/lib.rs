//! Framescope Operations Layer
//!
//! Loads the raw inputs (frame crawl, caption database, key-frame lists,
//! feature files), assembles them into a [`Catalog`], persists it as a
//! single snapshot, and exposes the query and per-segment operations used by
//! the CLI.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use framescope_ops::{Catalog, Config, Sources, SnapshotStore};
//!
//! fn main() -> Result<(), framescope_ops::OpsError> {
//!     let config = Config::load()?;
//!     let sources = Sources {
//!         frames_dir: "data/frames".into(),
//!         captions_file: "data/captions.json".into(),
//!         key_frames_dir: "data/keyframes".into(),
//!         features_dir: "data/features".into(),
//!     };
//!
//!     let mut catalog = Catalog::load(&sources, &config)?;
//!     catalog.normalize();
//!     SnapshotStore::new(&config.snapshot_path).save(&catalog)?;
//!
//!     let query = catalog.corpus().features()[0].clone();
//!     for hit in catalog.query_cosine(&query, 5)? {
//!         println!("{:.3} {} {}", hit.score, hit.caption, hit.frame_path.display());
//!     }
//!     Ok(())
//! }
//! ```

mod captions;
mod catalog;
mod config;
mod error;
mod features;
mod frames;
mod keyframes;
mod scan;
mod snapshot;

// Re-export public API
pub use captions::load_captions;
pub use catalog::{Catalog, CatalogStats, Sources};
pub use config::{Config, CONFIG_KEYS};
pub use error::{OpsError, OpsResult};
pub use features::{parse_row, FeatureFiles};
pub use frames::load_frame_paths;
pub use keyframes::{load_key_frames, parse_key_frames};
pub use snapshot::{SnapshotHeader, SnapshotStore, SNAPSHOT_VERSION};
