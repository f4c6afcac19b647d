//! Core data model for Framescope.
//!
//! Framescope indexes feature vectors extracted from key frames of video
//! segments and answers nearest-neighbour queries over them. This crate owns
//! the data model:
//!
//! ```text
//! ┌──────────────┐ ┌────────────────┐ ┌──────────────────┐ ┌───────────────┐
//! │ CaptionStore │ │ FramePathStore │ │ KeyFrameSelector │ │ FeatureSource │
//! └──────┬───────┘ └───────┬────────┘ └────────┬─────────┘ └───────┬───────┘
//!        └─────────────────┴─────┬─────────────┴───────────────────┘
//!                                ▼
//!                        ┌───────────────┐
//!                        │ CorpusBuilder │
//!                        └───────┬───────┘
//!                                ▼
//!                 ┌──────────────────────────────┐
//!                 │ FeatureCorpus                │
//!                 │ features / captions / paths  │
//!                 └──────────────────────────────┘
//! ```
//!
//! The query engine lives in `framescope-knn`; loaders and persistence in
//! `framescope-ops`.

pub mod builder;
pub mod corpus;
pub mod entries;
pub mod error;
pub mod segment;
pub mod stores;
pub mod vector;

pub use builder::{CorpusBuilder, FeatureSource, InMemoryFeatures};
pub use corpus::{CorpusRecord, FeatureCorpus, UNIT_NORM_TOLERANCE};
pub use error::{CoreError, CoreResult};
pub use segment::{FrameIndex, SegmentId, DEFAULT_VIDEO_ID_LEN};
pub use stores::{CaptionStore, FramePathStore, KeyFrameSelector, KeyFrameSet};
pub use vector::FeatureVector;
