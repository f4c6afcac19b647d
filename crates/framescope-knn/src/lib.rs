//! Brute-force k-nearest-neighbour search for Framescope.
//!
//! ```text
//! query ──▶ KnnEngine::scan ──▶ TopK (linear | heap) ──▶ resolve by index ──▶ Vec<Neighbor>
//!                 ▲
//!          FeatureCorpus (borrowed)
//! ```
//!
//! Cosine queries rank by descending similarity over a pre-normalized corpus;
//! Euclidean queries rank by ascending raw distance. Equal scores rank by
//! ascending corpus index, for both accumulators.

pub mod engine;
pub mod metric;
pub mod topk;

pub use engine::{KnnEngine, Neighbor, SIMILARITY_BOUND};
pub use metric::{Metric, Objective};
pub use topk::{Accumulator, Candidate, HeapTopK, LinearTopK, TopK};
