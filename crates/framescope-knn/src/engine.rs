//! Brute-force KNN query engine over a [`FeatureCorpus`].
//!
//! Both metrics share one scan: score every record in index order, offer it to
//! a bounded [`TopK`] accumulator, then resolve the retained indices to their
//! captions and frame paths by position. The engine holds only a shared
//! borrow of the corpus and no caches, so it can be used from many threads.

use std::path::PathBuf;

use framescope_core::vector::{dot, euclidean_distance, normalized};
use framescope_core::{CoreError, CoreResult, FeatureCorpus};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::metric::{Metric, Objective};
use crate::topk::{Accumulator, Candidate, HeapTopK, LinearTopK, TopK};

/// Cosine similarities must fall within `[-SIMILARITY_BOUND, SIMILARITY_BOUND]`.
pub const SIMILARITY_BOUND: f32 = 1.01;

/// One ranked query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Corpus position of the matched record.
    pub index: usize,
    pub caption: String,
    pub frame_path: PathBuf,
    /// Similarity (cosine) or distance (Euclidean).
    pub score: f32,
}

/// Stateless query engine borrowing a corpus.
#[derive(Debug, Clone, Copy)]
pub struct KnnEngine<'a> {
    corpus: &'a FeatureCorpus,
    accumulator: Accumulator,
}

impl<'a> KnnEngine<'a> {
    pub fn new(corpus: &'a FeatureCorpus) -> Self {
        Self {
            corpus,
            accumulator: Accumulator::default(),
        }
    }

    pub fn with_accumulator(mut self, accumulator: Accumulator) -> Self {
        self.accumulator = accumulator;
        self
    }

    /// Dispatch on `metric`.
    pub fn query(&self, metric: Metric, query: &[f32], k: usize) -> CoreResult<Vec<Neighbor>> {
        match metric {
            Metric::Cosine => self.query_cosine(query, k),
            Metric::Euclidean => self.query_euclidean(query, k),
        }
    }

    /// Top-`k` records by cosine similarity, most similar first.
    ///
    /// The query is L2-normalized here; the corpus must already have been
    /// normalized with [`FeatureCorpus::normalize`]. A similarity outside
    /// `[-1.01, 1.01]` aborts with [`CoreError::NumericInvariantViolation`].
    pub fn query_cosine(&self, query: &[f32], k: usize) -> CoreResult<Vec<Neighbor>> {
        self.validate(query, k)?;
        if !self.corpus.is_normalized() {
            warn!("cosine query over a corpus that was never normalized");
        }
        let query = normalized(query);

        let ranked = self.scan(k, Objective::Maximize, |index, feature| {
            let similarity = dot(feature, &query);
            if !(-SIMILARITY_BOUND..=SIMILARITY_BOUND).contains(&similarity) {
                return Err(CoreError::NumericInvariantViolation {
                    index,
                    score: similarity,
                });
            }
            Ok(similarity)
        })?;
        Ok(self.resolve(ranked))
    }

    /// Top-`k` records by Euclidean distance in raw feature space, closest
    /// first.
    pub fn query_euclidean(&self, query: &[f32], k: usize) -> CoreResult<Vec<Neighbor>> {
        self.validate(query, k)?;
        let ranked = self.scan(k, Objective::Minimize, |_, feature| {
            Ok(euclidean_distance(feature, query))
        })?;
        Ok(self.resolve(ranked))
    }

    fn validate(&self, query: &[f32], k: usize) -> CoreResult<()> {
        if k < 1 {
            return Err(CoreError::invalid_query("k must be at least 1"));
        }
        if self.corpus.is_empty() {
            return Err(CoreError::invalid_query("corpus is empty"));
        }
        if query.len() != self.corpus.dimension() {
            return Err(CoreError::invalid_query(format!(
                "query has dimension {}, corpus has {}",
                query.len(),
                self.corpus.dimension()
            )));
        }
        Ok(())
    }

    fn scan<F>(&self, k: usize, objective: Objective, score: F) -> CoreResult<Vec<Candidate>>
    where
        F: Fn(usize, &[f32]) -> CoreResult<f32>,
    {
        let ranked = match self.accumulator {
            Accumulator::Linear => scan_with::<LinearTopK, _>(self.corpus, k, objective, score)?,
            Accumulator::Heap => scan_with::<HeapTopK, _>(self.corpus, k, objective, score)?,
        };
        debug!(
            records = self.corpus.len(),
            k,
            accumulator = %self.accumulator,
            retained = ranked.len(),
            "knn scan complete"
        );
        Ok(ranked)
    }

    fn resolve(&self, ranked: Vec<Candidate>) -> Vec<Neighbor> {
        ranked
            .into_iter()
            .filter_map(|c| {
                let record = self.corpus.record(c.index)?;
                Some(Neighbor {
                    index: c.index,
                    caption: record.caption.to_owned(),
                    frame_path: record.frame_path.to_path_buf(),
                    score: c.score,
                })
            })
            .collect()
    }
}

fn scan_with<A, F>(
    corpus: &FeatureCorpus,
    k: usize,
    objective: Objective,
    score: F,
) -> CoreResult<Vec<Candidate>>
where
    A: TopK,
    F: Fn(usize, &[f32]) -> CoreResult<f32>,
{
    let mut top = A::new(k, objective);
    for (index, feature) in corpus.features().iter().enumerate() {
        top.offer(index, score(index, feature)?);
    }
    Ok(top.into_ranked())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc_corpus() -> FeatureCorpus {
        FeatureCorpus::from_records(vec![
            (vec![1.0, 0.0], "a", "a.jpg"),
            (vec![0.0, 1.0], "b", "b.jpg"),
            (vec![0.707, 0.707], "c", "c.jpg"),
        ])
        .unwrap()
    }

    fn captions(hits: &[Neighbor]) -> Vec<&str> {
        hits.iter().map(|h| h.caption.as_str()).collect()
    }

    #[test]
    fn test_cosine_scenario() {
        let mut corpus = abc_corpus();
        corpus.normalize();
        let hits = KnnEngine::new(&corpus).query_cosine(&[1.0, 0.0], 2).unwrap();

        assert_eq!(captions(&hits), vec!["a", "c"]);
        assert!((hits[0].score - 1.0).abs() < 1e-5);
        assert!((hits[1].score - 0.70710677).abs() < 1e-3);
        assert_eq!(hits[1].frame_path, PathBuf::from("c.jpg"));
    }

    #[test]
    fn test_euclidean_scenario() {
        let corpus = abc_corpus();
        let hits = KnnEngine::new(&corpus).query_euclidean(&[1.0, 0.0], 1).unwrap();

        assert_eq!(captions(&hits), vec!["a"]);
        assert_eq!(hits[0].score, 0.0);
        assert_eq!(hits[0].index, 0);
    }

    #[test]
    fn test_query_dispatch() {
        let mut corpus = abc_corpus();
        corpus.normalize();
        let engine = KnnEngine::new(&corpus);
        assert_eq!(
            engine.query(Metric::Cosine, &[0.0, 1.0], 1).unwrap()[0].caption,
            "b"
        );
        assert_eq!(
            engine.query(Metric::Euclidean, &[0.0, 1.0], 1).unwrap()[0].caption,
            "b"
        );
    }

    #[test]
    fn test_k_larger_than_corpus_returns_every_record() {
        let corpus = abc_corpus();
        let hits = KnnEngine::new(&corpus).query_euclidean(&[0.0, 0.0], 10).unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_euclidean_near_f32_max_returns_k() {
        let corpus = FeatureCorpus::from_records(vec![
            (vec![3e38, 0.0], "far", "far.jpg"),
            (vec![0.0, 0.0], "origin", "origin.jpg"),
        ])
        .unwrap();

        for accumulator in [Accumulator::Linear, Accumulator::Heap] {
            let hits = KnnEngine::new(&corpus)
                .with_accumulator(accumulator)
                .query_euclidean(&[-3e38, 0.0], 2)
                .unwrap();
            assert_eq!(captions(&hits), vec!["origin", "far"], "{accumulator}");
            assert!(hits[0].score.is_finite());
            assert!(hits[1].score >= hits[0].score);
        }
    }

    #[test]
    fn test_query_is_not_mutated_by_cosine() {
        let mut corpus = abc_corpus();
        corpus.normalize();
        let query = vec![3.0, 4.0];
        KnnEngine::new(&corpus).query_cosine(&query, 1).unwrap();
        assert_eq!(query, vec![3.0, 4.0]);
    }

    #[test]
    fn test_invalid_queries_rejected() {
        let corpus = abc_corpus();
        let engine = KnnEngine::new(&corpus);
        assert!(matches!(
            engine.query_cosine(&[1.0, 0.0], 0),
            Err(CoreError::InvalidQuery { .. })
        ));
        assert!(matches!(
            engine.query_euclidean(&[1.0, 0.0, 0.0], 1),
            Err(CoreError::InvalidQuery { .. })
        ));

        let empty = FeatureCorpus::default();
        assert!(matches!(
            KnnEngine::new(&empty).query_euclidean(&[], 1),
            Err(CoreError::InvalidQuery { .. })
        ));
    }

    #[test]
    fn test_unnormalized_corpus_violates_similarity_bound() {
        let corpus = FeatureCorpus::from_records(vec![
            (vec![0.5, 0.0], "small", "s.jpg"),
            (vec![10.0, 0.0], "large", "l.jpg"),
        ])
        .unwrap();
        let err = KnnEngine::new(&corpus)
            .query_cosine(&[1.0, 0.0], 1)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::NumericInvariantViolation { index: 1, .. }
        ));
    }

    #[test]
    fn test_neighbor_serializes() {
        let corpus = abc_corpus();
        let hits = KnnEngine::new(&corpus).query_euclidean(&[1.0, 0.0], 1).unwrap();
        let json = serde_json::to_value(&hits[0]).unwrap();
        assert_eq!(json["caption"], "a");
        assert_eq!(json["frame_path"], "a.jpg");
    }
}
