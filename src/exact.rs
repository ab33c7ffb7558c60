//! Brute-force exact search.
//!
//! Scans every item per query, O(N·K). Slow at scale but exact, which makes
//! it the correctness oracle for the KD-tree and the recall reference for
//! HNSW.

use serde::{Deserialize, Serialize};

use crate::corpus::Corpus;
use crate::distance::{euclidean_sq, get_vector};
use crate::error::{IndexError, Result};

/// Exhaustive-scan index. Owns a copy of the corpus arena so a serialized
/// index is self-contained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExactIndex {
    vectors: Vec<f32>,
    dimension: usize,
    num_items: usize,
}

impl ExactIndex {
    pub fn build(corpus: &Corpus) -> Result<Self> {
        if corpus.is_empty() {
            return Err(IndexError::EmptyCorpus);
        }
        Ok(Self {
            vectors: corpus.as_slice().to_vec(),
            dimension: corpus.dimension(),
            num_items: corpus.len(),
        })
    }

    /// The k nearest items to `query`, ascending by distance, ties broken by
    /// ascending item index. `k` larger than the corpus is clamped.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u32, f32)>> {
        check_query(query.len(), self.dimension, k)?;
        let k = k.min(self.num_items);

        let mut scored: Vec<(u32, f32)> = (0..self.num_items)
            .map(|idx| {
                let item = get_vector(&self.vectors, self.dimension, idx);
                (idx as u32, euclidean_sq(query, item))
            })
            .collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);

        Ok(scored.into_iter().map(|(idx, d)| (idx, d.sqrt())).collect())
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn num_items(&self) -> usize {
        self.num_items
    }
}

/// Shared query-argument validation for all backends.
pub(crate) fn check_query(query_dim: usize, item_dim: usize, k: usize) -> Result<()> {
    if query_dim != item_dim {
        return Err(IndexError::DimensionMismatch {
            query: query_dim,
            item: item_dim,
        });
    }
    if k == 0 {
        return Err(IndexError::InvalidParameter(
            "k must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_corpus() -> Corpus {
        Corpus::from_items(&[vec![0.0, 0.0], vec![1.0, 0.0], vec![5.0, 5.0]]).expect("corpus")
    }

    #[test]
    fn nearest_two_of_three() {
        let index = ExactIndex::build(&toy_corpus()).expect("build");
        let hits = index.search(&[0.0, 0.0], 2).expect("search");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0], (0, 0.0));
        assert_eq!(hits[1].0, 1);
        assert!((hits[1].1 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn k_is_clamped_to_corpus_size() {
        let index = ExactIndex::build(&toy_corpus()).expect("build");
        let hits = index.search(&[0.0, 0.0], 10).expect("search");
        assert_eq!(hits.len(), 3);
        assert!(hits.windows(2).all(|w| w[0].1 <= w[1].1));
    }

    #[test]
    fn ties_break_by_ascending_index() {
        let corpus =
            Corpus::from_items(&[vec![1.0, 0.0], vec![0.0, 1.0], vec![-1.0, 0.0]]).expect("corpus");
        let index = ExactIndex::build(&corpus).expect("build");
        let hits = index.search(&[0.0, 0.0], 3).expect("search");
        assert_eq!(
            hits.iter().map(|&(i, _)| i).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn dimension_mismatch_is_reported() {
        let index = ExactIndex::build(&toy_corpus()).expect("build");
        let err = index.search(&[0.0, 0.0, 0.0], 1).unwrap_err();
        assert_eq!(err, IndexError::DimensionMismatch { query: 3, item: 2 });
    }

    #[test]
    fn zero_k_is_rejected() {
        let index = ExactIndex::build(&toy_corpus()).expect("build");
        assert!(matches!(
            index.search(&[0.0, 0.0], 0),
            Err(IndexError::InvalidParameter(_))
        ));
    }
}
