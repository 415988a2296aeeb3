//! Vector index abstraction for evidence rows.
//!
//! Row ids are positions in the row table, so an index and its row table
//! must be built together and stay the same length.

use crate::index::cosine_similarity;
use grounded_core::{AppError, AppResult};

/// Trait for nearest-neighbor search backends.
pub trait VectorIndex: Send + Sync {
    /// Number of stored vectors.
    fn len(&self) -> usize;

    /// Whether the index holds no vectors.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vector dimensions.
    fn dimensions(&self) -> usize;

    /// Search for the `k` most similar vectors.
    ///
    /// Returns `(score, row_id)` pairs ordered by descending score.
    fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<(f32, usize)>>;
}

/// Exhaustive in-memory cosine index.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimensions: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    /// Build an index over `vectors`, position `i` being row id `i`.
    pub fn new(dimensions: usize, vectors: Vec<Vec<f32>>) -> AppResult<Self> {
        if let Some((row_id, v)) = vectors
            .iter()
            .enumerate()
            .find(|(_, v)| v.len() != dimensions)
        {
            return Err(AppError::Config(format!(
                "Vector for row {} has {} dimensions, expected {}",
                row_id,
                v.len(),
                dimensions
            )));
        }

        Ok(Self {
            dimensions,
            vectors,
        })
    }
}

impl VectorIndex for FlatIndex {
    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<(f32, usize)>> {
        if query.len() != self.dimensions {
            return Err(AppError::Knowledge(format!(
                "Query vector has {} dimensions, index has {}",
                query.len(),
                self.dimensions
            )));
        }

        let mut scored: Vec<(f32, usize)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(row_id, v)| (cosine_similarity(query, v), row_id))
            .collect();

        // Descending score, ascending row id on ties
        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });
        scored.truncate(k);

        tracing::debug!("Flat search returned {} of {} rows", scored.len(), self.len());

        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(v: &[f32]) -> Vec<f32> {
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        v.iter().map(|x| x / norm).collect()
    }

    #[test]
    fn test_relevant_row_ranks_first() {
        let index = FlatIndex::new(
            4,
            vec![
                normalize(&[-0.3, -0.8, 0.4, -0.2]),
                normalize(&[1.0, 0.5, 0.2, 0.1]),
            ],
        )
        .unwrap();

        let results = index.search(&normalize(&[0.9, 0.4, 0.3, 0.1]), 5).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].1, 1);
        assert!(results[0].0 > 0.9);
        assert!(results[1].0 < 0.0);
    }

    #[test]
    fn test_ties_break_by_row_id() {
        let index = FlatIndex::new(2, vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 0.0]]).unwrap();

        let results = index.search(&[1.0, 0.0], 3).unwrap();
        let ids: Vec<usize> = results.iter().map(|(_, id)| *id).collect();
        assert_eq!(ids, vec![1, 2, 0]);
    }

    #[test]
    fn test_search_truncates_to_k() {
        let index = FlatIndex::new(2, vec![vec![1.0, 0.0]; 10]).unwrap();
        assert_eq!(index.search(&[1.0, 0.0], 3).unwrap().len(), 3);
    }

    #[test]
    fn test_dimension_mismatch() {
        assert!(FlatIndex::new(3, vec![vec![1.0, 0.0]]).is_err());

        let index = FlatIndex::new(2, vec![vec![1.0, 0.0]]).unwrap();
        assert!(index.search(&[1.0, 0.0, 0.0], 1).is_err());
    }

    #[test]
    fn test_empty_index() {
        let index = FlatIndex::new(2, Vec::new()).unwrap();
        assert!(index.is_empty());
        assert!(index.search(&[1.0, 0.0], 5).unwrap().is_empty());
    }
}
