//! Item-item similarity structure in dense or sparse form.
//!
//! Consumers only talk to [`SimilarityMatrix`]; the enum hides which
//! physical layout was built. Both layouts store a self-similarity of 1.0
//! on the diagonal, and both leave it out of every neighbor query.

use crate::error::SimilarityError;
use interaction_store::ItemId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Physical layout of a similarity structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Representation {
    Dense,
    Sparse,
}

/// Order neighbors by similarity descending, lower item id first on ties
pub fn compare_neighbors(a: &(ItemId, f32), b: &(ItemId, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

// =============================================================================
// Dense
// =============================================================================

/// Row-major `item_count x item_count` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DenseParts")]
pub struct DenseSimilarity {
    item_count: usize,
    values: Vec<f32>,
}

#[derive(Deserialize)]
struct DenseParts {
    item_count: usize,
    values: Vec<f32>,
}

impl TryFrom<DenseParts> for DenseSimilarity {
    type Error = SimilarityError;

    fn try_from(parts: DenseParts) -> Result<Self, Self::Error> {
        let expected = parts.item_count.checked_mul(parts.item_count);
        if expected != Some(parts.values.len()) {
            return Err(SimilarityError::MalformedMatrix {
                reason: format!(
                    "dense matrix for {} items holds {} values",
                    parts.item_count,
                    parts.values.len()
                ),
            });
        }
        Ok(Self {
            item_count: parts.item_count,
            values: parts.values,
        })
    }
}

impl DenseSimilarity {
    pub(crate) fn from_raw(item_count: usize, values: Vec<f32>) -> Self {
        debug_assert_eq!(values.len(), item_count * item_count);
        Self { item_count, values }
    }

    /// Full row for `item`, empty for ids outside the catalog
    pub fn row(&self, item: ItemId) -> &[f32] {
        let n = self.item_count;
        let start = (item as usize).saturating_mul(n);
        self.values.get(start..start.saturating_add(n)).unwrap_or(&[])
    }

    pub fn value_at(&self, i: ItemId, j: ItemId) -> f32 {
        if j as usize >= self.item_count {
            return 0.0;
        }
        self.row(i).get(j as usize).copied().unwrap_or(0.0)
    }

    pub fn neighbors_of(&self, item: ItemId) -> Vec<(ItemId, f32)> {
        self.row(item)
            .iter()
            .enumerate()
            .filter(|&(j, &value)| j != item as usize && value != 0.0)
            .map(|(j, &value)| (j as ItemId, value))
            .collect()
    }

    pub fn nnz(&self) -> usize {
        self.values.iter().filter(|&&v| v != 0.0).count()
    }
}

// =============================================================================
// Sparse
// =============================================================================

/// Per-item rows of `(neighbor, score)` sorted by neighbor id, nonzero only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SparseParts")]
pub struct SparseSimilarity {
    rows: Vec<Vec<(ItemId, f32)>>,
}

#[derive(Deserialize)]
struct SparseParts {
    rows: Vec<Vec<(ItemId, f32)>>,
}

impl TryFrom<SparseParts> for SparseSimilarity {
    type Error = SimilarityError;

    fn try_from(parts: SparseParts) -> Result<Self, Self::Error> {
        let item_count = parts.rows.len();
        for (i, row) in parts.rows.iter().enumerate() {
            if !row.windows(2).all(|w| w[0].0 < w[1].0) {
                return Err(SimilarityError::MalformedMatrix {
                    reason: format!("sparse row {i} is not strictly sorted by item id"),
                });
            }
            if let Some(&(j, _)) = row.last().filter(|&&(j, _)| j as usize >= item_count) {
                return Err(SimilarityError::MalformedMatrix {
                    reason: format!("sparse row {i} references item {j} outside {item_count} items"),
                });
            }
        }
        Ok(Self { rows: parts.rows })
    }
}

impl SparseSimilarity {
    pub(crate) fn from_rows(rows: Vec<Vec<(ItemId, f32)>>) -> Self {
        Self { rows }
    }

    /// Stored entries of `item`, including its diagonal
    pub fn row(&self, item: ItemId) -> &[(ItemId, f32)] {
        self.rows
            .get(item as usize)
            .map(|row| row.as_slice())
            .unwrap_or(&[])
    }

    pub fn value_at(&self, i: ItemId, j: ItemId) -> f32 {
        let row = self.row(i);
        match row.binary_search_by_key(&j, |&(item, _)| item) {
            Ok(pos) => row[pos].1,
            Err(_) => 0.0,
        }
    }

    pub fn neighbors_of(&self, item: ItemId) -> Vec<(ItemId, f32)> {
        self.row(item)
            .iter()
            .filter(|&&(j, value)| j != item && value != 0.0)
            .copied()
            .collect()
    }

    pub fn nnz(&self) -> usize {
        self.rows.iter().map(|row| row.len()).sum()
    }

    pub fn item_count(&self) -> usize {
        self.rows.len()
    }
}

// =============================================================================
// Uniform interface
// =============================================================================

/// Similarity structure produced by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimilarityMatrix {
    Dense(DenseSimilarity),
    Sparse(SparseSimilarity),
}

impl SimilarityMatrix {
    /// Similarity of a single pair; 0.0 for unrelated or unknown items
    pub fn value_at(&self, i: ItemId, j: ItemId) -> f32 {
        match self {
            SimilarityMatrix::Dense(dense) => dense.value_at(i, j),
            SimilarityMatrix::Sparse(sparse) => sparse.value_at(i, j),
        }
    }

    /// Nonzero-similarity neighbors of `item` in ascending item id order.
    ///
    /// `item` itself is never included.
    pub fn neighbors_of(&self, item: ItemId) -> Vec<(ItemId, f32)> {
        match self {
            SimilarityMatrix::Dense(dense) => dense.neighbors_of(item),
            SimilarityMatrix::Sparse(sparse) => sparse.neighbors_of(item),
        }
    }

    /// The `k` most similar neighbors, best first (ties: lower item id)
    pub fn top_k_neighbors(&self, item: ItemId, k: usize) -> Vec<(ItemId, f32)> {
        let mut neighbors = self.neighbors_of(item);
        neighbors.sort_by(compare_neighbors);
        neighbors.truncate(k);
        neighbors
    }

    pub fn item_count(&self) -> usize {
        match self {
            SimilarityMatrix::Dense(dense) => dense.item_count,
            SimilarityMatrix::Sparse(sparse) => sparse.item_count(),
        }
    }

    /// Number of stored nonzero entries (diagonal included)
    pub fn nnz(&self) -> usize {
        match self {
            SimilarityMatrix::Dense(dense) => dense.nnz(),
            SimilarityMatrix::Sparse(sparse) => sparse.nnz(),
        }
    }

    pub fn representation(&self) -> Representation {
        match self {
            SimilarityMatrix::Dense(_) => Representation::Dense,
            SimilarityMatrix::Sparse(_) => Representation::Sparse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense() -> SimilarityMatrix {
        #[rustfmt::skip]
        let values = vec![
            1.0, 0.5, 0.0,
            0.5, 1.0, -0.2,
            0.0, -0.2, 1.0,
        ];
        SimilarityMatrix::Dense(DenseSimilarity::from_raw(3, values))
    }

    fn sparse() -> SimilarityMatrix {
        SimilarityMatrix::Sparse(SparseSimilarity::from_rows(vec![
            vec![(0, 1.0), (1, 0.5)],
            vec![(0, 0.5), (1, 1.0), (2, -0.2)],
            vec![(1, -0.2), (2, 1.0)],
        ]))
    }

    #[test]
    fn test_neighbors_exclude_self() {
        for matrix in [dense(), sparse()] {
            assert_eq!(matrix.neighbors_of(0), vec![(1, 0.5)]);
            assert_eq!(matrix.neighbors_of(1), vec![(0, 0.5), (2, -0.2)]);
            assert_eq!(matrix.neighbors_of(2), vec![(1, -0.2)]);
        }
    }

    #[test]
    fn test_value_at_matches_across_representations() {
        let (d, s) = (dense(), sparse());
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(d.value_at(i, j), s.value_at(i, j));
            }
        }
    }

    #[test]
    fn test_unknown_items() {
        for matrix in [dense(), sparse()] {
            assert_eq!(matrix.value_at(7, 0), 0.0);
            assert_eq!(matrix.value_at(0, 7), 0.0);
            assert!(matrix.neighbors_of(7).is_empty());
        }
    }

    #[test]
    fn test_top_k_order_and_ties() {
        let matrix = SimilarityMatrix::Sparse(SparseSimilarity::from_rows(vec![
            vec![(0, 1.0), (1, 0.3), (2, 0.9), (3, 0.3)],
            vec![],
            vec![],
            vec![],
        ]));
        assert_eq!(matrix.top_k_neighbors(0, 2), vec![(2, 0.9), (1, 0.3)]);
        assert_eq!(
            matrix.top_k_neighbors(0, 10),
            vec![(2, 0.9), (1, 0.3), (3, 0.3)]
        );
    }

    #[test]
    fn test_deserialize_rejects_wrong_dense_size() {
        let json = r#"{"Dense":{"item_count":3,"values":[1.0,0.5,0.5,1.0]}}"#;
        assert!(serde_json::from_str::<SimilarityMatrix>(json).is_err());

        let json = r#"{"Dense":{"item_count":2,"values":[1.0,0.5,0.5,1.0]}}"#;
        let matrix: SimilarityMatrix = serde_json::from_str(json).unwrap();
        assert_eq!(matrix.neighbors_of(0), vec![(1, 0.5)]);
    }

    #[test]
    fn test_deserialize_rejects_unsorted_sparse_rows() {
        let json = r#"{"Sparse":{"rows":[[[1,0.5],[0,1.0]],[[0,0.5],[1,1.0]]]}}"#;
        assert!(serde_json::from_str::<SimilarityMatrix>(json).is_err());

        let json = r#"{"Sparse":{"rows":[[[0,1.0],[5,0.5]],[[1,1.0]]]}}"#;
        assert!(serde_json::from_str::<SimilarityMatrix>(json).is_err());
    }

    #[test]
    fn test_nnz_and_representation() {
        assert_eq!(dense().nnz(), 7);
        assert_eq!(sparse().nnz(), 7);
        assert_eq!(dense().representation(), Representation::Dense);
        assert_eq!(sparse().representation(), Representation::Sparse);
        assert_eq!(sparse().item_count(), 3);
    }
}
