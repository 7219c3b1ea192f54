//! Exact nearest-neighbor index over squared Euclidean distance.
//!
//! [`FlatIndex`] keeps every vector in insertion order and answers queries
//! with a full linear scan. There is no approximation: the `k` returned
//! records are exactly the `k` closest, ties broken by insertion order.

use std::cmp::Ordering;

use tracing::debug;

use crate::error::{RagError, Result, Stage};
use crate::vector::{Embedding, check_dimensions, squared_l2};

/// One stored vector and the chunk it represents.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorRecord {
    /// `sequence_index` of the chunk this vector was computed from.
    pub sequence_index: usize,
    /// The embedding itself.
    pub vector: Embedding,
}

/// A search hit: position of the record in the index and its distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position of the record in insertion order.
    pub record_index: usize,
    /// `sequence_index` carried by the record.
    pub sequence_index: usize,
    /// Squared L2 distance to the query.
    pub distance: f32,
}

/// A brute-force index of fixed-dimension vectors.
///
/// Built once and never mutated; share it behind an `Arc` for concurrent
/// searches.
///
/// # Example
///
/// ```rust,ignore
/// use docrag::FlatIndex;
///
/// let index = FlatIndex::build(vec![vec![0.0, 0.0], vec![1.0, 1.0]])?;
/// let hits = index.search(&[0.9, 0.9], 1)?;
/// assert_eq!(hits[0].record_index, 1);
/// ```
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimensions: usize,
    records: Vec<VectorRecord>,
}

impl FlatIndex {
    /// Build an index from vectors in order; record `i` gets `sequence_index == i`.
    ///
    /// # Errors
    ///
    /// - [`RagError::EmptyInput`] if `vectors` is empty (use [`FlatIndex::empty`]
    ///   for a deliberately empty index).
    /// - [`RagError::DimensionMismatch`] if any vector's length differs from
    ///   the first one's.
    pub fn build(vectors: Vec<Embedding>) -> Result<Self> {
        let records = vectors
            .into_iter()
            .enumerate()
            .map(|(sequence_index, vector)| VectorRecord { sequence_index, vector })
            .collect();
        Self::from_records(records)
    }

    /// Build an index from explicit records, keeping their order.
    ///
    /// # Errors
    ///
    /// Same as [`FlatIndex::build`].
    pub fn from_records(records: Vec<VectorRecord>) -> Result<Self> {
        let dimensions = match records.first() {
            Some(first) => first.vector.len(),
            None => return Err(RagError::EmptyInput),
        };
        for record in &records {
            check_dimensions(dimensions, &record.vector, Stage::Indexing)?;
        }
        debug!(dimensions, record_count = records.len(), "built flat index");
        Ok(Self { dimensions, records })
    }

    /// An index with no records. Every search on it returns no hits.
    pub fn empty(dimensions: usize) -> Self {
        Self { dimensions, records: Vec::new() }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, record_index: usize) -> Option<&VectorRecord> {
        self.records.get(record_index)
    }

    pub fn records(&self) -> &[VectorRecord] {
        &self.records
    }

    /// Return the `min(k, len)` records closest to `query`, closest first.
    ///
    /// # Errors
    ///
    /// - [`RagError::DimensionMismatch`] if `query.len() != self.dimensions()`.
    /// - [`RagError::InvalidConfiguration`] if `k == 0`.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if k == 0 {
            return Err(RagError::InvalidConfiguration("k must be greater than zero".to_string()));
        }
        check_dimensions(self.dimensions, query, Stage::Search)?;

        let mut scored: Vec<(f32, usize)> = self
            .records
            .iter()
            .enumerate()
            .map(|(i, record)| (squared_l2(&record.vector, query), i))
            .collect();

        let take = k.min(scored.len());
        if take == 0 {
            return Ok(Vec::new());
        }
        if take < scored.len() {
            scored.select_nth_unstable_by(take - 1, rank);
            scored.truncate(take);
        }
        // (distance, position) is a total order, so an unstable sort is
        // equivalent to a stable one here.
        scored.sort_unstable_by(rank);

        Ok(scored
            .into_iter()
            .map(|(distance, record_index)| Neighbor {
                record_index,
                sequence_index: self.records[record_index].sequence_index,
                distance,
            })
            .collect())
    }
}

/// Ascending distance, NaN last, then insertion order.
fn rank(a: &(f32, usize), b: &(f32, usize)) -> Ordering {
    let by_distance = match (a.0.is_nan(), b.0.is_nan()) {
        (false, false) => a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal),
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
    };
    by_distance.then(a.1.cmp(&b.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_build_is_rejected_but_empty_index_searches() {
        assert!(matches!(FlatIndex::build(Vec::new()), Err(RagError::EmptyInput)));

        let index = FlatIndex::empty(3);
        assert!(index.search(&[0.0, 0.0, 0.0], 5).unwrap().is_empty());
        let err = index.search(&[0.0], 5).unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { expected: 3, actual: 1, .. }));
        assert_eq!(err.stage(), Stage::Search);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let index =
            FlatIndex::build(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![-1.0, 0.0], vec![5.0, 5.0]])
                .unwrap();
        let hits = index.search(&[0.0, 0.0], 3).unwrap();
        let order: Vec<usize> = hits.iter().map(|h| h.record_index).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert!(hits.iter().all(|h| h.distance == 1.0));
    }

    #[test]
    fn nan_distances_sort_last() {
        let index = FlatIndex::build(vec![vec![f32::NAN], vec![2.0], vec![1.0]]).unwrap();
        let order: Vec<usize> =
            index.search(&[0.0], 3).unwrap().iter().map(|h| h.record_index).collect();
        assert_eq!(order, vec![2, 1, 0]);
    }

    #[test]
    fn zero_k_is_rejected() {
        let index = FlatIndex::build(vec![vec![1.0]]).unwrap();
        assert!(matches!(index.search(&[1.0], 0), Err(RagError::InvalidConfiguration(_))));
    }
}
