//! Property tests for exact nearest-neighbor search.

use docrag::{FlatIndex, RagError, Stage, squared_l2};
use proptest::prelude::*;

const DIM: usize = 8;

fn arb_vector() -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-10.0f32..10.0f32, DIM)
}

/// Vectors drawn from a small integer grid so that equal distances are common.
fn arb_grid_vector() -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec((-2i8..=2).prop_map(f32::from), DIM)
}

/// **Property 4: k-bound and ordering**
/// *For any* non-empty index and query, `search(query, k)` returns exactly
/// `min(k, N)` results ordered by non-decreasing distance.
mod prop_k_bound {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn returns_min_k_n_in_ascending_order(
            vectors in proptest::collection::vec(arb_vector(), 1..40),
            query in arb_vector(),
            k in 1usize..60,
        ) {
            let n = vectors.len();
            let index = FlatIndex::build(vectors).unwrap();
            let hits = index.search(&query, k).unwrap();

            prop_assert_eq!(hits.len(), k.min(n));
            for pair in hits.windows(2) {
                prop_assert!(pair[0].distance <= pair[1].distance);
            }
        }

        #[test]
        fn agrees_with_a_stable_sort_of_all_distances(
            vectors in proptest::collection::vec(arb_grid_vector(), 1..40),
            query in arb_grid_vector(),
            k in 1usize..10,
        ) {
            let mut expected: Vec<(usize, f32)> =
                vectors.iter().map(|v| squared_l2(v, &query)).enumerate().collect();
            expected.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
            expected.truncate(k);

            let index = FlatIndex::build(vectors).unwrap();
            let actual: Vec<(usize, f32)> = index
                .search(&query, k)
                .unwrap()
                .into_iter()
                .map(|hit| (hit.record_index, hit.distance))
                .collect();

            prop_assert_eq!(actual, expected);
        }
    }
}

/// **Property 5: Self-retrieval**
/// *For any* set of distinct vectors, searching with a stored vector returns
/// that record first with distance 0.
mod prop_self_retrieval {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn stored_vector_is_its_own_nearest_neighbor(
            vectors in proptest::collection::vec(arb_vector(), 1..30),
            pick in any::<prop::sample::Index>(),
        ) {
            let target = pick.index(vectors.len());
            let query = vectors[target].clone();
            // Earlier duplicates would legitimately win the tie.
            prop_assume!(vectors[..target].iter().all(|v| *v != query));

            let index = FlatIndex::build(vectors).unwrap();
            let hits = index.search(&query, 1).unwrap();

            prop_assert_eq!(hits[0].record_index, target);
            prop_assert_eq!(hits[0].distance, 0.0);
        }
    }
}

#[test]
fn inconsistent_lengths_are_rejected_at_build() {
    let err = FlatIndex::build(vec![vec![1.0, 2.0], vec![1.0, 2.0, 3.0]]).unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { expected: 2, actual: 3, .. }));
    assert_eq!(err.stage(), Stage::Indexing);
}

#[test]
fn query_length_is_checked() {
    let index = FlatIndex::build(vec![vec![0.0; 4]]).unwrap();
    let err = index.search(&[0.0; 3], 1).unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { expected: 4, actual: 3, .. }));
    assert_eq!(err.stage(), Stage::Search);
}

#[test]
fn sequence_indices_follow_build_order() {
    let index = FlatIndex::build(vec![vec![3.0], vec![1.0], vec![2.0]]).unwrap();
    let hits = index.search(&[0.0], 3).unwrap();
    let seq: Vec<usize> = hits.iter().map(|h| h.sequence_index).collect();
    assert_eq!(seq, vec![1, 2, 0]);
    assert_eq!(index.record(1).unwrap().vector, vec![1.0]);
}
