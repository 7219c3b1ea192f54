//! Vector helpers shared by the index and the embedders.

use crate::error::{RagError, Result, Stage};

/// An embedding vector.
pub type Embedding = Vec<f32>;

/// Sum of squared per-dimension differences.
///
/// The square root is never taken; ordering by this value matches ordering
/// by Euclidean distance. Callers must check lengths first.
#[inline]
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Fail with [`RagError::DimensionMismatch`] unless `vector` has `expected` entries.
///
/// `stage` is recorded on the error so callers can tell an index build from
/// a query.
pub fn check_dimensions(expected: usize, vector: &[f32], stage: Stage) -> Result<()> {
    if vector.len() != expected {
        return Err(RagError::DimensionMismatch { expected, actual: vector.len(), stage });
    }
    Ok(())
}

/// Scale `vector` to unit length in place. Zero vectors are left untouched.
pub fn normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|x| *x /= norm);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squared_l2_skips_the_root() {
        assert_eq!(squared_l2(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
        assert_eq!(squared_l2(&[1.5, -2.0], &[1.5, -2.0]), 0.0);
    }

    #[test]
    fn dimension_check_reports_both_sides() {
        let err = check_dimensions(3, &[1.0, 2.0], Stage::Search).unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { expected: 3, actual: 2, .. }));
        assert_eq!(err.stage(), Stage::Search);
    }

    #[test]
    fn normalize_leaves_zero_vectors() {
        let mut zero = vec![0.0; 4];
        normalize(&mut zero);
        assert_eq!(zero, vec![0.0; 4]);

        let mut v = vec![3.0, 4.0];
        normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6 && (v[1] - 0.8).abs() < 1e-6);
    }
}
