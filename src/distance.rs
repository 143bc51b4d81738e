//! Squared Euclidean distances between two sets of vectors.
//!
//! Uses the expansion `|q - r|² = |q|² + |r|² - 2 q·r`; cancellation can push
//! tiny results below zero, those are clamped to `0.0`.

use smartcore::linalg::basic::arrays::{Array, Array2};
use smartcore::linalg::basic::matrix::DenseMatrix;

/// M×M' matrix of squared distances between the rows of `queries` (M×D)
/// and the rows of `refs` (M'×D).
///
/// # Panics
///
/// Panics if the two matrices differ in column count.
pub fn squared_l2_distance(queries: &DenseMatrix<f64>, refs: &DenseMatrix<f64>) -> DenseMatrix<f64> {
    let (m, d) = queries.shape();
    let (m_ref, d_ref) = refs.shape();
    assert_eq!(d, d_ref, "dimension mismatch: {} vs {}", d, d_ref);

    let q_norms: Vec<f64> = (0..m)
        .map(|i| (0..d).map(|k| queries.get((i, k)).powi(2)).sum())
        .collect();
    let r_norms: Vec<f64> = (0..m_ref)
        .map(|j| (0..d).map(|k| refs.get((j, k)).powi(2)).sum())
        .collect();

    let mut out = Vec::with_capacity(m * m_ref);
    for i in 0..m {
        for j in 0..m_ref {
            let dot: f64 = (0..d).map(|k| queries.get((i, k)) * refs.get((j, k))).sum();
            out.push((q_norms[i] + r_norms[j] - 2.0 * dot).max(0.0));
        }
    }

    DenseMatrix::from_iterator(out.into_iter(), m, m_ref, 0)
}

/// Rows `positions` of a flat row-major buffer with `dim` columns.
pub fn gather_rows(flat: &[f64], dim: usize, positions: &[usize]) -> DenseMatrix<f64> {
    DenseMatrix::from_iterator(
        positions
            .iter()
            .flat_map(|&p| flat[p * dim..(p + 1) * dim].iter().copied()),
        positions.len(),
        dim,
        0,
    )
}

/// Squared distance between two slices, computed directly.
#[inline]
pub fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
