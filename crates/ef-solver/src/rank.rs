//! Numeric rank estimation.

use nalgebra::DMatrix;

/// Effective rank of `m` from its singular values.
///
/// Uses the conventional threshold `max(nrows, ncols) · eps · σ_max`, so
/// singular values that are only roundoff away from zero do not count.
pub fn numeric_rank(m: &DMatrix<f64>) -> usize {
    if m.nrows() == 0 || m.ncols() == 0 {
        return 0;
    }
    let svd = m.clone().svd(false, false);
    let sigma_max = svd.singular_values.max();
    if sigma_max <= 0.0 {
        return 0;
    }
    let eps = m.nrows().max(m.ncols()) as f64 * f64::EPSILON * sigma_max;
    svd.rank(eps)
}
