use crate::CoreError;

/// Floating point type used throughout the system
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Shannon entropy of a probability vector, in nats.
///
/// Entries at or below zero contribute nothing (0 * ln 0 = 0 by convention),
/// so this is safe on solver output where forced-zero cells sit at exactly 0
/// or a tiny positive residual.
pub fn shannon_entropy(p: &[Real]) -> Real {
    p.iter()
        .filter(|&&x| x > 0.0)
        .map(|&x| -x * x.ln())
        .sum()
}
