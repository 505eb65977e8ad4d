//! Observed flow tables and their normalized probability form.

use crate::error::{ModelError, ModelResult};
use ef_core::ensure_finite;
use nalgebra::{DMatrix, DVector};

/// An N×N table of observed origin–destination flows.
///
/// Entries are non-negative and finite; the diagonal is forced to zero
/// because self-flow is not modeled. Read-only once constructed.
#[derive(Debug, Clone)]
pub struct FlowMatrix {
    flows: DMatrix<f64>,
}

impl FlowMatrix {
    /// Validate and adopt a square matrix of non-negative flows.
    ///
    /// The diagonal is zeroed unconditionally.
    pub fn new(mut flows: DMatrix<f64>) -> ModelResult<Self> {
        if flows.nrows() != flows.ncols() {
            return Err(ModelError::NotSquare {
                rows: flows.nrows(),
                cols: flows.ncols(),
            });
        }
        for i in 0..flows.nrows() {
            for j in 0..flows.ncols() {
                let v = flows[(i, j)];
                ensure_finite(v, "flow entry")?;
                if v < 0.0 {
                    return Err(ModelError::NegativeFlow {
                        row: i,
                        col: j,
                        value: v,
                    });
                }
            }
        }
        flows.fill_diagonal(0.0);
        Ok(Self { flows })
    }

    /// Number of cities (matrix side length).
    pub fn n_cities(&self) -> usize {
        self.flows.nrows()
    }

    /// Sum of all flows.
    pub fn total(&self) -> f64 {
        self.flows.sum()
    }

    /// Normalize so that all entries sum to one.
    pub fn normalize(&self) -> ModelResult<ProbabilityMatrix> {
        let total = self.total();
        if total <= 0.0 {
            return Err(ModelError::ZeroTotalFlow);
        }
        Ok(ProbabilityMatrix {
            probs: &self.flows / total,
        })
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.flows
    }
}

/// A flow matrix normalized to a joint probability distribution.
///
/// This is the ground truth the solvers are benchmarked against; it is
/// never mutated after creation.
#[derive(Debug, Clone)]
pub struct ProbabilityMatrix {
    probs: DMatrix<f64>,
}

impl ProbabilityMatrix {
    pub fn n_cities(&self) -> usize {
        self.probs.nrows()
    }

    /// Outflow marginals: sum over destinations for each origin.
    pub fn row_sums(&self) -> DVector<f64> {
        DVector::from_iterator(self.n_cities(), self.probs.row_iter().map(|r| r.sum()))
    }

    /// Inflow marginals: sum over origins for each destination.
    pub fn col_sums(&self) -> DVector<f64> {
        DVector::from_iterator(self.n_cities(), self.probs.column_iter().map(|c| c.sum()))
    }

    /// Row-major flattening: entry (i, j) lands at index i·N + j.
    ///
    /// The constraint system and both solvers index the unknown vector
    /// this way.
    pub fn flatten(&self) -> DVector<f64> {
        let n = self.n_cities();
        DVector::from_fn(n * n, |k, _| self.probs[(k / n, k % n)])
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.probs
    }
}
