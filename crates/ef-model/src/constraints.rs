//! Linear constraint system over the flattened probability vector.
//!
//! For an n-city problem the unknown is the row-major flattened vector
//! p of length n². Marginal constraints fix row and column sums of the
//! probability matrix; diagonal constraints force self-flow entries to
//! zero. One row of each marginal block is redundant (row totals and
//! column totals both equal the total flow), so the builder drops the
//! last row of each block to keep the system independent.

use crate::flow::ProbabilityMatrix;
use nalgebra::{DMatrix, DVector, RowDVector};

/// Equality constraints G·p = a over the flattened probability vector.
#[derive(Debug, Clone)]
pub struct ConstraintSystem {
    g: DMatrix<f64>,
    a: DVector<f64>,
}

impl ConstraintSystem {
    /// Constraint coefficient matrix, M×n².
    pub fn g(&self) -> &DMatrix<f64> {
        &self.g
    }

    /// Constraint targets, length M.
    pub fn a(&self) -> &DVector<f64> {
        &self.a
    }

    /// Number of constraint rows M.
    pub fn num_rows(&self) -> usize {
        self.g.nrows()
    }

    /// Number of unknowns n².
    pub fn num_vars(&self) -> usize {
        self.g.ncols()
    }

    /// The augmented matrix [1ᵗ; G].
    ///
    /// The dual solver requires this to have rank M+1; the all-ones row
    /// stands for the implicit normalization Σp = 1.
    pub fn augmented(&self) -> DMatrix<f64> {
        self.g.clone().insert_row(0, 1.0)
    }
}

/// Incremental builder for a [`ConstraintSystem`].
///
/// Append blocks in any order, then call [`build`](Self::build). Rank
/// validation is deliberately not performed here; the dual solver checks
/// it as a precondition and rejects degenerate systems.
#[derive(Debug, Clone)]
pub struct ConstraintBuilder {
    n: usize,
    rows: Vec<RowDVector<f64>>,
    targets: Vec<f64>,
}

impl ConstraintBuilder {
    /// Empty builder for an n-city problem (n² unknowns).
    pub fn new(n: usize) -> Self {
        Self {
            n,
            rows: Vec::new(),
            targets: Vec::new(),
        }
    }

    /// Append outflow (row-sum) constraints for origins 0..n−1, dropping
    /// the block's last row.
    ///
    /// Row i selects the n flattened entries of origin i with coefficient 1.
    /// Panics if `row_sums` does not have n entries.
    pub fn outflow_marginals(&mut self, row_sums: &DVector<f64>) -> &mut Self {
        assert_eq!(row_sums.len(), self.n, "one row sum per origin");
        for i in 0..self.n.saturating_sub(1) {
            let mut row = RowDVector::zeros(self.n * self.n);
            for j in 0..self.n {
                row[i * self.n + j] = 1.0;
            }
            self.rows.push(row);
            self.targets.push(row_sums[i]);
        }
        self
    }

    /// Append inflow (column-sum) constraints for destinations 0..n−1,
    /// dropping the block's last row.
    ///
    /// Row j selects the n flattened entries of destination j (stride n).
    /// Panics if `col_sums` does not have n entries.
    pub fn inflow_marginals(&mut self, col_sums: &DVector<f64>) -> &mut Self {
        assert_eq!(col_sums.len(), self.n, "one column sum per destination");
        for j in 0..self.n.saturating_sub(1) {
            let mut row = RowDVector::zeros(self.n * self.n);
            for i in 0..self.n {
                row[i * self.n + j] = 1.0;
            }
            self.rows.push(row);
            self.targets.push(col_sums[j]);
        }
        self
    }

    /// Append n diagonal constraints, one per city, each forcing the
    /// flattened self-flow entry i·n + i to zero.
    pub fn zero_diagonal(&mut self) -> &mut Self {
        for i in 0..self.n {
            let mut row = RowDVector::zeros(self.n * self.n);
            row[i * self.n + i] = 1.0;
            self.rows.push(row);
            self.targets.push(0.0);
        }
        self
    }

    /// Append one raw constraint row.
    ///
    /// Escape hatch for non-canonical systems (tests use it to construct
    /// deliberately degenerate ones). Panics if `coeffs` does not have n²
    /// entries.
    pub fn push_row(&mut self, coeffs: RowDVector<f64>, target: f64) -> &mut Self {
        assert_eq!(coeffs.len(), self.n * self.n, "one coefficient per unknown");
        self.rows.push(coeffs);
        self.targets.push(target);
        self
    }

    /// Stack the accumulated rows into an immutable [`ConstraintSystem`].
    pub fn build(self) -> ConstraintSystem {
        let nn = self.n * self.n;
        let g = if self.rows.is_empty() {
            DMatrix::zeros(0, nn)
        } else {
            DMatrix::from_rows(&self.rows)
        };
        let a = DVector::from_vec(self.targets);
        ConstraintSystem { g, a }
    }
}

/// Canonical constraint system for a probability matrix: both marginal
/// blocks (each minus its redundant last row) plus zero-diagonal rows,
/// M = 3n−2 in total.
pub fn marginal_constraints(p: &ProbabilityMatrix) -> ConstraintSystem {
    let mut builder = ConstraintBuilder::new(p.n_cities());
    builder
        .outflow_marginals(&p.row_sums())
        .inflow_marginals(&p.col_sums())
        .zero_diagonal();
    builder.build()
}
