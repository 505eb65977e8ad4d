//! Error types for model construction.

use ef_core::CoreError;
use thiserror::Error;

/// Errors that can occur while building flow data or constraint systems.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Flow matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("Negative flow at ({row}, {col}): {value}")]
    NegativeFlow { row: usize, col: usize, value: f64 },

    #[error("Total flow is zero; cannot normalize")]
    ZeroTotalFlow,

    #[error("Numeric error: {0}")]
    Core(#[from] CoreError),
}

pub type ModelResult<T> = Result<T, ModelError>;
