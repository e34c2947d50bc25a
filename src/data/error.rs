//! Pool construction errors.

use thiserror::Error;

/// Errors raised while building a [`Pool`](super::Pool).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// The pool has no feature columns.
    #[error("pool has no feature columns")]
    EmptyFeatures,

    /// The pool has no rows.
    #[error("pool has no rows")]
    EmptyRows,

    /// A column or label sequence has the wrong number of samples.
    #[error("{field} has {got} entries, expected {expected}")]
    ShapeMismatch {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    /// A categorical feature declaration references a column that does not exist.
    #[error("categorical feature index {index} out of range for {n_features} columns")]
    CatIndexOutOfRange { index: usize, n_features: usize },

    /// A row has a different number of values than the first row.
    #[error("row {row} has {got} values, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        got: usize,
    },

    /// A string value appeared in a column not declared categorical.
    #[error("row {row}, column {column}: string value in a numeric column (declare it in cat_features)")]
    StringInNumericColumn { row: usize, column: usize },
}
