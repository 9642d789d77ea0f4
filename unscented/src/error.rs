//! Error types for sigma-point generation.

use thiserror::Error;

/// Which stored input a moment-matched generator found to differ on a later call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateField {
    Mean,
    Covariance,
}

impl core::fmt::Display for StateField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StateField::Mean => f.write_str("mean"),
            StateField::Covariance => f.write_str("covariance"),
        }
    }
}

/// Errors that can occur while building generators or producing sigma points.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SigmaPointError {
    /// The mean does not have as many elements as the generator's dimension.
    #[error("expected mean of size {expected}, but size is {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The covariance is not a square matrix of the generator's dimension.
    #[error("expected {expected}x{expected} covariance, got {rows}x{cols}")]
    CovarianceShape {
        expected: usize,
        rows: usize,
        cols: usize,
    },

    /// A generator was requested for a zero-dimensional state.
    #[error("state dimension must be at least 1")]
    InvalidDimension,

    /// A per-dimension moment vector has the wrong length.
    #[error("expected {expected} moment entries, got {actual}")]
    MomentLength { expected: usize, actual: usize },

    /// No real-valued sigma point parameters exist for this dimension.
    #[error("no valid sigma points for dimension {dimension}: {reason}")]
    DomainInvalid {
        dimension: usize,
        reason: &'static str,
    },

    /// The generator was anchored to a mean/covariance and received different ones.
    #[error("input {field} differs from the one the generator was built with")]
    StateInconsistency { field: StateField },

    /// The matrix square root could not be computed.
    #[error("matrix square root failed, covariance is not positive-definite")]
    SquareRootFailed,

    /// Positivity constraint requested without a mean.
    #[error("positively constrained sigma points require the mean")]
    MissingMean,

    /// Positivity constraint requested without a slack parameter.
    #[error("positively constrained sigma points require the slack parameter k")]
    MissingSlack,
}

pub type Result<T> = core::result::Result<T, SigmaPointError>;
