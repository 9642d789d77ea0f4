//! Mean and covariance inputs, with scalar broadcasting.

use nalgebra::{DMatrix, DVector, RealField};

use crate::error::{Result, SigmaPointError};

/// Mean and covariance of a distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct Moments<T: RealField + Copy> {
    pub mean: DVector<T>,
    pub covariance: DMatrix<T>,
}

/// A mean given either as a vector or as a scalar.
///
/// A scalar is a one-element vector, so it only fits a 1-dimensional generator.
#[derive(Debug, Clone, PartialEq)]
pub enum Mean<T: RealField + Copy> {
    Scalar(T),
    Vector(DVector<T>),
}

impl<T: RealField + Copy> Mean<T> {
    pub fn into_vector(self) -> DVector<T> {
        match self {
            Mean::Scalar(value) => DVector::from_element(1, value),
            Mean::Vector(vector) => vector,
        }
    }
}

impl<T: RealField + Copy> From<DVector<T>> for Mean<T> {
    fn from(vector: DVector<T>) -> Self {
        Mean::Vector(vector)
    }
}

impl<T: RealField + Copy> From<&DVector<T>> for Mean<T> {
    fn from(vector: &DVector<T>) -> Self {
        Mean::Vector(vector.clone())
    }
}

impl<T: RealField + Copy> From<Vec<T>> for Mean<T> {
    fn from(values: Vec<T>) -> Self {
        Mean::Vector(DVector::from_vec(values))
    }
}

impl From<f64> for Mean<f64> {
    fn from(value: f64) -> Self {
        Mean::Scalar(value)
    }
}

impl From<f32> for Mean<f32> {
    fn from(value: f32) -> Self {
        Mean::Scalar(value)
    }
}

/// A covariance given either as a full matrix or as a scalar variance `I·v`.
#[derive(Debug, Clone, PartialEq)]
pub enum Covariance<T: RealField + Copy> {
    Scalar(T),
    Matrix(DMatrix<T>),
}

impl<T: RealField + Copy> Covariance<T> {
    /// Expand to an `n x n` matrix. Scalars become `I·v`, matrices pass through untouched.
    pub fn into_matrix(self, n: usize) -> DMatrix<T> {
        match self {
            Covariance::Scalar(value) => DMatrix::identity(n, n) * value,
            Covariance::Matrix(matrix) => matrix,
        }
    }
}

impl<T: RealField + Copy> From<DMatrix<T>> for Covariance<T> {
    fn from(matrix: DMatrix<T>) -> Self {
        Covariance::Matrix(matrix)
    }
}

impl<T: RealField + Copy> From<&DMatrix<T>> for Covariance<T> {
    fn from(matrix: &DMatrix<T>) -> Self {
        Covariance::Matrix(matrix.clone())
    }
}

impl From<f64> for Covariance<f64> {
    fn from(value: f64) -> Self {
        Covariance::Scalar(value)
    }
}

impl From<f32> for Covariance<f32> {
    fn from(value: f32) -> Self {
        Covariance::Scalar(value)
    }
}

/// Shape checks shared by every generator.
pub(crate) fn check_inputs<T: RealField + Copy>(
    n: usize,
    mean: &DVector<T>,
    covariance: &DMatrix<T>,
) -> Result<()> {
    if mean.len() != n {
        return Err(SigmaPointError::DimensionMismatch {
            expected: n,
            actual: mean.len(),
        });
    }
    check_covariance(n, covariance)
}

pub(crate) fn check_covariance<T: RealField + Copy>(n: usize, covariance: &DMatrix<T>) -> Result<()> {
    if covariance.shape() != (n, n) {
        return Err(SigmaPointError::CovarianceShape {
            expected: n,
            rows: covariance.nrows(),
            cols: covariance.ncols(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_covariance_broadcasts_to_scaled_identity() {
        let p: DMatrix<f64> = Covariance::from(3.0).into_matrix(2);
        assert_eq!(p, DMatrix::from_row_slice(2, 2, &[3.0, 0.0, 0.0, 3.0]));
    }

    #[test]
    fn scalar_mean_is_one_element() {
        let x = Mean::from(2.5f64).into_vector();
        assert_eq!(x.len(), 1);
        assert_eq!(x[0], 2.5);
    }

    #[test]
    fn shape_checks() {
        let x = DVector::from_vec(vec![0.0, 1.0]);
        let p = DMatrix::<f64>::identity(2, 2);
        assert!(check_inputs(2, &x, &p).is_ok());
        assert_eq!(
            check_inputs(3, &x, &p),
            Err(SigmaPointError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        );
        assert_eq!(
            check_inputs(2, &x, &DMatrix::<f64>::identity(2, 3)),
            Err(SigmaPointError::CovarianceShape {
                expected: 2,
                rows: 2,
                cols: 3
            })
        );
    }
}
