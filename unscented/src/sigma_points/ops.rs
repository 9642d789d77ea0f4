//! Injected capabilities: the matrix square root and the state difference.
//!
//! Both are strategies rather than hooks. Every generator takes them as type
//! parameters, defaulting to [`CholeskyUpper`] and [`EuclideanSubtract`], and
//! plain closures implement both traits.

use nalgebra::{Cholesky, DMatrix, DVector, RealField};

use crate::error::{Result, SigmaPointError};

/// Matrix square root returning the *upper* triangular factor `U` with `Uᵀ·U = m`.
///
/// Returning a lower factor does not raise an error, it silently changes the
/// geometry of the generated points.
pub trait MatrixSqrt<T: RealField + Copy> {
    fn sqrt(&self, m: &DMatrix<T>) -> Result<DMatrix<T>>;
}

/// State difference `a - b`, with `subtract(a, a) == 0`.
///
/// Override it for state spaces that do not subtract elementwise, e.g. angles.
pub trait Subtract<T: RealField + Copy> {
    fn subtract(&self, a: &DVector<T>, b: &DVector<T>) -> DVector<T>;
}

/// Upper Cholesky factor, `Lᵀ` of nalgebra's lower decomposition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CholeskyUpper;

impl<T: RealField + Copy> MatrixSqrt<T> for CholeskyUpper {
    fn sqrt(&self, m: &DMatrix<T>) -> Result<DMatrix<T>> {
        Cholesky::new(m.clone())
            .map(|chol| chol.l().transpose())
            .ok_or(SigmaPointError::SquareRootFailed)
    }
}

impl<T, F> MatrixSqrt<T> for F
where
    T: RealField + Copy,
    F: Fn(&DMatrix<T>) -> Result<DMatrix<T>>,
{
    fn sqrt(&self, m: &DMatrix<T>) -> Result<DMatrix<T>> {
        self(m)
    }
}

/// Elementwise `a - b`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EuclideanSubtract;

impl<T: RealField + Copy> Subtract<T> for EuclideanSubtract {
    fn subtract(&self, a: &DVector<T>, b: &DVector<T>) -> DVector<T> {
        a - b
    }
}

impl<T, F> Subtract<T> for F
where
    T: RealField + Copy,
    F: Fn(&DVector<T>, &DVector<T>) -> DVector<T>,
{
    fn subtract(&self, a: &DVector<T>, b: &DVector<T>) -> DVector<T> {
        self(a, b)
    }
}

/// Take the square root of `scaled` and check it came back `n x n`.
pub(crate) fn checked_sqrt<T, Q>(sqrt: &Q, scaled: &DMatrix<T>) -> Result<DMatrix<T>>
where
    T: RealField + Copy,
    Q: MatrixSqrt<T>,
{
    let u = sqrt.sqrt(scaled)?;
    if u.shape() != scaled.shape() {
        return Err(SigmaPointError::SquareRootFailed);
    }
    Ok(u)
}

/// Lay out `2n + 1` points around `mean` along the rows of `u`.
///
/// Row 0 is the mean, row `k + 1` is `subtract(mean, -u[k])` and row
/// `n + k + 1` is `subtract(mean, u[k])`.
pub(crate) fn symmetric_spread<T, D>(mean: &DVector<T>, u: &DMatrix<T>, subtract: &D) -> DMatrix<T>
where
    T: RealField + Copy,
    D: Subtract<T>,
{
    let n = mean.len();
    let mut sigmas = DMatrix::<T>::zeros(2 * n + 1, n);
    sigmas.row_mut(0).copy_from(&mean.transpose());

    for k in 0..n {
        let offset: DVector<T> = u.row(k).transpose();
        let plus = subtract.subtract(mean, &(-&offset));
        let minus = subtract.subtract(mean, &offset);
        sigmas.row_mut(k + 1).copy_from(&plus.transpose());
        sigmas.row_mut(n + k + 1).copy_from(&minus.transpose());
    }
    sigmas
}
