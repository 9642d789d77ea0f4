use core::fmt;

use nalgebra::{DMatrix, DVector, RealField};
use tracing::debug;

use super::ops::{checked_sqrt, CholeskyUpper, EuclideanSubtract, MatrixSqrt, Subtract};
use super::traits::SigmaPoints;
use super::weights::UTWeights;
use super::Listed;
use crate::error::{Result, SigmaPointError};
use crate::moments::check_inputs;

/// Simplex sigma points \[1\]: the minimal set of `n + 1` equally weighted points.
///
/// Cheaper than the symmetric sets at the cost of accuracy.
///
/// 1. P. Moireau, D. Chapelle "Reduced-Order Unscented Kalman Filtering with
///    Application to Parameter Identification in Large-Dimensional Systems"
#[derive(Clone, Debug)]
pub struct Simplex<T: RealField + Copy, Q = CholeskyUpper, D = EuclideanSubtract> {
    n: usize,
    alpha: T,
    weights: UTWeights<T>,
    directions: DMatrix<T>,
    sqrt: Q,
    subtract: D,
}

impl<T: RealField + Copy> Simplex<T> {
    /// `alpha` is kept for compatibility and shown in diagnostics, it does not
    /// change the points or the weights.
    pub fn new(n: usize, alpha: T) -> Result<Self> {
        if n == 0 {
            return Err(SigmaPointError::InvalidDimension);
        }
        debug!(n, "simplex weights computed");
        Ok(Self {
            n,
            alpha,
            weights: UTWeights::uniform(n + 1),
            directions: simplex_directions(n),
            sqrt: CholeskyUpper,
            subtract: EuclideanSubtract,
        })
    }

    /// `alpha = 1`
    pub fn with_dim(n: usize) -> Result<Self> {
        Self::new(n, T::one())
    }
}

impl<T: RealField + Copy, Q, D> Simplex<T, Q, D> {
    pub fn with_sqrt<Q2: MatrixSqrt<T>>(self, sqrt: Q2) -> Simplex<T, Q2, D> {
        Simplex {
            n: self.n,
            alpha: self.alpha,
            weights: self.weights,
            directions: self.directions,
            sqrt,
            subtract: self.subtract,
        }
    }

    pub fn with_subtract<D2: Subtract<T>>(self, subtract: D2) -> Simplex<T, Q, D2> {
        Simplex {
            n: self.n,
            alpha: self.alpha,
            weights: self.weights,
            directions: self.directions,
            sqrt: self.sqrt,
            subtract,
        }
    }

    pub fn alpha(&self) -> T {
        self.alpha
    }

    /// The `n x (n + 1)` unit simplex the points are laid out along, before scaling.
    pub fn directions(&self) -> &DMatrix<T> {
        &self.directions
    }
}

/// Unit simplex directions for dimension `n`, an `n x (n + 1)` matrix.
///
/// Every row sums to zero, and `n / (n + 1) · I·Iᵀ` is the identity.
pub fn simplex_directions<T: RealField + Copy>(n: usize) -> DMatrix<T> {
    let nf = T::from_subset(&(n as f64));
    let lambda = nf / (nf + T::one());
    let mut istar = DMatrix::<T>::zeros(n, n + 1);
    if n == 0 {
        return istar;
    }

    let first = T::one() / (T::from_subset(&2.0) * lambda).sqrt();
    istar[(0, 0)] = -first;
    istar[(0, 1)] = first;

    for d in 2..=n {
        let df = T::from_subset(&(d as f64));
        let c = T::one() / (lambda * df * (df + T::one())).sqrt();
        let mut row = istar.row_mut(d - 1);
        for j in 0..d {
            row[j] = c;
        }
        row[d] = -df * c;
    }
    istar
}

impl<T, Q, D> SigmaPoints<T> for Simplex<T, Q, D>
where
    T: RealField + Copy,
    Q: MatrixSqrt<T>,
    D: Subtract<T>,
{
    fn dim(&self) -> usize {
        self.n
    }

    /// Number of sigma points, n + 1
    fn num_sigmas(&self) -> usize {
        self.n + 1
    }

    fn sigma_points(&self, mean: &DVector<T>, covariance: &DMatrix<T>) -> Result<DMatrix<T>> {
        check_inputs(self.n, mean, covariance)?;
        let u = checked_sqrt(&self.sqrt, covariance)?;
        let scale = T::from_subset(&(self.n as f64)).sqrt();
        let scaled_unitary = u.transpose() * (&self.directions * scale);

        let mut sigmas = DMatrix::<T>::zeros(self.n + 1, self.n);
        for (j, column) in scaled_unitary.column_iter().enumerate() {
            let offset: DVector<T> = -column.into_owned();
            let point = self.subtract.subtract(mean, &offset);
            sigmas.row_mut(j).copy_from(&point.transpose());
        }
        Ok(sigmas)
    }

    fn weights(&self) -> &UTWeights<T> {
        &self.weights
    }
}

impl<T: RealField + Copy, Q, D> fmt::Display for Simplex<T, Q, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simplex")?;
        writeln!(f, "n = {}", self.n)?;
        writeln!(f, "alpha = {:?}", self.alpha)?;
        writeln!(f, "Wm = {}", Listed(self.weights.w_mean.as_slice()))?;
        writeln!(f, "Wc = {}", Listed(self.weights.w_covar.as_slice()))?;
        writeln!(f, "subtract = {}", core::any::type_name::<D>())?;
        write!(f, "sqrt = {}", core::any::type_name::<Q>())
    }
}
