use core::fmt;

use nalgebra::{DMatrix, DVector, RealField};
use tracing::{debug, warn};

use super::ops::{checked_sqrt, symmetric_spread, CholeskyUpper, EuclideanSubtract, MatrixSqrt, Subtract};
use super::traits::SigmaPoints;
use super::weights::UTWeights;
use super::Listed;
use crate::error::{Result, SigmaPointError};
use crate::moments::check_inputs;

/// Symmetric sigma points of Julier and Uhlmann \[1\], `2n + 1` points scaled by `n + kappa`.
///
/// Mean and covariance weights are identical.
///
/// 1. S. Julier, J. Uhlmann "A New Extension of the Kalman Filter to Nonlinear Systems"
#[derive(Clone, Debug)]
pub struct Julier<T: RealField + Copy, Q = CholeskyUpper, D = EuclideanSubtract> {
    n: usize,
    kappa: T,
    weights: UTWeights<T>,
    sqrt: Q,
    subtract: D,
}

impl<T: RealField + Copy> Julier<T> {
    /// `kappa` is commonly `0` or `3 - n`. It is not validated.
    pub fn new(n: usize, kappa: T) -> Result<Self> {
        if n == 0 {
            return Err(SigmaPointError::InvalidDimension);
        }
        let n_kappa = T::from_subset(&(n as f64)) + kappa;
        if n_kappa <= T::zero() {
            warn!(n, n_kappa = ?n_kappa, "non-positive n + kappa, sigma point spread is degenerate");
        }
        debug!(n, kappa = ?kappa, "julier weights computed");

        Ok(Self {
            n,
            kappa,
            weights: UTWeights::from_julier(n, kappa),
            sqrt: CholeskyUpper,
            subtract: EuclideanSubtract,
        })
    }

    /// `kappa = 0`
    pub fn with_dim(n: usize) -> Result<Self> {
        Self::new(n, T::zero())
    }
}

impl<T: RealField + Copy, Q, D> Julier<T, Q, D> {
    pub fn with_sqrt<Q2: MatrixSqrt<T>>(self, sqrt: Q2) -> Julier<T, Q2, D> {
        Julier {
            n: self.n,
            kappa: self.kappa,
            weights: self.weights,
            sqrt,
            subtract: self.subtract,
        }
    }

    pub fn with_subtract<D2: Subtract<T>>(self, subtract: D2) -> Julier<T, Q, D2> {
        Julier {
            n: self.n,
            kappa: self.kappa,
            weights: self.weights,
            sqrt: self.sqrt,
            subtract,
        }
    }

    pub fn kappa(&self) -> T {
        self.kappa
    }
}

impl<T, Q, D> SigmaPoints<T> for Julier<T, Q, D>
where
    T: RealField + Copy,
    Q: MatrixSqrt<T>,
    D: Subtract<T>,
{
    fn dim(&self) -> usize {
        self.n
    }

    fn num_sigmas(&self) -> usize {
        2 * self.n + 1
    }

    fn sigma_points(&self, mean: &DVector<T>, covariance: &DMatrix<T>) -> Result<DMatrix<T>> {
        check_inputs(self.n, mean, covariance)?;
        let n_kappa = T::from_subset(&(self.n as f64)) + self.kappa;
        let u = checked_sqrt(&self.sqrt, &(covariance * n_kappa))?;
        Ok(symmetric_spread(mean, &u, &self.subtract))
    }

    fn weights(&self) -> &UTWeights<T> {
        &self.weights
    }
}

impl<T: RealField + Copy, Q, D> fmt::Display for Julier<T, Q, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Julier")?;
        writeln!(f, "n = {}", self.n)?;
        writeln!(f, "kappa = {:?}", self.kappa)?;
        writeln!(f, "Wm = {}", Listed(self.weights.w_mean.as_slice()))?;
        writeln!(f, "Wc = {}", Listed(self.weights.w_covar.as_slice()))?;
        writeln!(f, "subtract = {}", core::any::type_name::<D>())?;
        write!(f, "sqrt = {}", core::any::type_name::<Q>())
    }
}
