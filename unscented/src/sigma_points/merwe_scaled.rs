use core::fmt;

use nalgebra::{DMatrix, DVector, RealField};
use tracing::{debug, warn};

use super::ops::{checked_sqrt, symmetric_spread, CholeskyUpper, EuclideanSubtract, MatrixSqrt, Subtract};
use super::traits::SigmaPoints;
use super::weights::{merwe_lambda, UTWeights};
use super::Listed;
use crate::error::{Result, SigmaPointError};
use crate::moments::check_inputs;

/// Scaled sigma points as described in \[1\], `2n + 1` points.
///
/// 1. E.A. Wan; R. Van Der Merwe "The unscented Kalman filter for nonlinear estimation"
///
/// `alpha`, `beta` and `kappa` are not validated. Choices that make `n + lambda`
/// zero or negative are the caller's responsibility; they produce the weights the
/// formulas give, including negative or infinite ones.
#[derive(Clone, Debug)]
pub struct MerweScaled<T: RealField + Copy, Q = CholeskyUpper, D = EuclideanSubtract> {
    n: usize,
    alpha: T,
    beta: T,
    kappa: T,
    lambda: T,
    weights: UTWeights<T>,
    sqrt: Q,
    subtract: D,
}

impl<T: RealField + Copy> MerweScaled<T> {
    /// Create a new MerweScaled sigma point generator.
    ///
    /// # Arguments
    /// * `n` - State dimension
    /// * `alpha` - Spread of sigma points (typically 1e-3 to 1)
    /// * `beta` - Prior knowledge parameter (2 is optimal for Gaussian)
    /// * `kappa` - Secondary scaling (typically 0 or 3-n)
    pub fn new(n: usize, alpha: T, beta: T, kappa: T) -> Result<Self> {
        if n == 0 {
            return Err(SigmaPointError::InvalidDimension);
        }
        let nf = T::from_subset(&(n as f64));
        let lambda = merwe_lambda(n, alpha, kappa);
        if nf + lambda <= T::zero() {
            warn!(n, n_lambda = ?(nf + lambda), "non-positive n + lambda, sigma point spread is degenerate");
        }
        let weights = UTWeights::from_lambda(n, lambda, alpha, beta);
        debug!(n, lambda = ?lambda, "merwe scaled weights computed");

        Ok(Self {
            n,
            alpha,
            beta,
            kappa,
            lambda,
            weights,
            sqrt: CholeskyUpper,
            subtract: EuclideanSubtract,
        })
    }
}

impl<T: RealField + Copy, Q, D> MerweScaled<T, Q, D> {
    /// Replace the matrix square root.
    pub fn with_sqrt<Q2: MatrixSqrt<T>>(self, sqrt: Q2) -> MerweScaled<T, Q2, D> {
        MerweScaled {
            n: self.n,
            alpha: self.alpha,
            beta: self.beta,
            kappa: self.kappa,
            lambda: self.lambda,
            weights: self.weights,
            sqrt,
            subtract: self.subtract,
        }
    }

    /// Replace the state difference.
    pub fn with_subtract<D2: Subtract<T>>(self, subtract: D2) -> MerweScaled<T, Q, D2> {
        MerweScaled {
            n: self.n,
            alpha: self.alpha,
            beta: self.beta,
            kappa: self.kappa,
            lambda: self.lambda,
            weights: self.weights,
            sqrt: self.sqrt,
            subtract,
        }
    }

    pub fn alpha(&self) -> T {
        self.alpha
    }

    pub fn beta(&self) -> T {
        self.beta
    }

    pub fn kappa(&self) -> T {
        self.kappa
    }

    /// `alpha² (n + kappa) - n`
    pub fn lambda(&self) -> T {
        self.lambda
    }
}

impl<T, Q, D> SigmaPoints<T> for MerweScaled<T, Q, D>
where
    T: RealField + Copy,
    Q: MatrixSqrt<T>,
    D: Subtract<T>,
{
    fn dim(&self) -> usize {
        self.n
    }

    /// Number of sigma points, 2 * n + 1
    fn num_sigmas(&self) -> usize {
        2 * self.n + 1
    }

    fn sigma_points(&self, mean: &DVector<T>, covariance: &DMatrix<T>) -> Result<DMatrix<T>> {
        check_inputs(self.n, mean, covariance)?;
        let n_lambda = self.lambda + T::from_subset(&(self.n as f64));
        let u = checked_sqrt(&self.sqrt, &(covariance * n_lambda))?;
        Ok(symmetric_spread(mean, &u, &self.subtract))
    }

    fn weights(&self) -> &UTWeights<T> {
        &self.weights
    }
}

impl<T: RealField + Copy, Q, D> fmt::Display for MerweScaled<T, Q, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MerweScaled")?;
        writeln!(f, "n = {}", self.n)?;
        writeln!(f, "alpha = {:?}", self.alpha)?;
        writeln!(f, "beta = {:?}", self.beta)?;
        writeln!(f, "kappa = {:?}", self.kappa)?;
        writeln!(f, "Wm = {}", Listed(self.weights.w_mean.as_slice()))?;
        writeln!(f, "Wc = {}", Listed(self.weights.w_covar.as_slice()))?;
        writeln!(f, "subtract = {}", core::any::type_name::<D>())?;
        write!(f, "sqrt = {}", core::any::type_name::<Q>())
    }
}
