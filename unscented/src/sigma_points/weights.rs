//! Unscented transform weights shared by sigma-point generators and the transform.

use nalgebra::{DVector, RealField};

/// Holds the mean and covariance recombination weights.
#[derive(Clone, Debug, PartialEq)]
pub struct UTWeights<T: RealField + Copy> {
    /// Mean recombination weights.
    pub w_mean: DVector<T>,
    /// Covariance recombination weights.
    pub w_covar: DVector<T>,
}

impl<T: RealField + Copy> UTWeights<T> {
    /// Construct UT weights from the Merwe scaled parameters.
    ///
    /// `n + lambda` is not validated; a zero value yields infinite weights.
    pub fn from_merwe(dim: usize, alpha: T, beta: T, kappa: T) -> Self {
        Self::from_lambda(dim, merwe_lambda(dim, alpha, kappa), alpha, beta)
    }

    /// Merwe weights for an already computed `lambda`.
    pub fn from_lambda(dim: usize, lambda: T, alpha: T, beta: T) -> Self {
        let n_lambda = T::from_subset(&(dim as f64)) + lambda;
        let c = T::from_subset(&0.5) / n_lambda;

        let mut w_mean = DVector::from_element(2 * dim + 1, c);
        let mut w_covar = DVector::from_element(2 * dim + 1, c);
        w_mean[0] = lambda / n_lambda;
        w_covar[0] = lambda / n_lambda + (T::one() - alpha * alpha + beta);

        Self { w_mean, w_covar }
    }

    /// Construct UT weights from the Julier/Uhlmann `kappa`. Mean and covariance weights coincide.
    pub fn from_julier(dim: usize, kappa: T) -> Self {
        let n_kappa = T::from_subset(&(dim as f64)) + kappa;
        let mut w = DVector::from_element(2 * dim + 1, T::from_subset(&0.5) / n_kappa);
        w[0] = kappa / n_kappa;
        Self::shared(w)
    }

    /// `count` equal weights summing to one.
    pub fn uniform(count: usize) -> Self {
        let c = T::one() / T::from_subset(&(count as f64));
        Self::shared(DVector::from_element(count, c))
    }

    /// Use the same vector for mean and covariance weights.
    pub fn shared(w: DVector<T>) -> Self {
        Self {
            w_mean: w.clone(),
            w_covar: w,
        }
    }

    pub fn len(&self) -> usize {
        self.w_mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.w_mean.is_empty()
    }
}

/// `alpha² (n + kappa) - n`
pub(crate) fn merwe_lambda<T: RealField + Copy>(dim: usize, alpha: T, kappa: T) -> T {
    let n = T::from_subset(&(dim as f64));
    alpha * alpha * (n + kappa) - n
}
