use nalgebra::{DMatrix, DVector, RealField};

use super::weights::UTWeights;
use crate::error::Result;
use crate::moments::{Covariance, Mean};

/// Sigma points together with the weights they are recombined with.
#[derive(Clone, Debug, PartialEq)]
pub struct SigmaPointsGenerated<T: RealField + Copy> {
    /// One sigma point per row.
    pub sigma_points: DMatrix<T>,
    pub mean_weights: DVector<T>,
    pub covariance_weights: DVector<T>,
}

/// Trait for sigma point generators
pub trait SigmaPoints<T: RealField + Copy> {
    /// State dimension `n`.
    fn dim(&self) -> usize;

    /// Number of sigma points, a fixed function of `n` and the method.
    fn num_sigmas(&self) -> usize;

    /// Generate sigma points for `mean` and `covariance`.
    ///
    /// The result has `num_sigmas()` rows and `n` columns. Row order is part of
    /// the contract: row 0 is the mean and the remaining rows follow the
    /// generator's branch layout.
    fn sigma_points(&self, mean: &DVector<T>, covariance: &DMatrix<T>) -> Result<DMatrix<T>>;

    /// Mean and covariance weights, one per sigma point.
    fn weights(&self) -> &UTWeights<T>;

    /// Like [`SigmaPoints::sigma_points`], broadcasting scalar inputs first.
    fn sigma_points_from<M, C>(&self, mean: M, covariance: C) -> Result<DMatrix<T>>
    where
        Self: Sized,
        M: Into<Mean<T>>,
        C: Into<Covariance<T>>,
    {
        let mean = mean.into().into_vector();
        let covariance = covariance.into().into_matrix(self.dim());
        self.sigma_points(&mean, &covariance)
    }

    /// Generate sigma points and hand back the weights alongside them.
    fn generate(&self, mean: &DVector<T>, covariance: &DMatrix<T>) -> Result<SigmaPointsGenerated<T>> {
        let sigma_points = self.sigma_points(mean, covariance)?;
        let UTWeights { w_mean, w_covar } = self.weights().clone();
        Ok(SigmaPointsGenerated {
            sigma_points,
            mean_weights: w_mean,
            covariance_weights: w_covar,
        })
    }
}
