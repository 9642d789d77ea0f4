use nalgebra::{DMatrix, DVector, RealField};

use super::weights::UTWeights;
use crate::error::{Result, SigmaPointError};
use crate::moments::Moments;

/// Recombine sigma points (one per row) into a mean and covariance.
///
/// The mean uses `w_mean`, the covariance sums `w_covar`-weighted outer
/// products of the deviations and adds `noise` if given.
pub fn unscented_transform<T: RealField + Copy>(
    sigma_pts: &DMatrix<T>,
    weights: &UTWeights<T>,
    noise: Option<&DMatrix<T>>,
) -> Result<Moments<T>> {
    unscented_transform_with(
        sigma_pts,
        weights,
        noise,
        |points, w_mean| points.tr_mul(w_mean),
        |a, b| a - b,
    )
}

/// [`unscented_transform`] with a caller-supplied weighted mean and residual,
/// for state spaces where neither is elementwise (angles, manifolds).
///
/// `mean_fn` receives the points (one per row) and the mean weights;
/// `residual_fn(a, b)` must return `a - b` in the tangent sense.
pub fn unscented_transform_with<T, M, R>(
    sigma_pts: &DMatrix<T>,
    weights: &UTWeights<T>,
    noise: Option<&DMatrix<T>>,
    mean_fn: M,
    residual_fn: R,
) -> Result<Moments<T>>
where
    T: RealField + Copy,
    M: Fn(&DMatrix<T>, &DVector<T>) -> DVector<T>,
    R: Fn(&DVector<T>, &DVector<T>) -> DVector<T>,
{
    if sigma_pts.nrows() != weights.len() || weights.w_covar.len() != weights.len() {
        return Err(SigmaPointError::DimensionMismatch {
            expected: weights.len(),
            actual: sigma_pts.nrows(),
        });
    }
    let dim = sigma_pts.ncols();

    let mean = mean_fn(sigma_pts, &weights.w_mean);
    let mut covariance = DMatrix::<T>::zeros(dim, dim);
    for (i, row) in sigma_pts.row_iter().enumerate() {
        let dev = residual_fn(&row.transpose(), &mean);
        covariance.ger(weights.w_covar[i], &dev, &dev, T::one());
    }

    if let Some(noise) = noise {
        if noise.shape() != (dim, dim) {
            return Err(SigmaPointError::CovarianceShape {
                expected: dim,
                rows: noise.nrows(),
                cols: noise.ncols(),
            });
        }
        covariance += noise;
    }

    Ok(Moments { mean, covariance })
}
