//! Sigma point generators for the unscented transform.
//!
//! Four ways of placing a deterministic set of points around a mean and
//! covariance: van der Merwe's scaled set, Julier's symmetric set, the
//! minimal simplex set and a set matched to per-axis skewness and kurtosis.
//! Each generator also owns the mean and covariance weights that recover the
//! input moments from its points.
//!
//! ```
//! use nalgebra::{DMatrix, DVector};
//! use unscented::{unscented_transform, Julier, SigmaPoints};
//!
//! let ut = Julier::<f64>::with_dim(2)?;
//! let x = DVector::from_vec(vec![1.0, -1.0]);
//! let p = DMatrix::identity(2, 2);
//! let sigmas = ut.sigma_points(&x, &p)?;
//! assert_eq!(sigmas.shape(), (5, 2));
//!
//! let moments = unscented_transform(&sigmas, ut.weights(), None)?;
//! assert!((moments.mean - x).norm() < 1e-12);
//! # Ok::<(), unscented::SigmaPointError>(())
//! ```

pub mod config;
pub mod error;
pub mod moments;
pub mod sigma_points;

pub use config::GeneratorConfig;
pub use error::{Result, SigmaPointError, StateField};
pub use moments::{Covariance, Mean, Moments};
pub use sigma_points::{
    simplex_directions, unscented_transform, unscented_transform_with, CholeskyUpper,
    EuclideanSubtract, Julier, MatrixSqrt, MerweScaled, MomentMatched, MomentMatchedBuilder,
    SigmaPointGenerator, SigmaPoints, SigmaPointsGenerated, Simplex, Subtract, UTWeights,
};
