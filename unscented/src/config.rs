//! Serializable generator descriptions.
//!
//! A [`GeneratorConfig`] names a method and its parameters and builds the
//! matching [`SigmaPointGenerator`]. Values are stored as `f64` and converted
//! to the generator's scalar type when building.
//!
//! ```
//! use unscented::{GeneratorConfig, SigmaPoints};
//!
//! let config: GeneratorConfig = serde_json::from_str(
//!     r#"{ "method": "merwe_scaled", "n": 2, "alpha": 0.1, "beta": 2.0, "kappa": 1.0 }"#,
//! ).unwrap();
//! let generator = config.build::<f64>()?;
//! assert_eq!(generator.num_sigmas(), 5);
//! # Ok::<(), unscented::SigmaPointError>(())
//! ```

use nalgebra::{DMatrix, DVector, RealField};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SigmaPointError};
use crate::sigma_points::{Julier, MerweScaled, MomentMatched, SigmaPointGenerator, Simplex};

/// Method and parameters of a sigma point generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum GeneratorConfig {
    /// Van der Merwe scaled points.
    MerweScaled {
        n: usize,
        alpha: f64,
        beta: f64,
        kappa: f64,
    },
    /// Julier/Uhlmann symmetric points.
    Julier {
        n: usize,
        #[serde(default)]
        kappa: f64,
    },
    /// Minimal simplex points.
    Simplex {
        n: usize,
        #[serde(default = "default_simplex_alpha")]
        alpha: f64,
    },
    /// Skewness/kurtosis matched points. The dimension is the number of covariance rows.
    MomentMatched {
        covariance: Vec<Vec<f64>>,
        skewness: Vec<f64>,
        kurtosis: Vec<f64>,
        #[serde(default)]
        positively_constrained: bool,
        #[serde(default)]
        k: Option<f64>,
        #[serde(default)]
        mean: Option<Vec<f64>>,
    },
}

fn default_simplex_alpha() -> f64 {
    1.0
}

impl GeneratorConfig {
    /// Scaled points tuned for Gaussian priors: `alpha = 1e-3`, `beta = 2`, `kappa = 0`.
    pub fn gaussian(n: usize) -> Self {
        GeneratorConfig::MerweScaled {
            n,
            alpha: 1e-3,
            beta: 2.0,
            kappa: 0.0,
        }
    }

    /// Julier points with the usual `kappa = 3 - n` heuristic.
    pub fn julier_heuristic(n: usize) -> Self {
        GeneratorConfig::Julier {
            n,
            kappa: 3.0 - n as f64,
        }
    }

    /// State dimension the generator will have.
    pub fn dim(&self) -> usize {
        match self {
            GeneratorConfig::MerweScaled { n, .. }
            | GeneratorConfig::Julier { n, .. }
            | GeneratorConfig::Simplex { n, .. } => *n,
            GeneratorConfig::MomentMatched { covariance, .. } => covariance.len(),
        }
    }

    pub fn build<T: RealField + Copy>(&self) -> Result<SigmaPointGenerator<T>> {
        let generator = match self {
            GeneratorConfig::MerweScaled {
                n,
                alpha,
                beta,
                kappa,
            } => MerweScaled::new(*n, lift(*alpha), lift(*beta), lift(*kappa))?.into(),
            GeneratorConfig::Julier { n, kappa } => Julier::new(*n, lift(*kappa))?.into(),
            GeneratorConfig::Simplex { n, alpha } => Simplex::new(*n, lift(*alpha))?.into(),
            GeneratorConfig::MomentMatched {
                covariance,
                skewness,
                kurtosis,
                positively_constrained,
                k,
                mean,
            } => {
                let n = covariance.len();
                let mut builder =
                    MomentMatched::builder(n, rows_to_matrix(covariance)?, vector(skewness), vector(kurtosis))
                        .positively_constrained(*positively_constrained);
                if let Some(k) = k {
                    builder = builder.slack(lift(*k));
                }
                if let Some(mean) = mean {
                    builder = builder.mean(vector(mean));
                }
                builder.build()?.into()
            }
        };
        Ok(generator)
    }
}

fn lift<T: RealField + Copy>(value: f64) -> T {
    T::from_subset(&value)
}

fn vector<T: RealField + Copy>(values: &[f64]) -> DVector<T> {
    DVector::from_iterator(values.len(), values.iter().map(|v| lift(*v)))
}

fn rows_to_matrix<T: RealField + Copy>(rows: &[Vec<f64>]) -> Result<DMatrix<T>> {
    let n = rows.len();
    if let Some(bad) = rows.iter().find(|row| row.len() != n) {
        return Err(SigmaPointError::CovarianceShape {
            expected: n,
            rows: n,
            cols: bad.len(),
        });
    }
    Ok(DMatrix::from_fn(n, n, |r, c| lift(rows[r][c])))
}
