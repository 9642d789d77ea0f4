//! Sigma‐point generators for the unscented transform

use core::fmt;

use nalgebra::{DMatrix, RealField};

pub use self::generator::SigmaPointGenerator;
pub use self::julier::Julier;
pub use self::merwe_scaled::MerweScaled;
pub use self::moment_matched::{MomentMatched, MomentMatchedBuilder};
pub use self::ops::{CholeskyUpper, EuclideanSubtract, MatrixSqrt, Subtract};
pub use self::simplex::{simplex_directions, Simplex};
pub use self::traits::{SigmaPoints, SigmaPointsGenerated};
pub use self::weights::UTWeights;

mod generator;
mod julier;
mod merwe_scaled;
mod moment_matched;
mod ops;
mod simplex;

#[cfg(test)]
mod tests;

mod traits;
mod weights;

pub mod transform;
pub use transform::{unscented_transform, unscented_transform_with};

/// `[a, b, c]` for diagnostics.
pub(crate) struct Listed<'a, T>(pub(crate) &'a [T]);

impl<T: fmt::Debug> fmt::Display for Listed<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{v:?}")?;
        }
        f.write_str("]")
    }
}

/// `[[a, b], [c, d]]`, row by row.
pub(crate) struct ListedRows<'a, T: RealField + Copy>(pub(crate) &'a DMatrix<T>);

impl<T: RealField + Copy> fmt::Display for ListedRows<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for r in 0..self.0.nrows() {
            if r > 0 {
                f.write_str(", ")?;
            }
            let row: Vec<T> = self.0.row(r).iter().copied().collect();
            write!(f, "{}", Listed(&row))?;
        }
        f.write_str("]")
    }
}
