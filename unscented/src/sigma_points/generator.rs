use core::fmt;

use nalgebra::{DMatrix, DVector, RealField};

use super::{Julier, MerweScaled, MomentMatched, SigmaPoints, Simplex, UTWeights};
use crate::error::Result;

/// Any of the four generators with the default square root and difference.
#[derive(Clone, Debug)]
pub enum SigmaPointGenerator<T: RealField + Copy> {
    MerweScaled(MerweScaled<T>),
    Julier(Julier<T>),
    Simplex(Simplex<T>),
    MomentMatched(MomentMatched<T>),
}

impl<T: RealField + Copy> SigmaPointGenerator<T> {
    fn inner(&self) -> &dyn SigmaPoints<T> {
        match self {
            SigmaPointGenerator::MerweScaled(g) => g,
            SigmaPointGenerator::Julier(g) => g,
            SigmaPointGenerator::Simplex(g) => g,
            SigmaPointGenerator::MomentMatched(g) => g,
        }
    }
}

impl<T: RealField + Copy> SigmaPoints<T> for SigmaPointGenerator<T> {
    fn dim(&self) -> usize {
        self.inner().dim()
    }

    fn num_sigmas(&self) -> usize {
        self.inner().num_sigmas()
    }

    fn sigma_points(&self, mean: &DVector<T>, covariance: &DMatrix<T>) -> Result<DMatrix<T>> {
        self.inner().sigma_points(mean, covariance)
    }

    fn weights(&self) -> &UTWeights<T> {
        self.inner().weights()
    }
}

impl<T: RealField + Copy> From<MerweScaled<T>> for SigmaPointGenerator<T> {
    fn from(g: MerweScaled<T>) -> Self {
        SigmaPointGenerator::MerweScaled(g)
    }
}

impl<T: RealField + Copy> From<Julier<T>> for SigmaPointGenerator<T> {
    fn from(g: Julier<T>) -> Self {
        SigmaPointGenerator::Julier(g)
    }
}

impl<T: RealField + Copy> From<Simplex<T>> for SigmaPointGenerator<T> {
    fn from(g: Simplex<T>) -> Self {
        SigmaPointGenerator::Simplex(g)
    }
}

impl<T: RealField + Copy> From<MomentMatched<T>> for SigmaPointGenerator<T> {
    fn from(g: MomentMatched<T>) -> Self {
        SigmaPointGenerator::MomentMatched(g)
    }
}

impl<T: RealField + Copy> fmt::Display for SigmaPointGenerator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigmaPointGenerator::MerweScaled(g) => fmt::Display::fmt(g, f),
            SigmaPointGenerator::Julier(g) => fmt::Display::fmt(g, f),
            SigmaPointGenerator::Simplex(g) => fmt::Display::fmt(g, f),
            SigmaPointGenerator::MomentMatched(g) => fmt::Display::fmt(g, f),
        }
    }
}
