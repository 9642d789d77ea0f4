//! Generalized unscented transform points matching skewness and kurtosis.
//!
//! Follows D. Ebeigbe et al. "Generalized Unscented Transformation for
//! Probability Distributions" (arXiv:2104.01958). Each axis gets an asymmetric
//! pair of points at `-s[i]` and `+s[i + n]` standard deviations, chosen so the
//! weighted points reproduce the mean, variance, third and fourth central
//! moments of that axis.

use core::fmt;

use nalgebra::{DMatrix, DVector, RealField};
use tracing::{debug, trace, warn};

use super::traits::SigmaPoints;
use super::weights::UTWeights;
use super::{Listed, ListedRows};
use crate::error::{Result, SigmaPointError, StateField};
use crate::moments::{check_covariance, check_inputs, Covariance, Mean};

/// Moment-matched sigma points, `2n + 1` of them.
///
/// Row `i` in `1..=n` sits at `x - s[i]·√P[:, i-1]` and row `i + n` at
/// `x + s[i+n]·√P[:, i-1]`, square roots taken elementwise on the covariance
/// column. With the positivity constraint the scales are corrected once while
/// building, so the generator never changes after [`MomentMatchedBuilder::build`].
#[derive(Clone, Debug)]
pub struct MomentMatched<T: RealField + Copy> {
    n: usize,
    mean: Option<DVector<T>>,
    covariance: DMatrix<T>,
    skewness: DVector<T>,
    kurtosis: DVector<T>,
    positively_constrained: bool,
    slack: Option<T>,
    skewness_std: DVector<T>,
    kurtosis_std: DVector<T>,
    scales: DVector<T>,
    corrected: Vec<usize>,
    weights: UTWeights<T>,
}

/// Collects the inputs of a [`MomentMatched`] generator.
#[derive(Clone, Debug)]
pub struct MomentMatchedBuilder<T: RealField + Copy> {
    n: usize,
    covariance: Covariance<T>,
    skewness: DVector<T>,
    kurtosis: DVector<T>,
    mean: Option<Mean<T>>,
    slack: Option<T>,
    positively_constrained: bool,
}

impl<T: RealField + Copy> MomentMatched<T> {
    /// Start building a generator for dimension `n`.
    ///
    /// # Arguments
    /// * `covariance` - Covariance `P`, a scalar is treated as `I·P`
    /// * `skewness` - Third central moment of each axis
    /// * `kurtosis` - Fourth central moment of each axis
    pub fn builder(
        n: usize,
        covariance: impl Into<Covariance<T>>,
        skewness: DVector<T>,
        kurtosis: DVector<T>,
    ) -> MomentMatchedBuilder<T> {
        MomentMatchedBuilder {
            n,
            covariance: covariance.into(),
            skewness,
            kurtosis,
            mean: None,
            slack: None,
            positively_constrained: false,
        }
    }

    /// Unconstrained, unanchored generator.
    pub fn new(
        n: usize,
        covariance: impl Into<Covariance<T>>,
        skewness: DVector<T>,
        kurtosis: DVector<T>,
    ) -> Result<Self> {
        Self::builder(n, covariance, skewness, kurtosis).build()
    }

    /// The scale vector `s`, length `2n + 1`. `s[0]` is unused and zero.
    pub fn scales(&self) -> &DVector<T> {
        &self.scales
    }

    /// Skewness divided by `σ³` per axis.
    pub fn standardized_skewness(&self) -> &DVector<T> {
        &self.skewness_std
    }

    /// Kurtosis divided by `σ⁴` per axis.
    pub fn standardized_kurtosis(&self) -> &DVector<T> {
        &self.kurtosis_std
    }

    /// Indices of `s` rewritten by the positivity correction, empty when unconstrained.
    pub fn corrected_indices(&self) -> &[usize] {
        &self.corrected
    }

    pub fn is_positively_constrained(&self) -> bool {
        self.positively_constrained
    }

    pub fn slack(&self) -> Option<T> {
        self.slack
    }

    /// The mean this generator is anchored to, if any.
    pub fn mean(&self) -> Option<&DVector<T>> {
        self.mean.as_ref()
    }

    pub fn covariance(&self) -> &DMatrix<T> {
        &self.covariance
    }

    pub fn skewness(&self) -> &DVector<T> {
        &self.skewness
    }

    pub fn kurtosis(&self) -> &DVector<T> {
        &self.kurtosis
    }
}

impl<T: RealField + Copy> MomentMatchedBuilder<T> {
    /// Anchor the generator to a mean. Later calls must pass the same mean and covariance.
    pub fn mean(mut self, mean: impl Into<Mean<T>>) -> Self {
        self.mean = Some(mean.into());
        self
    }

    /// Keep every sigma point non-negative.
    ///
    /// Requires [`MomentMatchedBuilder::mean`] and [`MomentMatchedBuilder::slack`].
    pub fn positively_constrained(mut self, enabled: bool) -> Self {
        self.positively_constrained = enabled;
        self
    }

    /// Slack `k` of the positivity correction. `k = 1` puts at least one
    /// corrected point exactly on zero; smaller `k` moves the points away from zero.
    pub fn slack(mut self, k: T) -> Self {
        self.slack = Some(k);
        self
    }

    /// Solve the scales, apply the positivity correction if requested, and fix the weights.
    pub fn build(self) -> Result<MomentMatched<T>> {
        let n = self.n;
        if n == 0 {
            return Err(SigmaPointError::InvalidDimension);
        }
        let covariance = self.covariance.into_matrix(n);
        check_covariance(n, &covariance)?;
        check_moment_len(n, &self.skewness)?;
        check_moment_len(n, &self.kurtosis)?;
        check_entries(&covariance)?;

        let mean = self.mean.map(Mean::into_vector);
        if let Some(x) = &mean {
            check_inputs(n, x, &covariance)?;
        }

        let std = covariance.diagonal().map(|v| v.sqrt());
        let skewness_std = self.skewness.component_div(&std.map(|s| s.powi(3)));
        let kurtosis_std = self.kurtosis.component_div(&std.map(|s| s.powi(4)));

        let mut scales = solve_free_parameters(&skewness_std, &kurtosis_std)?;

        let mut corrected = Vec::new();
        if self.positively_constrained {
            let x = mean.as_ref().ok_or(SigmaPointError::MissingMean)?;
            let k = self.slack.ok_or(SigmaPointError::MissingSlack)?;
            if let Some(dimension) = x.iter().position(|v| *v < T::zero()) {
                return Err(SigmaPointError::DomainInvalid {
                    dimension,
                    reason: "positively constrained mean has a negative entry",
                });
            }

            let trial = spread(x, &covariance, &scales);
            corrected = correct_scales(&mut scales, &trial, x, &covariance, k);
            pair_scales(&mut scales, &skewness_std);
            debug!(corrected = corrected.len(), "positivity correction applied");

            let finished = spread(x, &covariance, &scales);
            if let Some(row) = finished
                .row_iter()
                .position(|row| row.iter().any(|v| !(*v >= T::zero())))
            {
                let dimension = (row - 1) % n;
                warn!(row, dimension, scale = ?(scales[row]), "corrected sigma point still negative");
                return Err(SigmaPointError::DomainInvalid {
                    dimension,
                    reason: "positivity correction left a negative point",
                });
            }
        }

        let weights = weights_from_scales(&scales)?;
        debug!(n, constrained = self.positively_constrained, "moment matched weights computed");

        Ok(MomentMatched {
            n,
            mean,
            covariance,
            skewness: self.skewness,
            kurtosis: self.kurtosis,
            positively_constrained: self.positively_constrained,
            slack: self.slack,
            skewness_std,
            kurtosis_std,
            scales,
            corrected,
            weights,
        })
    }
}

fn check_moment_len<T: RealField + Copy>(n: usize, moment: &DVector<T>) -> Result<()> {
    if moment.len() != n {
        return Err(SigmaPointError::MomentLength {
            expected: n,
            actual: moment.len(),
        });
    }
    Ok(())
}

/// Points use elementwise roots of covariance columns, so every entry must be
/// non-negative and every variance positive.
fn check_entries<T: RealField + Copy>(covariance: &DMatrix<T>) -> Result<()> {
    for (dimension, column) in covariance.column_iter().enumerate() {
        if !(covariance[(dimension, dimension)] > T::zero()) {
            return Err(SigmaPointError::DomainInvalid {
                dimension,
                reason: "variance must be positive",
            });
        }
        if column.iter().any(|v| !(*v >= T::zero())) {
            return Err(SigmaPointError::DomainInvalid {
                dimension,
                reason: "covariance column has a negative entry",
            });
        }
    }
    Ok(())
}

/// `s[i] = (-S + √(4K - 3S²)) / 2` for standardized moments, then the paired scales.
fn solve_free_parameters<T: RealField + Copy>(
    skewness: &DVector<T>,
    kurtosis: &DVector<T>,
) -> Result<DVector<T>> {
    let n = skewness.len();
    let half = T::from_subset(&0.5);
    let three = T::from_subset(&3.0);
    let four = T::from_subset(&4.0);

    let mut scales = DVector::<T>::zeros(2 * n + 1);
    for i in 1..=n {
        let (s, k) = (skewness[i - 1], kurtosis[i - 1]);
        let discriminant = four * k - three * s * s;
        if !(discriminant >= T::zero()) {
            return Err(SigmaPointError::DomainInvalid {
                dimension: i - 1,
                reason: "negative discriminant 4K - 3S², no real scale exists",
            });
        }
        scales[i] = half * (-s + discriminant.sqrt());
    }
    pair_scales(&mut scales, skewness);
    Ok(scales)
}

/// `s[i + n] = s[i] + S[i]`
fn pair_scales<T: RealField + Copy>(scales: &mut DVector<T>, skewness: &DVector<T>) {
    let n = skewness.len();
    for i in 1..=n {
        scales[i + n] = scales[i] + skewness[i - 1];
    }
}

fn weights_from_scales<T: RealField + Copy>(scales: &DVector<T>) -> Result<UTWeights<T>> {
    let n = (scales.len() - 1) / 2;
    let mut w = DVector::<T>::zeros(2 * n + 1);
    for i in 1..=n {
        w[i + n] = T::one() / (scales[i + n] * (scales[i] + scales[i + n]));
        w[i] = scales[i + n] / scales[i] * w[i + n];
    }
    w[0] = T::one() - w.rows(1, 2 * n).sum();

    let paired = (1..=n).find(|&i| !w[i].is_finite() || !w[i + n].is_finite());
    let dimension = match paired {
        Some(i) => Some(i - 1),
        // w[0] only overflows through the sum, blame the largest pair
        None if !w[0].is_finite() => (1..=n)
            .map(|i| (i - 1, w[i].abs() + w[i + n].abs()))
            .reduce(|a, b| if b.1 > a.1 { b } else { a })
            .map(|(d, _)| d),
        None => None,
    };
    if let Some(dimension) = dimension {
        return Err(SigmaPointError::DomainInvalid {
            dimension,
            reason: "weights are not finite",
        });
    }
    Ok(UTWeights::shared(w))
}

fn spread<T: RealField + Copy>(x: &DVector<T>, covariance: &DMatrix<T>, scales: &DVector<T>) -> DMatrix<T> {
    let n = x.len();
    let mut sigmas = DMatrix::<T>::zeros(2 * n + 1, n);
    sigmas.row_mut(0).copy_from(&x.transpose());
    for i in 1..=n {
        let root = covariance.column(i - 1).map(|v| v.sqrt());
        sigmas.row_mut(i).copy_from(&(x - &root * scales[i]).transpose());
        sigmas.row_mut(i + n).copy_from(&(x + &root * scales[i + n]).transpose());
    }
    sigmas
}

/// Shrink `s[i]` for every trial row `i` in `1..=n` that went negative, to
/// `k · min_j x[j] / √P[j, i-1]` over the entries with a positive root.
fn correct_scales<T: RealField + Copy>(
    scales: &mut DVector<T>,
    trial: &DMatrix<T>,
    x: &DVector<T>,
    covariance: &DMatrix<T>,
    k: T,
) -> Vec<usize> {
    let n = x.len();
    let mut corrected = Vec::new();
    for i in 1..=n {
        if !trial.row(i).iter().any(|v| *v < T::zero()) {
            continue;
        }
        let root = covariance.column(i - 1).map(|v| v.sqrt());
        let bound = x
            .iter()
            .zip(root.iter())
            .filter(|(_, r)| **r > T::zero())
            .map(|(xj, r)| *xj / *r)
            .reduce(|a, b| a.min(b));
        if let Some(bound) = bound {
            trace!(index = i, from = ?(scales[i]), to = ?(k * bound), "scale corrected");
            scales[i] = k * bound;
            corrected.push(i);
        }
    }
    corrected
}

impl<T: RealField + Copy> SigmaPoints<T> for MomentMatched<T> {
    fn dim(&self) -> usize {
        self.n
    }

    fn num_sigmas(&self) -> usize {
        2 * self.n + 1
    }

    /// Fails with [`SigmaPointError::StateInconsistency`] when the generator is
    /// anchored to a mean and either input differs from the stored one, and with
    /// [`SigmaPointError::DomainInvalid`] for a covariance with a negative entry.
    fn sigma_points(&self, mean: &DVector<T>, covariance: &DMatrix<T>) -> Result<DMatrix<T>> {
        check_inputs(self.n, mean, covariance)?;
        check_entries(covariance)?;
        if let Some(anchor) = &self.mean {
            if mean != anchor {
                return Err(SigmaPointError::StateInconsistency {
                    field: StateField::Mean,
                });
            }
            if covariance != &self.covariance {
                return Err(SigmaPointError::StateInconsistency {
                    field: StateField::Covariance,
                });
            }
        }
        Ok(spread(mean, covariance, &self.scales))
    }

    fn weights(&self) -> &UTWeights<T> {
        &self.weights
    }
}

impl<T: RealField + Copy> fmt::Display for MomentMatched<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MomentMatched")?;
        writeln!(f, "n = {}", self.n)?;
        match &self.mean {
            Some(x) => writeln!(f, "x = {}", Listed(x.as_slice()))?,
            None => writeln!(f, "x = None")?,
        }
        writeln!(f, "P = {}", ListedRows(&self.covariance))?;
        writeln!(f, "S = {}", Listed(self.skewness.as_slice()))?;
        writeln!(f, "K = {}", Listed(self.kurtosis.as_slice()))?;
        writeln!(f, "s = {}", Listed(self.scales.as_slice()))?;
        writeln!(f, "positively constrained = {}", self.positively_constrained)?;
        writeln!(f, "k = {:?}", self.slack)?;
        writeln!(f, "Wm = {}", Listed(self.weights.w_mean.as_slice()))?;
        write!(f, "Wc = {}", Listed(self.weights.w_covar.as_slice()))
    }
}
