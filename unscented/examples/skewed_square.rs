//! Push a skewed, strictly positive distribution through `y = x²` and compare
//! the symmetric and moment-matched sigma points against Monte Carlo.

use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use unscented::{unscented_transform, Julier, MomentMatched, SigmaPoints};

/// Exponential with rate 1: mean 1, variance 1, third moment 2, fourth moment 9.
fn sample_exponential(rng: &mut StdRng) -> f64 {
    -(1.0 - rng.gen::<f64>()).ln()
}

fn propagate<G: SigmaPoints<f64>>(ut: &G, x: &DVector<f64>, p: &DMatrix<f64>) -> (f64, f64) {
    let sigmas = ut.sigma_points(x, p).expect("valid inputs");
    let squared = sigmas.map(|v| v * v);
    let moments = unscented_transform(&squared, ut.weights(), None).expect("matching weights");
    println!("  points  = {:?}", sigmas.as_slice());
    (moments.mean[0], moments.covariance[(0, 0)])
}

fn main() {
    let x = DVector::from_element(1, 1.0);
    let p = DMatrix::from_element(1, 1, 1.0);

    let mut rng = StdRng::seed_from_u64(7);
    let samples: Vec<f64> = (0..200_000)
        .map(|_| sample_exponential(&mut rng).powi(2))
        .collect();
    let mc_mean = samples.iter().sum::<f64>() / samples.len() as f64;
    let mc_var = samples.iter().map(|y| (y - mc_mean).powi(2)).sum::<f64>() / samples.len() as f64;
    println!("monte carlo      mean = {mc_mean:.3}, variance = {mc_var:.3}");

    println!("julier (kappa 2)");
    let julier = Julier::new(1, 2.0).expect("n > 0");
    let (mean, var) = propagate(&julier, &x, &p);
    println!("  mean = {mean:.3}, variance = {var:.3}");

    println!("moment matched");
    let skewness = DVector::from_element(1, 2.0);
    let kurtosis = DVector::from_element(1, 9.0);
    let matched = MomentMatched::new(1, p.clone(), skewness.clone(), kurtosis.clone())
        .expect("exponential moments are admissible");
    let (mean, var) = propagate(&matched, &x, &p);
    println!("  mean = {mean:.3}, variance = {var:.3}");

    println!("moment matched, positively constrained (k = 0.9)");
    let constrained = MomentMatched::builder(1, p.clone(), skewness, kurtosis)
        .mean(x.clone())
        .positively_constrained(true)
        .slack(0.9)
        .build()
        .expect("exponential moments are admissible");
    let (mean, var) = propagate(&constrained, &x, &p);
    println!("  mean = {mean:.3}, variance = {var:.3}");
    println!("{constrained}");
}
