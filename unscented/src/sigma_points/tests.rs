use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random SPD covariance `A·Aᵀ + n·I` and a mean in `[-5, 5]`.
fn fixture(n: usize, seed: u64) -> (DVector<f64>, DMatrix<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let a = DMatrix::from_fn(n, n, |_, _| rng.gen_range(-1.0..1.0));
    let p = &a * a.transpose() + DMatrix::identity(n, n) * n as f64;
    let x = DVector::from_fn(n, |_, _| rng.gen_range(-5.0..5.0));
    (x, p)
}

mod round_trip {
    use super::fixture;
    use crate::sigma_points::{unscented_transform, Julier, MerweScaled, SigmaPoints, Simplex};
    use approx::abs_diff_eq;

    const EPS: f64 = 1e-9;

    /// `centered` generators put the mean at row 0.
    fn check<G: SigmaPoints<f64>>(ut: &G, n: usize, seed: u64, centered: bool) {
        let (x, p) = fixture(n, seed);
        let sigmas = ut.sigma_points(&x, &p).unwrap();
        assert_eq!(sigmas.shape(), (ut.num_sigmas(), n));

        if centered {
            for c in 0..n {
                assert!(
                    abs_diff_eq!(sigmas[(0, c)], x[c], epsilon = EPS),
                    "head point mismatch at column {}",
                    c
                );
            }
        }

        let w = ut.weights();
        let sum_wm: f64 = w.w_mean.iter().copied().sum();
        assert!(abs_diff_eq!(sum_wm, 1.0, epsilon = EPS), "sum wm {}", sum_wm);

        let moments = unscented_transform(&sigmas, w, None).unwrap();
        for r in 0..n {
            assert!(
                abs_diff_eq!(moments.mean[r], x[r], epsilon = EPS),
                "mean mismatch at {}: {} vs {}",
                r,
                moments.mean[r],
                x[r]
            );
        }
        for r in 0..n {
            for c in 0..n {
                assert!(
                    abs_diff_eq!(moments.covariance[(r, c)], p[(r, c)], epsilon = 1e-8),
                    "cov mismatch at ({},{}): {} vs {}",
                    r,
                    c,
                    moments.covariance[(r, c)],
                    p[(r, c)]
                );
            }
        }
    }

    macro_rules! test_dim {
        ($name:ident, $n:expr) => {
            #[test]
            fn $name() {
                let n: usize = $n;
                check(&MerweScaled::<f64>::new(n, 0.6, 1.2, 0.4).unwrap(), n, 1, true);
                check(&MerweScaled::<f64>::new(n, 1.0, 2.0, 3.0 - n as f64).unwrap(), n, 2, true);
                check(&Julier::<f64>::new(n, 1.0).unwrap(), n, 3, true);
                check(&Julier::<f64>::with_dim(n).unwrap(), n, 4, true);
                check(&Simplex::<f64>::with_dim(n).unwrap(), n, 5, false);
            }
        };
    }

    test_dim!(dim1_general, 1);
    test_dim!(dim2_general, 2);
    test_dim!(dim3_general, 3);
    test_dim!(dim4_general, 4);
    test_dim!(dim7_general, 7);
}

mod counts {
    use crate::sigma_points::{Julier, MerweScaled, MomentMatched, SigmaPoints, Simplex};
    use nalgebra::DVector;

    #[test]
    fn num_sigmas_per_method() {
        for n in 1..6 {
            assert_eq!(MerweScaled::<f64>::new(n, 0.1, 2.0, 0.0).unwrap().num_sigmas(), 2 * n + 1);
            assert_eq!(Julier::<f64>::with_dim(n).unwrap().num_sigmas(), 2 * n + 1);
            assert_eq!(Simplex::<f64>::with_dim(n).unwrap().num_sigmas(), n + 1);
            let mm = MomentMatched::<f64>::new(
                n,
                1.0,
                DVector::zeros(n),
                DVector::from_element(n, 3.0),
            )
            .unwrap();
            assert_eq!(mm.num_sigmas(), 2 * n + 1);
            assert_eq!(mm.weights().len(), 2 * n + 1);
        }
    }
}

mod dimension_mismatch {
    use crate::error::SigmaPointError;
    use crate::sigma_points::{Julier, MerweScaled, MomentMatched, SigmaPoints, Simplex};
    use nalgebra::{DMatrix, DVector};

    fn expect_mismatch<G: SigmaPoints<f64>>(ut: &G) {
        let x = DVector::zeros(2);
        let p = DMatrix::identity(3, 3);
        assert_eq!(
            ut.sigma_points(&x, &p),
            Err(SigmaPointError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn every_generator_checks_the_mean() {
        expect_mismatch(&MerweScaled::<f64>::new(3, 0.1, 2.0, 0.0).unwrap());
        expect_mismatch(&Julier::<f64>::with_dim(3).unwrap());
        expect_mismatch(&Simplex::<f64>::with_dim(3).unwrap());
        expect_mismatch(
            &MomentMatched::<f64>::new(3, 1.0, DVector::zeros(3), DVector::from_element(3, 3.0)).unwrap(),
        );
    }

    #[test]
    fn scalar_mean_only_fits_one_dimension() {
        let ut = Julier::<f64>::with_dim(2).unwrap();
        assert_eq!(
            ut.sigma_points_from(0.0, 1.0),
            Err(SigmaPointError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        );
    }
}

mod capabilities {
    use super::fixture;
    use crate::error::Result;
    use crate::sigma_points::{Julier, MerweScaled, SigmaPoints, Simplex};
    use approx::assert_relative_eq;
    use nalgebra::{DMatrix, DVector};
    use std::f64::consts::PI;

    fn wrap_angle(a: &DVector<f64>, b: &DVector<f64>) -> DVector<f64> {
        let mut d = a - b;
        d[0] = (d[0] + PI).rem_euclid(2.0 * PI) - PI;
        d
    }

    #[test]
    fn custom_subtract_wraps_angles() {
        let ut = Julier::<f64>::with_dim(2).unwrap().with_subtract(wrap_angle);
        let x = DVector::from_vec(vec![3.0, 0.0]);
        let sigmas = ut.sigma_points(&x, &DMatrix::identity(2, 2)).unwrap();
        // 3 + √2 wraps around to the negative side
        assert_relative_eq!(sigmas[(1, 0)], 3.0 + 2f64.sqrt() - 2.0 * PI, epsilon = 1e-12);
        assert_relative_eq!(sigmas[(3, 0)], 3.0 - 2f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(sigmas[(2, 1)], 2f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn custom_subtract_reaches_the_simplex() {
        let ut = Simplex::<f64>::with_dim(1)
            .unwrap()
            .with_subtract(|a: &DVector<f64>, b: &DVector<f64>| (a - b) * 2.0);
        let sigmas = ut.sigma_points_from(0.5, 1.0).unwrap();
        assert_relative_eq!(sigmas[(0, 0)], -1.0, epsilon = 1e-12);
        assert_relative_eq!(sigmas[(1, 0)], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn lower_factor_changes_geometry_silently() {
        let (x, p) = fixture(3, 11);
        let upper = MerweScaled::<f64>::new(3, 0.5, 2.0, 0.0).unwrap();
        let lower = MerweScaled::<f64>::new(3, 0.5, 2.0, 0.0).unwrap().with_sqrt(
            |m: &DMatrix<f64>| -> Result<DMatrix<f64>> {
                Ok(m.clone().cholesky().expect("spd fixture").l())
            },
        );
        let a = upper.sigma_points(&x, &p).unwrap();
        let b = lower.sigma_points(&x, &p).unwrap();
        assert_eq!(a.row(0), b.row(0));
        assert!((a - b).amax() > 1e-3);
    }

    #[test]
    fn failing_sqrt_propagates() {
        let ut = MerweScaled::<f64>::new(2, 1.0, 2.0, 0.0).unwrap();
        let indefinite = DMatrix::from_row_slice(2, 2, &[1.0, 3.0, 3.0, 1.0]);
        assert!(ut.sigma_points(&DVector::zeros(2), &indefinite).is_err());
    }
}

mod generator {
    use crate::sigma_points::{Julier, MerweScaled, MomentMatched, SigmaPointGenerator, SigmaPoints};
    use approx::assert_relative_eq;
    use nalgebra::{DMatrix, DVector};

    #[test]
    fn enum_delegates_to_variant() {
        let direct = MerweScaled::<f64>::new(2, 0.3, 2.0, 1.0).unwrap();
        let wrapped = SigmaPointGenerator::from(direct.clone());
        let x = DVector::from_vec(vec![1.0, 2.0]);
        let p = DMatrix::from_row_slice(2, 2, &[2.0, 0.5, 0.5, 1.0]);

        assert_eq!(wrapped.dim(), 2);
        assert_eq!(wrapped.num_sigmas(), 5);
        assert_eq!(wrapped.weights(), direct.weights());
        assert_eq!(wrapped.sigma_points(&x, &p), direct.sigma_points(&x, &p));
        assert_eq!(wrapped.to_string(), direct.to_string());

        let generated = wrapped.generate(&x, &p).unwrap();
        assert_eq!(generated.mean_weights, direct.weights().w_mean);
        assert_eq!(generated.covariance_weights, direct.weights().w_covar);
    }

    #[test]
    fn gaussian_moment_match_equals_julier_kappa_two() {
        let generators: Vec<SigmaPointGenerator<f64>> = vec![
            Julier::<f64>::new(1, 2.0).unwrap().into(),
            MomentMatched::<f64>::new(1, 1.0, DVector::zeros(1), DVector::from_element(1, 3.0))
                .unwrap()
                .into(),
        ];
        let a = generators[0].sigma_points_from(0.5, 2.0).unwrap();
        let b = generators[1].sigma_points_from(0.5, 2.0).unwrap();
        // the moment-matched minus branch comes first
        assert_eq!(a[(0, 0)], b[(0, 0)]);
        assert_relative_eq!(a[(1, 0)], b[(2, 0)], epsilon = 1e-12);
        assert_relative_eq!(a[(2, 0)], b[(1, 0)], epsilon = 1e-12);
        assert_relative_eq!(
            generators[0].weights().w_mean,
            generators[1].weights().w_mean,
            epsilon = 1e-12
        );
    }
}

mod positivity {
    use super::fixture;
    use crate::sigma_points::{MomentMatched, SigmaPoints};
    use nalgebra::{DMatrix, DVector};

    #[test]
    fn constrained_points_stay_non_negative() {
        for seed in 0..8 {
            let (_, p) = fixture(3, 100 + seed);
            // elementwise roots need non-negative entries
            let p = p.map(f64::abs);
            let x = DVector::from_vec(vec![0.2, 1.5, 0.05]);
            let skewness = DVector::from_fn(3, |i, _| p[(i, i)].powf(1.5) * 1.2);
            let kurtosis = DVector::from_fn(3, |i, _| p[(i, i)].powi(2) * 5.0);

            let ut = MomentMatched::builder(3, p.clone(), skewness, kurtosis)
                .mean(x.clone())
                .positively_constrained(true)
                .slack(0.95)
                .build()
                .unwrap();
            let sigmas = ut.sigma_points(&x, &p).unwrap();
            assert!(
                sigmas.iter().all(|v| *v >= 0.0),
                "negative point for seed {}: {}",
                seed,
                sigmas
            );
            assert!(!ut.corrected_indices().is_empty());
            let total: f64 = ut.weights().w_mean.iter().sum();
            approx::assert_relative_eq!(total, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn unconstrained_points_can_go_negative() {
        let x = DVector::from_vec(vec![0.2]);
        let p = DMatrix::from_element(1, 1, 1.0);
        let skewness = DVector::from_element(1, 1.2);
        let kurtosis = DVector::from_element(1, 5.0);
        let ut = MomentMatched::<f64>::new(1, p.clone(), skewness, kurtosis).unwrap();
        let sigmas = ut.sigma_points(&x, &p).unwrap();
        assert!(sigmas[(1, 0)] < 0.0);
    }
}

mod from_config {
    use crate::config::GeneratorConfig;
    use crate::sigma_points::{MerweScaled, SigmaPointGenerator, SigmaPoints};

    #[test]
    fn config_builds_the_same_generator() {
        let config: GeneratorConfig = serde_json::from_str(
            r#"{ "method": "merwe_scaled", "n": 2, "alpha": 0.3, "beta": 2.0, "kappa": 1.0 }"#,
        )
        .unwrap();
        let built = config.build::<f64>().unwrap();
        let direct = MerweScaled::<f64>::new(2, 0.3, 2.0, 1.0).unwrap();
        assert_eq!(built.weights(), direct.weights());
        assert_eq!(built.to_string(), direct.to_string());
    }

    #[test]
    fn generators_are_shareable_across_threads() {
        fn assert_send_sync<S: Send + Sync>() {}
        assert_send_sync::<SigmaPointGenerator<f64>>();
        assert_send_sync::<GeneratorConfig>();

        let generator = std::sync::Arc::new(GeneratorConfig::gaussian(2).build::<f64>().unwrap());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let generator = generator.clone();
                let mean = nalgebra::DVector::from_element(2, i as f64);
                std::thread::spawn(move || generator.sigma_points_from(mean, 1.0))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap().nrows(), 5);
        }
    }
}
