//! Daily exact-discretization simulation of the Hull-White short rate.
//!
//! Over a step of `Δ` years the short rate evolves as
//!
//! ```text
//! r_{i+1} = r_i·e^{-aΔ} + (θ_i/a)(1 - e^{-aΔ}) + √var·Z
//! var     = σ²/(2a)(1 - e^{-2aΔ})
//! ```
//!
//! and the reported EA rate at time `t` is the rate of the pathwise
//! discount factor, `exp(∫r/t) - 1`.

use ndarray::Array2;
use prepay_curves::discount::DAYS_PER_YEAR;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use super::HullWhiteParameters;
use crate::error::{ModelError, ModelResult};
use crate::paths::{PathMatrix, Regime};

/// `1 - e^{-x}`, with a second-order expansion near zero.
#[must_use]
pub fn one_minus_exp(x: f64) -> f64 {
    if x.abs() < 1e-6 {
        x * (1.0 - 0.5 * x)
    } else {
        -(-x).exp_m1()
    }
}

/// Simulates `n_paths` paths over the parameters' time grid in `regime`.
///
/// # Errors
///
/// Fails when `n_paths` is zero or the grid has fewer than two points.
pub fn simulate_paths(
    params: &HullWhiteParameters,
    regime: Regime,
    n_paths: usize,
    seed: u64,
) -> ModelResult<PathMatrix> {
    if n_paths == 0 {
        return Err(ModelError::invalid_input("at least one path is required"));
    }
    let times = &params.times;
    if times.len() < 2 {
        return Err(ModelError::invalid_input(format!(
            "Hull-White grid needs at least two points, got {}",
            times.len()
        )));
    }
    let theta = params.theta_for(regime);
    let (a, sigma) = (params.a, params.sigma);
    let n = times.len();
    let mut rng = StdRng::seed_from_u64(seed);

    let mut short = Array2::<f64>::zeros((n, n_paths));
    short.row_mut(0).fill(params.r0);
    for i in 0..n - 1 {
        let dt = times[i + 1] - times[i];
        let decay = (-a * dt).exp();
        let drift = theta[i] / a * one_minus_exp(a * dt);
        let sd = (sigma * sigma / (2.0 * a) * one_minus_exp(2.0 * a * dt))
            .max(0.0)
            .sqrt();
        for p in 0..n_paths {
            let z: f64 = rng.sample(StandardNormal);
            short[[i + 1, p]] = short[[i, p]] * decay + drift + sd * z;
        }
    }

    let mut ea = Array2::<f64>::zeros((n, n_paths));
    for p in 0..n_paths {
        let mut integral = 0.0;
        ea[[0, p]] = params.r0.exp_m1();
        for i in 1..n {
            integral += short[[i, p]] * (times[i] - times[i - 1]);
            ea[[i, p]] = (integral / times[i]).exp_m1();
        }
    }

    let times_days = times.iter().map(|t| t * DAYS_PER_YEAR).collect();
    PathMatrix::new(params.anchor, times_days, short, ea)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use prepay_core::Date;

    fn params(sigma: f64) -> HullWhiteParameters {
        let times: Vec<f64> = (0..=10).map(|d| d as f64 / 365.0).collect();
        let a = 0.2;
        let r0 = 0.09;
        // Constant θ = a·r0 keeps the zero-vol path at r0.
        let theta = vec![a * r0; times.len()];
        HullWhiteParameters {
            a,
            sigma,
            lambda: 0.0,
            r0,
            anchor: Date::from_ymd(2025, 1, 31).unwrap(),
            times,
            theta_base: theta.clone(),
            theta_stressed: theta,
            converged: true,
        }
    }

    #[test]
    fn test_one_minus_exp() {
        assert_relative_eq!(one_minus_exp(1e-8), 1e-8 - 0.5e-16, epsilon = 1e-24);
        assert_relative_eq!(one_minus_exp(0.5), 1.0 - (-0.5_f64).exp(), epsilon = 1e-15);
    }

    #[test]
    fn test_zero_vol_stationary_path() {
        let m = simulate_paths(&params(0.0), Regime::Base, 3, 1).unwrap();
        assert_eq!(m.n_steps(), 11);
        assert_relative_eq!(m.times_days()[10], 10.0, epsilon = 1e-12);
        for i in 0..11 {
            assert_relative_eq!(m.short_rates()[[i, 2]], 0.09, epsilon = 1e-12);
            assert_relative_eq!(m.effective_annual()[[i, 2]], 0.09_f64.exp_m1(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_ea_is_average_short_rate() {
        let m = simulate_paths(&params(0.02), Regime::Stressed, 4, 9).unwrap();
        let r = m.short_rates();
        let t = 5.0 / 365.0;
        let integral: f64 = (1..=5).map(|i| r[[i, 1]] / 365.0).sum();
        assert_relative_eq!(m.effective_annual()[[5, 1]], (integral / t).exp_m1(), epsilon = 1e-12);
    }

    #[test]
    fn test_seeded_and_validated() {
        let p = params(0.01);
        let a = simulate_paths(&p, Regime::Base, 5, 3).unwrap();
        let b = simulate_paths(&p, Regime::Base, 5, 3).unwrap();
        assert_eq!(a, b);
        assert!(simulate_paths(&p, Regime::Base, 0, 3).is_err());

        let mut short = p.clone();
        short.times.truncate(1);
        assert!(simulate_paths(&short, Regime::Base, 5, 3).is_err());
    }
}
