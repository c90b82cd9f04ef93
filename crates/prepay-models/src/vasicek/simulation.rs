//! Weekly Euler-Maruyama simulation of the Vasicek short rate.

use ndarray::Array2;
use prepay_core::Date;
use prepay_curves::conversion::short_to_ea;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use super::calibration::WEEKLY_DT;
use super::VasicekParameters;
use crate::error::{ModelError, ModelResult};
use crate::paths::PathMatrix;

/// Days per simulation step.
pub const STEP_DAYS: i64 = 7;

/// Number of weekly steps needed to reach `end` from `anchor`, at least one.
#[must_use]
pub fn weeks_to(anchor: Date, end: Date) -> usize {
    let days = end - anchor;
    if days > 0 {
        days.div_euclid(STEP_DAYS) as usize + usize::from(days.rem_euclid(STEP_DAYS) != 0)
    } else {
        1
    }
}

/// Simulates `n_paths` weekly paths of `n_weeks` steps starting at the
/// parameters' `r0`:
///
/// ```text
/// r_{t+Δ} = r_t + κ(θ - r_t)Δ + σ√Δ·Z
/// ```
///
/// # Errors
///
/// Fails when `n_paths` is zero.
pub fn simulate_paths(
    params: &VasicekParameters,
    n_weeks: usize,
    n_paths: usize,
    seed: u64,
) -> ModelResult<PathMatrix> {
    if n_paths == 0 {
        return Err(ModelError::invalid_input("at least one path is required"));
    }

    let dt = WEEKLY_DT;
    let kdt = params.kappa * dt;
    let vol = params.sigma * dt.sqrt();
    let mut rng = StdRng::seed_from_u64(seed);

    let mut short = Array2::<f64>::zeros((n_weeks + 1, n_paths));
    short.row_mut(0).fill(params.r0);
    for t in 1..=n_weeks {
        for p in 0..n_paths {
            let prev = short[[t - 1, p]];
            let z: f64 = rng.sample(StandardNormal);
            short[[t, p]] = prev + kdt * (params.theta - prev) + vol * z;
        }
    }

    let ea = short.mapv(short_to_ea);
    let times = (0..=n_weeks).map(|w| (w as i64 * STEP_DAYS) as f64).collect();
    PathMatrix::new(params.anchor, times, short, ea)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params() -> VasicekParameters {
        VasicekParameters {
            kappa: 0.3,
            theta: 0.05,
            sigma: 0.02,
            r0: 0.08,
            anchor: Date::from_ymd(2025, 1, 3).unwrap(),
            converged: true,
        }
    }

    #[test]
    fn test_weeks_to() {
        let a = Date::from_ymd(2025, 1, 1).unwrap();
        assert_eq!(weeks_to(a, a), 1);
        assert_eq!(weeks_to(a, a.add_days(-10)), 1);
        assert_eq!(weeks_to(a, a.add_days(7)), 1);
        assert_eq!(weeks_to(a, a.add_days(8)), 2);
        assert_eq!(weeks_to(a, a.add_days(365)), 53);
    }

    #[test]
    fn test_shape_and_start() {
        let m = simulate_paths(&params(), 10, 5, 42).unwrap();
        assert_eq!(m.n_steps(), 11);
        assert_eq!(m.n_paths(), 5);
        assert_eq!(m.times_days()[10], 70.0);
        for p in 0..5 {
            assert_eq!(m.short_rates()[[0, p]], 0.08);
            assert_relative_eq!(m.effective_annual()[[0, p]], 0.08_f64.exp_m1(), epsilon = 1e-15);
        }
    }

    #[test]
    fn test_seed_reproducibility() {
        let a = simulate_paths(&params(), 20, 8, 7).unwrap();
        let b = simulate_paths(&params(), 20, 8, 7).unwrap();
        let c = simulate_paths(&params(), 20, 8, 8).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.short_rates(), c.short_rates());
    }

    #[test]
    fn test_zero_volatility_is_deterministic_decay() {
        let mut p = params();
        p.sigma = 0.0;
        let m = simulate_paths(&p, 3, 2, 1).unwrap();
        let mut r = p.r0;
        for t in 1..=3 {
            r += p.kappa * WEEKLY_DT * (p.theta - r);
            assert_relative_eq!(m.short_rates()[[t, 1]], r, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_rejects_zero_paths() {
        assert!(simulate_paths(&params(), 3, 0, 1).is_err());
    }
}
