//! Maximum-likelihood calibration of the Vasicek model.
//!
//! The OU transition over a step `Δ` is Gaussian:
//!
//! ```text
//! r_t | r_{t-1} ~ N(θ + (r_{t-1} - θ)e^{-κΔ}, (σ²/2κ)(1 - e^{-2κΔ}))
//! ```
//!
//! The negative log-likelihood of a weekly series is minimized over a box.

use prepay_math::optimization::{minimize_bounded, Bounds, OptimizationConfig};
use prepay_math::statistics::{mean, population_std};
use tracing::{debug, warn};

use crate::error::{ModelError, ModelResult};

/// Weekly observation step in years.
pub const WEEKLY_DT: f64 = 7.0 / 365.0;

/// Minimum observations for a calibration.
pub const MIN_OBSERVATIONS: usize = 3;

const KAPPA_INIT: f64 = 0.2;
const KAPPA_MIN: f64 = 0.01;
const SIGMA_MIN: f64 = 1e-6;
const SIGMA_INIT_FLOOR: f64 = 1e-4;
const SIGMA_INIT_FALLBACK: f64 = 0.01;
const THETA_FLOOR: f64 = 0.05;
const THETA_CAP: f64 = 0.69;

/// Outcome of a Vasicek fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VasicekFit {
    /// Mean-reversion speed.
    pub kappa: f64,
    /// Long-run level (short-rate space).
    pub theta: f64,
    /// Volatility.
    pub sigma: f64,
    /// Whether the optimizer converged; when `false` the fit is the
    /// initial guess.
    pub converged: bool,
    /// Negative log-likelihood at the reported parameters.
    pub nll: f64,
}

/// Negative log-likelihood of `rates` under `(κ, θ, σ)` with step `dt`.
///
/// Returns infinity for non-positive `κ` or `σ`, or a degenerate variance.
#[must_use]
pub fn negative_log_likelihood(params: &[f64], rates: &[f64], dt: f64) -> f64 {
    let (kappa, theta, sigma) = (params[0], params[1], params[2]);
    if !(kappa.is_finite() && theta.is_finite() && sigma.is_finite()) || kappa <= 0.0 || sigma <= 0.0 {
        return f64::INFINITY;
    }
    if rates.len() < 2 {
        return f64::INFINITY;
    }

    let decay = (-kappa * dt).exp();
    let var = sigma * sigma / (2.0 * kappa) * (1.0 - (-2.0 * kappa * dt).exp());
    if !var.is_finite() || var <= 0.0 {
        return f64::INFINITY;
    }

    let log_norm = (2.0 * std::f64::consts::PI * var).ln();
    0.5 * rates
        .windows(2)
        .map(|w| {
            let m = theta + (w[0] - theta) * decay;
            log_norm + (w[1] - m).powi(2) / var
        })
        .sum::<f64>()
}

/// Box for θ: `[0.7·m, 1.5·m]` capped to `[0.05, 0.69]`, falling back to the
/// uncapped band when the capped one is empty.
#[must_use]
pub fn theta_bounds(sample_mean: f64) -> (f64, f64) {
    let lo = (0.7 * sample_mean).max(THETA_FLOOR);
    let hi = (1.5 * sample_mean).min(THETA_CAP);
    if lo <= hi {
        (lo, hi)
    } else {
        let (a, b) = (0.7 * sample_mean, 1.5 * sample_mean);
        (a.min(b), a.max(b))
    }
}

/// Initial guess `(κ₀, θ₀, σ₀)` for a short-rate series.
#[must_use]
pub fn initial_guess(rates: &[f64], dt: f64) -> [f64; 3] {
    let diffs: Vec<f64> = rates.windows(2).map(|w| w[1] - w[0]).collect();
    let sigma = if diffs.len() > 1 {
        population_std(&diffs) / dt.sqrt()
    } else {
        SIGMA_INIT_FALLBACK
    };
    [KAPPA_INIT, mean(rates), sigma.max(SIGMA_INIT_FLOOR)]
}

/// Fits `(κ, θ, σ)` to a weekly short-rate series.
///
/// # Errors
///
/// Fails with [`ModelError::InsufficientData`] on fewer than three
/// observations. Non-convergence falls back to the initial guess.
pub fn fit_short_rates(
    rates: &[f64],
    config: &OptimizationConfig,
    entity: &str,
) -> ModelResult<VasicekFit> {
    if rates.len() < MIN_OBSERVATIONS {
        return Err(ModelError::insufficient_data(entity, MIN_OBSERVATIONS, rates.len()));
    }

    let dt = WEEKLY_DT;
    let x0 = initial_guess(rates, dt);
    let bounds = Bounds::new(&[
        (KAPPA_MIN, f64::INFINITY),
        theta_bounds(x0[1]),
        (SIGMA_MIN, f64::INFINITY),
    ])?;
    let objective = |p: &[f64]| negative_log_likelihood(p, rates, dt);

    let result = minimize_bounded(objective, &x0, &bounds, config)?;
    let usable = result.converged && result.parameters.iter().all(|v| v.is_finite());

    let params = if usable {
        result.parameters
    } else {
        warn!(
            entity,
            iterations = result.iterations,
            "Vasicek optimizer did not converge, using initial guess"
        );
        // The start may sit outside the θ box; report the feasible point.
        bounds.project(&x0)
    };

    let fit = VasicekFit {
        kappa: params[0],
        theta: params[1],
        sigma: params[2],
        converged: usable,
        nll: negative_log_likelihood(&params, rates, dt),
    };
    debug!(
        entity,
        kappa = fit.kappa,
        theta = fit.theta,
        sigma = fit.sigma,
        nll = fit.nll,
        "Vasicek calibrated"
    );
    Ok(fit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_nll_rejects_invalid_parameters() {
        let r = [0.05, 0.051, 0.049];
        assert!(negative_log_likelihood(&[0.0, 0.05, 0.01], &r, WEEKLY_DT).is_infinite());
        assert!(negative_log_likelihood(&[0.2, 0.05, -0.01], &r, WEEKLY_DT).is_infinite());
        assert!(negative_log_likelihood(&[0.2, 0.05, 0.01], &r[..1], WEEKLY_DT).is_infinite());
        assert!(negative_log_likelihood(&[0.2, 0.05, 0.01], &r, WEEKLY_DT).is_finite());
    }

    #[test]
    fn test_nll_matches_gaussian_density() {
        let (k, th, s) = (0.5, 0.06, 0.02);
        let r = [0.05, 0.052];
        let decay = (-k * WEEKLY_DT).exp();
        let m = th + (0.05 - th) * decay;
        let v = s * s / (2.0 * k) * (1.0 - (-2.0 * k * WEEKLY_DT).exp());
        let expected = 0.5 * ((2.0 * std::f64::consts::PI * v).ln() + (0.052 - m).powi(2) / v);
        assert_relative_eq!(
            negative_log_likelihood(&[k, th, s], &r, WEEKLY_DT),
            expected,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_theta_bounds() {
        let (lo, hi) = theta_bounds(0.10);
        assert_relative_eq!(lo, 0.07, epsilon = 1e-15);
        assert_relative_eq!(hi, 0.15, epsilon = 1e-15);

        // Low mean: floor of 0.05 applies.
        let (lo, hi) = theta_bounds(0.05);
        assert_eq!(lo, 0.05);
        assert_relative_eq!(hi, 0.075, epsilon = 1e-15);

        // Mean so low the capped band inverts.
        let (lo, hi) = theta_bounds(0.02);
        assert_relative_eq!(lo, 0.014, epsilon = 1e-15);
        assert_relative_eq!(hi, 0.03, epsilon = 1e-15);

        // Very high mean: cap of 0.69 applies.
        let (lo, hi) = theta_bounds(0.8);
        assert_relative_eq!(lo, 0.56, epsilon = 1e-15);
        assert_eq!(hi, 0.69);
    }

    #[test]
    fn test_initial_guess() {
        let r = [0.10, 0.12, 0.10, 0.12, 0.10];
        let x0 = initial_guess(&r, WEEKLY_DT);
        assert_eq!(x0[0], 0.2);
        assert_relative_eq!(x0[1], 0.108, epsilon = 1e-15);
        assert_relative_eq!(x0[2], 0.02 / WEEKLY_DT.sqrt(), epsilon = 1e-12);

        let flat = initial_guess(&[0.1, 0.1, 0.1], WEEKLY_DT);
        assert_eq!(flat[2], 1e-4);
        let two = initial_guess(&[0.1, 0.2], WEEKLY_DT);
        assert_eq!(two[2], 0.01);
    }

    #[test]
    fn test_too_few_observations() {
        let err = fit_short_rates(&[0.1, 0.11], &OptimizationConfig::default(), "Consumo");
        assert!(matches!(err, Err(ModelError::InsufficientData { required: 3, actual: 2, .. })));
    }

    #[test]
    fn test_fit_stays_inside_bounds() {
        let r: Vec<f64> = (0..40)
            .map(|i| 0.09 + 0.004 * (f64::from(i) * 0.7).sin())
            .collect();
        let fit = fit_short_rates(&r, &OptimizationConfig::default(), "Comercial").unwrap();
        let (lo, hi) = theta_bounds(mean(&r));
        assert!(fit.theta >= lo && fit.theta <= hi);
        assert!(fit.kappa >= KAPPA_MIN);
        assert!(fit.sigma >= SIGMA_MIN);
        assert!(fit.nll.is_finite());
    }
}
