//! Maximum-likelihood calibration of the Hull-White model to a curve
//! snapshot history, and construction of the daily drift grid.
//!
//! Between consecutive snapshots `k` and `k+1`, `Δ` years apart, the short
//! rate is Gaussian with
//!
//! ```text
//! mean = e^{-aΔ}(r_k - f_k(0)) + f_k(Δ) + σ²/(2a²)(1 - e^{-aΔ})² + (σλ/a)(1 - e^{-aΔ})
//! var  = σ²/(2a)(1 - e^{-2aΔ})
//! ```
//!
//! where `f_k` is the forward curve of snapshot `k` and `λ` the market price
//! of risk.

use prepay_curves::discount::DAYS_PER_YEAR;
use prepay_curves::forward::{CurveHistory, ForwardCurve};
use prepay_math::differentiation::gradient;
use prepay_math::optimization::{minimize_bounded, Bounds, OptimizationConfig};
use prepay_math::statistics::population_std;
use tracing::{debug, warn};

use crate::error::{ModelError, ModelResult};

/// Minimum snapshots on or before the cut-off.
pub const MIN_SNAPSHOTS: usize = 5;

/// Minimum curve nodes within the horizon.
pub const MIN_NODES: usize = 2;

const A_INIT: f64 = 0.1;
const LAMBDA_INIT: f64 = 0.0;
const PARAM_MIN: f64 = 1e-6;
const SIGMA_INIT_FLOOR: f64 = 1e-3;
const SIGMA_INIT_FALLBACK: f64 = 0.01;

/// Outcome of a Hull-White likelihood fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HullWhiteFit {
    /// Mean-reversion speed.
    pub a: f64,
    /// Volatility.
    pub sigma: f64,
    /// Market price of risk.
    pub lambda: f64,
    /// Whether the optimizer converged; when `false` the fit is the
    /// initial guess.
    pub converged: bool,
    /// Negative log-likelihood at the reported parameters.
    pub nll: f64,
}

/// Forward-curve column holding the forward `dt` years ahead, on a grid
/// whose column `j` is the `(j+1)`-day node.
#[must_use]
pub fn forward_column(dt: f64, n_columns: usize) -> usize {
    let days = (dt * DAYS_PER_YEAR).round().max(1.0) as usize;
    (days - 1).min(n_columns.saturating_sub(1))
}

/// Conditional mean and variance of `r_{k+1}` given `r_k`.
#[must_use]
pub fn transition_moments(
    a: f64,
    sigma: f64,
    lambda: f64,
    r_k: f64,
    forward_0: f64,
    forward_dt: f64,
    dt: f64,
) -> (f64, f64) {
    let decay = (-a * dt).exp();
    let one_minus = 1.0 - decay;
    let mean = decay * (r_k - forward_0)
        + forward_dt
        + sigma * sigma / (2.0 * a * a) * one_minus * one_minus
        + sigma * lambda / a * one_minus;
    let var = sigma * sigma / (2.0 * a) * (1.0 - (-2.0 * a * dt).exp());
    (mean, var)
}

/// Gaps between snapshots in years, floored at one day.
#[must_use]
pub fn snapshot_steps(history: &CurveHistory) -> Vec<f64> {
    history
        .dates()
        .windows(2)
        .map(|w| ((w[1] - w[0]) as f64 / DAYS_PER_YEAR).max(1.0 / DAYS_PER_YEAR))
        .collect()
}

/// Number of transitions used for a series of `n_rates` observations.
fn transitions(n_rates: usize, n_steps: usize, n_forwards: usize) -> usize {
    n_steps
        .min(n_rates.saturating_sub(1))
        .min(n_forwards.saturating_sub(1))
}

/// Negative log-likelihood of `(a, σ, λ)` over the snapshot transitions.
///
/// Returns infinity on fewer than three observations, non-positive `a` or
/// `σ`, or a degenerate variance.
#[must_use]
pub fn negative_log_likelihood(
    params: &[f64],
    rates: &[f64],
    forwards: &[ForwardCurve],
    steps: &[f64],
) -> f64 {
    let (a, sigma, lambda) = (params[0], params[1], params[2]);
    if !(a.is_finite() && sigma.is_finite() && lambda.is_finite()) || a <= 0.0 || sigma <= 0.0 {
        return f64::INFINITY;
    }
    if rates.len() < 3 {
        return f64::INFINITY;
    }
    let m = transitions(rates.len(), steps.len(), forwards.len());
    if m == 0 {
        return f64::INFINITY;
    }

    let mut nll = 0.0;
    for k in 0..m {
        let fwd = &forwards[k];
        let j = forward_column(steps[k], fwd.forwards().len());
        let (mean, var) = transition_moments(
            a,
            sigma,
            lambda,
            rates[k],
            fwd.initial(),
            fwd.forwards()[j],
            steps[k],
        );
        if !var.is_finite() || var <= 0.0 {
            return f64::INFINITY;
        }
        nll += (2.0 * std::f64::consts::PI * var).ln() + (rates[k + 1] - mean).powi(2) / var;
    }
    0.5 * nll
}

/// Initial guess `(a₀, σ₀, λ₀)`.
#[must_use]
pub fn initial_guess(rates: &[f64], history: &CurveHistory) -> [f64; 3] {
    let diffs: Vec<f64> = rates.windows(2).map(|w| w[1] - w[0]).collect();
    let sigma = if diffs.len() > 1 {
        let gaps: Vec<f64> = history
            .dates()
            .windows(2)
            .map(|w| (w[1] - w[0]) as f64)
            .collect();
        let mean_dt = gaps.iter().sum::<f64>() / gaps.len() as f64 / DAYS_PER_YEAR;
        (population_std(&diffs) / mean_dt.sqrt()).max(SIGMA_INIT_FLOOR)
    } else {
        SIGMA_INIT_FALLBACK
    };
    [A_INIT, sigma, LAMBDA_INIT]
}

/// Fits `(a, σ, λ)` to a curve history already restricted to the cut-off
/// and horizon.
///
/// # Errors
///
/// Fails if fewer than two nodes are available. Non-convergence falls back
/// to the initial guess.
pub fn fit_history(
    history: &CurveHistory,
    config: &OptimizationConfig,
    entity: &str,
) -> ModelResult<HullWhiteFit> {
    let forwards = history.forward_curves()?;
    let rates = history.short_rate_series();
    let steps = snapshot_steps(history);

    let x0 = initial_guess(&rates, history);
    let bounds = Bounds::new(&[
        (PARAM_MIN, f64::INFINITY),
        (PARAM_MIN, f64::INFINITY),
        (f64::NEG_INFINITY, f64::INFINITY),
    ])?;
    let objective = |p: &[f64]| negative_log_likelihood(p, &rates, &forwards, &steps);

    let result = minimize_bounded(objective, &x0, &bounds, config)?;
    let usable = result.converged && result.parameters.iter().all(|v| v.is_finite());
    let params = if usable {
        result.parameters
    } else {
        warn!(
            entity,
            iterations = result.iterations,
            "Hull-White optimizer did not converge, using initial guess"
        );
        x0.to_vec()
    };

    let fit = HullWhiteFit {
        a: params[0],
        sigma: params[1],
        lambda: params[2],
        converged: usable,
        nll: negative_log_likelihood(&params, &rates, &forwards, &steps),
    };
    debug!(
        entity,
        a = fit.a,
        sigma = fit.sigma,
        lambda = fit.lambda,
        nll = fit.nll,
        "Hull-White calibrated"
    );
    Ok(fit)
}

/// Daily time grid `0..=horizon_days` in years.
#[must_use]
pub fn daily_grid(horizon_days: i64) -> Vec<f64> {
    (0..=horizon_days.max(1))
        .map(|d| d as f64 / DAYS_PER_YEAR)
        .collect()
}

/// Drift `θ(t)` on `times` that reproduces `forward`:
///
/// ```text
/// θ(t) = ∂f/∂t + a·f(t) + σ²/(2a)(1 - e^{-2at}) + σλ
/// ```
///
/// # Errors
///
/// Fails if `times` has fewer than two points.
pub fn drift_grid(
    a: f64,
    sigma: f64,
    lambda: f64,
    forward: &ForwardCurve,
    times: &[f64],
) -> ModelResult<Vec<f64>> {
    let f: Vec<f64> = times.iter().map(|&t| forward.at(t)).collect();
    let df = gradient(&f, times)?;
    Ok(times
        .iter()
        .zip(f.iter().zip(&df))
        .map(|(&t, (&f_t, &df_t))| {
            df_t + a * f_t + sigma * sigma / (2.0 * a) * (1.0 - (-2.0 * a * t).exp()) + sigma * lambda
        })
        .collect())
}

/// Checks horizon coverage and snapshot counts, returning the history
/// restricted to `cutoff` and to nodes within `horizon_days`.
///
/// # Errors
///
/// Fails when the horizon exceeds the last curve node, fewer than two nodes
/// fall within it, or fewer than five snapshots precede the cut-off.
pub fn calibration_window(
    curves: &CurveHistory,
    cutoff: prepay_core::Date,
    horizon_days: i64,
    entity: &str,
) -> ModelResult<CurveHistory> {
    let model = "Hull-White";
    if horizon_days > curves.last_node() {
        return Err(ModelError::calibration(
            model,
            entity,
            format!(
                "horizon of {horizon_days} days exceeds the last curve node ({} days)",
                curves.last_node()
            ),
        ));
    }
    let window = curves.truncated(cutoff, horizon_days);
    if window.nodes().len() < MIN_NODES {
        return Err(ModelError::calibration(
            model,
            entity,
            format!(
                "need at least {MIN_NODES} curve nodes within {horizon_days} days, got {}",
                window.nodes().len()
            ),
        ));
    }
    if window.len() < MIN_SNAPSHOTS {
        return Err(ModelError::insufficient_data(entity, MIN_SNAPSHOTS, window.len()));
    }
    Ok(window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use prepay_core::Date;

    fn flat_history(n: usize, nodes: Vec<i64>, level: f64) -> CurveHistory {
        let start = Date::from_ymd(2024, 1, 5).unwrap();
        let dates = (0..n).map(|i| start.add_days(7 * i as i64)).collect();
        let rows = (0..n)
            .map(|i| vec![level + 0.0005 * ((i % 3) as f64); nodes.len()])
            .collect();
        CurveHistory::new(dates, nodes, rows).unwrap()
    }

    #[test]
    fn test_forward_column() {
        assert_eq!(forward_column(7.0 / 365.0, 400), 6);
        assert_eq!(forward_column(0.0, 400), 0);
        assert_eq!(forward_column(1.0, 10), 9);
        assert_eq!(forward_column(1.0, 0), 0);
    }

    #[test]
    fn test_transition_moments_limits() {
        // Flat forwards and λ = 0: the mean relaxes towards the forward
        // plus the convexity term.
        let (m, v) = transition_moments(0.5, 0.01, 0.0, 0.08, 0.08, 0.08, 1.0 / 52.0);
        let one = 1.0 - (-0.5_f64 / 52.0).exp();
        assert_relative_eq!(m, 0.08 + 0.0001 / 0.5 * one * one, epsilon = 1e-15);
        assert_relative_eq!(
            v,
            0.0001 / 1.0 * (1.0 - (-1.0_f64 / 52.0).exp()),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_nll_guards() {
        let h = flat_history(6, vec![1, 7, 30], 0.09);
        let f = h.forward_curves().unwrap();
        let r = h.short_rate_series();
        let s = snapshot_steps(&h);
        assert!(negative_log_likelihood(&[0.0, 0.01, 0.0], &r, &f, &s).is_infinite());
        assert!(negative_log_likelihood(&[0.1, 0.0, 0.0], &r, &f, &s).is_infinite());
        assert!(negative_log_likelihood(&[0.1, 0.01, 0.0], &r[..2], &f, &s).is_infinite());
        assert!(negative_log_likelihood(&[0.1, 0.01, 0.0], &r, &f, &s).is_finite());
    }

    #[test]
    fn test_snapshot_steps_floor_at_one_day() {
        let d0 = Date::from_ymd(2024, 1, 1).unwrap();
        let h = CurveHistory::new(
            vec![d0, d0.add_days(1), d0.add_days(8)],
            vec![1, 30],
            vec![vec![0.1, 0.1]; 3],
        )
        .unwrap();
        let s = snapshot_steps(&h);
        assert_relative_eq!(s[0], 1.0 / 365.0, epsilon = 1e-15);
        assert_relative_eq!(s[1], 7.0 / 365.0, epsilon = 1e-15);
    }

    #[test]
    fn test_calibration_window_errors() {
        let h = flat_history(6, vec![1, 30, 365], 0.09);
        let cutoff = Date::from_ymd(2024, 12, 31).unwrap();

        let too_long = calibration_window(&h, cutoff, 400, "C-1");
        assert!(matches!(too_long, Err(ModelError::Calibration { .. })));

        let one_node = calibration_window(&h, cutoff, 10, "C-1");
        assert!(matches!(one_node, Err(ModelError::Calibration { .. })));

        let early = calibration_window(&h, Date::from_ymd(2024, 1, 20).unwrap(), 60, "C-1");
        assert!(matches!(early, Err(ModelError::InsufficientData { required: 5, .. })));

        let ok = calibration_window(&h, cutoff, 60, "C-1").unwrap();
        assert_eq!(ok.nodes(), &[1, 30]);
        assert_eq!(ok.len(), 6);
    }

    #[test]
    fn test_drift_grid_flat_curve() {
        let times = daily_grid(30);
        let fwd = ForwardCurve::from_effective_annual(&[1.0 / 365.0, 1.0], &[0.1, 0.1]).unwrap();
        let (a, sigma) = (0.2, 0.01);
        let theta = drift_grid(a, sigma, 0.0, &fwd, &times).unwrap();
        let f = 1.1_f64.ln();
        for (t, th) in times.iter().zip(&theta) {
            let expected = a * f + sigma * sigma / (2.0 * a) * (1.0 - (-2.0 * a * t).exp());
            assert_relative_eq!(*th, expected, epsilon = 1e-12);
        }
    }
}
