//! Goodness-of-fit statistics for one-step-ahead predictions.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::error::{MathError, MathResult};

/// Total sum of squares below which R² is reported as 0.
const MIN_TOTAL_VARIANCE: f64 = 1e-12;

/// Fit of a prediction series against observations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitMetrics {
    /// Coefficient of determination `1 − SS_res/SS_tot`.
    pub r_squared: f64,
    /// Root mean squared error.
    pub rmse: f64,
    /// Mean absolute error.
    pub mae: f64,
    /// Pearson correlation between predictions and observations.
    pub correlation: f64,
    /// Mean of `predicted − observed`.
    pub bias: f64,
    /// Mean absolute percentage error; absent when any observation is zero.
    pub mape: Option<f64>,
    /// Number of compared pairs.
    pub n_observations: usize,
}

impl FitMetrics {
    /// Computes the metrics for aligned `observed` and `predicted` series.
    ///
    /// # Errors
    ///
    /// Fails on mismatched lengths or empty input.
    pub fn compute(observed: &[f64], predicted: &[f64]) -> MathResult<Self> {
        MathError::check_lengths(observed.len(), predicted.len())?;
        let n = observed.len();
        if n == 0 {
            return Err(MathError::insufficient_data(1, 0));
        }
        let nf = n as f64;

        let mean_obs = observed.iter().mean();
        let residuals: Vec<f64> = observed
            .iter()
            .zip(predicted)
            .map(|(o, p)| o - p)
            .collect();

        let ss_res: f64 = residuals.iter().map(|r| r * r).sum();
        let ss_tot: f64 = observed.iter().map(|o| (o - mean_obs).powi(2)).sum();
        let r_squared = if ss_tot > MIN_TOTAL_VARIANCE {
            1.0 - ss_res / ss_tot
        } else {
            0.0
        };

        let rmse = (ss_res / nf).sqrt();
        let mae = residuals.iter().map(|r| r.abs()).sum::<f64>() / nf;
        let bias = -residuals.iter().mean();

        let mape = if observed.iter().all(|&o| o != 0.0) {
            let total: f64 = residuals
                .iter()
                .zip(observed)
                .map(|(r, o)| (r / o).abs())
                .sum();
            Some(100.0 * total / nf)
        } else {
            None
        };

        Ok(Self {
            r_squared,
            rmse,
            mae,
            correlation: pearson(observed, predicted),
            bias,
            mape,
            n_observations: n,
        })
    }
}

/// Pearson correlation using population moments; 0 for fewer than two
/// points or when either series is constant.
#[must_use]
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return 0.0;
    }
    let (x, y) = (&x[..n], &y[..n]);
    let sx = x.iter().population_std_dev();
    let sy = y.iter().population_std_dev();
    if sx == 0.0 || sy == 0.0 || !sx.is_finite() || !sy.is_finite() {
        return 0.0;
    }
    let (mx, my) = (x.iter().mean(), y.iter().mean());
    let cov = x
        .iter()
        .zip(y)
        .map(|(a, b)| (a - mx) * (b - my))
        .sum::<f64>()
        / n as f64;
    cov / (sx * sy)
}

/// Population standard deviation (divides by `n`); 0 for empty input.
#[must_use]
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().population_std_dev()
    }
}

/// Arithmetic mean; NaN for empty input.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    values.iter().mean()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_perfect_fit() {
        let obs = [0.10, 0.11, 0.12, 0.115];
        let m = FitMetrics::compute(&obs, &obs).unwrap();
        assert_relative_eq!(m.r_squared, 1.0, epsilon = 1e-12);
        assert_eq!(m.rmse, 0.0);
        assert_eq!(m.mae, 0.0);
        assert_relative_eq!(m.correlation, 1.0, epsilon = 1e-12);
        assert_eq!(m.bias, 0.0);
        assert_eq!(m.mape, Some(0.0));
        assert_eq!(m.n_observations, 4);
    }

    #[test]
    fn test_constant_offset() {
        let obs = [1.0, 2.0, 3.0, 4.0];
        let pred = [1.5, 2.5, 3.5, 4.5];
        let m = FitMetrics::compute(&obs, &pred).unwrap();

        // SS_res = 1.0, SS_tot = 5.0
        assert_relative_eq!(m.r_squared, 0.8, epsilon = 1e-12);
        assert_relative_eq!(m.rmse, 0.5, epsilon = 1e-12);
        assert_relative_eq!(m.mae, 0.5, epsilon = 1e-12);
        assert_relative_eq!(m.bias, 0.5, epsilon = 1e-12);
        assert_relative_eq!(m.correlation, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_series() {
        let obs = [0.0, 0.0, 0.0];
        let pred = [0.1, 0.2, 0.3];
        let m = FitMetrics::compute(&obs, &pred).unwrap();
        assert_eq!(m.r_squared, 0.0);
        assert_eq!(m.correlation, 0.0);
        assert_eq!(m.mape, None);

        assert_eq!(pearson(&[1.0], &[2.0]), 0.0);
        assert!(FitMetrics::compute(&[], &[]).is_err());
    }

    #[test]
    fn test_population_std() {
        assert_relative_eq!(population_std(&[1.0, 3.0]), 1.0, epsilon = 1e-12);
        assert_eq!(population_std(&[]), 0.0);
    }
}
