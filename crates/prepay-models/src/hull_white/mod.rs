//! One-factor Hull-White short-rate model.
//!
//! ```text
//! dr = (θ(t) - a·r)dt + σ dW
//! ```
//!
//! `(a, σ, λ)` are fitted per credit by maximum likelihood on the curve
//! snapshot history up to the cut-off, restricted to nodes within the
//! credit's horizon. `θ(t)` is then built on a daily grid from the forward
//! curve of the cut-off snapshot so that simulated rates reproduce it.

pub mod calibration;
pub mod simulation;

use std::sync::Arc;

use prepay_core::Date;
use prepay_curves::discount::DAYS_PER_YEAR;
use prepay_curves::forward::{CurveHistory, ForwardCurve};
use prepay_math::optimization::OptimizationConfig;
use prepay_math::statistics::FitMetrics;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ModelError, ModelResult};
use crate::model::{
    CalibratedPair, CalibrationRequest, ModelKind, ModelParameters, RateModel, SimulationSpec,
    STRESS_FACTOR,
};
use crate::paths::{PathMatrix, Regime};
use crate::validation::hull_white_fit;

pub use calibration::{
    calibration_window, daily_grid, drift_grid, fit_history, forward_column, transition_moments,
    HullWhiteFit,
};
pub use simulation::{one_minus_exp, simulate_paths};

/// Calibrated Hull-White parameters with their drift grids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HullWhiteParameters {
    /// Mean-reversion speed.
    pub a: f64,
    /// Volatility.
    pub sigma: f64,
    /// Market price of risk.
    pub lambda: f64,
    /// Starting short rate.
    pub r0: f64,
    /// Cut-off date; time zero of simulated paths.
    pub anchor: Date,
    /// Daily grid in years.
    pub times: Vec<f64>,
    /// Drift on `times` built with the calibrated `σ`.
    pub theta_base: Vec<f64>,
    /// Drift on `times` built with `σ × 1.25`.
    pub theta_stressed: Vec<f64>,
    /// Whether the optimizer converged.
    pub converged: bool,
}

impl HullWhiteParameters {
    /// Builds parameters and both drift grids from a forward curve over
    /// `horizon_days`.
    ///
    /// # Errors
    ///
    /// Fails on non-positive `a` or negative `σ`.
    #[allow(clippy::too_many_arguments)]
    pub fn from_forward_curve(
        a: f64,
        sigma: f64,
        lambda: f64,
        r0: f64,
        forward: &ForwardCurve,
        horizon_days: i64,
        anchor: Date,
        converged: bool,
    ) -> ModelResult<Self> {
        if !(a > 0.0 && a.is_finite()) {
            return Err(ModelError::invalid_parameter("a", a));
        }
        if !(sigma >= 0.0 && sigma.is_finite()) {
            return Err(ModelError::invalid_parameter("sigma", sigma));
        }
        let times = daily_grid(horizon_days);
        let theta_base = drift_grid(a, sigma, lambda, forward, &times)?;
        let theta_stressed = drift_grid(a, sigma * STRESS_FACTOR, lambda, forward, &times)?;
        Ok(Self {
            a,
            sigma,
            lambda,
            r0,
            anchor,
            times,
            theta_base,
            theta_stressed,
            converged,
        })
    }

    /// Copy with `sigma × 1.25`; the drift grids are shared.
    #[must_use]
    pub fn stressed(&self) -> Self {
        Self {
            sigma: self.sigma * STRESS_FACTOR,
            ..self.clone()
        }
    }

    /// Drift grid used in `regime`.
    #[must_use]
    pub fn theta_for(&self, regime: Regime) -> &[f64] {
        match regime {
            Regime::Base => &self.theta_base,
            Regime::Stressed => &self.theta_stressed,
        }
    }

    /// Simulation horizon in days.
    #[must_use]
    pub fn horizon_days(&self) -> i64 {
        self.times
            .last()
            .map_or(0, |t| (t * DAYS_PER_YEAR).round() as i64)
    }
}

/// Hull-White model over a curve snapshot history.
#[derive(Debug, Clone)]
pub struct HullWhiteModel {
    curves: Arc<CurveHistory>,
    optimizer: OptimizationConfig,
}

impl HullWhiteModel {
    /// Creates the model.
    #[must_use]
    pub fn new(curves: Arc<CurveHistory>, optimizer: OptimizationConfig) -> Self {
        Self { curves, optimizer }
    }

    /// The curve history.
    #[must_use]
    pub fn curves(&self) -> &CurveHistory {
        &self.curves
    }

    /// Calibrates one credit with horizon `max(1, maturity - cutoff)` days.
    ///
    /// # Errors
    ///
    /// Fails when the horizon is not covered by the curve or the history
    /// before the cut-off is too short.
    pub fn calibrate_credit(
        &self,
        credit_id: &str,
        cutoff: Date,
        maturity: Date,
    ) -> ModelResult<HullWhiteParameters> {
        let horizon_days = (maturity - cutoff).max(1);
        let window = calibration_window(&self.curves, cutoff, horizon_days, credit_id)?;
        let fit = fit_history(&window, &self.optimizer, credit_id)?;

        let last = window.len() - 1;
        let forward = window.forward_curve(last)?;
        let r0 = window.short_rate(last)?;
        let params = HullWhiteParameters::from_forward_curve(
            fit.a,
            fit.sigma,
            fit.lambda,
            r0,
            &forward,
            horizon_days,
            cutoff,
            fit.converged,
        )?;
        info!(
            credit = credit_id,
            horizon_days,
            snapshots = window.len(),
            converged = fit.converged,
            "Hull-White calibration complete"
        );
        Ok(params)
    }
}

impl RateModel for HullWhiteModel {
    fn kind(&self) -> ModelKind {
        ModelKind::HullWhite
    }

    fn calibration_key(&self, request: &CalibrationRequest<'_>) -> String {
        request.credit_id.to_string()
    }

    fn calibrate(&self, request: &CalibrationRequest<'_>) -> ModelResult<CalibratedPair> {
        let base = self.calibrate_credit(request.credit_id, request.cutoff, request.maturity)?;
        Ok(CalibratedPair::from_base(ModelParameters::HullWhite(base)))
    }

    fn simulate(
        &self,
        parameters: &ModelParameters,
        regime: Regime,
        spec: &SimulationSpec,
    ) -> ModelResult<PathMatrix> {
        simulate_paths(parameters.as_hull_white()?, regime, spec.n_paths, spec.seed)
    }

    fn validate(
        &self,
        request: &CalibrationRequest<'_>,
        parameters: &ModelParameters,
    ) -> ModelResult<FitMetrics> {
        let params = parameters.as_hull_white()?;
        let window = self.curves.truncated(request.cutoff, self.curves.last_node());
        hull_white_fit(&window, params, request.credit_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn curves() -> Arc<CurveHistory> {
        let start = Date::from_ymd(2024, 1, 5).unwrap();
        let nodes = vec![1, 30, 90, 180, 365, 730];
        let dates = (0..20).map(|i| start.add_days(7 * i)).collect();
        let rows = (0..20)
            .map(|i| {
                let level = 9.0 + 0.15 * (i as f64 * 0.7).sin();
                nodes.iter().map(|&n| level + 0.4 * n as f64 / 730.0).collect()
            })
            .collect();
        Arc::new(CurveHistory::new(dates, nodes, rows).unwrap())
    }

    #[test]
    fn test_calibrate_credit() {
        let model = HullWhiteModel::new(curves(), OptimizationConfig::default());
        let cutoff = Date::from_ymd(2024, 5, 17).unwrap();
        let p = model
            .calibrate_credit("C-7", cutoff, cutoff.add_days(200))
            .unwrap();
        assert!(p.a > 0.0 && p.sigma > 0.0);
        assert_eq!(p.anchor, cutoff);
        assert_eq!(p.times.len(), 201);
        assert_eq!(p.horizon_days(), 200);
        assert_eq!(p.theta_base.len(), p.theta_stressed.len());

        let first = model.curves().rows()[model.curves().last_index_on_or_before(cutoff).unwrap()][0];
        assert_relative_eq!(p.r0, first.ln_1p(), epsilon = 1e-15);
    }

    #[test]
    fn test_horizon_beyond_curve() {
        let model = HullWhiteModel::new(curves(), OptimizationConfig::default());
        let cutoff = Date::from_ymd(2024, 5, 17).unwrap();
        let err = model.calibrate_credit("C-8", cutoff, cutoff.add_days(800));
        assert!(matches!(err, Err(ModelError::Calibration { .. })));
    }

    #[test]
    fn test_stressed_shares_drift_grids() {
        let fwd = ForwardCurve::from_effective_annual(&[1.0 / 365.0, 1.0], &[0.09, 0.10]).unwrap();
        let anchor = Date::from_ymd(2024, 5, 17).unwrap();
        let p = HullWhiteParameters::from_forward_curve(0.1, 0.01, 0.0, 0.086, &fwd, 30, anchor, true)
            .unwrap();
        let s = p.stressed();
        assert_eq!(s.sigma, p.sigma * 1.25);
        assert_eq!(s.theta_base, p.theta_base);
        assert_eq!(s.theta_stressed, p.theta_stressed);
        assert_eq!((s.a, s.lambda, s.r0), (p.a, p.lambda, p.r0));
        assert!(s.theta_for(Regime::Stressed)[30] > s.theta_for(Regime::Base)[30]);

        assert!(HullWhiteParameters::from_forward_curve(0.0, 0.01, 0.0, 0.0, &fwd, 30, anchor, true).is_err());
    }

    #[test]
    fn test_rate_model_contract() {
        let model = HullWhiteModel::new(curves(), OptimizationConfig::default());
        let cutoff = Date::from_ymd(2024, 5, 17).unwrap();
        let request = CalibrationRequest {
            credit_id: "C-7",
            category: prepay_core::ProductCategory::Comercial,
            cutoff,
            maturity: cutoff.add_days(60),
        };
        assert_eq!(model.calibration_key(&request), "C-7");
        let pair = model.calibrate(&request).unwrap();
        let spec = SimulationSpec {
            n_paths: 8,
            seed: 42,
            horizon_end: request.maturity,
        };
        let paths = model.simulate(&pair.stressed, Regime::Stressed, &spec).unwrap();
        assert_eq!(paths.n_steps(), 61);
        assert_eq!(paths.anchor(), cutoff);

        let fit = model.validate(&request, &pair.base).unwrap();
        assert_eq!(fit.n_observations, 19);
    }
}
