//! Vasicek (Ornstein-Uhlenbeck) short-rate model.
//!
//! ```text
//! dr = κ(θ - r)dt + σ dW
//! ```
//!
//! Parameters are fitted per product category on the weekly market-rate
//! history up to the effective cut-off (the last history date on or before
//! the valuation cut-off). Paths start from that category's rate on the
//! effective cut-off.

pub mod calibration;
pub mod simulation;

use std::collections::BTreeMap;
use std::sync::Arc;

use prepay_core::{Date, ProductCategory};
use prepay_curves::conversion::ea_to_short;
use prepay_math::optimization::OptimizationConfig;
use prepay_math::statistics::FitMetrics;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ModelError, ModelResult};
use crate::history::HistoricalRateSeries;
use crate::model::{
    CalibratedPair, CalibrationRequest, ModelKind, ModelParameters, RateModel, SimulationSpec,
    STRESS_FACTOR,
};
use crate::paths::{PathMatrix, Regime};
use crate::validation::vasicek_fit;

pub use calibration::{fit_short_rates, VasicekFit, WEEKLY_DT};
pub use simulation::{simulate_paths, weeks_to};

/// Calibrated Vasicek parameters in short-rate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VasicekParameters {
    /// Mean-reversion speed.
    pub kappa: f64,
    /// Long-run level.
    pub theta: f64,
    /// Volatility.
    pub sigma: f64,
    /// Starting short rate, `ln(1 + EA)` at the effective cut-off.
    pub r0: f64,
    /// Effective cut-off date; time zero of simulated paths.
    pub anchor: Date,
    /// Whether the optimizer converged.
    pub converged: bool,
}

impl VasicekParameters {
    /// Copy with `sigma × 1.25`.
    #[must_use]
    pub fn stressed(&self) -> Self {
        Self {
            sigma: self.sigma * STRESS_FACTOR,
            ..*self
        }
    }

    /// One-step-ahead conditional mean after `dt` years.
    #[must_use]
    pub fn conditional_mean(&self, r: f64, dt: f64) -> f64 {
        self.theta + (r - self.theta) * (-self.kappa * dt).exp()
    }

    /// Conditional variance after `dt` years.
    #[must_use]
    pub fn conditional_variance(&self, dt: f64) -> f64 {
        self.sigma * self.sigma / (2.0 * self.kappa) * (1.0 - (-2.0 * self.kappa * dt).exp())
    }
}

/// Vasicek model over a market-rate history.
#[derive(Debug, Clone)]
pub struct VasicekModel {
    history: Arc<HistoricalRateSeries>,
    optimizer: OptimizationConfig,
}

impl VasicekModel {
    /// Creates the model.
    #[must_use]
    pub fn new(history: Arc<HistoricalRateSeries>, optimizer: OptimizationConfig) -> Self {
        Self { history, optimizer }
    }

    /// The market-rate history.
    #[must_use]
    pub fn history(&self) -> &HistoricalRateSeries {
        &self.history
    }

    fn effective_cutoff(&self, cutoff: Date) -> ModelResult<Date> {
        self.history.effective_cutoff(cutoff).ok_or_else(|| {
            ModelError::calibration(
                ModelKind::Vasicek.name(),
                cutoff.to_string(),
                "cut-off precedes every historical observation",
            )
        })
    }

    /// Short-rate series of a category up to the effective cut-off.
    fn short_rates(&self, category: ProductCategory, anchor: Date) -> Vec<f64> {
        self.history
            .observations(category, Some(anchor))
            .into_iter()
            .map(|(_, ea)| ea_to_short(ea))
            .collect()
    }

    /// Calibrates one category.
    ///
    /// # Errors
    ///
    /// Fails if the cut-off precedes the history or fewer than three
    /// observations are available.
    pub fn calibrate_category(
        &self,
        category: ProductCategory,
        cutoff: Date,
    ) -> ModelResult<CalibratedPair> {
        let anchor = self.effective_cutoff(cutoff)?;
        let rates = self.short_rates(category, anchor);
        let fit = fit_short_rates(&rates, &self.optimizer, category.label())?;

        // Non-empty: the fit needs at least three observations.
        let r0 = rates[rates.len() - 1];
        let base = VasicekParameters {
            kappa: fit.kappa,
            theta: fit.theta,
            sigma: fit.sigma,
            r0,
            anchor,
            converged: fit.converged,
        };
        Ok(CalibratedPair::from_base(ModelParameters::Vasicek(base)))
    }

    /// Calibrates every category present in the history.
    ///
    /// Categories that cannot be calibrated are logged and skipped.
    ///
    /// # Errors
    ///
    /// Fails only if no category could be calibrated.
    pub fn calibrate_all(
        &self,
        cutoff: Date,
    ) -> ModelResult<BTreeMap<ProductCategory, CalibratedPair>> {
        let mut out = BTreeMap::new();
        for category in self.history.categories() {
            match self.calibrate_category(category, cutoff) {
                Ok(pair) => {
                    out.insert(category, pair);
                }
                Err(e) => warn!(category = %category, error = %e, "skipping category"),
            }
        }
        if out.is_empty() {
            return Err(ModelError::calibration(
                ModelKind::Vasicek.name(),
                "all categories",
                "no category could be calibrated",
            ));
        }
        info!(categories = out.len(), "Vasicek calibration complete");
        Ok(out)
    }
}

impl RateModel for VasicekModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Vasicek
    }

    fn calibration_key(&self, request: &CalibrationRequest<'_>) -> String {
        request.category.label().to_string()
    }

    fn calibrate(&self, request: &CalibrationRequest<'_>) -> ModelResult<CalibratedPair> {
        self.calibrate_category(request.category, request.cutoff)
    }

    fn simulate(
        &self,
        parameters: &ModelParameters,
        _regime: Regime,
        spec: &SimulationSpec,
    ) -> ModelResult<PathMatrix> {
        let params = parameters.as_vasicek()?;
        simulate_paths(
            params,
            weeks_to(params.anchor, spec.horizon_end),
            spec.n_paths,
            spec.seed,
        )
    }

    fn validate(
        &self,
        request: &CalibrationRequest<'_>,
        parameters: &ModelParameters,
    ) -> ModelResult<FitMetrics> {
        let params = parameters.as_vasicek()?;
        let rates = self.short_rates(request.category, params.anchor);
        vasicek_fit(&rates, params, request.category.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn history() -> Arc<HistoricalRateSeries> {
        let start = Date::from_ymd(2024, 1, 5).unwrap();
        let dates: Vec<Date> = (0..30).map(|i| start.add_days(7 * i)).collect();
        let consumo: Vec<f64> = (0..30)
            .map(|i| 0.20 + 0.01 * (i as f64 * 0.9).sin())
            .collect();
        let mut vivienda = vec![f64::NAN; 30];
        vivienda[0] = 0.11;
        vivienda[1] = 0.12;
        Arc::new(
            HistoricalRateSeries::new(dates)
                .unwrap()
                .with_category(ProductCategory::Consumo, consumo)
                .unwrap()
                .with_category(ProductCategory::Vivienda, vivienda)
                .unwrap(),
        )
    }

    #[test]
    fn test_calibrate_category_anchors_at_effective_cutoff() {
        let model = VasicekModel::new(history(), OptimizationConfig::default());
        let cutoff = Date::from_ymd(2024, 3, 3).unwrap();
        let pair = model.calibrate_category(ProductCategory::Consumo, cutoff).unwrap();
        let p = pair.base.as_vasicek().unwrap();

        // 2024-03-01 is the last weekly date on or before the cut-off.
        assert_eq!(p.anchor, Date::from_ymd(2024, 3, 1).unwrap());
        assert_relative_eq!(
            p.r0,
            (0.20 + 0.01 * (8.0_f64 * 0.9).sin()).ln_1p(),
            epsilon = 1e-15
        );
        assert_eq!(pair.stressed.sigma(), p.sigma * 1.25);
    }

    #[test]
    fn test_calibrate_all_skips_short_categories() {
        let model = VasicekModel::new(history(), OptimizationConfig::default());
        let all = model
            .calibrate_all(Date::from_ymd(2024, 12, 31).unwrap())
            .unwrap();
        assert!(all.contains_key(&ProductCategory::Consumo));
        assert!(!all.contains_key(&ProductCategory::Vivienda));

        let err = model.calibrate_category(ProductCategory::Vivienda, Date::from_ymd(2024, 12, 31).unwrap());
        assert!(matches!(err, Err(ModelError::InsufficientData { .. })));
    }

    #[test]
    fn test_cutoff_before_history() {
        let model = VasicekModel::new(history(), OptimizationConfig::default());
        let err = model.calibrate_all(Date::from_ymd(2020, 1, 1).unwrap());
        assert!(err.is_err());
    }

    #[test]
    fn test_rate_model_contract() {
        let model = VasicekModel::new(history(), OptimizationConfig::default());
        let cutoff = Date::from_ymd(2024, 6, 28).unwrap();
        let request = CalibrationRequest {
            credit_id: "C-1",
            category: ProductCategory::Consumo,
            cutoff,
            maturity: cutoff.add_days(90),
        };
        assert_eq!(model.calibration_key(&request), "Consumo");

        let pair = model.calibrate(&request).unwrap();
        let spec = SimulationSpec {
            n_paths: 16,
            seed: 42,
            horizon_end: request.maturity,
        };
        let paths = model.simulate(&pair.stressed, Regime::Stressed, &spec).unwrap();
        assert_eq!(paths.n_paths(), 16);
        assert_eq!(paths.n_steps(), 14);

        let fit = model.validate(&request, &pair.base).unwrap();
        assert!(fit.rmse.is_finite());
    }
}
