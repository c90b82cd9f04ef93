//! The pricing pipeline.
//!
//! For every credit the [`PipelineCoordinator`] runs:
//!
//! 1. contractual schedule generation
//! 2. calibration, memoized by the model's calibration key
//! 3. simulation in the base and stressed regimes
//! 4. prepayment detection on every path
//! 5. discounting under the base and six stressed curves
//!
//! A failing credit is reported and skipped; the others are unaffected.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use dashmap::DashMap;
use prepay_core::amortization::generate_schedule;
use prepay_core::{CashFlowSchedule, Credit, Currency, PrepayError};
use prepay_curves::discount::{DiscountCurve, RiskFreeTable};
use prepay_curves::forward::CurveHistory;
use prepay_math::statistics::FitMetrics;
use prepay_models::history::HistoricalRateSeries;
use prepay_models::hull_white::HullWhiteModel;
use prepay_models::model::{CalibratedPair, CalibrationRequest, ModelKind, RateModel, SimulationSpec};
use prepay_models::paths::Regime;
use prepay_models::vasicek::VasicekModel;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cache::{ScenarioCache, ScenarioKey};
use crate::config::PipelineConfig;
use crate::discount::{assign_bands, BandedCashFlow, CurrencyCurves};
use crate::error::{EngineError, EngineResult};
use crate::prepayment::PrepaymentEngine;
use crate::report::ValidationReport;
use crate::scenario::PrepaidCashFlowScenario;
use crate::sensitivity::CreditValuation;

/// Market inputs of a run.
#[derive(Debug, Clone, Default)]
pub struct MarketData {
    /// Weekly market rates by category; required by Vasicek.
    pub history: Option<HistoricalRateSeries>,
    /// Curve snapshots; required by Hull-White.
    pub curve_history: Option<CurveHistory>,
    /// Risk-free discount curves.
    pub risk_free: RiskFreeTable,
}

/// Calibrated parameters of one calibration key with their in-sample fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Category label or credit identifier.
    pub key: String,
    /// Base and stressed parameters.
    pub parameters: CalibratedPair,
    /// One-step-ahead fit, absent when too few observations remain.
    pub fit: Option<FitMetrics>,
}

/// Everything computed for one credit.
#[derive(Debug, Clone)]
pub struct CreditResult {
    /// Credit identifier.
    pub credit_id: String,
    /// Calibration the credit was simulated with.
    pub calibration: Calibration,
    /// Contractual schedule.
    pub schedule: CashFlowSchedule,
    /// Contractual flows on the band grid.
    pub bands: Vec<BandedCashFlow>,
    /// Triggered base-regime scenarios.
    pub base_scenarios: Arc<Vec<PrepaidCashFlowScenario>>,
    /// Triggered stressed-regime scenarios.
    pub stressed_scenarios: Arc<Vec<PrepaidCashFlowScenario>>,
    /// Present values and sensitivities.
    pub valuation: CreditValuation,
}

impl CreditResult {
    /// Triggered scenarios of a regime.
    #[must_use]
    pub fn scenarios(&self, regime: Regime) -> &[PrepaidCashFlowScenario] {
        match regime {
            Regime::Base => &self.base_scenarios,
            Regime::Stressed => &self.stressed_scenarios,
        }
    }
}

/// A credit that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditFailure {
    /// Credit identifier.
    pub credit_id: String,
    /// What went wrong.
    pub message: String,
}

/// Outcome of a run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Processed credits, in portfolio order.
    pub results: Vec<CreditResult>,
    /// Failed credits, in portfolio order.
    pub failures: Vec<CreditFailure>,
    /// Fit of the calibrated parameters.
    pub report: ValidationReport,
}

impl PipelineOutput {
    /// Number of processed credits.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.results.len()
    }

    /// Number of failed credits.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Result of one credit.
    #[must_use]
    pub fn result(&self, credit_id: &str) -> Option<&CreditResult> {
        self.results.iter().find(|r| r.credit_id == credit_id)
    }
}

/// Runs credits through calibration, simulation, prepayment and discounting.
pub struct PipelineCoordinator {
    config: PipelineConfig,
    model: Box<dyn RateModel>,
    curves: HashMap<Currency, CurrencyCurves>,
    calibrations: DashMap<String, Calibration>,
    cache: ScenarioCache,
}

impl PipelineCoordinator {
    /// Builds the model selected by `config` from the market data.
    ///
    /// # Errors
    ///
    /// Fails on an invalid configuration, when the market input the model
    /// needs is absent, or when a discount curve cannot be built.
    pub fn new(config: PipelineConfig, market: MarketData) -> EngineResult<Self> {
        config.ensure_valid()?;
        let optimizer = config.optimization();
        let model: Box<dyn RateModel> = match config.model {
            ModelKind::Vasicek => {
                let history = market
                    .history
                    .ok_or_else(|| EngineError::missing_input("historical rate series"))?;
                Box::new(VasicekModel::new(Arc::new(history), optimizer))
            }
            ModelKind::HullWhite => {
                let curves = market
                    .curve_history
                    .ok_or_else(|| EngineError::missing_input("curve history"))?;
                Box::new(HullWhiteModel::new(Arc::new(curves), optimizer))
            }
        };
        let curves = market
            .risk_free
            .currencies()
            .map(|c| market.risk_free.curve(c))
            .collect::<Result<Vec<_>, _>>()?;
        Self::with_model(config, model, curves)
    }

    /// Uses an already built model.
    ///
    /// # Errors
    ///
    /// Fails on an invalid configuration or if a stressed curve set cannot
    /// be derived.
    pub fn with_model(
        config: PipelineConfig,
        model: Box<dyn RateModel>,
        curves: impl IntoIterator<Item = DiscountCurve>,
    ) -> EngineResult<Self> {
        config.ensure_valid()?;
        let curves = curves
            .into_iter()
            .map(|c| CurrencyCurves::new(c).map(|cc| (cc.currency(), cc)))
            .collect::<EngineResult<HashMap<_, _>>>()?;
        debug!(
            model = %model.kind(),
            currencies = curves.len(),
            "pipeline coordinator ready"
        );
        Ok(Self {
            config,
            model,
            curves,
            calibrations: DashMap::new(),
            cache: ScenarioCache::new(),
        })
    }

    /// Run configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Model in use.
    #[must_use]
    pub fn model_kind(&self) -> ModelKind {
        self.model.kind()
    }

    /// Scenario cache.
    #[must_use]
    pub fn cache(&self) -> &ScenarioCache {
        &self.cache
    }

    /// Curves of a currency.
    #[must_use]
    pub fn curves(&self, currency: Currency) -> Option<&CurrencyCurves> {
        self.curves.get(&currency)
    }

    /// Seed of the credit at `position` in the portfolio.
    #[must_use]
    pub fn seed_for(&self, position: usize) -> u64 {
        self.config.seed.wrapping_add(position as u64)
    }

    fn request<'a>(&self, credit: &'a Credit) -> CalibrationRequest<'a> {
        CalibrationRequest {
            credit_id: &credit.id,
            category: credit.category,
            cutoff: self.config.cutoff,
            maturity: credit.maturity,
        }
    }

    /// Calibration of a credit, computed once per calibration key.
    ///
    /// # Errors
    ///
    /// Propagates calibration failures; they are not memoized.
    pub fn calibrate(&self, credit: &Credit) -> EngineResult<Calibration> {
        let request = self.request(credit);
        let key = self.model.calibration_key(&request);
        if let Some(found) = self.calibrations.get(&key) {
            return Ok(found.clone());
        }

        let parameters = self.model.calibrate(&request)?;
        if !parameters.base.converged() {
            warn!(
                credit_id = %credit.id,
                key = %key,
                "calibration did not converge, using initial guess"
            );
        }
        let fit = match self.model.validate(&request, &parameters.base) {
            Ok(metrics) => Some(metrics),
            Err(e) => {
                warn!(key = %key, error = %e, "fit validation skipped");
                None
            }
        };
        let calibration = Calibration {
            key: key.clone(),
            parameters,
            fit,
        };
        self.calibrations.insert(key, calibration.clone());
        Ok(calibration)
    }

    /// Processes one credit; `position` selects its seed.
    ///
    /// # Errors
    ///
    /// Fails if the credit is invalid, its currency has no curve, or its
    /// calibration or simulation fails.
    pub fn process_credit(&self, credit: &Credit, position: usize) -> EngineResult<CreditResult> {
        let cutoff = self.config.cutoff;
        let schedule = generate_schedule(credit)?;
        let curves = self
            .curves
            .get(&credit.currency)
            .ok_or_else(|| EngineError::missing_curve(credit.currency))?;
        let calibration = self.calibrate(credit)?;

        self.cache.invalidate_credit(&credit.id);
        let spec = SimulationSpec {
            n_paths: self.config.simulations,
            seed: self.seed_for(position),
            horizon_end: credit.maturity,
        };
        let engine = PrepaymentEngine::new(cutoff, self.config.differential(), self.config.interpolation);

        let simulate = |regime: Regime| -> EngineResult<Arc<Vec<PrepaidCashFlowScenario>>> {
            let paths = self
                .model
                .simulate(calibration.parameters.for_regime(regime), regime, &spec)?;
            let scenarios = engine.scenarios(credit, &schedule, &paths, regime)?;
            Ok(self.cache.insert(ScenarioKey::new(&credit.id, regime), scenarios))
        };
        let base_scenarios = simulate(Regime::Base)?;
        let stressed_scenarios = simulate(Regime::Stressed)?;

        let valuation = CreditValuation::value(
            &credit.id,
            cutoff,
            &base_scenarios,
            &stressed_scenarios,
            curves,
        )?;
        debug!(
            credit_id = %credit.id,
            base_pv = valuation.base_pv,
            triggered = base_scenarios.len(),
            "credit processed"
        );

        Ok(CreditResult {
            credit_id: credit.id.clone(),
            calibration,
            bands: assign_bands(&schedule, cutoff),
            schedule,
            base_scenarios,
            stressed_scenarios,
            valuation,
        })
    }

    /// Processes a portfolio.
    ///
    /// # Errors
    ///
    /// Fails before computing anything if the portfolio is empty or has
    /// repeated identifiers. Individual credit failures are reported in the
    /// output instead.
    pub fn run(&self, credits: &[Credit]) -> EngineResult<PipelineOutput> {
        check_portfolio(credits)?;
        info!(
            credits = credits.len(),
            model = %self.model.kind(),
            simulations = self.config.simulations,
            cutoff = %self.config.cutoff,
            "starting pipeline run"
        );

        let mut results = Vec::with_capacity(credits.len());
        let mut failures = Vec::new();
        for (credit, outcome) in credits.iter().zip(self.process_all(credits)) {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!(credit_id = %credit.id, error = %e, "credit failed");
                    failures.push(CreditFailure {
                        credit_id: credit.id.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        let mut report = ValidationReport::new(self.model.kind());
        for r in &results {
            if let Some(metrics) = r.calibration.fit {
                report.record(&r.credit_id, &r.calibration.key, metrics);
            }
        }

        info!(
            succeeded = results.len(),
            failed = failures.len(),
            "pipeline run complete"
        );
        Ok(PipelineOutput {
            results,
            failures,
            report,
        })
    }

    #[cfg(feature = "parallel")]
    fn process_all(&self, credits: &[Credit]) -> Vec<EngineResult<CreditResult>> {
        use rayon::prelude::*;
        credits
            .par_iter()
            .enumerate()
            .map(|(i, c)| self.process_credit(c, i))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn process_all(&self, credits: &[Credit]) -> Vec<EngineResult<CreditResult>> {
        credits
            .iter()
            .enumerate()
            .map(|(i, c)| self.process_credit(c, i))
            .collect()
    }
}

fn check_portfolio(credits: &[Credit]) -> EngineResult<()> {
    if credits.is_empty() {
        return Err(PrepayError::input_validation("credits", "portfolio is empty").into());
    }
    let mut seen = HashSet::with_capacity(credits.len());
    for credit in credits {
        if !seen.insert(credit.id.as_str()) {
            return Err(PrepayError::input_validation(
                "id",
                format!("credit {} appears more than once", credit.id),
            )
            .into());
        }
    }
    Ok(())
}
