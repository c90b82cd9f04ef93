//! Present values under the base and stressed curves, and their deltas.

use prepay_core::{Currency, Date};
use prepay_curves::stress::StressScenario;
use serde::{Deserialize, Serialize};

use crate::discount::{mean_present_value, CurrencyCurves};
use crate::error::EngineResult;
use crate::scenario::PrepaidCashFlowScenario;

/// Present value of one stress scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioValue {
    /// Stress scenario.
    pub scenario: StressScenario,
    /// Mean present value of the stressed-regime scenarios on the stressed curve.
    pub present_value: f64,
    /// `present_value - base_pv`.
    pub delta: f64,
}

/// Present values of one credit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditValuation {
    /// Credit identifier.
    pub credit_id: String,
    /// Currency of the curves used.
    pub currency: Currency,
    /// Mean present value of the base-regime scenarios on the base curve.
    pub base_pv: f64,
    /// Triggered base-regime paths.
    pub base_paths: usize,
    /// Triggered stressed-regime paths.
    pub stressed_paths: usize,
    /// One entry per stress scenario, in reporting order.
    pub scenarios: Vec<ScenarioValue>,
}

impl CreditValuation {
    /// Values a credit's triggered scenarios.
    ///
    /// # Errors
    ///
    /// Fails if a stressed curve is missing from `curves`.
    pub fn value(
        credit_id: &str,
        cutoff: Date,
        base: &[PrepaidCashFlowScenario],
        stressed: &[PrepaidCashFlowScenario],
        curves: &CurrencyCurves,
    ) -> EngineResult<Self> {
        let base_pv = mean_present_value(base, cutoff, curves.base());
        let scenarios = StressScenario::ALL
            .into_iter()
            .map(|scenario| {
                let present_value = mean_present_value(stressed, cutoff, curves.scenario(scenario)?);
                Ok(ScenarioValue {
                    scenario,
                    present_value,
                    delta: present_value - base_pv,
                })
            })
            .collect::<EngineResult<Vec<_>>>()?;

        Ok(Self {
            credit_id: credit_id.to_string(),
            currency: curves.currency(),
            base_pv,
            base_paths: base.len(),
            stressed_paths: stressed.len(),
            scenarios,
        })
    }

    /// Value of one scenario.
    #[must_use]
    pub fn scenario(&self, scenario: StressScenario) -> Option<&ScenarioValue> {
        self.scenarios.iter().find(|v| v.scenario == scenario)
    }

    /// Sensitivity of one scenario.
    #[must_use]
    pub fn delta(&self, scenario: StressScenario) -> Option<f64> {
        self.scenario(scenario).map(|v| v.delta)
    }
}
