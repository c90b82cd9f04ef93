//! Normative discounting of cash flows.
//!
//! Every flow on or after the cut-off gets a node (calendar days from the
//! cut-off) and the band time factor `t_k` of that node. Its present value is
//! `flow × exp(-r·t_k)` with `r` the curve's short rate at the node.

use prepay_core::bands::{band_for_days, time_band_factor};
use prepay_core::{CashFlowSchedule, Currency, Date};
use prepay_curves::discount::DiscountCurve;
use prepay_curves::stress::{StressScenario, StressedCurveSet};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::EngineResult;
use crate::scenario::PrepaidCashFlowScenario;

/// A cash flow placed on the normative band grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandedCashFlow {
    /// Payment date.
    pub payment_date: Date,
    /// Calendar days from the cut-off.
    pub node_days: i64,
    /// Normative band number, `None` beyond the last band.
    pub band: Option<u8>,
    /// Band time factor in years.
    pub t_k: f64,
    /// Flow amount (principal plus interest).
    pub flow: f64,
}

/// Places every row of `schedule` on the band grid relative to `cutoff`.
#[must_use]
pub fn assign_bands(schedule: &CashFlowSchedule, cutoff: Date) -> Vec<BandedCashFlow> {
    schedule
        .iter()
        .map(|row| {
            let node_days = cutoff.days_between(&row.payment_date);
            BandedCashFlow {
                payment_date: row.payment_date,
                node_days,
                band: band_for_days(node_days),
                t_k: time_band_factor(node_days),
                flow: row.total,
            }
        })
        .collect()
}

/// Present value at `cutoff` of the flows of `schedule` dated on or after it.
///
/// Zero flows and zero time factors contribute nothing. A node without a
/// usable curve rate contributes nothing and is logged.
#[must_use]
pub fn present_value(schedule: &CashFlowSchedule, cutoff: Date, curve: &DiscountCurve) -> f64 {
    assign_bands(schedule, cutoff)
        .into_iter()
        .filter(|f| f.node_days >= 0 && f.flow != 0.0 && f.t_k != 0.0)
        .map(|f| match curve.discount_factor(f.node_days, f.t_k) {
            Some(df) => f.flow * df,
            None => {
                warn!(
                    currency = %curve.currency(),
                    node = f.node_days,
                    "no usable curve rate, flow skipped"
                );
                0.0
            }
        })
        .sum()
}

/// Mean present value over triggered scenarios, or zero when there are none.
#[must_use]
pub fn mean_present_value(
    scenarios: &[PrepaidCashFlowScenario],
    cutoff: Date,
    curve: &DiscountCurve,
) -> f64 {
    if scenarios.is_empty() {
        return 0.0;
    }
    let total: f64 = scenarios
        .iter()
        .map(|s| present_value(&s.schedule, cutoff, curve))
        .sum();
    total / scenarios.len() as f64
}

/// The base curve of a currency with its six stressed variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyCurves {
    base: DiscountCurve,
    stressed: StressedCurveSet,
}

impl CurrencyCurves {
    /// Derives the stressed set from `base`.
    ///
    /// # Errors
    ///
    /// Propagates stressed curve construction failures.
    pub fn new(base: DiscountCurve) -> EngineResult<Self> {
        let stressed = StressedCurveSet::build(&base)?;
        Ok(Self { base, stressed })
    }

    /// Currency of the curves.
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.base.currency()
    }

    /// Base curve.
    #[must_use]
    pub fn base(&self) -> &DiscountCurve {
        &self.base
    }

    /// Stressed curves.
    #[must_use]
    pub fn stressed(&self) -> &StressedCurveSet {
        &self.stressed
    }

    /// Stressed curve of one scenario.
    ///
    /// # Errors
    ///
    /// Never fails for curves built by [`CurrencyCurves::new`].
    pub fn scenario(&self, scenario: StressScenario) -> EngineResult<&DiscountCurve> {
        Ok(self.stressed.get(scenario)?)
    }
}
