//! The six regulatory yield-curve stress scenarios.
//!
//! Every stressed curve is derived from one base curve per currency. The base
//! curve is first extended with daily nodes up to
//! [`EXTENSION_HORIZON_DAYS`] by repeating its last rate. Shocks are then
//! added to the effective-annual rates and the result is converted to short
//! rates.
//!
//! With `t` the tenor in years and `x` the decay constant:
//!
//! | Scenario       | EA shock             |
//! |----------------|----------------------|
//! | Parallel up    | `+S0`                |
//! | Parallel down  | `-S0`                |
//! | Steepening     | `+(long - short)`    |
//! | Flattening     | `-(long - short)`    |
//! | Short-end up   | `+short`             |
//! | Short-end down | `-short`             |
//!
//! where `short = S1·exp(-t/x)` and `long = S1·(1 - exp(-t/x))`.

use std::fmt;
use std::str::FromStr;

use prepay_core::{Currency, PrepayError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::discount::{CurveNode, DiscountCurve, DAYS_PER_YEAR};
use crate::error::{CurveError, CurveResult};

/// Stressed curves are extended to this many days.
pub const EXTENSION_HORIZON_DAYS: i64 = 12_000;

/// Decay constant of the short/long shock kernel, in years.
pub const DECAY_YEARS: f64 = 4.0;

/// A yield-curve stress scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StressScenario {
    /// Parallel shift up.
    ParallelUp,
    /// Parallel shift down.
    ParallelDown,
    /// Long end up, short end down.
    Steepening,
    /// Short end up, long end down.
    Flattening,
    /// Short end up.
    ShortUp,
    /// Short end down.
    ShortDown,
}

impl StressScenario {
    /// All scenarios in reporting order.
    pub const ALL: [StressScenario; 6] = [
        StressScenario::ParallelUp,
        StressScenario::ParallelDown,
        StressScenario::Steepening,
        StressScenario::Flattening,
        StressScenario::ShortUp,
        StressScenario::ShortDown,
    ];

    /// Column label used in reports.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            StressScenario::ParallelUp => "parallel_up",
            StressScenario::ParallelDown => "parallel_down",
            StressScenario::Steepening => "steepening",
            StressScenario::Flattening => "flattening",
            StressScenario::ShortUp => "short_up",
            StressScenario::ShortDown => "short_down",
        }
    }

    /// EA shock at `tenor` years under `params`.
    #[must_use]
    pub fn shock(&self, tenor: f64, params: &StressParameters) -> f64 {
        let decay = (-tenor / params.decay_years).exp();
        let short = params.s1 * decay;
        let long = params.s1 * (1.0 - decay);
        match self {
            StressScenario::ParallelUp => params.s0,
            StressScenario::ParallelDown => -params.s0,
            StressScenario::Steepening => long - short,
            StressScenario::Flattening => -(long - short),
            StressScenario::ShortUp => short,
            StressScenario::ShortDown => -short,
        }
    }
}

impl fmt::Display for StressScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for StressScenario {
    type Err = PrepayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        StressScenario::ALL
            .into_iter()
            .find(|sc| sc.label() == key)
            .ok_or_else(|| PrepayError::unknown_variant("stress scenario", s))
    }
}

/// Currency-specific shock sizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressParameters {
    /// Parallel shift size.
    pub s0: f64,
    /// Amplitude of the short/long kernel.
    pub s1: f64,
    /// Decay constant in years.
    pub decay_years: f64,
}

impl StressParameters {
    /// Regulatory parameters for a currency.
    #[must_use]
    pub fn for_currency(currency: Currency) -> Self {
        let (s0, s1) = match currency {
            Currency::COP => (0.04, 0.05),
            Currency::USD => (0.035, 0.045),
            Currency::UVR => (0.03, 0.04),
        };
        Self {
            s0,
            s1,
            decay_years: DECAY_YEARS,
        }
    }
}

/// Extends `curve` with daily nodes after its last node up to `horizon_days`,
/// repeating the last EA rate.
#[must_use]
pub fn extend_curve(curve: &DiscountCurve, horizon_days: i64) -> Vec<CurveNode> {
    let last = *curve.last_node();
    let mut nodes = curve.nodes().to_vec();
    if last.days < horizon_days {
        nodes.reserve((horizon_days - last.days) as usize);
        nodes.extend(((last.days + 1)..=horizon_days).map(|d| CurveNode {
            days: d,
            tenor: d as f64 / DAYS_PER_YEAR,
            rate_ea: last.rate_ea,
            rate: last.rate,
        }));
    }
    nodes
}

/// The six stressed curves derived from one base curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressedCurveSet {
    currency: Currency,
    parameters: StressParameters,
    curves: Vec<(StressScenario, DiscountCurve)>,
}

impl StressedCurveSet {
    /// Builds all six stressed curves with the currency's parameters.
    ///
    /// # Errors
    ///
    /// Propagates curve construction failures.
    pub fn build(base: &DiscountCurve) -> CurveResult<Self> {
        Self::with_parameters(base, StressParameters::for_currency(base.currency()))
    }

    /// Builds all six stressed curves with explicit parameters.
    ///
    /// # Errors
    ///
    /// Propagates curve construction failures.
    pub fn with_parameters(base: &DiscountCurve, parameters: StressParameters) -> CurveResult<Self> {
        let extended = extend_curve(base, EXTENSION_HORIZON_DAYS);
        let curves = StressScenario::ALL
            .into_iter()
            .map(|scenario| {
                let nodes = extended
                    .iter()
                    .map(|n| {
                        CurveNode::from_effective_annual(
                            n.days,
                            n.tenor,
                            n.rate_ea + scenario.shock(n.tenor, &parameters),
                        )
                    })
                    .collect();
                DiscountCurve::from_nodes(base.currency(), nodes).map(|c| (scenario, c))
            })
            .collect::<CurveResult<Vec<_>>>()?;

        debug!(
            currency = %base.currency(),
            nodes = extended.len(),
            "built stressed curve set"
        );

        Ok(Self {
            currency: base.currency(),
            parameters,
            curves,
        })
    }

    /// Currency of the set.
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Shock parameters used.
    #[must_use]
    pub fn parameters(&self) -> &StressParameters {
        &self.parameters
    }

    /// Stressed curve for `scenario`.
    ///
    /// # Errors
    ///
    /// Never fails for a set built by [`StressedCurveSet::build`].
    pub fn get(&self, scenario: StressScenario) -> CurveResult<&DiscountCurve> {
        self.curves
            .iter()
            .find(|(s, _)| *s == scenario)
            .map(|(_, c)| c)
            .ok_or_else(|| CurveError::invalid_input(format!("no curve for scenario {scenario}")))
    }

    /// Iterates `(scenario, curve)` pairs in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = (StressScenario, &DiscountCurve)> {
        self.curves.iter().map(|(s, c)| (*s, c))
    }
}
