//! Discount curves and the risk-free curve table.
//!
//! A [`DiscountCurve`] holds one currency's rates by day node. Rates are kept
//! in both representations: the effective-annual quote and the
//! continuously-compounded short rate used by the discount factor
//! `exp(-r * t_k)`.

use std::collections::BTreeMap;

use prepay_core::Currency;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::conversion::{ea_to_short, normalize_percent};
use crate::error::{CurveError, CurveResult};

/// Days per year used to express nodes as tenors.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// One node of a discount curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveNode {
    /// Calendar days from the reference date.
    pub days: i64,
    /// Tenor in years.
    pub tenor: f64,
    /// Effective-annual rate.
    pub rate_ea: f64,
    /// Continuously-compounded short rate, `ln(1 + rate_ea)`.
    pub rate: f64,
}

impl CurveNode {
    /// Builds a node from an effective-annual rate.
    #[must_use]
    pub fn from_effective_annual(days: i64, tenor: f64, rate_ea: f64) -> Self {
        Self {
            days,
            tenor,
            rate_ea,
            rate: ea_to_short(rate_ea),
        }
    }
}

/// Discount factor `exp(-rate * t_k)`.
#[must_use]
#[inline]
pub fn discount_factor(rate: f64, t_k: f64) -> f64 {
    (-rate * t_k).exp()
}

/// A per-currency discount curve indexed by day node.
///
/// # Example
///
/// ```rust
/// use prepay_core::Currency;
/// use prepay_curves::discount::DiscountCurve;
///
/// let curve = DiscountCurve::from_effective_annual(
///     Currency::COP,
///     &[1, 30, 90],
///     &[1.0 / 365.0, 30.0 / 365.0, 90.0 / 365.0],
///     &[0.09, 0.095, 0.10],
/// )
/// .unwrap();
///
/// // Exact node
/// assert!((curve.rate_at_node(30).unwrap() - 1.095_f64.ln()).abs() < 1e-12);
/// // Nearest node
/// assert!((curve.rate_at_node(80).unwrap() - 1.10_f64.ln()).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountCurve {
    currency: Currency,
    nodes: Vec<CurveNode>,
}

impl DiscountCurve {
    /// Builds a curve from aligned node, tenor and EA rate columns.
    ///
    /// Nodes with a missing (NaN) rate are dropped. Percentage quotes are
    /// normalized to decimals.
    ///
    /// # Errors
    ///
    /// Fails on mismatched lengths, non-increasing nodes, or when no node
    /// with a usable rate remains.
    pub fn from_effective_annual(
        currency: Currency,
        days: &[i64],
        tenors: &[f64],
        rates_ea: &[f64],
    ) -> CurveResult<Self> {
        if days.len() != tenors.len() || days.len() != rates_ea.len() {
            return Err(CurveError::invalid_input(format!(
                "curve columns differ in length: {} nodes, {} tenors, {} rates",
                days.len(),
                tenors.len(),
                rates_ea.len()
            )));
        }
        if let Some(i) = days.windows(2).position(|w| w[1] <= w[0]) {
            return Err(CurveError::non_monotonic(i + 1, days[i], days[i + 1]));
        }

        let mut rates = rates_ea.to_vec();
        normalize_percent(&mut rates);

        let nodes: Vec<CurveNode> = days
            .iter()
            .zip(tenors)
            .zip(&rates)
            .filter(|(_, r)| !r.is_nan())
            .map(|((&d, &t), &r)| CurveNode::from_effective_annual(d, t, r))
            .collect();

        Self::from_nodes(currency, nodes)
    }

    /// Builds a curve from ready-made nodes, assumed sorted by day.
    ///
    /// # Errors
    ///
    /// Fails when `nodes` is empty.
    pub fn from_nodes(currency: Currency, nodes: Vec<CurveNode>) -> CurveResult<Self> {
        if nodes.is_empty() {
            return Err(CurveError::empty_curve(format!("{currency} discount curve")));
        }
        Ok(Self { currency, nodes })
    }

    /// Currency of the curve.
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Curve nodes in ascending day order.
    #[must_use]
    pub fn nodes(&self) -> &[CurveNode] {
        &self.nodes
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`; construction rejects empty curves.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Last node of the curve.
    #[must_use]
    pub fn last_node(&self) -> &CurveNode {
        // Non-empty by construction.
        &self.nodes[self.nodes.len() - 1]
    }

    /// Node matching `days` exactly, or the closest node otherwise.
    ///
    /// Ties between two equally distant nodes resolve to the shorter one.
    #[must_use]
    pub fn node_at(&self, days: i64) -> &CurveNode {
        match self.nodes.binary_search_by_key(&days, |n| n.days) {
            Ok(i) => &self.nodes[i],
            Err(i) => {
                let idx = if i == 0 {
                    0
                } else if i == self.nodes.len() {
                    i - 1
                } else {
                    let below = days - self.nodes[i - 1].days;
                    let above = self.nodes[i].days - days;
                    if above < below {
                        i
                    } else {
                        i - 1
                    }
                };
                debug!(
                    currency = %self.currency,
                    requested = days,
                    used = self.nodes[idx].days,
                    "no exact curve node, using nearest"
                );
                &self.nodes[idx]
            }
        }
    }

    /// Short rate at `days`, by exact node match with nearest-node fallback.
    ///
    /// Returns `None` if the matched rate is not finite.
    #[must_use]
    pub fn rate_at_node(&self, days: i64) -> Option<f64> {
        let rate = self.node_at(days).rate;
        rate.is_finite().then_some(rate)
    }

    /// Discount factor for a flow at `days` using the band time factor `t_k`.
    #[must_use]
    pub fn discount_factor(&self, days: i64, t_k: f64) -> Option<f64> {
        self.rate_at_node(days).map(|r| discount_factor(r, t_k))
    }
}

/// The risk-free table: shared node and tenor columns with one EA rate
/// column per currency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskFreeTable {
    days: Vec<i64>,
    tenors: Vec<f64>,
    rates: BTreeMap<Currency, Vec<f64>>,
}

impl RiskFreeTable {
    /// Creates a table with the node and tenor columns.
    ///
    /// # Errors
    ///
    /// Fails if the columns are empty or differ in length.
    pub fn new(days: Vec<i64>, tenors: Vec<f64>) -> CurveResult<Self> {
        if days.is_empty() {
            return Err(CurveError::empty_curve("risk-free table"));
        }
        if days.len() != tenors.len() {
            return Err(CurveError::invalid_input(format!(
                "{} nodes but {} tenors",
                days.len(),
                tenors.len()
            )));
        }
        Ok(Self {
            days,
            tenors,
            rates: BTreeMap::new(),
        })
    }

    /// Adds the EA rate column for a currency.
    ///
    /// # Errors
    ///
    /// Fails if the column length differs from the node column.
    pub fn with_currency(mut self, currency: Currency, rates_ea: Vec<f64>) -> CurveResult<Self> {
        if rates_ea.len() != self.days.len() {
            return Err(CurveError::invalid_input(format!(
                "{currency} column has {} rates for {} nodes",
                rates_ea.len(),
                self.days.len()
            )));
        }
        self.rates.insert(currency, rates_ea);
        Ok(self)
    }

    /// Currencies present in the table.
    pub fn currencies(&self) -> impl Iterator<Item = Currency> + '_ {
        self.rates.keys().copied()
    }

    /// Builds the discount curve for `currency`.
    ///
    /// # Errors
    ///
    /// Fails with [`CurveError::MissingCurrency`] if the table has no column
    /// for it, or if the column has no usable rate.
    pub fn curve(&self, currency: Currency) -> CurveResult<DiscountCurve> {
        let rates = self
            .rates
            .get(&currency)
            .ok_or(CurveError::missing_currency(currency))?;
        DiscountCurve::from_effective_annual(currency, &self.days, &self.tenors, rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn curve() -> DiscountCurve {
        DiscountCurve::from_effective_annual(
            Currency::COP,
            &[1, 30, 90, 180],
            &[1.0 / 365.0, 30.0 / 365.0, 90.0 / 365.0, 180.0 / 365.0],
            &[0.09, 0.095, 0.10, 0.105],
        )
        .unwrap()
    }

    #[test]
    fn test_rates_are_stored_as_short_rates() {
        let c = curve();
        assert_relative_eq!(c.nodes()[0].rate, 1.09_f64.ln(), epsilon = 1e-15);
        assert_relative_eq!(c.nodes()[0].rate_ea, 0.09, epsilon = 1e-15);
    }

    #[test]
    fn test_nearest_node_fallback() {
        let c = curve();
        assert_eq!(c.node_at(0).days, 1);
        assert_eq!(c.node_at(50).days, 30);
        assert_eq!(c.node_at(70).days, 90);
        assert_eq!(c.node_at(10_000).days, 180);
        // 60 is equidistant from 30 and 90
        assert_eq!(c.node_at(60).days, 30);
    }

    #[test]
    fn test_percent_and_missing_rates() {
        let c = DiscountCurve::from_effective_annual(
            Currency::USD,
            &[1, 30, 90],
            &[0.0, 0.08, 0.25],
            &[4.5, f64::NAN, 5.0],
        )
        .unwrap();
        assert_eq!(c.len(), 2);
        assert_relative_eq!(c.nodes()[0].rate_ea, 0.045, epsilon = 1e-15);
        assert_eq!(c.node_at(30).days, 1);
    }

    #[test]
    fn test_rejects_bad_columns() {
        assert!(
            DiscountCurve::from_effective_annual(Currency::COP, &[1, 2], &[0.1], &[0.1]).is_err()
        );
        assert!(DiscountCurve::from_effective_annual(
            Currency::COP,
            &[2, 1],
            &[0.1, 0.2],
            &[0.1, 0.1]
        )
        .is_err());
        assert!(DiscountCurve::from_effective_annual(
            Currency::COP,
            &[1],
            &[0.1],
            &[f64::NAN]
        )
        .is_err());
    }

    #[test]
    fn test_discount_factor() {
        let c = curve();
        let df = c.discount_factor(90, 0.1667).unwrap();
        assert_relative_eq!(df, (-(1.10_f64.ln()) * 0.1667).exp(), epsilon = 1e-15);
        assert_eq!(discount_factor(0.1, 0.0), 1.0);
    }

    #[test]
    fn test_risk_free_table() {
        let table = RiskFreeTable::new(vec![1, 30], vec![1.0 / 365.0, 30.0 / 365.0])
            .unwrap()
            .with_currency(Currency::COP, vec![9.0, 9.5])
            .unwrap()
            .with_currency(Currency::USD, vec![0.04, 0.045])
            .unwrap();

        assert_eq!(table.currencies().collect::<Vec<_>>(), vec![Currency::COP, Currency::USD]);
        let cop = table.curve(Currency::COP).unwrap();
        assert_relative_eq!(cop.nodes()[1].rate_ea, 0.095, epsilon = 1e-15);
        let usd = table.curve(Currency::USD).unwrap();
        assert_relative_eq!(usd.nodes()[1].rate_ea, 0.045, epsilon = 1e-15);

        assert!(matches!(
            table.curve(Currency::UVR),
            Err(CurveError::MissingCurrency { .. })
        ));
        assert!(RiskFreeTable::new(vec![1], vec![]).is_err());
    }
}
