//! Curve snapshot histories and instantaneous forward curves.
//!
//! A [`CurveHistory`] is the wide-format market input for Hull-White: one
//! dated row per snapshot with an EA rate per day node. Each row yields a
//! [`ForwardCurve`] by differentiating the log discount function
//!
//! ```text
//! ln D(τ) = -y(τ)·τ,   y = ln(1 + EA),   f(τ) = -d ln D / dτ
//! ```
//!
//! with a second-order finite difference on the (uneven) node grid.

use prepay_core::Date;
use prepay_math::differentiation::gradient;
use prepay_math::interpolation::interp;
use serde::{Deserialize, Serialize};

use crate::conversion::{ea_to_short, normalize_percent_rows};
use crate::discount::DAYS_PER_YEAR;
use crate::error::{CurveError, CurveResult};

/// Instantaneous forward rates on a tenor grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardCurve {
    tenors: Vec<f64>,
    forwards: Vec<f64>,
}

impl ForwardCurve {
    /// Derives forwards from EA zero rates at `tenors` (years).
    ///
    /// # Errors
    ///
    /// Fails on fewer than two tenors, mismatched lengths, or repeated tenors.
    pub fn from_effective_annual(tenors: &[f64], rates_ea: &[f64]) -> CurveResult<Self> {
        let log_discount: Vec<f64> = rates_ea
            .iter()
            .zip(tenors)
            .map(|(&ea, &t)| -ea_to_short(ea) * t)
            .collect();
        let forwards = gradient(&log_discount, tenors)?
            .into_iter()
            .map(|d| -d)
            .collect();
        Ok(Self {
            tenors: tenors.to_vec(),
            forwards,
        })
    }

    /// Tenor grid in years.
    #[must_use]
    pub fn tenors(&self) -> &[f64] {
        &self.tenors
    }

    /// Forward rate at each tenor.
    #[must_use]
    pub fn forwards(&self) -> &[f64] {
        &self.forwards
    }

    /// Forward at the first node.
    #[must_use]
    pub fn initial(&self) -> f64 {
        self.forwards[0]
    }

    /// Linearly interpolated forward at `t` years, flat outside the grid.
    #[must_use]
    pub fn at(&self, t: f64) -> f64 {
        interp(t, &self.tenors, &self.forwards)
    }
}

/// Dated curve snapshots in wide format.
///
/// # Example
///
/// ```rust
/// use prepay_core::Date;
/// use prepay_curves::forward::CurveHistory;
///
/// let history = CurveHistory::new(
///     vec![Date::from_ymd(2024, 1, 5).unwrap(), Date::from_ymd(2024, 1, 12).unwrap()],
///     vec![1, 30, 90],
///     vec![vec![9.0, 9.2, 9.5], vec![9.1, 9.3, 9.6]],
/// )
/// .unwrap();
///
/// // Percent quotes were normalized.
/// assert!((history.rows()[0][0] - 0.09).abs() < 1e-15);
/// assert_eq!(history.short_rate_series().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveHistory {
    dates: Vec<Date>,
    nodes: Vec<i64>,
    rows: Vec<Vec<f64>>,
}

impl CurveHistory {
    /// Builds a history from dates, day nodes and one EA row per date.
    ///
    /// # Errors
    ///
    /// Fails on empty input, rows whose width differs from the node count,
    /// or dates and nodes that are not strictly increasing.
    pub fn new(dates: Vec<Date>, nodes: Vec<i64>, mut rows: Vec<Vec<f64>>) -> CurveResult<Self> {
        if dates.is_empty() || nodes.is_empty() {
            return Err(CurveError::empty_curve("curve history"));
        }
        if dates.len() != rows.len() {
            return Err(CurveError::invalid_input(format!(
                "{} dates but {} curve rows",
                dates.len(),
                rows.len()
            )));
        }
        if let Some(row) = rows.iter().position(|r| r.len() != nodes.len()) {
            return Err(CurveError::invalid_input(format!(
                "row {row} has {} rates for {} nodes",
                rows[row].len(),
                nodes.len()
            )));
        }
        if let Some(i) = nodes.windows(2).position(|w| w[1] <= w[0]) {
            return Err(CurveError::non_monotonic(i + 1, nodes[i], nodes[i + 1]));
        }
        if let Some(i) = dates.windows(2).position(|w| w[1] <= w[0]) {
            return Err(CurveError::non_monotonic(i + 1, dates[i], dates[i + 1]));
        }

        normalize_percent_rows(&mut rows);
        Ok(Self { dates, nodes, rows })
    }

    /// Snapshot dates.
    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Day nodes.
    #[must_use]
    pub fn nodes(&self) -> &[i64] {
        &self.nodes
    }

    /// EA rates, one row per date.
    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Number of snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// `true` if there are no snapshots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Largest day node.
    #[must_use]
    pub fn last_node(&self) -> i64 {
        self.nodes[self.nodes.len() - 1]
    }

    /// Node tenors in years.
    #[must_use]
    pub fn tenors(&self) -> Vec<f64> {
        self.nodes.iter().map(|&d| d as f64 / DAYS_PER_YEAR).collect()
    }

    /// Index of the last snapshot dated on or before `cutoff`.
    #[must_use]
    pub fn last_index_on_or_before(&self, cutoff: Date) -> Option<usize> {
        self.dates.partition_point(|d| *d <= cutoff).checked_sub(1)
    }

    /// Snapshots dated on or before `cutoff`, restricted to nodes of at most
    /// `max_node` days.
    #[must_use]
    pub fn truncated(&self, cutoff: Date, max_node: i64) -> Self {
        let n_dates = self.dates.partition_point(|d| *d <= cutoff);
        let n_nodes = self.nodes.partition_point(|&n| n <= max_node);
        Self {
            dates: self.dates[..n_dates].to_vec(),
            nodes: self.nodes[..n_nodes].to_vec(),
            rows: self.rows[..n_dates]
                .iter()
                .map(|r| r[..n_nodes].to_vec())
                .collect(),
        }
    }

    /// Forward curve of the snapshot at `index`.
    ///
    /// # Errors
    ///
    /// Fails if the index is out of range or the history has fewer than two
    /// nodes.
    pub fn forward_curve(&self, index: usize) -> CurveResult<ForwardCurve> {
        let row = self.rows.get(index).ok_or_else(|| {
            CurveError::invalid_input(format!("snapshot {index} out of range"))
        })?;
        if self.nodes.len() < 2 {
            return Err(CurveError::insufficient_points(2, self.nodes.len()));
        }
        ForwardCurve::from_effective_annual(&self.tenors(), row)
    }

    /// Forward curves of every snapshot.
    ///
    /// # Errors
    ///
    /// Fails if the history has fewer than two nodes.
    pub fn forward_curves(&self) -> CurveResult<Vec<ForwardCurve>> {
        (0..self.len()).map(|i| self.forward_curve(i)).collect()
    }

    /// Short rate implied by the snapshot at `index`: `ln(1 + EA)` at the
    /// 1-day node when present, else the first forward.
    ///
    /// # Errors
    ///
    /// Fails if the forward curve is needed and cannot be built.
    pub fn short_rate(&self, index: usize) -> CurveResult<f64> {
        match self.nodes.binary_search(&1) {
            Ok(col) => self
                .rows
                .get(index)
                .map(|row| ea_to_short(row[col]))
                .ok_or_else(|| CurveError::invalid_input(format!("snapshot {index} out of range"))),
            Err(_) => self.forward_curve(index).map(|f| f.initial()),
        }
    }

    /// Observed short-rate series, one value per snapshot.
    ///
    /// Snapshots whose short rate cannot be derived are reported as NaN.
    #[must_use]
    pub fn short_rate_series(&self) -> Vec<f64> {
        (0..self.len())
            .map(|i| self.short_rate(i).unwrap_or(f64::NAN))
            .collect()
    }
}
