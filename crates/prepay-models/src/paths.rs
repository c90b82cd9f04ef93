//! Simulated rate paths.
//!
//! A [`PathMatrix`] stores Monte Carlo output as `steps × paths` arrays of
//! short rates and effective-annual rates on a time grid measured in days
//! from the simulation anchor date.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, ArrayView1};
use prepay_core::{Date, PrepayError};
use prepay_curves::conversion::{ea_to_short, short_to_ea};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Volatility regime of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Regime {
    /// Calibrated volatility.
    #[default]
    Base,
    /// Volatility scaled by the stress factor.
    Stressed,
}

impl Regime {
    /// Both regimes.
    pub const ALL: [Regime; 2] = [Regime::Base, Regime::Stressed];

    /// Lowercase label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Regime::Base => "base",
            Regime::Stressed => "stressed",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// How path values are interpolated between grid points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMode {
    /// Linear in effective-annual rates.
    Ea,
    /// Linear in `ln(1 + EA)`, mapped back with `expm1`.
    #[default]
    Short,
}

impl fmt::Display for InterpolationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterpolationMode::Ea => write!(f, "ea"),
            InterpolationMode::Short => write!(f, "short"),
        }
    }
}

impl FromStr for InterpolationMode {
    type Err = PrepayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ea" => Ok(InterpolationMode::Ea),
            "short" => Ok(InterpolationMode::Short),
            _ => Err(PrepayError::unknown_variant("interpolation mode", s)),
        }
    }
}

/// Monte Carlo rate paths on a day grid.
#[derive(Debug, Clone, PartialEq)]
pub struct PathMatrix {
    anchor: Date,
    times_days: Vec<f64>,
    short: Array2<f64>,
    ea: Array2<f64>,
}

impl PathMatrix {
    /// Wraps simulated arrays.
    ///
    /// # Errors
    ///
    /// Fails if the arrays disagree in shape with each other or with the
    /// time grid, or if the grid is empty or decreasing.
    pub fn new(
        anchor: Date,
        times_days: Vec<f64>,
        short: Array2<f64>,
        ea: Array2<f64>,
    ) -> ModelResult<Self> {
        if times_days.is_empty() {
            return Err(ModelError::invalid_input("path matrix has no time steps"));
        }
        if short.dim() != ea.dim() || short.nrows() != times_days.len() {
            return Err(ModelError::invalid_input(format!(
                "path shapes disagree: short {:?}, ea {:?}, {} times",
                short.dim(),
                ea.dim(),
                times_days.len()
            )));
        }
        if times_days.windows(2).any(|w| w[1] < w[0]) {
            return Err(ModelError::invalid_input("path time grid must be ascending"));
        }
        Ok(Self {
            anchor,
            times_days,
            short,
            ea,
        })
    }

    /// Date of grid time zero.
    #[must_use]
    pub fn anchor(&self) -> Date {
        self.anchor
    }

    /// Grid times in days from the anchor.
    #[must_use]
    pub fn times_days(&self) -> &[f64] {
        &self.times_days
    }

    /// Number of time steps (rows).
    #[must_use]
    pub fn n_steps(&self) -> usize {
        self.short.nrows()
    }

    /// Number of simulated paths (columns).
    #[must_use]
    pub fn n_paths(&self) -> usize {
        self.short.ncols()
    }

    /// Short rates, `steps × paths`.
    #[must_use]
    pub fn short_rates(&self) -> &Array2<f64> {
        &self.short
    }

    /// Effective-annual rates, `steps × paths`.
    #[must_use]
    pub fn effective_annual(&self) -> &Array2<f64> {
        &self.ea
    }

    /// EA values of one path over the grid.
    #[must_use]
    pub fn path(&self, index: usize) -> ArrayView1<'_, f64> {
        self.ea.column(index)
    }

    /// Bracketing rows and weight for a time `t` in days, flat outside the
    /// grid.
    fn bracket(&self, t: f64) -> (usize, usize, f64) {
        let n = self.times_days.len();
        if n == 1 || t <= self.times_days[0] {
            return (0, 0, 0.0);
        }
        if t >= self.times_days[n - 1] {
            return (n - 1, n - 1, 0.0);
        }
        let hi = self.times_days.partition_point(|&v| v <= t);
        let lo = hi - 1;
        let span = self.times_days[hi] - self.times_days[lo];
        let w = if span > 0.0 {
            (t - self.times_days[lo]) / span
        } else {
            0.0
        };
        (lo, hi, w)
    }

    /// Simulated EA rates at arbitrary dates, `dates × paths`.
    ///
    /// Dates before the anchor take the anchor value.
    #[must_use]
    pub fn interpolate(&self, dates: &[Date], mode: InterpolationMode) -> Array2<f64> {
        let mut out = Array2::zeros((dates.len(), self.n_paths()));
        for (row, date) in dates.iter().enumerate() {
            let t = (*date - self.anchor).max(0) as f64;
            let (lo, hi, w) = self.bracket(t);
            let a = self.ea.row(lo);
            let b = self.ea.row(hi);
            let mut target = out.row_mut(row);
            match mode {
                InterpolationMode::Ea => {
                    for ((o, &x), &y) in target.iter_mut().zip(a).zip(b) {
                        *o = x + (y - x) * w;
                    }
                }
                InterpolationMode::Short => {
                    for ((o, &x), &y) in target.iter_mut().zip(a).zip(b) {
                        let (sx, sy) = (ea_to_short(x), ea_to_short(y));
                        *o = short_to_ea(sx + (sy - sx) * w);
                    }
                }
            }
        }
        out
    }
}
