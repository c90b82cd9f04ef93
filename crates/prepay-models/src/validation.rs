//! In-sample one-step-ahead validation of calibrated parameters.
//!
//! Each observation is predicted from the previous one with the model's
//! conditional mean. The prediction series is scored with
//! [`FitMetrics`] and classified with a [`FitRating`].

use std::fmt;

use prepay_curves::forward::CurveHistory;
use prepay_math::statistics::FitMetrics;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::hull_white::calibration::{forward_column, snapshot_steps, transition_moments};
use crate::hull_white::HullWhiteParameters;
use crate::vasicek::{VasicekParameters, WEEKLY_DT};

/// R² at or above which a fit is rated good.
pub const GOOD_R_SQUARED: f64 = 0.65;

/// R² at or above which a fit is rated acceptable.
pub const ACCEPTABLE_R_SQUARED: f64 = 0.40;

/// Minimum observations for a validation.
pub const MIN_VALIDATION_OBSERVATIONS: usize = 2;

/// Traffic-light rating of a fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FitRating {
    /// `R² ≥ 0.65`.
    Good,
    /// `0.40 ≤ R² < 0.65`.
    Acceptable,
    /// `R² < 0.40`.
    Poor,
}

impl FitRating {
    /// Rates an R² value. NaN is poor.
    #[must_use]
    pub fn from_r_squared(r_squared: f64) -> Self {
        if r_squared >= GOOD_R_SQUARED {
            FitRating::Good
        } else if r_squared >= ACCEPTABLE_R_SQUARED {
            FitRating::Acceptable
        } else {
            FitRating::Poor
        }
    }

    /// Report label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            FitRating::Good => "Good",
            FitRating::Acceptable => "Acceptable",
            FitRating::Poor => "Poor",
        }
    }
}

impl fmt::Display for FitRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

fn score(observed: Vec<f64>, predicted: Vec<f64>, entity: &str) -> ModelResult<FitMetrics> {
    let (observed, predicted): (Vec<f64>, Vec<f64>) = observed
        .into_iter()
        .zip(predicted)
        .filter(|(o, p)| o.is_finite() && p.is_finite())
        .unzip();
    if observed.is_empty() {
        return Err(ModelError::insufficient_data(
            entity,
            MIN_VALIDATION_OBSERVATIONS,
            observed.len(),
        ));
    }
    Ok(FitMetrics::compute(&observed, &predicted)?)
}

/// Weekly one-step-ahead fit of Vasicek parameters to a short-rate series.
///
/// # Errors
///
/// Fails on fewer than two observations.
pub fn vasicek_fit(
    rates: &[f64],
    params: &VasicekParameters,
    entity: &str,
) -> ModelResult<FitMetrics> {
    if rates.len() < MIN_VALIDATION_OBSERVATIONS {
        return Err(ModelError::insufficient_data(
            entity,
            MIN_VALIDATION_OBSERVATIONS,
            rates.len(),
        ));
    }
    let predicted = rates[..rates.len() - 1]
        .iter()
        .map(|&r| params.conditional_mean(r, WEEKLY_DT))
        .collect();
    score(rates[1..].to_vec(), predicted, entity)
}

/// One-step-ahead fit of Hull-White parameters to a curve history, using
/// the transition mean between consecutive snapshots.
///
/// # Errors
///
/// Fails on fewer than two snapshots or fewer than two curve nodes.
pub fn hull_white_fit(
    history: &CurveHistory,
    params: &HullWhiteParameters,
    entity: &str,
) -> ModelResult<FitMetrics> {
    if history.len() < MIN_VALIDATION_OBSERVATIONS {
        return Err(ModelError::insufficient_data(
            entity,
            MIN_VALIDATION_OBSERVATIONS,
            history.len(),
        ));
    }
    let forwards = history.forward_curves()?;
    let rates = history.short_rate_series();
    let steps = snapshot_steps(history);

    let m = steps.len().min(rates.len() - 1);
    let predicted = (0..m)
        .map(|k| {
            let fwd = &forwards[k];
            let j = forward_column(steps[k], fwd.forwards().len());
            transition_moments(
                params.a,
                params.sigma,
                params.lambda,
                rates[k],
                fwd.initial(),
                fwd.forwards()[j],
                steps[k],
            )
            .0
        })
        .collect();
    score(rates[1..=m].to_vec(), predicted, entity)
}
