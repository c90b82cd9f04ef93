//! The rate model contract shared by Vasicek and Hull-White.
//!
//! The pipeline talks to models only through [`RateModel`]:
//!
//! 1. [`RateModel::calibrate`] fits base and stressed parameters for a
//!    credit (memoized by [`RateModel::calibration_key`])
//! 2. [`RateModel::simulate`] produces a seeded [`PathMatrix`] per regime
//! 3. [`RateModel::validate`] measures the in-sample one-step-ahead fit

use std::fmt;
use std::str::FromStr;

use prepay_core::{Date, PrepayError, ProductCategory};
use prepay_math::statistics::FitMetrics;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::hull_white::HullWhiteParameters;
use crate::paths::{PathMatrix, Regime};
use crate::vasicek::VasicekParameters;

/// Volatility multiplier of the stressed regime.
pub const STRESS_FACTOR: f64 = 1.25;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 42;

/// Available short-rate models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKind {
    /// Ornstein-Uhlenbeck short rate calibrated per product category.
    #[default]
    Vasicek,
    /// One-factor Hull-White calibrated per credit to the curve history.
    HullWhite,
}

impl ModelKind {
    /// Display name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::Vasicek => "Vasicek",
            ModelKind::HullWhite => "Hull-White",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ModelKind {
    type Err = PrepayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "vasicek" | "ou" => Ok(ModelKind::Vasicek),
            "hull-white" | "hullwhite" | "hw" => Ok(ModelKind::HullWhite),
            _ => Err(PrepayError::unknown_variant("rate model", s)),
        }
    }
}

/// Calibrated parameters of either model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "kebab-case")]
pub enum ModelParameters {
    /// Vasicek parameters.
    Vasicek(VasicekParameters),
    /// Hull-White parameters.
    HullWhite(HullWhiteParameters),
}

impl ModelParameters {
    /// Model the parameters belong to.
    #[must_use]
    pub fn kind(&self) -> ModelKind {
        match self {
            ModelParameters::Vasicek(_) => ModelKind::Vasicek,
            ModelParameters::HullWhite(_) => ModelKind::HullWhite,
        }
    }

    /// Short-rate volatility.
    #[must_use]
    pub fn sigma(&self) -> f64 {
        match self {
            ModelParameters::Vasicek(p) => p.sigma,
            ModelParameters::HullWhite(p) => p.sigma,
        }
    }

    /// Whether the optimizer converged.
    #[must_use]
    pub fn converged(&self) -> bool {
        match self {
            ModelParameters::Vasicek(p) => p.converged,
            ModelParameters::HullWhite(p) => p.converged,
        }
    }

    /// Copy with volatility scaled by [`STRESS_FACTOR`].
    #[must_use]
    pub fn stressed(&self) -> Self {
        match self {
            ModelParameters::Vasicek(p) => ModelParameters::Vasicek(p.stressed()),
            ModelParameters::HullWhite(p) => ModelParameters::HullWhite(p.stressed()),
        }
    }

    /// Vasicek parameters, or a mismatch error.
    pub fn as_vasicek(&self) -> ModelResult<&VasicekParameters> {
        match self {
            ModelParameters::Vasicek(p) => Ok(p),
            other => Err(ModelError::ParameterMismatch {
                expected: ModelKind::Vasicek.name(),
                got: other.kind().name(),
            }),
        }
    }

    /// Hull-White parameters, or a mismatch error.
    pub fn as_hull_white(&self) -> ModelResult<&HullWhiteParameters> {
        match self {
            ModelParameters::HullWhite(p) => Ok(p),
            other => Err(ModelError::ParameterMismatch {
                expected: ModelKind::HullWhite.name(),
                got: other.kind().name(),
            }),
        }
    }
}

/// Base and stressed parameters produced by one calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibratedPair {
    /// Calibrated parameters.
    pub base: ModelParameters,
    /// Same parameters with `sigma × 1.25`.
    pub stressed: ModelParameters,
}

impl CalibratedPair {
    /// Pairs `base` with its stressed copy.
    #[must_use]
    pub fn from_base(base: ModelParameters) -> Self {
        let stressed = base.stressed();
        Self { base, stressed }
    }

    /// Parameters for a regime.
    #[must_use]
    pub fn for_regime(&self, regime: Regime) -> &ModelParameters {
        match regime {
            Regime::Base => &self.base,
            Regime::Stressed => &self.stressed,
        }
    }
}

/// What is being calibrated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationRequest<'a> {
    /// Credit identifier.
    pub credit_id: &'a str,
    /// Product category of the credit.
    pub category: ProductCategory,
    /// Valuation cut-off date.
    pub cutoff: Date,
    /// Credit maturity; bounds the simulation horizon.
    pub maturity: Date,
}

/// Monte Carlo settings for one simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationSpec {
    /// Number of paths.
    pub n_paths: usize,
    /// RNG seed.
    pub seed: u64,
    /// Last date the paths must cover.
    pub horizon_end: Date,
}

/// A calibratable, simulatable short-rate model.
pub trait RateModel: Send + Sync {
    /// Which model this is.
    fn kind(&self) -> ModelKind;

    /// Memoization key: credits with equal keys share calibrated parameters.
    fn calibration_key(&self, request: &CalibrationRequest<'_>) -> String;

    /// Fits base and stressed parameters.
    ///
    /// # Errors
    ///
    /// Returns a calibration error when the available history is too short
    /// or does not cover the horizon. Optimizer non-convergence is not an
    /// error.
    fn calibrate(&self, request: &CalibrationRequest<'_>) -> ModelResult<CalibratedPair>;

    /// Simulates `spec.n_paths` paths in `regime`.
    ///
    /// # Errors
    ///
    /// Fails on parameters of another model or a degenerate time grid.
    fn simulate(
        &self,
        parameters: &ModelParameters,
        regime: Regime,
        spec: &SimulationSpec,
    ) -> ModelResult<PathMatrix>;

    /// In-sample one-step-ahead fit of `parameters`.
    ///
    /// # Errors
    ///
    /// Fails when fewer than two observations are available.
    fn validate(
        &self,
        request: &CalibrationRequest<'_>,
        parameters: &ModelParameters,
    ) -> ModelResult<FitMetrics>;
}
