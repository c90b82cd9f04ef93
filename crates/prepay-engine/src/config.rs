//! Run configuration.
//!
//! A [`PipelineConfig`] holds everything a run needs besides market data and
//! the portfolio. It is usually loaded from TOML:
//!
//! ```toml
//! cutoff = "2025-01-31"
//! model = "hull-white"
//! simulations = 500
//! differential_pct = 2.5
//!
//! [optimizer]
//! max_iterations = 2000
//! ```

use std::fmt;
use std::path::Path;

use prepay_core::Date;
use prepay_math::optimization::OptimizationConfig;
use prepay_models::model::{ModelKind, DEFAULT_SEED};
use prepay_models::paths::InterpolationMode;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Validation error for a configuration field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field that failed validation.
    pub field: String,
    /// Validation error message.
    pub message: String,
    /// Validation rule that was violated.
    pub rule: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// Creates a validation error with a rule name.
    #[must_use]
    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref rule) = self.rule {
            write!(f, "{}: {} (rule: {})", self.field, self.message, rule)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// Trait for validatable configurations.
pub trait Validate {
    /// Returns a list of validation errors, or an empty vector if valid.
    fn validate(&self) -> Vec<ValidationError>;

    /// Returns true if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

/// Nelder-Mead settings for the likelihood fits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizerSettings {
    /// Simplex cost spread at which the search stops.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Iteration cap.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u64,

    /// Relative size of the starting simplex.
    #[serde(default = "default_initial_step")]
    pub initial_step: f64,
}

fn default_tolerance() -> f64 {
    OptimizationConfig::default().tolerance
}

fn default_max_iterations() -> u64 {
    OptimizationConfig::default().max_iterations
}

fn default_initial_step() -> f64 {
    OptimizationConfig::default().initial_step
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
            initial_step: default_initial_step(),
        }
    }
}

impl From<OptimizerSettings> for OptimizationConfig {
    fn from(s: OptimizerSettings) -> Self {
        OptimizationConfig {
            tolerance: s.tolerance,
            max_iterations: s.max_iterations,
            initial_step: s.initial_step,
        }
    }
}

impl Validate for OptimizerSettings {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            errors.push(ValidationError::with_rule(
                "optimizer.tolerance",
                format!("must be a positive number, got {}", self.tolerance),
                "positive",
            ));
        }
        if self.max_iterations == 0 {
            errors.push(ValidationError::with_rule(
                "optimizer.max_iterations",
                "must be at least 1",
                "positive",
            ));
        }
        if !(self.initial_step.is_finite() && self.initial_step > 0.0) {
            errors.push(ValidationError::with_rule(
                "optimizer.initial_step",
                format!("must be a positive number, got {}", self.initial_step),
                "positive",
            ));
        }
        errors
    }
}

/// Parameters of one pricing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Valuation cut-off date.
    pub cutoff: Date,

    /// Short-rate model.
    #[serde(default)]
    pub model: ModelKind,

    /// Monte Carlo paths per credit and regime.
    #[serde(default = "default_simulations")]
    pub simulations: usize,

    /// Base seed; credit `i` simulates with `seed + i`.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Interpolation of simulated paths onto evaluation dates.
    #[serde(default)]
    pub interpolation: InterpolationMode,

    /// Prepayment differential in percentage points (`3.0` is 3%).
    #[serde(default = "default_differential_pct")]
    pub differential_pct: f64,

    /// Optimizer settings for calibration.
    #[serde(default)]
    pub optimizer: OptimizerSettings,
}

fn default_simulations() -> usize {
    100
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_differential_pct() -> f64 {
    3.0
}

impl PipelineConfig {
    /// Configuration with every optional field at its default.
    #[must_use]
    pub fn new(cutoff: Date) -> Self {
        Self {
            cutoff,
            model: ModelKind::default(),
            simulations: default_simulations(),
            seed: default_seed(),
            interpolation: InterpolationMode::default(),
            differential_pct: default_differential_pct(),
            optimizer: OptimizerSettings::default(),
        }
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: ModelKind) -> Self {
        self.model = model;
        self
    }

    /// Sets the path count.
    #[must_use]
    pub fn with_simulations(mut self, simulations: usize) -> Self {
        self.simulations = simulations;
        self
    }

    /// Sets the base seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the differential in percentage points.
    #[must_use]
    pub fn with_differential_pct(mut self, pct: f64) -> Self {
        self.differential_pct = pct;
        self
    }

    /// Sets the interpolation mode.
    #[must_use]
    pub fn with_interpolation(mut self, mode: InterpolationMode) -> Self {
        self.interpolation = mode;
        self
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ConfigLoad`] on malformed TOML and
    /// [`EngineError::InvalidConfig`] when a field fails validation.
    pub fn from_toml_str(source: &str) -> EngineResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| EngineError::config_load(e.to_string()))?;
        config.ensure_valid()?;
        Ok(config)
    }

    /// Reads and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, parsed or validated.
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| EngineError::config_load(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Serializes to TOML.
    ///
    /// # Errors
    ///
    /// Fails only if a float field is not representable in TOML.
    pub fn to_toml_string(&self) -> EngineResult<String> {
        toml::to_string_pretty(self).map_err(|e| EngineError::config_load(e.to_string()))
    }

    /// Differential as a decimal rate.
    #[must_use]
    pub fn differential(&self) -> f64 {
        self.differential_pct / 100.0
    }

    /// Optimizer configuration for the models.
    #[must_use]
    pub fn optimization(&self) -> OptimizationConfig {
        self.optimizer.into()
    }

    /// Returns `InvalidConfig` listing every failing field.
    ///
    /// # Errors
    ///
    /// Fails when [`Validate::validate`] reports anything.
    pub fn ensure_valid(&self) -> EngineResult<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(EngineError::InvalidConfig { errors })
        }
    }
}

impl Validate for PipelineConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.simulations == 0 {
            errors.push(ValidationError::with_rule(
                "simulations",
                "must be at least 1",
                "positive",
            ));
        }
        if !self.differential_pct.is_finite() {
            errors.push(ValidationError::new(
                "differential_pct",
                format!("must be finite, got {}", self.differential_pct),
            ));
        }
        errors.extend(self.optimizer.validate());
        errors
    }
}
