//! Error types for rate model operations.

use prepay_core::PrepayError;
use prepay_curves::CurveError;
use prepay_math::MathError;
use thiserror::Error;

/// A specialized Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised by calibration, simulation and validation.
///
/// Optimizer non-convergence is not an error: it is reported through the
/// `converged` flag of the calibrated parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Calibration of one entity (category or credit) failed.
    #[error("{model} calibration failed for {entity}: {reason}")]
    Calibration {
        /// Model name.
        model: &'static str,
        /// Category or credit identifier.
        entity: String,
        /// Description of the failure.
        reason: String,
    },

    /// Not enough observations to calibrate or validate.
    #[error("Insufficient data for {entity}: need at least {required}, got {actual}")]
    InsufficientData {
        /// Category or credit identifier.
        entity: String,
        /// Minimum required observations.
        required: usize,
        /// Observations available.
        actual: usize,
    },

    /// A parameter is outside its valid domain.
    #[error("Invalid parameter: {name} = {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Invalid value.
        value: f64,
    },

    /// Parameters of one model were handed to another.
    #[error("Parameter mismatch: expected {expected} parameters, got {got}")]
    ParameterMismatch {
        /// Expected model.
        expected: &'static str,
        /// Model the parameters belong to.
        got: &'static str,
    },

    /// Input series is malformed.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the problem.
        reason: String,
    },

    /// Curve error.
    #[error(transparent)]
    Curve(#[from] CurveError),

    /// Mathematical error.
    #[error(transparent)]
    Math(#[from] MathError),

    /// Core type error.
    #[error(transparent)]
    Core(#[from] PrepayError),
}

impl ModelError {
    /// Creates a calibration error.
    #[must_use]
    pub fn calibration(
        model: &'static str,
        entity: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Calibration {
            model,
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    /// Creates an insufficient data error.
    #[must_use]
    pub fn insufficient_data(entity: impl Into<String>, required: usize, actual: usize) -> Self {
        Self::InsufficientData {
            entity: entity.into(),
            required,
            actual,
        }
    }

    /// Creates an invalid parameter error.
    #[must_use]
    pub fn invalid_parameter(name: &'static str, value: f64) -> Self {
        Self::InvalidParameter { name, value }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// `true` for errors that only abort the current category or credit.
    #[must_use]
    pub fn is_calibration_error(&self) -> bool {
        matches!(
            self,
            Self::Calibration { .. } | Self::InsufficientData { .. }
        )
    }
}
