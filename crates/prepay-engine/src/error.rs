//! Error types for the pricing pipeline.

use prepay_core::{Currency, PrepayError};
use prepay_curves::CurveError;
use prepay_models::ModelError;
use thiserror::Error;

use crate::config::ValidationError;

/// A specialized Result type for pipeline operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised while configuring or running the pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The run configuration failed validation.
    #[error("Invalid configuration: {}", join_errors(.errors))]
    InvalidConfig {
        /// Every field that failed.
        errors: Vec<ValidationError>,
    },

    /// The configuration file could not be read or parsed.
    #[error("Cannot load configuration: {reason}")]
    ConfigLoad {
        /// Description of the failure.
        reason: String,
    },

    /// An input required by the selected model is absent.
    #[error("Missing input: {what}")]
    MissingInput {
        /// Which input.
        what: String,
    },

    /// No discount curve was supplied for a credit's currency.
    #[error("No discount curve for currency {currency}")]
    MissingCurve {
        /// The uncovered currency.
        currency: Currency,
    },

    /// Model error.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Curve error.
    #[error(transparent)]
    Curve(#[from] CurveError),

    /// Core type error.
    #[error(transparent)]
    Core(#[from] PrepayError),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl EngineError {
    /// Creates a configuration load error.
    #[must_use]
    pub fn config_load(reason: impl Into<String>) -> Self {
        Self::ConfigLoad {
            reason: reason.into(),
        }
    }

    /// Creates a missing input error.
    #[must_use]
    pub fn missing_input(what: impl Into<String>) -> Self {
        Self::MissingInput { what: what.into() }
    }

    /// Creates a missing curve error.
    #[must_use]
    pub fn missing_curve(currency: Currency) -> Self {
        Self::MissingCurve { currency }
    }

    /// `true` if the error only concerns one credit's calibration.
    #[must_use]
    pub fn is_calibration_error(&self) -> bool {
        matches!(self, Self::Model(e) if e.is_calibration_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_lists_every_field() {
        let err = EngineError::InvalidConfig {
            errors: vec![
                ValidationError::new("simulations", "must be positive"),
                ValidationError::new("seed", "bad"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Invalid configuration: simulations: must be positive; seed: bad"
        );
    }

    #[test]
    fn test_calibration_errors_are_recognized() {
        let err: EngineError = ModelError::insufficient_data("Consumo", 3, 1).into();
        assert!(err.is_calibration_error());
        assert!(!EngineError::missing_curve(Currency::USD).is_calibration_error());
        assert_eq!(
            EngineError::missing_curve(Currency::USD).to_string(),
            "No discount curve for currency USD"
        );
    }
}
