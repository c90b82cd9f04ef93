//! Error types for the Prepay core crate.
//!
//! Input validation failures are raised here: malformed dates, unknown
//! enumerations in a portfolio row, and credits that cannot be amortized.

use thiserror::Error;

/// A specialized Result type for core operations.
pub type PrepayResult<T> = Result<T, PrepayError>;

/// The main error type for core operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PrepayError {
    /// Error in date calculations or invalid date.
    #[error("Invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },

    /// An input record failed validation.
    #[error("Input validation failed for {field}: {reason}")]
    InputValidation {
        /// Field or column that failed.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A credit cannot produce a cash-flow schedule.
    #[error("Invalid credit {credit_id}: {reason}")]
    InvalidCredit {
        /// Identifier of the offending credit.
        credit_id: String,
        /// Description of the problem.
        reason: String,
    },

    /// Unrecognized enumeration label (currency, frequency, product type...).
    #[error("Unknown {kind}: '{value}'")]
    UnknownVariant {
        /// Kind of value that was being parsed.
        kind: &'static str,
        /// The unrecognized text.
        value: String,
    },
}

impl PrepayError {
    /// Creates an invalid date error.
    #[must_use]
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }

    /// Creates an input validation error.
    #[must_use]
    pub fn input_validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InputValidation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid credit error.
    #[must_use]
    pub fn invalid_credit(credit_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCredit {
            credit_id: credit_id.into(),
            reason: reason.into(),
        }
    }

    /// Creates an unknown variant error.
    #[must_use]
    pub fn unknown_variant(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownVariant {
            kind,
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PrepayError::invalid_date("2024-02-30 is not a valid date");
        assert!(err.to_string().contains("Invalid date"));
    }

    #[test]
    fn test_unknown_variant_display() {
        let err = PrepayError::unknown_variant("currency", "EUR");
        assert_eq!(err.to_string(), "Unknown currency: 'EUR'");
    }
}
