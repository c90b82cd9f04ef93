//! Error types for curve operations.
//!
//! Curve construction fails on empty or malformed input. Lookups that miss an
//! exact node never fail: they fall back to the nearest node.

use prepay_core::{Currency, PrepayError};
use prepay_math::MathError;
use thiserror::Error;

/// A specialized Result type for curve operations.
pub type CurveResult<T> = Result<T, CurveError>;

/// Error types for curve operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    /// The curve or history has no nodes.
    #[error("Empty curve: {context}")]
    EmptyCurve {
        /// What was being built.
        context: String,
    },

    /// Not enough nodes for the requested operation.
    #[error("Insufficient points: need at least {required}, got {got}")]
    InsufficientPoints {
        /// Minimum required points.
        required: usize,
        /// Actual number of points provided.
        got: usize,
    },

    /// Nodes or dates are not strictly increasing.
    #[error("Non-monotonic nodes at index {index}: {prev} >= {current}")]
    NonMonotonicNodes {
        /// Index where monotonicity violation occurred.
        index: usize,
        /// Previous value.
        prev: String,
        /// Current value.
        current: String,
    },

    /// No rate column for the requested currency.
    #[error("No curve available for currency {currency}")]
    MissingCurrency {
        /// The requested currency.
        currency: Currency,
    },

    /// Malformed input (length mismatch, unparseable value, NaN where a
    /// number is required).
    #[error("Invalid curve input: {reason}")]
    InvalidInput {
        /// Description of the problem.
        reason: String,
    },

    /// Mathematical error.
    #[error("Math error: {0}")]
    Math(#[from] MathError),

    /// Core type error.
    #[error(transparent)]
    Core(#[from] PrepayError),
}

impl CurveError {
    /// Creates an empty curve error.
    #[must_use]
    pub fn empty_curve(context: impl Into<String>) -> Self {
        Self::EmptyCurve {
            context: context.into(),
        }
    }

    /// Creates an insufficient points error.
    #[must_use]
    pub fn insufficient_points(required: usize, got: usize) -> Self {
        Self::InsufficientPoints { required, got }
    }

    /// Creates a non-monotonic nodes error.
    #[must_use]
    pub fn non_monotonic(index: usize, prev: impl ToString, current: impl ToString) -> Self {
        Self::NonMonotonicNodes {
            index,
            prev: prev.to_string(),
            current: current.to_string(),
        }
    }

    /// Creates a missing currency error.
    #[must_use]
    pub fn missing_currency(currency: Currency) -> Self {
        Self::MissingCurrency { currency }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}
