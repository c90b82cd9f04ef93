//! Error types for mathematical operations.

use thiserror::Error;

/// A specialized Result type for mathematical operations.
pub type MathResult<T> = Result<T, MathError>;

/// Errors that can occur during mathematical operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    /// Optimizer failed to run.
    #[error("Optimization failed: {reason}")]
    OptimizationFailed {
        /// Message from the solver.
        reason: String,
    },

    /// Slices that must be aligned have different lengths.
    #[error("Length mismatch: {left} vs {right}")]
    LengthMismatch {
        /// Length of the first input.
        left: usize,
        /// Length of the second input.
        right: usize,
    },

    /// Insufficient data points for operation.
    #[error("Insufficient data: need at least {required}, got {actual}")]
    InsufficientData {
        /// Minimum required points.
        required: usize,
        /// Actual number of points.
        actual: usize,
    },

    /// Invalid input parameter.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the invalid input.
        reason: String,
    },
}

impl MathError {
    /// Creates an optimization failure error.
    #[must_use]
    pub fn optimization_failed(reason: impl Into<String>) -> Self {
        Self::OptimizationFailed {
            reason: reason.into(),
        }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Creates an insufficient data error.
    #[must_use]
    pub fn insufficient_data(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }

    /// Returns an error unless both lengths agree.
    pub fn check_lengths(left: usize, right: usize) -> MathResult<()> {
        if left == right {
            Ok(())
        } else {
            Err(Self::LengthMismatch { left, right })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MathError::insufficient_data(3, 1);
        assert!(err.to_string().contains("at least 3"));
    }

    #[test]
    fn test_check_lengths() {
        assert!(MathError::check_lengths(2, 2).is_ok());
        assert_eq!(
            MathError::check_lengths(2, 3),
            Err(MathError::LengthMismatch { left: 2, right: 3 })
        );
    }
}
