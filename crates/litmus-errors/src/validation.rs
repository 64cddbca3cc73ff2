//! Input validation error types.
//!
//! Lookup misses (unknown protocol name, unknown task class label) and
//! rejected parameter blocks are reported here. None of them are fatal; the
//! caller decides what to do.

use core::fmt;

use crate::common::ErrorSeverity;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Value out of range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Field name
        field: String,
        /// The invalid value
        value: String,
        /// Minimum allowed value
        min: String,
        /// Maximum allowed value
        max: String,
    },

    /// Value is required but missing or zero
    #[error("Required field '{0}' is missing")]
    Required(String),

    /// Invalid enum value
    #[error("Invalid value '{value}' for field '{field}', expected one of: {expected}")]
    InvalidEnumValue {
        /// Field name
        field: String,
        /// The invalid value
        value: String,
        /// Expected values
        expected: String,
    },

    /// Numeric overflow
    #[error("Numeric overflow in field '{field}'")]
    NumericOverflow {
        /// Field name
        field: String,
    },

    /// Constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

impl ValidationError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Error
    }

    /// Create an out of range error for a numeric value.
    pub fn out_of_range<T: fmt::Debug>(field: impl Into<String>, value: T, min: T, max: T) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            value: format!("{value:?}"),
            min: format!("{min:?}"),
            max: format!("{max:?}"),
        }
    }

    /// Create a required field error.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required(field.into())
    }

    /// Create an invalid enum value error.
    pub fn invalid_enum(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        ValidationError::InvalidEnumValue {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Create a numeric overflow error.
    pub fn overflow(field: impl Into<String>) -> Self {
        ValidationError::NumericOverflow {
            field: field.into(),
        }
    }

    /// Create a constraint violation error.
    pub fn constraint(msg: impl Into<String>) -> Self {
        ValidationError::ConstraintViolation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_out_of_range() {
        let err = ValidationError::out_of_range("priority", 600_u32, 1, 511);
        let msg = err.to_string();
        assert!(msg.contains("priority"));
        assert!(msg.contains("600"));
        assert!(msg.contains("511"));
    }

    #[test]
    fn test_validation_error_required() {
        let err = ValidationError::required("period");
        assert_eq!(err.to_string(), "Required field 'period' is missing");
    }

    #[test]
    fn test_validation_error_invalid_enum() {
        let err = ValidationError::invalid_enum("task class", "xrt", "hrt, srt, be");
        let msg = err.to_string();
        assert!(msg.contains("xrt"));
        assert!(msg.contains("hrt, srt, be"));
    }

    #[test]
    fn test_validation_error_overflow() {
        let err = ValidationError::overflow("exec_cost");
        assert_eq!(err.to_string(), "Numeric overflow in field 'exec_cost'");
    }

    #[test]
    fn test_validation_error_severity() {
        assert_eq!(
            ValidationError::required("test").severity(),
            ErrorSeverity::Error
        );
    }
}
