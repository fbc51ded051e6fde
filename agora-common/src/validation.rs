//! Configuration validation for Agora services.
//!
//! Provides validation logic for configuration fields to ensure
//! all required values are present and within valid ranges.

use thiserror::Error;

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Value {value} for {field} is outside [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Configuration conflict: {reason}")]
    Conflict { reason: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

impl ValidationError {
    /// The field path this error refers to, when there is exactly one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingField { field }
            | Self::InvalidValue { field, .. }
            | Self::OutOfRange { field, .. } => Some(field),
            Self::Conflict { .. } | Self::Multiple(_) => None,
        }
    }
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> ValidationResult<()>;
}

/// Check that `value` is finite and lies in the closed interval `[min, max]`.
pub fn check_range(field: &str, value: f64, min: f64, max: f64) -> ValidationResult<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        })
    }
}

/// Check that `value` is finite and lies in `(min, max]`.
pub fn check_range_exclusive_min(
    field: &str,
    value: f64,
    min: f64,
    max: f64,
) -> ValidationResult<()> {
    if value.is_finite() && value > min && value <= max {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        })
    }
}

/// Fold a list of collected errors into a single result.
pub fn collect_errors(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
    if errors.is_empty() {
        Ok(())
    } else if errors.len() == 1 {
        Err(errors.remove(0))
    } else {
        Err(ValidationError::Multiple(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0.0, true ; "lower bound")]
    #[test_case(1.0, true ; "upper bound")]
    #[test_case(0.5, true ; "inside")]
    #[test_case(-0.01, false ; "below")]
    #[test_case(1.01, false ; "above")]
    #[test_case(f64::NAN, false ; "nan")]
    fn test_check_range(value: f64, ok: bool) {
        assert_eq!(check_range("x", value, 0.0, 1.0).is_ok(), ok);
    }

    #[test]
    fn test_exclusive_min_rejects_zero() {
        assert!(check_range_exclusive_min("rate", 0.0, 0.0, 10.0).is_err());
        assert!(check_range_exclusive_min("rate", 0.001, 0.0, 10.0).is_ok());
    }

    #[test]
    fn test_out_of_range_message_names_field() {
        let err = check_range("dimensions.inflation.rate", 12.0, 0.0, 10.0).unwrap_err();
        assert_eq!(err.field(), Some("dimensions.inflation.rate"));
        assert!(err.to_string().contains("dimensions.inflation.rate"));
    }

    #[test]
    fn test_collect_errors() {
        assert!(collect_errors(vec![]).is_ok());

        let one = collect_errors(vec![ValidationError::MissingField { field: "a".into() }]);
        assert!(matches!(one, Err(ValidationError::MissingField { .. })));

        let many = collect_errors(vec![
            ValidationError::MissingField { field: "a".into() },
            ValidationError::Conflict { reason: "b".into() },
        ]);
        assert!(matches!(many, Err(ValidationError::Multiple(ref v)) if v.len() == 2));
    }
}
