//! Numeric validation utilities
//!
//! Range and finiteness checks for operation parameters, so slider values
//! and filter arguments fail with a descriptive `InvalidParameter` instead
//! of silently producing garbage pixels.

use crate::error::{EditorError, Result};

/// Validator for numeric operation parameters
pub struct NumericValidator;

impl NumericValidator {
    /// Reject NaN and infinities
    pub fn validate_finite(value: f32, name: &str) -> Result<f32> {
        if !value.is_finite() {
            return Err(EditorError::invalid_parameter(format!(
                "{} must be finite, got {}",
                name, value
            )));
        }
        Ok(value)
    }

    /// Validate a fraction (0.0 to 1.0)
    pub fn validate_unit_interval(value: f32, name: &str) -> Result<f32> {
        Self::validate_finite(value, name)?;
        Self::validate_range(value, 0.0, 1.0, name)
    }

    /// Validate numeric range (inclusive)
    pub fn validate_range<T>(value: T, min: T, max: T, name: &str) -> Result<T>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if value < min || value > max {
            return Err(EditorError::invalid_parameter(format!(
                "{} must be between {} and {}, got {}",
                name, min, max, value
            )));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_finite() {
        assert!(NumericValidator::validate_finite(0.0, "test").is_ok());
        assert!(NumericValidator::validate_finite(f32::NAN, "test").is_err());
        assert!(NumericValidator::validate_finite(f32::NEG_INFINITY, "test").is_err());
    }

    #[test]
    fn test_validate_unit_interval() {
        assert!(NumericValidator::validate_unit_interval(0.0, "alpha").is_ok());
        assert!(NumericValidator::validate_unit_interval(0.5, "alpha").is_ok());
        assert!(NumericValidator::validate_unit_interval(1.0, "alpha").is_ok());

        assert!(NumericValidator::validate_unit_interval(-0.1, "alpha").is_err());
        assert!(NumericValidator::validate_unit_interval(1.1, "alpha").is_err());
        assert!(NumericValidator::validate_unit_interval(f32::NAN, "alpha").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(NumericValidator::validate_range(50, 0, 100, "test").is_ok());
        assert!(NumericValidator::validate_range(0, 0, 100, "test").is_ok());
        assert!(NumericValidator::validate_range(100, 0, 100, "test").is_ok());

        assert!(NumericValidator::validate_range(-1, 0, 100, "test").is_err());
        let err = NumericValidator::validate_range(101, 0, 100, "radius").unwrap_err();
        assert!(matches!(err, EditorError::InvalidParameter(_)));
        assert!(err.to_string().contains("radius must be between 0 and 100, got 101"));
    }
}
