//! Error types for Grace operations.
//!
//! Validation happens at the boundary: at construction, or on the call that
//! receives an external grid. Step bodies never fail.

use thiserror::Error;

/// Result type for Grace operations.
pub type Result<T> = std::result::Result<T, GraceError>;

/// Errors that can occur when building or feeding a simulation component.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraceError {
    /// An externally supplied grid or array cannot be interpreted as
    /// a finite 2D numeric array of the expected extent.
    #[error("Invalid input shape: {0}")]
    InvalidInputShape(String),

    /// A configuration parameter is outside its valid domain.
    #[error("Invalid configuration for {field}: {value} ({reason})")]
    InvalidConfiguration {
        field: String,
        value: String,
        reason: String,
    },
}

// Convenience constructors
impl GraceError {
    pub fn invalid_shape(msg: impl Into<String>) -> Self {
        GraceError::InvalidInputShape(msg.into())
    }

    pub fn invalid_config(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        GraceError::InvalidConfiguration {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Parameter checks shared by the component configs.
pub mod check {
    use super::{GraceError, Result};

    /// Value must be finite.
    pub fn finite(field: &str, value: f64) -> Result<()> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(GraceError::invalid_config(field, value, "must be finite"))
        }
    }

    /// Value must be finite and >= 0.
    pub fn non_negative(field: &str, value: f64) -> Result<()> {
        finite(field, value)?;
        if value < 0.0 {
            return Err(GraceError::invalid_config(field, value, "must be >= 0"));
        }
        Ok(())
    }

    /// Value must be finite and > 0.
    pub fn positive(field: &str, value: f64) -> Result<()> {
        finite(field, value)?;
        if value <= 0.0 {
            return Err(GraceError::invalid_config(field, value, "must be > 0"));
        }
        Ok(())
    }

    /// Value must lie in [0, 1].
    pub fn unit_interval(field: &str, value: f64) -> Result<()> {
        finite(field, value)?;
        if !(0.0..=1.0).contains(&value) {
            return Err(GraceError::invalid_config(field, value, "must be in [0, 1]"));
        }
        Ok(())
    }

    /// Count must be at least `min`.
    pub fn at_least(field: &str, value: usize, min: usize) -> Result<()> {
        if value < min {
            return Err(GraceError::invalid_config(
                field,
                value,
                format!("must be >= {}", min),
            ));
        }
        Ok(())
    }
}
