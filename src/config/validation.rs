//! Configuration validation.
//!
//! # Responsibilities
//! - Reject missing or blank required values
//! - Parse optional numeric overrides
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Each error names the environment variable at fault
//! - Runs before any dependent component is constructed

use thiserror::Error;

/// A single problem with one environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Required variable absent or blank.
    #[error("{var} is not set")]
    Missing { var: &'static str },

    /// Variable present but not usable.
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ValidationError {
    /// The environment variable this error refers to.
    pub fn var(&self) -> &'static str {
        match self {
            ValidationError::Missing { var } | ValidationError::Invalid { var, .. } => var,
        }
    }
}

/// Require a non-blank value, recording an error otherwise.
///
/// A value that is only whitespace counts as missing. Anything else is
/// returned verbatim, surrounding whitespace included.
pub fn require(
    var: &'static str,
    value: Option<String>,
    errors: &mut Vec<ValidationError>,
) -> Option<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Some(v),
        _ => {
            errors.push(ValidationError::Missing { var });
            None
        }
    }
}

/// Parse an optional positive integer. Blank counts as absent.
pub fn optional_positive<T>(
    var: &'static str,
    value: Option<String>,
    errors: &mut Vec<ValidationError>,
) -> Option<T>
where
    T: std::str::FromStr + PartialOrd + Default,
    T::Err: std::fmt::Display,
{
    let raw = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())?;
    match raw.parse::<T>() {
        Ok(n) if n > T::default() => Some(n),
        Ok(_) => {
            errors.push(ValidationError::Invalid {
                var,
                reason: "must be greater than zero".to_string(),
            });
            None
        }
        Err(e) => {
            errors.push(ValidationError::Invalid {
                var,
                reason: e.to_string(),
            });
            None
        }
    }
}
