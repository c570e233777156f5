use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The provided value was empty or blank.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// A numeric field must be strictly positive.
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    /// A numeric field must not be below zero.
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    /// A numeric field must be a finite number.
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    /// A string did not name any known variant.
    #[error("unknown {field}: {value}")]
    UnknownVariant { field: &'static str, value: String },
}
