//! Error types for geometric operations.
//!
//! This module defines the core error types used throughout the library
//! for metric, group-action and numerical computations.

use thiserror::Error;

/// Errors that can occur during geometric operations.
#[derive(Debug, Clone, Error)]
pub enum GeometryError {
    /// Dimension mismatch between arrays.
    ///
    /// This error occurs when operations involve arrays with incompatible
    /// shapes, e.g. a metric matrix whose shape is not `(dim, dim)`.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions
        expected: String,
        /// Actual dimensions
        actual: String,
    },

    /// Invalid configuration of an operation.
    ///
    /// This error occurs when an operation is called with an inconsistent
    /// set of arguments, e.g. a geodesic defined by both an end point and
    /// an initial tangent vector.
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Description of the configuration error
        reason: String,
    },

    /// Numerical instability detected.
    ///
    /// This error occurs when numerical operations become unstable,
    /// such as inversion of a singular metric matrix or a shooting
    /// solver failing to converge.
    #[error("Numerical instability detected: {reason}")]
    NumericalError {
        /// Description of the numerical issue
        reason: String,
    },

    /// Operation not implemented for this metric or point shape.
    ///
    /// This error is used for operations that have no closed form on a
    /// given manifold, e.g. the metric matrix of a flat metric over
    /// matrix-shaped points.
    #[error("Operation not implemented: {feature}")]
    NotImplemented {
        /// Name of the unimplemented operation
        feature: String,
    },
}

impl GeometryError {
    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch<S1, S2>(expected: S1, actual: S2) -> Self
    where
        S1: std::fmt::Display,
        S2: std::fmt::Display,
    {
        Self::DimensionMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create an InvalidConfiguration error with a custom reason.
    pub fn invalid_configuration<S: Into<String>>(reason: S) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Create a NumericalError with a custom reason.
    pub fn numerical_error<S: Into<String>>(reason: S) -> Self {
        Self::NumericalError {
            reason: reason.into(),
        }
    }

    /// Create a NotImplemented error for a specific operation.
    pub fn not_implemented<S: Into<String>>(feature: S) -> Self {
        Self::NotImplemented {
            feature: feature.into(),
        }
    }
}

/// Result type alias for operations that can produce GeometryError.
pub type Result<T> = std::result::Result<T, GeometryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = GeometryError::dimension_mismatch("(3, 3)", "(4, 4)");
        assert!(matches!(err, GeometryError::DimensionMismatch { .. }));
        assert_eq!(
            err.to_string(),
            "Dimension mismatch: expected (3, 3), got (4, 4)"
        );

        let err = GeometryError::invalid_configuration("both end point and tangent vector given");
        assert!(matches!(err, GeometryError::InvalidConfiguration { .. }));
        assert_eq!(
            err.to_string(),
            "Invalid configuration: both end point and tangent vector given"
        );
    }

    #[test]
    fn test_error_display() {
        let errors = vec![
            GeometryError::dimension_mismatch("(2, 2)", "(2, 3)"),
            GeometryError::invalid_configuration("no endpoint"),
            GeometryError::numerical_error("singular metric matrix"),
            GeometryError::not_implemented("metric_matrix"),
        ];

        for err in errors {
            assert!(!err.to_string().is_empty());
        }
    }
}
