//! Error types for the estimators.

use riemannstat_core::error::GeometryError;
use thiserror::Error;

/// Errors that can occur while fitting an estimator.
#[derive(Debug, Clone, Error)]
pub enum EstimatorError {
    /// Invalid estimator configuration.
    ///
    /// This error occurs when an estimator is configured or called with
    /// inconsistent parameters (e.g. a weight vector whose length does not
    /// match the dataset).
    #[error("Invalid estimator configuration: {reason}")]
    InvalidConfiguration {
        /// Description of the configuration error
        reason: String,
    },

    /// The dataset is empty.
    #[error("Cannot fit an estimator on an empty dataset")]
    EmptyDataset,

    /// Propagated geometry error.
    ///
    /// This error wraps metric and group-action errors that occur during
    /// estimator iterations.
    #[error("Geometric operation failed: {0}")]
    Geometry(#[from] GeometryError),
}

impl EstimatorError {
    /// Create an InvalidConfiguration error.
    pub fn invalid_configuration<S: Into<String>>(reason: S) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}

/// Result type alias for estimator operations.
pub type EstimatorResult<T> = std::result::Result<T, EstimatorError>;
