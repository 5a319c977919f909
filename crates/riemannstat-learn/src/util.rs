//! Shared helpers for the iterative estimators.

use crate::error::{EstimatorError, EstimatorResult};
use riemannstat_core::types::Scalar;

/// Emits the non-convergence warning when the iteration cap was exhausted.
///
/// Reaching the cap is not an error: the estimate is still returned and the
/// caller can inspect the convergence flag.
pub(crate) fn warn_max_iterations(iteration: usize, max_iter: usize) {
    if iteration == max_iter {
        tracing::warn!(
            max_iter,
            "maximum number of iterations reached; the estimate may be inaccurate"
        );
    }
}

/// Normalized per-sample weights: uniform when absent, rescaled to sum to
/// one otherwise.
pub(crate) fn normalize_weights<T: Scalar>(
    n_samples: usize,
    weights: Option<&[T]>,
) -> EstimatorResult<Vec<T>> {
    match weights {
        None => {
            let uniform = T::one() / <T as riemannstat_core::types::Scalar>::from_usize(n_samples);
            Ok(vec![uniform; n_samples])
        }
        Some(weights) => {
            if weights.len() != n_samples {
                return Err(EstimatorError::invalid_configuration(format!(
                    "expected {} weights, got {}",
                    n_samples,
                    weights.len()
                )));
            }
            let total = weights.iter().fold(T::zero(), |acc, &w| acc + w);
            if total <= T::zero() {
                return Err(EstimatorError::invalid_configuration(
                    "weights must have a positive sum",
                ));
            }
            Ok(weights.iter().map(|&w| w / total).collect())
        }
    }
}
