//! Fréchet mean estimation.
//!
//! The Fréchet mean of a dataset is the point minimizing the sum of squared
//! geodesic distances to the samples. It is computed here by the Karcher
//! flow: average the logarithms of the samples at the current estimate and
//! take one exponential step in the averaged direction, until the averaged
//! tangent vector is small enough.
//!
//! On a flat metric the first step already lands on the arithmetic mean.

use crate::{
    error::{EstimatorError, EstimatorResult},
    util::{normalize_weights, warn_max_iterations},
};
use riemannstat_core::{batch, metric::RiemannianMetric, point::PointRepr, types::Scalar};

/// Configuration of the Fréchet mean estimator.
///
/// The estimator is a pure configuration object: `fit` borrows the metric
/// and the dataset and returns an immutable [`FrechetMeanFit`].
#[derive(Debug, Clone)]
pub struct FrechetMean<T: Scalar, P> {
    epsilon: T,
    max_iter: usize,
    step_size: T,
    init_point: Option<P>,
}

impl<T: Scalar, P> Default for FrechetMean<T, P> {
    fn default() -> Self {
        Self {
            epsilon: <T as Scalar>::from_f64(1e-6),
            max_iter: 32,
            step_size: T::one(),
            init_point: None,
        }
    }
}

impl<T: Scalar, P> FrechetMean<T, P> {
    /// Creates a new estimator with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the convergence tolerance on the averaged tangent norm.
    pub fn with_epsilon(mut self, epsilon: T) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Sets the iteration cap.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Sets the step size of the Karcher flow.
    pub fn with_step_size(mut self, step_size: T) -> Self {
        self.step_size = step_size;
        self
    }

    /// Sets the initial estimate; the first sample is used otherwise.
    pub fn with_init_point(mut self, init_point: P) -> Self {
        self.init_point = Some(init_point);
        self
    }
}

impl<T: Scalar, P: PointRepr<T>> FrechetMean<T, P> {
    /// Fits the Fréchet mean of `points` under `metric`.
    ///
    /// Optional `weights` are normalized to sum to one; uniform weights are
    /// used when absent. Reaching the iteration cap logs a warning and
    /// returns the last estimate with `converged == false`.
    pub fn fit<M>(
        &self,
        metric: &M,
        points: &[P],
        weights: Option<&[T]>,
    ) -> EstimatorResult<FrechetMeanFit<P>>
    where
        M: RiemannianMetric<T, Point = P>,
    {
        if points.is_empty() {
            return Err(EstimatorError::EmptyDataset);
        }
        let weights = normalize_weights(points.len(), weights)?;

        let mut estimate = match &self.init_point {
            Some(init) => init.clone(),
            None => points[0].clone(),
        };

        let mut n_iter = 0;
        let mut converged = false;
        while n_iter < self.max_iter {
            n_iter += 1;

            let logs = batch::logs_at(metric, points, &estimate)?;
            let mut mean_tangent = estimate.zeros_like();
            for (log, &weight) in logs.iter().zip(&weights) {
                mean_tangent = mean_tangent.add(&log.scaled(weight));
            }

            let gradient_norm = metric.norm(&mean_tangent, &estimate)?;
            if gradient_norm <= self.epsilon {
                converged = true;
                break;
            }
            estimate = metric.exp(&mean_tangent.scaled(self.step_size), &estimate)?;
        }

        if !converged {
            warn_max_iterations(n_iter, self.max_iter);
        }

        Ok(FrechetMeanFit {
            estimate,
            n_iter,
            converged,
        })
    }
}

/// Outcome of a Fréchet mean fit.
#[derive(Debug, Clone)]
pub struct FrechetMeanFit<P> {
    /// The estimated mean.
    pub estimate: P,
    /// Number of iterations performed.
    pub n_iter: usize,
    /// Whether the averaged tangent norm reached the tolerance.
    pub converged: bool,
}
