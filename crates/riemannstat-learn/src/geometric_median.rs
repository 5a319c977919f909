//! Geometric median estimation by the Weiszfeld algorithm.
//!
//! The geometric median minimizes the sum of (unsquared) geodesic distances
//! to the samples, making it robust to outliers. Each round reweights the
//! logarithms of the samples at the current median by `weight / distance`,
//! averages them and takes one exponential step scaled by the learning
//! rate.
//!
//! A zero total distance means the current median coincides with every
//! sample; the update short-circuits to a no-op instead of dividing by
//! zero.

use crate::{
    error::{EstimatorError, EstimatorResult},
    util::{normalize_weights, warn_max_iterations},
};
use riemannstat_core::{batch, metric::RiemannianMetric, point::PointRepr, types::Scalar};

/// Configuration of the Weiszfeld geometric-median estimator.
#[derive(Debug, Clone)]
pub struct WeiszfeldAlgorithm<T: Scalar, P> {
    max_iter: usize,
    lr: T,
    epsilon: T,
    init_point: Option<P>,
}

impl<T: Scalar, P> Default for WeiszfeldAlgorithm<T, P> {
    fn default() -> Self {
        Self {
            max_iter: 100,
            lr: T::one(),
            epsilon: <T as Scalar>::from_f64(1e-12),
            init_point: None,
        }
    }
}

impl<T: Scalar, P> WeiszfeldAlgorithm<T, P> {
    /// Creates a new estimator with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the iteration cap.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Sets the learning rate of the update step.
    pub fn with_lr(mut self, lr: T) -> Self {
        self.lr = lr;
        self
    }

    /// Sets the movement tolerance between successive medians.
    ///
    /// A negative tolerance disables early stopping: the loop then always
    /// runs `max_iter` rounds.
    pub fn with_epsilon(mut self, epsilon: T) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Sets the initial median; the first sample is used otherwise.
    pub fn with_init_point(mut self, init_point: P) -> Self {
        self.init_point = Some(init_point);
        self
    }
}

impl<T: Scalar, P: PointRepr<T>> WeiszfeldAlgorithm<T, P> {
    /// One Weiszfeld round from `current_median`.
    ///
    /// `weights` must already be normalized to a distribution. Returns the
    /// median unchanged when the total distance to the samples is exactly
    /// zero.
    pub fn single_iteration<M>(
        &self,
        metric: &M,
        current_median: &P,
        points: &[P],
        weights: &[T],
    ) -> EstimatorResult<P>
    where
        M: RiemannianMetric<T, Point = P>,
    {
        let dists = batch::dists_to_point(metric, points, current_median)?;
        let total = dists.iter().fold(T::zero(), |acc, &d| acc + d);
        if total == T::zero() {
            return Ok(current_median.clone());
        }

        let logs = batch::logs_at(metric, points, current_median)?;
        let mut weighted_tangent = current_median.zeros_like();
        let mut coefficient_sum = T::zero();
        for ((log, &dist), &weight) in logs.iter().zip(&dists).zip(weights) {
            // A sample coinciding with the current median has a vanishing
            // logarithm; its 1/dist coefficient is skipped instead of
            // dividing by zero.
            if dist == T::zero() {
                continue;
            }
            let coefficient = weight / dist;
            weighted_tangent = weighted_tangent.add(&log.scaled(coefficient));
            coefficient_sum += coefficient;
        }

        let step = weighted_tangent.scaled(self.lr / coefficient_sum);
        Ok(metric.exp(&step, current_median)?)
    }

    /// Fits the geometric median of `points` under `metric`.
    ///
    /// Optional `weights` are normalized to sum to one; uniform weights are
    /// used when absent.
    pub fn fit<M>(
        &self,
        metric: &M,
        points: &[P],
        weights: Option<&[T]>,
    ) -> EstimatorResult<WeiszfeldFit<P>>
    where
        M: RiemannianMetric<T, Point = P>,
    {
        if points.is_empty() {
            return Err(EstimatorError::EmptyDataset);
        }
        let weights = normalize_weights(points.len(), weights)?;

        let mut current_median = match &self.init_point {
            Some(init) => init.clone(),
            None => points[0].clone(),
        };

        let mut n_iter = 0;
        let mut converged = false;
        while n_iter < self.max_iter {
            n_iter += 1;

            let updated = self.single_iteration(metric, &current_median, points, &weights)?;
            let movement = metric.dist(&current_median, &updated)?;
            current_median = updated;

            if movement <= self.epsilon {
                converged = true;
                break;
            }
        }

        if !converged {
            warn_max_iterations(n_iter, self.max_iter);
        }

        Ok(WeiszfeldFit {
            estimate: current_median,
            n_iter,
            converged,
        })
    }
}

/// Outcome of a geometric-median fit.
#[derive(Debug, Clone)]
pub struct WeiszfeldFit<P> {
    /// The estimated median.
    pub estimate: P,
    /// Number of iterations performed.
    pub n_iter: usize,
    /// Whether the movement between successive medians reached the
    /// tolerance.
    pub converged: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use riemannstat_core::{flat::FlatMetric, types::DVector};

    #[test]
    fn test_zero_distance_guard() {
        let metric = FlatMetric::<f64>::new(2);
        let point = DVector::from_vec(vec![1.0, 2.0]);
        let points = vec![point.clone(), point.clone(), point.clone()];
        let weights = vec![1.0 / 3.0; 3];

        let estimator = WeiszfeldAlgorithm::new();
        let updated = estimator
            .single_iteration(&metric, &point, &points, &weights)
            .unwrap();
        assert_eq!(updated, point);
    }

    #[test]
    fn test_single_point_converges_after_one_iteration() {
        let metric = FlatMetric::<f64>::new(2);
        let point = DVector::from_vec(vec![-3.0, 0.5]);
        let points = vec![point.clone(), point.clone()];

        let fit = WeiszfeldAlgorithm::new()
            .fit(&metric, &points, Some(&[0.9, 0.1]))
            .unwrap();
        assert_eq!(fit.estimate, point);
        assert_eq!(fit.n_iter, 1);
        assert!(fit.converged);
    }

    #[test]
    fn test_median_is_robust_to_outlier() {
        let metric = FlatMetric::<f64>::new(2);
        let points = vec![
            DVector::from_vec(vec![0.0, 0.0]),
            DVector::from_vec(vec![2.0, 0.0]),
            DVector::from_vec(vec![0.0, 2.0]),
            DVector::from_vec(vec![2.0, 2.0]),
            DVector::from_vec(vec![100.0, 100.0]),
        ];

        let fit = WeiszfeldAlgorithm::new()
            .with_max_iter(200)
            .fit(&metric, &points, None)
            .unwrap();
        // The mean would be dragged to ~(20.8, 20.8); the median stays near
        // the bulk of the data.
        assert!(fit.estimate[0] < 3.0);
        assert!(fit.estimate[1] < 3.0);
    }

    #[test]
    fn test_symmetric_configuration_balances() {
        let metric = FlatMetric::<f64>::new(2);
        let points = vec![
            DVector::from_vec(vec![-1.0, 0.0]),
            DVector::from_vec(vec![1.0, 0.0]),
            DVector::from_vec(vec![0.0, -1.0]),
            DVector::from_vec(vec![0.0, 1.0]),
        ];

        let fit = WeiszfeldAlgorithm::new()
            .with_init_point(DVector::from_vec(vec![0.0, 0.0]))
            .fit(&metric, &points, None)
            .unwrap();
        // The center already balances the pulls: one no-op round suffices.
        assert_eq!(fit.n_iter, 1);
        assert!(fit.converged);
        assert_relative_eq!(fit.estimate, DVector::from_vec(vec![0.0, 0.0]), epsilon = 1e-12);
    }

    #[test]
    fn test_negative_epsilon_runs_to_cap() {
        let metric = FlatMetric::<f64>::new(1);
        let point = DVector::from_vec(vec![1.0]);
        let points = vec![point.clone(), point.clone()];

        let fit = WeiszfeldAlgorithm::new()
            .with_epsilon(-1.0)
            .with_max_iter(5)
            .fit(&metric, &points, None)
            .unwrap();
        assert_eq!(fit.n_iter, 5);
        assert!(!fit.converged);
        assert_eq!(fit.estimate, point);
    }

    #[test]
    fn test_empty_dataset_is_rejected() {
        let metric = FlatMetric::<f64>::new(1);
        let result = WeiszfeldAlgorithm::<f64, DVector<f64>>::new().fit(&metric, &[], None);
        assert!(matches!(result, Err(EstimatorError::EmptyDataset)));
    }
}
