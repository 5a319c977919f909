//! Align-all-and-compute estimators.
//!
//! The AAC family alternates two phases on a quotient space: align every
//! sample to the current reference through the group action, then refit the
//! reference in the aligned frame. The reference is a Fréchet mean
//! ([`AacFrechet`]), a leading principal geodesic ([`AacGpc`]) or a linear
//! regression target ([`AacRegression`]).
//!
//! The loop stops when the progress signal (distance between successive
//! references, or the change in leading explained-variance ratio) falls
//! within the tolerance, or at the iteration cap — the cap is not an error:
//! a warning is logged and the last reference is returned with
//! `converged == false`.
//!
//! When no initial reference is supplied, one is drawn uniformly from the
//! samples; seed the draw with `with_seed` to make fits reproducible.

use crate::{
    error::{EstimatorError, EstimatorResult},
    frechet_mean::FrechetMean,
    pca::EuclideanPca,
    regression::{LinearModel, LinearModelFit},
    util::warn_max_iterations,
};
use num_traits::Float;
use rand::{rngs::StdRng, Rng, SeedableRng};
use riemannstat_core::{
    batch,
    graph_space::Alignment,
    metric::RiemannianMetric,
    point::PointRepr,
    types::{DVector, Scalar},
};

/// Reference used to start an alternating fit: an explicit point, or a
/// sample drawn uniformly (seeded when requested).
fn initial_reference<P: Clone>(points: &[P], init_point: Option<&P>, seed: Option<u64>) -> P {
    if let Some(init) = init_point {
        return init.clone();
    }
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    points[rng.gen_range(0..points.len())].clone()
}

/// Fréchet mean on a quotient space by alternating alignment and
/// total-space averaging.
#[derive(Debug, Clone)]
pub struct AacFrechet<T: Scalar, P> {
    epsilon: T,
    max_iter: usize,
    init_point: Option<P>,
    seed: Option<u64>,
    mean_estimator: FrechetMean<T, P>,
}

impl<T: Scalar, P> Default for AacFrechet<T, P> {
    fn default() -> Self {
        Self {
            epsilon: <T as Scalar>::from_f64(1e-6),
            max_iter: 20,
            init_point: None,
            seed: None,
            mean_estimator: FrechetMean::default(),
        }
    }
}

impl<T: Scalar, P> AacFrechet<T, P> {
    /// Creates a new estimator with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tolerance on the distance between successive estimates.
    pub fn with_epsilon(mut self, epsilon: T) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Sets the iteration cap.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Sets the initial reference explicitly.
    pub fn with_init_point(mut self, init_point: P) -> Self {
        self.init_point = Some(init_point);
        self
    }

    /// Seeds the random draw of the initial reference.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replaces the inner Fréchet mean configuration.
    pub fn with_mean_estimator(mut self, mean_estimator: FrechetMean<T, P>) -> Self {
        self.mean_estimator = mean_estimator;
        self
    }
}

impl<T: Scalar, P: PointRepr<T>> AacFrechet<T, P> {
    /// Fits the quotient-space Fréchet mean of `points`.
    pub fn fit<A>(&self, metric: &A, points: &[P]) -> EstimatorResult<AacFrechetFit<P>>
    where
        A: Alignment<T>,
        A::Metric: RiemannianMetric<T, Point = P>,
    {
        if points.is_empty() {
            return Err(EstimatorError::EmptyDataset);
        }
        let total = metric.total_space_metric();

        let mut previous_estimate =
            initial_reference(points, self.init_point.as_ref(), self.seed);
        let mut aligned: Vec<P> = points.to_vec();

        let mut n_iter = 0;
        let mut converged = false;
        while n_iter < self.max_iter {
            n_iter += 1;

            aligned = metric.align_point_to_point(&previous_estimate, &aligned)?;
            let mean_fit = self.mean_estimator.fit(total, &aligned, None)?;
            let error = total.dist(&previous_estimate, &mean_fit.estimate)?;
            previous_estimate = mean_fit.estimate;

            if error <= self.epsilon {
                converged = true;
                break;
            }
        }

        if !converged {
            warn_max_iterations(n_iter, self.max_iter);
        }

        Ok(AacFrechetFit {
            estimate: previous_estimate,
            n_iter,
            converged,
        })
    }
}

/// Outcome of an [`AacFrechet`] fit.
#[derive(Debug, Clone)]
pub struct AacFrechetFit<P> {
    /// The estimated quotient-space mean.
    pub estimate: P,
    /// Number of align/refit rounds performed.
    pub n_iter: usize,
    /// Whether successive estimates came within the tolerance.
    pub converged: bool,
}

/// Leading principal geodesic on a quotient space by alternating alignment
/// and tangent PCA.
#[derive(Debug, Clone)]
pub struct AacGpc<T: Scalar, P> {
    epsilon: T,
    max_iter: usize,
    n_components: usize,
    init_point: Option<P>,
    seed: Option<u64>,
}

impl<T: Scalar, P> Default for AacGpc<T, P> {
    fn default() -> Self {
        Self {
            epsilon: <T as Scalar>::from_f64(1e-6),
            max_iter: 20,
            n_components: 2,
            init_point: None,
            seed: None,
        }
    }
}

impl<T: Scalar, P> AacGpc<T, P> {
    /// Creates a new estimator with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tolerance on the change of the leading explained-variance
    /// ratio.
    pub fn with_epsilon(mut self, epsilon: T) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Sets the iteration cap.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Sets the number of principal components kept by the inner PCA.
    pub fn with_n_components(mut self, n_components: usize) -> Self {
        self.n_components = n_components;
        self
    }

    /// Sets the initial reference explicitly.
    pub fn with_init_point(mut self, init_point: P) -> Self {
        self.init_point = Some(init_point);
        self
    }

    /// Seeds the random draw of the initial reference.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl<T: Scalar, P: PointRepr<T>> AacGpc<T, P> {
    /// Fits the leading principal geodesic of `points`.
    pub fn fit<A>(&self, metric: &A, points: &[P]) -> EstimatorResult<AacGpcFit<T, P>>
    where
        A: Alignment<T>,
        A::Metric: RiemannianMetric<T, Point = P>,
    {
        if points.is_empty() {
            return Err(EstimatorError::EmptyDataset);
        }
        let total = metric.total_space_metric();
        let pca = EuclideanPca::new(self.n_components);

        let reference = initial_reference(points, self.init_point.as_ref(), self.seed);
        let mut aligned = metric.align_point_to_point(&reference, points)?;
        let mut pca_fit = pca.fit(&aligned)?;
        let mut previous_ratio = pca_fit.explained_variance_ratio[0];

        let mut n_iter = 0;
        let mut converged = false;
        while n_iter < self.max_iter {
            n_iter += 1;

            let mean = pca_fit.mean_point()?;
            let direction = pca_fit.component_point(0)?;
            let geodesic = total.geodesic(&mean, None, Some(&direction))?;

            aligned = metric.align_point_to_geodesic(&geodesic, &aligned)?;
            pca_fit = pca.fit(&aligned)?;
            let ratio = pca_fit.explained_variance_ratio[0];
            let error = <T as Float>::abs(ratio - previous_ratio);
            previous_ratio = ratio;

            if error <= self.epsilon {
                converged = true;
                break;
            }
        }

        if !converged {
            warn_max_iterations(n_iter, self.max_iter);
        }

        let mean = pca_fit.mean_point()?;
        let principal_direction = pca_fit.component_point(0)?;
        Ok(AacGpcFit {
            mean,
            principal_direction,
            explained_variance: pca_fit.explained_variance.clone(),
            explained_variance_ratio: pca_fit.explained_variance_ratio.clone(),
            singular_values: pca_fit.singular_values.clone(),
            n_iter,
            converged,
        })
    }
}

/// Outcome of an [`AacGpc`] fit.
#[derive(Debug, Clone)]
pub struct AacGpcFit<T: Scalar, P> {
    /// Mean of the aligned samples.
    pub mean: P,
    /// Leading principal direction in the aligned frame.
    pub principal_direction: P,
    /// Variance explained by each kept component.
    pub explained_variance: Vec<T>,
    /// Fraction of the total variance explained by each kept component.
    pub explained_variance_ratio: Vec<T>,
    /// Leading singular values of the aligned, centered data.
    pub singular_values: Vec<T>,
    /// Number of align/refit rounds performed.
    pub n_iter: usize,
    /// Whether the explained-variance ratio stabilized within the
    /// tolerance.
    pub converged: bool,
}

/// Regression onto a quotient space by alternating alignment and linear
/// least squares.
#[derive(Debug, Clone)]
pub struct AacRegression<T: Scalar, P> {
    epsilon: T,
    max_iter: usize,
    init_point: Option<P>,
    seed: Option<u64>,
    model: LinearModel,
}

impl<T: Scalar, P> Default for AacRegression<T, P> {
    fn default() -> Self {
        Self {
            epsilon: <T as Scalar>::from_f64(1e-6),
            max_iter: 20,
            init_point: None,
            seed: None,
            model: LinearModel::default(),
        }
    }
}

impl<T: Scalar, P> AacRegression<T, P> {
    /// Creates a new estimator with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tolerance on the summed distance between successive
    /// predictions.
    pub fn with_epsilon(mut self, epsilon: T) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Sets the iteration cap.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Sets the initial reference target explicitly.
    pub fn with_init_point(mut self, init_point: P) -> Self {
        self.init_point = Some(init_point);
        self
    }

    /// Seeds the random draw of the initial reference target.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replaces the inner linear model configuration.
    pub fn with_model(mut self, model: LinearModel) -> Self {
        self.model = model;
        self
    }
}

impl<T: Scalar, P: PointRepr<T>> AacRegression<T, P> {
    /// Fits a linear model from covariates `x` to quotient-space targets
    /// `y`.
    pub fn fit<A>(
        &self,
        metric: &A,
        x: &[DVector<T>],
        y: &[P],
    ) -> EstimatorResult<AacRegressionFit<T, P>>
    where
        A: Alignment<T>,
        A::Metric: RiemannianMetric<T, Point = P>,
    {
        if x.is_empty() || y.is_empty() {
            return Err(EstimatorError::EmptyDataset);
        }
        let total = metric.total_space_metric();

        let reference = initial_reference(y, self.init_point.as_ref(), self.seed);
        let mut aligned = metric.align_point_to_point(&reference, y)?;
        let mut model_fit = self.model.fit(x, &aligned)?;
        let mut previous_predictions = model_fit.predict(x)?;

        let mut n_iter = 0;
        let mut converged = false;
        while n_iter < self.max_iter {
            n_iter += 1;

            aligned = metric.align_pairwise(&previous_predictions, &aligned)?;
            model_fit = self.model.fit(x, &aligned)?;
            let predictions = model_fit.predict(x)?;

            let dists = batch::paired_dists(total, &previous_predictions, &predictions)?;
            let error = dists.iter().fold(T::zero(), |acc, &d| acc + d);
            previous_predictions = predictions;

            if error <= self.epsilon {
                converged = true;
                break;
            }
        }

        if !converged {
            warn_max_iterations(n_iter, self.max_iter);
        }

        Ok(AacRegressionFit {
            model: model_fit,
            n_iter,
            converged,
        })
    }
}

/// Outcome of an [`AacRegression`] fit.
#[derive(Debug, Clone)]
pub struct AacRegressionFit<T: Scalar, P> {
    /// The fitted linear model over the aligned targets.
    pub model: LinearModelFit<T, P>,
    /// Number of align/refit rounds performed.
    pub n_iter: usize,
    /// Whether successive predictions came within the tolerance.
    pub converged: bool,
}

impl<T: Scalar, P: PointRepr<T>> AacRegressionFit<T, P> {
    /// Predicted points for a batch of covariate vectors.
    pub fn predict(&self, x: &[DVector<T>]) -> EstimatorResult<Vec<P>> {
        self.model.predict(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use riemannstat_core::action::{GroupAction, Permutation, PermutationAction};
    use riemannstat_core::graph_space::GraphSpaceMetric;
    use riemannstat_core::types::DMatrix;

    fn path_graph() -> DMatrix<f64> {
        DMatrix::from_row_slice(
            3,
            3,
            &[
                0.0, 1.0, 0.0, //
                1.0, 0.0, 1.0, //
                0.0, 1.0, 0.0,
            ],
        )
    }

    fn permuted_orbit(reference: &DMatrix<f64>) -> Vec<DMatrix<f64>> {
        let action = PermutationAction::<f64>::new();
        [
            vec![0, 1, 2],
            vec![1, 0, 2],
            vec![2, 1, 0],
            vec![1, 2, 0],
        ]
        .into_iter()
        .map(|indices| action.apply(&Permutation::new(indices).unwrap(), reference))
        .collect()
    }

    #[test]
    fn test_frechet_recovers_orbit_representative() {
        let metric = GraphSpaceMetric::<f64>::new(3).unwrap();
        let reference = path_graph();
        let samples = permuted_orbit(&reference);

        let fit = AacFrechet::new()
            .with_init_point(reference.clone())
            .fit(&metric, &samples)
            .unwrap();

        assert!(fit.converged);
        assert_relative_eq!(
            metric.quotient_dist(&reference, &fit.estimate).unwrap(),
            0.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_frechet_is_deterministic_with_init_point() {
        let metric = GraphSpaceMetric::<f64>::new(3).unwrap();
        let samples = permuted_orbit(&path_graph());

        let estimator = AacFrechet::new().with_init_point(samples[1].clone());
        let first = estimator.fit(&metric, &samples).unwrap();
        let second = estimator.fit(&metric, &samples).unwrap();

        assert_eq!(first.estimate, second.estimate);
        assert_eq!(first.n_iter, second.n_iter);
    }

    #[test]
    fn test_frechet_is_deterministic_with_seed() {
        let metric = GraphSpaceMetric::<f64>::new(3).unwrap();
        let samples = permuted_orbit(&path_graph());

        let estimator = AacFrechet::new().with_seed(42);
        let first = estimator.fit(&metric, &samples).unwrap();
        let second = estimator.fit(&metric, &samples).unwrap();

        assert_eq!(first.estimate, second.estimate);
        assert_eq!(first.n_iter, second.n_iter);
    }

    #[test]
    fn test_frechet_zero_max_iter_still_returns_estimate() {
        let metric = GraphSpaceMetric::<f64>::new(3).unwrap();
        let samples = permuted_orbit(&path_graph());
        let init = samples[0].clone();

        let fit = AacFrechet::new()
            .with_init_point(init.clone())
            .with_max_iter(0)
            .fit(&metric, &samples)
            .unwrap();

        assert!(!fit.converged);
        assert_eq!(fit.n_iter, 0);
        assert_eq!(fit.estimate, init);
    }

    #[test]
    fn test_gpc_on_a_line_of_graphs() {
        let metric = GraphSpaceMetric::<f64>::new(3).unwrap();
        let base = path_graph();

        // Graphs along a single direction in total space, with node labels
        // scrambled.
        let action = PermutationAction::<f64>::new();
        let scramble = Permutation::new(vec![2, 0, 1]).unwrap();
        let samples: Vec<DMatrix<f64>> = (0..5)
            .map(|k| {
                let graph = &base * (1.0 + k as f64);
                if k % 2 == 0 {
                    graph
                } else {
                    action.apply(&scramble, &graph)
                }
            })
            .collect();

        let fit = AacGpc::new()
            .with_init_point(base.clone())
            .fit(&metric, &samples)
            .unwrap();

        assert!(fit.converged);
        // All variance concentrates on the single shared direction.
        assert_relative_eq!(fit.explained_variance_ratio[0], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_regression_recovers_linear_trend() {
        let metric = GraphSpaceMetric::<f64>::new(3).unwrap();
        let base = path_graph();
        let action = PermutationAction::<f64>::new();
        let scramble = Permutation::new(vec![1, 2, 0]).unwrap();

        let x: Vec<DVector<f64>> = (0..4)
            .map(|t| DVector::from_vec(vec![t as f64]))
            .collect();
        let y: Vec<DMatrix<f64>> = (0..4)
            .map(|t| {
                let graph = &base * (t as f64 + 1.0);
                if t % 2 == 1 {
                    action.apply(&scramble, &graph)
                } else {
                    graph
                }
            })
            .collect();

        let fit = AacRegression::new()
            .with_init_point(base.clone())
            .fit(&metric, &x, &y)
            .unwrap();
        assert!(fit.converged);

        let prediction = &fit.predict(&x[2..3]).unwrap()[0];
        // In the aligned frame the trend is G * (t + 1).
        assert_relative_eq!(prediction.clone(), &base * 3.0, epsilon = 1e-6);
    }
}
