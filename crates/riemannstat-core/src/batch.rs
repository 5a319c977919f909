//! Batched helpers over the sample axis.
//!
//! Datasets are slices of points, one array per sample. The helpers here
//! map metric operations across a dataset and are the only place where the
//! library parallelizes: estimator loops call into them instead of spawning
//! work themselves.

use crate::{
    error::{GeometryError, Result},
    metric::RiemannianMetric,
    types::Scalar,
};
use rayon::prelude::*;

/// Distance from `base_point` to every point of the dataset.
pub fn dists_to_point<T, M>(
    metric: &M,
    points: &[M::Point],
    base_point: &M::Point,
) -> Result<Vec<T>>
where
    T: Scalar,
    M: RiemannianMetric<T>,
{
    points
        .par_iter()
        .map(|point| metric.dist(base_point, point))
        .collect()
}

/// Logarithm of every point of the dataset at `base_point`.
pub fn logs_at<T, M>(
    metric: &M,
    points: &[M::Point],
    base_point: &M::Point,
) -> Result<Vec<M::Point>>
where
    T: Scalar,
    M: RiemannianMetric<T>,
{
    points
        .par_iter()
        .map(|point| metric.log(point, base_point))
        .collect()
}

/// Exponential of every tangent vector at `base_point`.
pub fn exps_at<T, M>(
    metric: &M,
    tangent_vecs: &[M::Point],
    base_point: &M::Point,
) -> Result<Vec<M::Point>>
where
    T: Scalar,
    M: RiemannianMetric<T>,
{
    tangent_vecs
        .par_iter()
        .map(|tangent_vec| metric.exp(tangent_vec, base_point))
        .collect()
}

/// Distance between paired samples of two datasets of equal length.
pub fn paired_dists<T, M>(
    metric: &M,
    points_a: &[M::Point],
    points_b: &[M::Point],
) -> Result<Vec<T>>
where
    T: Scalar,
    M: RiemannianMetric<T>,
{
    if points_a.len() != points_b.len() {
        return Err(GeometryError::dimension_mismatch(
            format!("{} samples", points_a.len()),
            format!("{} samples", points_b.len()),
        ));
    }
    points_a
        .par_iter()
        .zip(points_b.par_iter())
        .map(|(a, b)| metric.dist(a, b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flat::FlatMetric;
    use crate::types::DVector;

    #[test]
    fn test_dists_to_point() {
        let metric = FlatMetric::<f64>::new(2);
        let base = DVector::zeros(2);
        let points = vec![
            DVector::from_vec(vec![3.0, 4.0]),
            DVector::from_vec(vec![1.0, 0.0]),
            DVector::zeros(2),
        ];
        let dists = dists_to_point(&metric, &points, &base).unwrap();
        assert_eq!(dists, vec![5.0, 1.0, 0.0]);
    }

    #[test]
    fn test_logs_and_exps_round_trip() {
        let metric = FlatMetric::<f64>::new(2);
        let base = DVector::from_vec(vec![1.0, 1.0]);
        let points = vec![
            DVector::from_vec(vec![2.0, 3.0]),
            DVector::from_vec(vec![0.0, 0.0]),
        ];
        let logs = logs_at(&metric, &points, &base).unwrap();
        let back = exps_at(&metric, &logs, &base).unwrap();
        assert_eq!(back, points);
    }

    #[test]
    fn test_paired_dists_checks_lengths() {
        let metric = FlatMetric::<f64>::new(1);
        let a = vec![DVector::from_vec(vec![0.0])];
        let b = vec![
            DVector::from_vec(vec![1.0]),
            DVector::from_vec(vec![2.0]),
        ];
        assert!(paired_dists(&metric, &a, &b).is_err());

        let b = vec![DVector::from_vec(vec![2.0])];
        assert_eq!(paired_dists(&metric, &a, &b).unwrap(), vec![2.0]);
    }
}
