//! Flat Riemannian metrics.
//!
//! A flat metric has an inner product independent of the base point. The
//! exponential map is vector addition, the logarithm is subtraction and
//! parallel transport is the identity; the injectivity radius is infinite
//! everywhere.
//!
//! [`FlatMetric`] covers vector-shaped points and carries an explicit
//! (constant) metric matrix. [`MatrixFlatMetric`] covers matrix-shaped
//! points with the Frobenius inner product; matrix-valued queries (metric
//! matrix, its derivative, Christoffel symbols) have no closed form over
//! matrix-shaped points and report `NotImplemented`.

use crate::{
    error::{GeometryError, Result},
    metric::RiemannianMetric,
    space::SpaceSpec,
    types::{DMatrix, DVector, Scalar},
};
use num_traits::Float;
use std::marker::PhantomData;

/// Flat metric over vector-shaped points.
///
/// The metric matrix is fixed at construction (identity by default) and
/// must be symmetric positive definite.
#[derive(Debug, Clone)]
pub struct FlatMetric<T: Scalar> {
    space: SpaceSpec,
    metric_matrix: DMatrix<T>,
}

impl<T: Scalar> FlatMetric<T> {
    /// Euclidean metric on vectors of length `dim`.
    pub fn new(dim: usize) -> Self {
        Self {
            space: SpaceSpec::vector(dim),
            metric_matrix: DMatrix::identity(dim, dim),
        }
    }

    /// Flat metric with a user-supplied inner-product matrix.
    ///
    /// # Errors
    ///
    /// Fails with `DimensionMismatch` if the matrix shape is not
    /// `(dim, dim)`, and with `InvalidConfiguration`/`NumericalError` if it
    /// is not symmetric positive definite.
    pub fn with_matrix(dim: usize, metric_matrix: DMatrix<T>) -> Result<Self> {
        if metric_matrix.nrows() != dim || metric_matrix.ncols() != dim {
            return Err(GeometryError::dimension_mismatch(
                format!("({dim}, {dim})"),
                format!("({}, {})", metric_matrix.nrows(), metric_matrix.ncols()),
            ));
        }

        for i in 0..dim {
            for j in i + 1..dim {
                let gap = <T as Float>::abs(metric_matrix[(i, j)] - metric_matrix[(j, i)]);
                if gap > T::DEFAULT_TOLERANCE {
                    return Err(GeometryError::invalid_configuration(
                        "metric matrix must be symmetric",
                    ));
                }
            }
        }

        let eigen = metric_matrix.clone().symmetric_eigen();
        let min_eigenvalue = eigen
            .eigenvalues
            .iter()
            .fold(<T as Float>::infinity(), |min, &val| {
                <T as Float>::min(min, val)
            });
        if min_eigenvalue <= T::EPSILON {
            return Err(GeometryError::numerical_error(
                "metric matrix must be positive definite",
            ));
        }

        Ok(Self {
            space: SpaceSpec::vector(dim),
            metric_matrix,
        })
    }
}

impl<T: Scalar> RiemannianMetric<T> for FlatMetric<T> {
    type Point = DVector<T>;

    fn space(&self) -> &SpaceSpec {
        &self.space
    }

    fn metric_matrix(&self, _base_point: &DVector<T>) -> Result<DMatrix<T>> {
        Ok(self.metric_matrix.clone())
    }

    fn inner_product_derivative_matrix(
        &self,
        _base_point: &DVector<T>,
    ) -> Result<Vec<DMatrix<T>>> {
        let dim = self.space.dim;
        Ok(vec![DMatrix::zeros(dim, dim); dim])
    }

    fn christoffels(&self, _base_point: &DVector<T>) -> Result<Vec<DMatrix<T>>> {
        let dim = self.space.dim;
        Ok(vec![DMatrix::zeros(dim, dim); dim])
    }

    fn exp(&self, tangent_vec: &DVector<T>, base_point: &DVector<T>) -> Result<DVector<T>> {
        Ok(base_point + tangent_vec)
    }

    fn log(&self, point: &DVector<T>, base_point: &DVector<T>) -> Result<DVector<T>> {
        Ok(point - base_point)
    }

    fn parallel_transport(
        &self,
        tangent_vec: &DVector<T>,
        _base_point: &DVector<T>,
        _direction: Option<&DVector<T>>,
        _end_point: Option<&DVector<T>>,
    ) -> Result<DVector<T>> {
        // Copy semantics: downstream mutation must not reach the caller's
        // array.
        Ok(tangent_vec.clone())
    }

    fn injectivity_radius(&self, _base_point: &DVector<T>) -> Result<T> {
        Ok(<T as Float>::infinity())
    }
}

/// Flat metric over matrix-shaped points with the Frobenius inner product.
#[derive(Debug, Clone)]
pub struct MatrixFlatMetric<T: Scalar> {
    space: SpaceSpec,
    _scalar: PhantomData<T>,
}

impl<T: Scalar> MatrixFlatMetric<T> {
    /// Frobenius metric on `n x m` matrices.
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            space: SpaceSpec::matrix(n, m),
            _scalar: PhantomData,
        }
    }

    /// Frobenius metric on `n x n` matrices.
    pub fn square(n: usize) -> Self {
        Self::new(n, n)
    }
}

impl<T: Scalar> RiemannianMetric<T> for MatrixFlatMetric<T> {
    type Point = DMatrix<T>;

    fn space(&self) -> &SpaceSpec {
        &self.space
    }

    fn inner_product(
        &self,
        tangent_vec_a: &DMatrix<T>,
        tangent_vec_b: &DMatrix<T>,
        _base_point: &DMatrix<T>,
    ) -> Result<T> {
        // Frobenius product tr(UᵗV).
        Ok(tangent_vec_a.dot(tangent_vec_b))
    }

    fn exp(&self, tangent_vec: &DMatrix<T>, base_point: &DMatrix<T>) -> Result<DMatrix<T>> {
        Ok(base_point + tangent_vec)
    }

    fn log(&self, point: &DMatrix<T>, base_point: &DMatrix<T>) -> Result<DMatrix<T>> {
        Ok(point - base_point)
    }

    fn parallel_transport(
        &self,
        tangent_vec: &DMatrix<T>,
        _base_point: &DMatrix<T>,
        _direction: Option<&DMatrix<T>>,
        _end_point: Option<&DMatrix<T>>,
    ) -> Result<DMatrix<T>> {
        Ok(tangent_vec.clone())
    }

    fn injectivity_radius(&self, _base_point: &DMatrix<T>) -> Result<T> {
        Ok(<T as Float>::infinity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exp_log_exact_inverses() {
        let metric = FlatMetric::<f64>::new(3);
        let p = DVector::from_vec(vec![1.0, -2.0, 0.5]);
        let v = DVector::from_vec(vec![0.1, 0.2, -0.3]);
        let q = DVector::from_vec(vec![4.0, 4.0, 4.0]);

        // Exact, not approximate.
        assert_eq!(metric.log(&metric.exp(&v, &p).unwrap(), &p).unwrap(), v);
        assert_eq!(metric.exp(&metric.log(&q, &p).unwrap(), &p).unwrap(), q);
    }

    #[test]
    fn test_parallel_transport_is_identity() {
        let metric = FlatMetric::<f64>::new(2);
        let p = DVector::from_vec(vec![0.0, 0.0]);
        let q = DVector::from_vec(vec![5.0, 5.0]);
        let v = DVector::from_vec(vec![1.0, 2.0]);

        let transported = metric
            .parallel_transport(&v, &p, None, Some(&q))
            .unwrap();
        assert_eq!(transported, v);

        // The result is a copy: mutating it must not touch the input.
        let mut transported = transported;
        transported[0] = 99.0;
        assert_eq!(v[0], 1.0);
    }

    #[test]
    fn test_injectivity_radius_is_infinite() {
        let metric = FlatMetric::<f64>::new(2);
        let p = DVector::from_vec(vec![3.0, -1.0]);
        assert_eq!(metric.injectivity_radius(&p).unwrap(), f64::INFINITY);
    }

    #[test]
    fn test_default_metric_matrix_is_identity() {
        let metric = FlatMetric::<f64>::new(3);
        let p = DVector::zeros(3);
        assert_eq!(metric.metric_matrix(&p).unwrap(), DMatrix::identity(3, 3));

        let v = DVector::from_vec(vec![3.0, 4.0, 0.0]);
        assert_eq!(metric.norm(&v, &p).unwrap(), 5.0);
    }

    #[test]
    fn test_with_matrix_rejects_bad_shape() {
        let matrix = DMatrix::<f64>::identity(2, 3);
        let result = FlatMetric::with_matrix(2, matrix);
        assert!(matches!(
            result,
            Err(GeometryError::DimensionMismatch { .. })
        ));

        let matrix = DMatrix::<f64>::identity(3, 3);
        let result = FlatMetric::with_matrix(2, matrix);
        assert!(matches!(
            result,
            Err(GeometryError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_with_matrix_rejects_asymmetric_and_indefinite() {
        let asymmetric = DMatrix::from_row_slice(2, 2, &[1.0, 0.5, -0.5, 1.0]);
        assert!(FlatMetric::with_matrix(2, asymmetric).is_err());

        let indefinite = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, -1.0]);
        assert!(FlatMetric::with_matrix(2, indefinite).is_err());
    }

    #[test]
    fn test_weighted_inner_product() {
        let weights = DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 3.0]);
        let metric = FlatMetric::with_matrix(2, weights).unwrap();
        let p = DVector::zeros(2);
        let v = DVector::from_vec(vec![1.0, 1.0]);
        assert_eq!(metric.inner_product(&v, &v, &p).unwrap(), 5.0);
    }

    #[test]
    fn test_flat_christoffels_vanish() {
        let metric = FlatMetric::<f64>::new(2);
        let p = DVector::zeros(2);
        let gamma = metric.christoffels(&p).unwrap();
        assert_eq!(gamma.len(), 2);
        for component in &gamma {
            assert_eq!(*component, DMatrix::zeros(2, 2));
        }
    }

    #[test]
    fn test_geodesic_broadcasts_over_times() {
        let metric = FlatMetric::<f64>::new(2);
        let p = DVector::from_vec(vec![0.0, 0.0]);
        let v = DVector::from_vec(vec![1.0, 0.0]);
        let path = metric.geodesic(&p, None, Some(&v)).unwrap();

        let times: Vec<f64> = (0..5).map(|k| k as f64 / 4.0).collect();
        let points = path.sample(&times).unwrap();
        assert_eq!(points.len(), 5);
        assert_relative_eq!(points[4][0], 1.0);
    }

    #[test]
    fn test_matrix_flat_metric_frobenius() {
        let metric = MatrixFlatMetric::<f64>::square(2);
        let p = DMatrix::zeros(2, 2);
        let u = DMatrix::identity(2, 2);
        let v = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 1.0, 0.0]);

        assert_eq!(metric.inner_product(&u, &v, &p).unwrap(), 0.0);
        assert_eq!(metric.inner_product(&u, &u, &p).unwrap(), 2.0);
    }

    #[test]
    fn test_matrix_flat_metric_has_no_metric_matrix() {
        let metric = MatrixFlatMetric::<f64>::square(2);
        let p = DMatrix::zeros(2, 2);
        assert!(matches!(
            metric.metric_matrix(&p),
            Err(GeometryError::NotImplemented { .. })
        ));
        assert!(matches!(
            metric.christoffels(&p),
            Err(GeometryError::NotImplemented { .. })
        ));
    }

    #[test]
    fn test_matrix_flat_metric_exp_log_and_dist() {
        let metric = MatrixFlatMetric::<f64>::square(2);
        let p = DMatrix::zeros(2, 2);
        let q = DMatrix::from_row_slice(2, 2, &[3.0, 0.0, 0.0, 4.0]);
        assert_eq!(metric.log(&q, &p).unwrap(), q);
        assert_relative_eq!(metric.dist(&p, &q).unwrap(), 5.0);
    }
}
