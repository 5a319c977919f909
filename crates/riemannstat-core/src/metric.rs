//! The Riemannian metric contract.
//!
//! A Riemannian metric g on a manifold M assigns to each point p an inner
//! product g_p on the tangent space T_p M. From the inner product and the
//! exponential/logarithmic maps everything else is derived: norms, geodesic
//! distance, geodesic curves and parallel transport.
//!
//! # Contract
//!
//! Implementations must satisfy, for all valid inputs:
//!
//! - `inner_product` is symmetric and positive definite;
//! - `exp` and `log` are mutual (approximate) inverses within the
//!   injectivity radius;
//! - `dist(p, p) == 0`.
//!
//! These properties are verified by the test suites rather than enforced at
//! runtime.
//!
//! Metrics are stateless with respect to points: a metric object is a pure
//! function over (point, tangent) pairs and can be shared freely across
//! concurrent estimator fits.

use crate::{
    error::{GeometryError, Result},
    point::PointRepr,
    space::SpaceSpec,
    types::{DMatrix, Scalar},
};
use num_traits::Float;
use std::fmt::Debug;
use std::marker::PhantomData;

/// Trait for Riemannian metrics.
///
/// The associated `Point` type is the array representation of both points
/// and tangent vectors on the underlying space ([`crate::point::PointRepr`]).
///
/// Rank-3 tensors (the derivative of the metric matrix and the Christoffel
/// symbols) are represented as a `Vec` of `dim x dim` matrices with the
/// outermost index first: `christoffels(p)[k][(i, j)]` is Γᵏᵢⱼ.
pub trait RiemannianMetric<T: Scalar>: Debug + Send + Sync {
    /// Array representation of points and tangent vectors.
    type Point: PointRepr<T>;

    /// The space this metric is defined on.
    fn space(&self) -> &SpaceSpec;

    /// Inner-product matrix at `base_point`.
    ///
    /// # Errors
    ///
    /// Metrics without a closed form over their point shape return a
    /// `NotImplemented` error; this is the default.
    fn metric_matrix(&self, base_point: &Self::Point) -> Result<DMatrix<T>> {
        let _ = base_point;
        Err(GeometryError::not_implemented("metric_matrix"))
    }

    /// Inverse of the inner-product matrix (the cometric) at `base_point`.
    fn cometric_matrix(&self, base_point: &Self::Point) -> Result<DMatrix<T>> {
        self.metric_matrix(base_point)?
            .try_inverse()
            .ok_or_else(|| GeometryError::numerical_error("metric matrix is singular"))
    }

    /// Derivative of the inner-product matrix at `base_point`.
    ///
    /// Writing g_ij for the inner-product matrix, entry `[k][(i, j)]` of the
    /// result is ∂ₖ g_ij.
    fn inner_product_derivative_matrix(
        &self,
        base_point: &Self::Point,
    ) -> Result<Vec<DMatrix<T>>> {
        let _ = base_point;
        Err(GeometryError::not_implemented(
            "inner_product_derivative_matrix",
        ))
    }

    /// Christoffel symbols of the Levi-Civita connection at `base_point`,
    /// contravariant index outermost.
    fn christoffels(&self, base_point: &Self::Point) -> Result<Vec<DMatrix<T>>> {
        let _ = base_point;
        Err(GeometryError::not_implemented("christoffels"))
    }

    /// Inner product of two tangent vectors at `base_point`.
    ///
    /// The default contracts flattened coordinates through the metric
    /// matrix, uᵗ G v.
    fn inner_product(
        &self,
        tangent_vec_a: &Self::Point,
        tangent_vec_b: &Self::Point,
        base_point: &Self::Point,
    ) -> Result<T> {
        let g = self.metric_matrix(base_point)?;
        let u = tangent_vec_a.to_coords();
        let v = tangent_vec_b.to_coords();
        if u.len() != g.nrows() || v.len() != g.nrows() {
            return Err(GeometryError::dimension_mismatch(
                format!("vectors of length {}", g.nrows()),
                format!("lengths {} and {}", u.len(), v.len()),
            ));
        }
        Ok(u.dot(&(&g * &v)))
    }

    /// Inner product of two cotangent vectors at `base_point`, contracted
    /// through the cometric matrix.
    fn inner_coproduct(
        &self,
        cotangent_vec_a: &Self::Point,
        cotangent_vec_b: &Self::Point,
        base_point: &Self::Point,
    ) -> Result<T> {
        let g_inv = self.cometric_matrix(base_point)?;
        let u = cotangent_vec_a.to_coords();
        let v = cotangent_vec_b.to_coords();
        if u.len() != g_inv.nrows() || v.len() != g_inv.nrows() {
            return Err(GeometryError::dimension_mismatch(
                format!("covectors of length {}", g_inv.nrows()),
                format!("lengths {} and {}", u.len(), v.len()),
            ));
        }
        Ok(u.dot(&(&g_inv * &v)))
    }

    /// Squared norm of a tangent vector at `base_point`.
    fn squared_norm(&self, tangent_vec: &Self::Point, base_point: &Self::Point) -> Result<T> {
        self.inner_product(tangent_vec, tangent_vec, base_point)
    }

    /// Norm of a tangent vector at `base_point`.
    fn norm(&self, tangent_vec: &Self::Point, base_point: &Self::Point) -> Result<T> {
        self.squared_norm(tangent_vec, base_point)
            .map(|sq| <T as Float>::sqrt(sq))
    }

    /// Riemannian exponential of `tangent_vec` at `base_point`.
    fn exp(&self, tangent_vec: &Self::Point, base_point: &Self::Point) -> Result<Self::Point>;

    /// Riemannian logarithm of `point` at `base_point`.
    fn log(&self, point: &Self::Point, base_point: &Self::Point) -> Result<Self::Point>;

    /// Geodesic distance between two points.
    ///
    /// The default is the norm of the logarithm; implementations may
    /// override it with a closed form.
    fn dist(&self, point_a: &Self::Point, point_b: &Self::Point) -> Result<T> {
        let log = self.log(point_b, point_a)?;
        self.norm(&log, point_a)
    }

    /// Squared geodesic distance between two points.
    fn squared_dist(&self, point_a: &Self::Point, point_b: &Self::Point) -> Result<T> {
        let d = self.dist(point_a, point_b)?;
        Ok(d * d)
    }

    /// Geodesic curve through `initial_point`.
    ///
    /// The curve is defined by exactly one of `end_point` (a logarithm is
    /// computed) or `initial_tangent_vec`. Supplying both or neither is an
    /// `InvalidConfiguration` error.
    fn geodesic(
        &self,
        initial_point: &Self::Point,
        end_point: Option<&Self::Point>,
        initial_tangent_vec: Option<&Self::Point>,
    ) -> Result<Geodesic<'_, T, Self>>
    where
        Self: Sized,
    {
        let tangent = match (end_point, initial_tangent_vec) {
            (Some(_), Some(_)) => {
                return Err(GeometryError::invalid_configuration(
                    "cannot specify both an end point and an initial tangent vector",
                ))
            }
            (None, None) => {
                return Err(GeometryError::invalid_configuration(
                    "specify an end point or an initial tangent vector to define the geodesic",
                ))
            }
            (Some(end), None) => self.log(end, initial_point)?,
            (None, Some(vec)) => vec.clone(),
        };
        Ok(Geodesic {
            metric: self,
            initial_point: initial_point.clone(),
            initial_tangent_vec: tangent,
            _scalar: PhantomData,
        })
    }

    /// Parallel transport of `tangent_vec` from `base_point`, either along
    /// `direction` or towards `end_point` (implementation-specific which of
    /// the two is required).
    fn parallel_transport(
        &self,
        tangent_vec: &Self::Point,
        base_point: &Self::Point,
        direction: Option<&Self::Point>,
        end_point: Option<&Self::Point>,
    ) -> Result<Self::Point>;

    /// Radius of the largest ball around `base_point` on which `exp` is a
    /// diffeomorphism.
    fn injectivity_radius(&self, base_point: &Self::Point) -> Result<T>;
}

/// Time-parameterized geodesic curve.
///
/// A `Geodesic` is a restartable pure function of time: evaluating it never
/// mutates state, so the same curve can be sampled repeatedly. `at(0)` is
/// the initial point and, when the curve was built from an end point,
/// `at(1)` reaches it.
#[derive(Debug, Clone)]
pub struct Geodesic<'a, T: Scalar, M: RiemannianMetric<T>> {
    metric: &'a M,
    initial_point: M::Point,
    initial_tangent_vec: M::Point,
    _scalar: PhantomData<fn() -> T>,
}

impl<'a, T: Scalar, M: RiemannianMetric<T>> Geodesic<'a, T, M> {
    /// Initial point of the curve.
    pub fn initial_point(&self) -> &M::Point {
        &self.initial_point
    }

    /// Initial speed of the curve.
    pub fn initial_tangent_vec(&self) -> &M::Point {
        &self.initial_tangent_vec
    }

    /// Point reached at time `t`.
    pub fn at(&self, t: T) -> Result<M::Point> {
        self.metric
            .exp(&self.initial_tangent_vec.scaled(t), &self.initial_point)
    }

    /// Points reached at each of `times`.
    ///
    /// The leading axis of the output corresponds to the time axis: one
    /// point per entry of `times`.
    pub fn sample(&self, times: &[T]) -> Result<Vec<M::Point>> {
        times.iter().map(|&t| self.at(t)).collect()
    }
}
